//! Decision function contract
//!
//! An agent is a cooperative coroutine expressed as an object: each call to
//! [`Agent::decide`] advances it to its next suspension point, either
//! yielding an [`Instruction`] or returning a final value. The runtime is
//! the trait's only caller and never inspects model or provider specifics.

use crate::{Instruction, Result};
use async_trait::async_trait;
use serde_json::Value;

/// One advancement of the decision coroutine
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Suspend with an instruction for the runtime to interpret
    Yield(Instruction),
    /// The decision loop is exhausted; the run finishes with this value
    Return(Value),
}

/// Decision logic driven by the runtime
///
/// The runtime alternates: call `decide` with the result of the previous
/// instruction (tool result or externally supplied prompt answer), interpret
/// the yielded instruction, repeat. `resume` is `None` exactly once, on the
/// first advancement.
#[async_trait]
pub trait Agent: Send {
    /// Advance to the next yield or return
    async fn decide(&mut self, resume: Option<Value>) -> Result<Step>;

    /// Cleanup hook invoked when the run is interrupted
    ///
    /// Mirrors the "return signal" an interrupt injects into a coroutine:
    /// the agent gets one chance to release resources before the runtime
    /// marks the run terminally stopped.
    async fn on_interrupt(&mut self) {}

    /// Name of the agent, used in logs
    fn name(&self) -> &str {
        "agent"
    }
}

/// A scripted agent that replays a fixed sequence of steps
///
/// Intended for tests and demos: resume values are recorded so assertions
/// can check what the runtime fed back.
pub struct ScriptedAgent {
    steps: std::collections::VecDeque<Step>,
    resumes: Vec<Option<Value>>,
    name: String,
}

impl ScriptedAgent {
    /// Create a scripted agent from a step sequence
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            resumes: Vec::new(),
            name: "scripted".to_string(),
        }
    }

    /// Resume values observed so far, in order
    pub fn resumes(&self) -> &[Option<Value>] {
        &self.resumes
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    async fn decide(&mut self, resume: Option<Value>) -> Result<Step> {
        self.resumes.push(resume);
        Ok(self
            .steps
            .pop_front()
            .unwrap_or(Step::Return(Value::Null)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
