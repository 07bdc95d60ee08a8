//! Instruction protocol
//!
//! Instructions are the vocabulary an agent's decision logic emits at each
//! step. They are immutable value objects: every variant is pure data with a
//! `type` discriminant, and the runtime never mutates one after it is
//! produced. Consumers must treat a variant they cannot execute as an
//! interrupt condition rather than silently ignoring it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An instruction emitted by the decision function at each step
///
/// `Prompt` and `CallTool` are the two variants the core loop executes
/// directly. The remaining variants belong to the group orchestration
/// protocol and are routed by the caller; the core loop treats them as
/// unrecognized (see [`Instruction::is_executable`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    /// Ask the driving context (human or caller) for a value; execution
    /// suspends until one is supplied
    Prompt { payload: String },

    /// Invoke a registered tool; execution suspends until the tool settles
    CallTool { tool: String, args: Vec<Value> },

    /// Hand the conversation to the configured supervisor agent
    CallSupervisor { payload: Value },

    /// Let a single group member speak
    Speak { payload: Value },

    /// Fan an instruction out to several group members
    Broadcast { payload: Value },

    /// Delegate a task to another agent
    Delegate { payload: Value },

    /// A group member finished speaking
    AgentSpoke { payload: Value },

    /// A broadcast round completed
    AgentsBroadcasted { payload: Value },

    /// Terminate the orchestration with a reason
    Finish { reason: String },
}

impl Instruction {
    /// The wire discriminant for this instruction
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Prompt { .. } => "prompt",
            Self::CallTool { .. } => "call_tool",
            Self::CallSupervisor { .. } => "call_supervisor",
            Self::Speak { .. } => "speak",
            Self::Broadcast { .. } => "broadcast",
            Self::Delegate { .. } => "delegate",
            Self::AgentSpoke { .. } => "agent_spoke",
            Self::AgentsBroadcasted { .. } => "agents_broadcasted",
            Self::Finish { .. } => "finish",
        }
    }

    /// Whether the core loop can execute this instruction itself
    ///
    /// Orchestration variants are only meaningful to a group driver; the
    /// core loop degrades to a stop when it receives one.
    pub fn is_executable(&self) -> bool {
        matches!(self, Self::Prompt { .. } | Self::CallTool { .. })
    }
}
