//! Pull-based run driver
//!
//! Coroutine control flow expressed as an explicit state machine: the
//! caller pulls events with [`Run::next`], supplying a resume value when the
//! previous event was `Paused`. Exactly two suspension points exist
//! (awaiting an external resume value, and awaiting or draining a tool
//! call), and interruption is only observed at those boundaries.

use agent_core::{Agent, AgentState, Error, Instruction, Message, Result, RunEvent, Status, Step};
use agent_tools::ToolExecutor;
use crate::runtime::RuntimeConfig;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Cooperative interruption handle
///
/// Safe to call from outside the loop while a consumer drives the run; the
/// effect is observed at the next suspension boundary. Idempotent: only the
/// first reason is kept, later calls are no-ops.
#[derive(Clone, Default)]
pub struct InterruptHandle {
    requested: Arc<AtomicBool>,
    reason: Arc<Mutex<Option<String>>>,
}

impl InterruptHandle {
    /// Request early termination of the run
    pub fn interrupt(&self, reason: impl Into<String>) {
        if self.requested.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Ok(mut slot) = self.reason.lock() {
            *slot = Some(reason.into());
        }
    }

    fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    fn reason(&self) -> String {
        self.reason
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .unwrap_or_else(|| "interrupted".to_string())
    }
}

/// Driver phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The decision function has not been advanced yet
    Created,
    /// Ready to advance the decision function
    Ready,
    /// A `Paused` event was emitted; an external resume value is required
    AwaitingResume,
    /// A terminal event was emitted (or an error escaped); the run is over
    Terminal,
}

/// One agent run: a lazy sequence of [`RunEvent`]s ending in exactly one
/// terminal event
///
/// The protocol is cooperative, single-threaded and pull-based: call
/// [`Run::next`] to obtain the next event; after a `Paused` event the next
/// call must carry `Some(resume)`. After the terminal event, `next` returns
/// `Ok(None)` forever.
pub struct Run {
    agent: Box<dyn Agent>,
    executor: ToolExecutor,
    config: RuntimeConfig,
    state: AgentState,
    phase: Phase,
    /// Buffered `Running` chunk events from a drained tool stream
    buffered: VecDeque<RunEvent>,
    /// Value to feed into the next decision advancement
    pending_input: Option<Value>,
    interrupt: InterruptHandle,
}

impl Run {
    pub(crate) fn new(agent: Box<dyn Agent>, executor: ToolExecutor, config: RuntimeConfig) -> Self {
        let state = AgentState::new(config.operation_id.clone());
        Self {
            agent,
            executor,
            config,
            state,
            phase: Phase::Created,
            buffered: VecDeque::new(),
            pending_input: None,
            interrupt: InterruptHandle::default(),
        }
    }

    /// Get a handle for requesting cooperative interruption
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// The run's accumulated state
    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Advance the run and return the next event
    ///
    /// # Arguments
    ///
    /// * `resume` - Required (`Some`) when the previous event was `Paused`;
    ///   ignored otherwise
    ///
    /// # Errors
    ///
    /// Tool and decision failures propagate here and terminate the sequence
    /// without a clean terminal event; [`Error::ResumeRequired`] is returned
    /// when the run is paused and no resume value was supplied.
    pub async fn next(&mut self, resume: Option<Value>) -> Result<Option<RunEvent>> {
        // Chunks drained from the last tool call are replayed first, in
        // production order.
        if let Some(event) = self.buffered.pop_front() {
            return Ok(Some(event));
        }

        match self.phase {
            Phase::Terminal => return Ok(None),
            Phase::AwaitingResume => {
                let Some(value) = resume else {
                    return Err(Error::ResumeRequired);
                };
                self.pending_input = Some(value);
                self.phase = Phase::Ready;
            }
            Phase::Created => {
                self.phase = Phase::Ready;
            }
            Phase::Ready => {}
        }

        self.advance().await
    }

    /// Drive the decision function until an event is produced
    async fn advance(&mut self) -> Result<Option<RunEvent>> {
        loop {
            // Interruption and step limits are suspension-boundary checks:
            // they never preempt a tool execution already in flight.
            if self.interrupt.requested() {
                return Ok(Some(self.stop(self.interrupt.reason()).await));
            }
            if let Some(max) = self.config.max_steps {
                if self.state.step_count >= max {
                    return Ok(Some(self.stop(format!("max steps exceeded: {max}")).await));
                }
            }

            let input = self.pending_input.take();
            let step = match self.agent.decide(input).await {
                Ok(step) => step,
                Err(e) => {
                    self.fail();
                    return Err(e);
                }
            };

            match step {
                Step::Return(value) => {
                    info!(
                        operation_id = %self.state.operation_id,
                        step_count = self.state.step_count,
                        "Run finished"
                    );
                    self.phase = Phase::Terminal;
                    self.state.transition(Status::Done)?;
                    return Ok(Some(RunEvent::Finished { value }));
                }

                Step::Yield(Instruction::Prompt { payload }) => {
                    debug!(
                        operation_id = %self.state.operation_id,
                        prompt = %payload,
                        "Run paused on prompt"
                    );
                    self.state.usage.prompt_requests += 1;
                    self.state.complete_step();
                    self.phase = Phase::AwaitingResume;
                    return Ok(Some(RunEvent::Paused {
                        instruction: Instruction::Prompt { payload },
                    }));
                }

                Step::Yield(Instruction::CallTool { tool, args }) => {
                    // Executed inside the run: no external input is needed,
                    // so no Paused event is surfaced for this step.
                    let started = Instant::now();
                    let execution = match self.executor.execute(&tool, args).await {
                        Ok(execution) => execution,
                        Err(e) => {
                            self.fail();
                            return Err(e);
                        }
                    };

                    self.state.usage.tool_calls += 1;
                    self.state.usage.streamed_chunks += execution.chunks.len() as u64;
                    self.state.usage.execution_time_ms +=
                        started.elapsed().as_millis() as u64;
                    self.state.push_message(Message::tool_result(
                        tool,
                        execution.resolved.to_string(),
                    ));
                    self.state.complete_step();

                    self.buffered.extend(
                        execution
                            .chunks
                            .into_iter()
                            .map(|data| RunEvent::Running { data }),
                    );
                    self.pending_input = Some(execution.resolved);

                    if let Some(event) = self.buffered.pop_front() {
                        return Ok(Some(event));
                    }
                    // No chunks: resume the decision function immediately.
                }

                Step::Yield(other) => {
                    // Instructions the core loop cannot execute degrade to a
                    // stop with a descriptive reason, never a hard failure.
                    let reason = format!("unsupported instruction: {}", other.kind());
                    warn!(
                        operation_id = %self.state.operation_id,
                        instruction = other.kind(),
                        "Stopping run"
                    );
                    return Ok(Some(self.stop(reason).await));
                }
            }
        }
    }

    /// Inject the return signal into the decision function and emit the
    /// terminal `Stopped` event
    async fn stop(&mut self, reason: String) -> RunEvent {
        self.agent.on_interrupt().await;
        self.phase = Phase::Terminal;
        // Stopped is a controlled termination, not an error state.
        let _ = self.state.transition(Status::Done);
        info!(
            operation_id = %self.state.operation_id,
            reason = %reason,
            "Run stopped"
        );
        RunEvent::Stopped { reason }
    }

    /// Mark the run failed; the caller sees the error instead of an event
    fn fail(&mut self) {
        self.phase = Phase::Terminal;
        let _ = self.state.transition(Status::Error);
    }
}
