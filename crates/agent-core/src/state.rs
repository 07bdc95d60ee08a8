//! Durable agent state
//!
//! `AgentState` is the unit that must survive process boundaries when a run
//! is driven through a queue: it is read before a step resumes, written
//! after the step completes, and keyed by a stable operation id. The record
//! carries a version number for optimistic concurrency at the persistence
//! boundary.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an operation
///
/// Transitions only `Running -> {Running, Done, Error}`; `Done` and `Error`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Running,
    Done,
    Error,
}

impl Status {
    /// Whether this status admits no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Running => "running",
            Self::Done => "done",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// A message accumulated over the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message role (`user`, `assistant`, `tool`)
    pub role: String,
    /// Message content
    pub content: String,
    /// Tool call this message settles, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            tool_call_id: None,
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            tool_call_id: None,
        }
    }

    /// Create a tool result message
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: content.into(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// Usage accounting accumulated over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of prompt suspensions surfaced to the caller
    pub prompt_requests: u64,
    /// Number of tool invocations
    pub tool_calls: u64,
    /// Number of streamed chunks drained from tools
    pub streamed_chunks: u64,
    /// Wall-clock time spent executing instructions, in milliseconds
    pub execution_time_ms: u64,
}

/// Durable, serializable state of one agent operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    /// Stable identifier of the operation this state belongs to
    pub operation_id: String,
    /// Accumulated message history
    pub messages: Vec<Message>,
    /// Completed instruction cycles; increases by exactly 1 per cycle
    pub step_count: u64,
    /// Optimistic concurrency guard, checked-and-incremented on save
    pub version: u64,
    /// Usage and cost accounting
    pub usage: Usage,
    /// Lifecycle status
    pub status: Status,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub last_modified: DateTime<Utc>,
}

impl AgentState {
    /// Create a fresh state for an operation
    pub fn new(operation_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            operation_id: operation_id.into(),
            messages: Vec::new(),
            step_count: 0,
            version: 0,
            usage: Usage::default(),
            status: Status::Running,
            created_at: now,
            last_modified: now,
        }
    }

    /// Record the completion of one instruction cycle
    pub fn complete_step(&mut self) {
        self.step_count += 1;
        self.touch();
    }

    /// Append a message to the history
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.touch();
    }

    /// Transition to a new status
    ///
    /// Terminal statuses reject further transitions; re-asserting the
    /// current status is a no-op.
    pub fn transition(&mut self, next: Status) -> Result<()> {
        if self.status == next {
            return Ok(());
        }
        if self.status.is_terminal() {
            return Err(Error::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = AgentState::new("op-1");
        assert_eq!(state.operation_id, "op-1");
        assert_eq!(state.step_count, 0);
        assert_eq!(state.version, 0);
        assert_eq!(state.status, Status::Running);
        assert!(state.messages.is_empty());
    }

    #[test]
    fn test_step_count_increments_by_one() {
        let mut state = AgentState::new("op-1");
        state.complete_step();
        state.complete_step();
        assert_eq!(state.step_count, 2);
    }

    #[test]
    fn test_terminal_status_rejects_transition() {
        let mut state = AgentState::new("op-1");
        state.transition(Status::Done).unwrap();

        let err = state.transition(Status::Running).unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
        assert_eq!(state.status, Status::Done);
    }

    #[test]
    fn test_reasserting_status_is_noop() {
        let mut state = AgentState::new("op-1");
        state.transition(Status::Done).unwrap();
        // Same terminal status again is fine
        state.transition(Status::Done).unwrap();
    }

    #[test]
    fn test_running_to_error() {
        let mut state = AgentState::new("op-1");
        state.transition(Status::Error).unwrap();
        assert!(state.status.is_terminal());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut state = AgentState::new("op-1");
        state.push_message(Message::user("hello"));
        state.complete_step();

        let text = serde_json::to_string(&state).unwrap();
        let back: AgentState = serde_json::from_str(&text).unwrap();
        assert_eq!(back, state);
    }
}
