//! Run events
//!
//! The runtime's external observable output. Events are totally ordered
//! within a single run and end in exactly one terminal event (`Finished` or
//! `Stopped`); a test suite can replay a run against the event sequence.

use crate::Instruction;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An observable event emitted while driving a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    /// The decision suspended and needs an external resume value
    Paused { instruction: Instruction },

    /// An incremental chunk produced by a streaming tool
    Running { data: Value },

    /// The decision loop completed normally
    Finished { value: Value },

    /// The run was interrupted
    Stopped { reason: String },
}

impl RunEvent {
    /// Whether this event terminates the run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Stopped { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_terminal_events() {
        assert!(RunEvent::Finished { value: json!(1) }.is_terminal());
        assert!(
            RunEvent::Stopped {
                reason: "interrupted".to_string()
            }
            .is_terminal()
        );
        assert!(!RunEvent::Running { data: json!("a") }.is_terminal());
        assert!(
            !RunEvent::Paused {
                instruction: Instruction::Prompt {
                    payload: "?".to_string()
                }
            }
            .is_terminal()
        );
    }

    #[test]
    fn test_tagged_serialization() {
        let event = RunEvent::Running {
            data: json!("chunk"),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({ "type": "running", "data": "chunk" }));
    }
}
