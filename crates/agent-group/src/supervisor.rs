//! Group orchestration supervisor
//!
//! A stateless, pure router for multi-agent conversations: given the phase
//! the session just completed and its payload, it returns exactly one
//! instruction. It never mutates agent state, never loops, and never calls
//! a model; the only injected configuration is which agent identity acts as
//! supervisor and the round cap the caller enforces.

use agent_core::{AgentState, Instruction};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Configuration for the group orchestration supervisor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Agent identity that acts as supervisor for the group
    pub supervisor_agent_id: String,

    /// Round cap; carried for the caller, not enforced here
    pub max_rounds: u32,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            supervisor_agent_id: String::new(),
            max_rounds: 10,
        }
    }
}

/// Stateless router from orchestration phases to instructions
///
/// The mapping is total: every recognized phase maps 1:1 to its instruction
/// type with the payload carried through unchanged, except that
/// `call_supervisor` always stamps the configured supervisor identity over
/// any caller-supplied value. Any unrecognized phase, including the empty
/// string, fails closed to `finish` with reason `unknown_phase`;
/// orchestration never guesses.
pub struct GroupOrchestrationSupervisor {
    config: SupervisorConfig,
}

impl GroupOrchestrationSupervisor {
    /// Create a supervisor with the given configuration
    pub fn new(config: SupervisorConfig) -> Self {
        Self { config }
    }

    /// Get the configured supervisor identity
    pub fn supervisor_agent_id(&self) -> &str {
        &self.config.supervisor_agent_id
    }

    /// Get the round cap for the caller to enforce
    pub fn max_rounds(&self) -> u32 {
        self.config.max_rounds
    }

    /// Map a completed phase to the next instruction
    ///
    /// # Arguments
    ///
    /// * `phase` - The phase the session just completed
    /// * `payload` - Phase payload, passed through unchanged
    /// * `state` - Current agent state, read-only
    pub fn route(&self, phase: &str, payload: Value, _state: &AgentState) -> Instruction {
        match phase {
            "call_supervisor" => Instruction::CallSupervisor {
                payload: self.stamp_supervisor(payload),
            },
            "speak" => Instruction::Speak { payload },
            "broadcast" => Instruction::Broadcast { payload },
            "delegate" => Instruction::Delegate { payload },
            "agent_spoke" => Instruction::AgentSpoke { payload },
            "agents_broadcasted" => Instruction::AgentsBroadcasted { payload },
            "finish" => Instruction::Finish {
                reason: payload
                    .get("reason")
                    .and_then(Value::as_str)
                    .unwrap_or("completed")
                    .to_string(),
            },
            other => {
                warn!(phase = %other, "Unknown orchestration phase, finishing");
                Instruction::Finish {
                    reason: "unknown_phase".to_string(),
                }
            }
        }
    }

    /// Stamp the configured supervisor identity into the payload
    ///
    /// Overrides any caller-supplied identity: the configuration, not the
    /// inbound payload, decides who supervises.
    fn stamp_supervisor(&self, payload: Value) -> Value {
        let mut payload = match payload {
            Value::Object(map) => Value::Object(map),
            Value::Null => Value::Object(serde_json::Map::new()),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("payload".to_string(), other);
                Value::Object(map)
            }
        };
        if let Some(map) = payload.as_object_mut() {
            map.insert(
                "supervisor_agent_id".to_string(),
                Value::String(self.config.supervisor_agent_id.clone()),
            );
        }
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn supervisor() -> GroupOrchestrationSupervisor {
        GroupOrchestrationSupervisor::new(SupervisorConfig {
            supervisor_agent_id: "supervisor-1".to_string(),
            max_rounds: 10,
        })
    }

    fn state() -> AgentState {
        AgentState::new("op-1")
    }

    #[test]
    fn test_call_supervisor_stamps_configured_id() {
        let instruction = supervisor().route(
            "call_supervisor",
            json!({ "group_id": "g-1", "round": 0 }),
            &state(),
        );

        assert_eq!(
            instruction,
            Instruction::CallSupervisor {
                payload: json!({
                    "group_id": "g-1",
                    "round": 0,
                    "supervisor_agent_id": "supervisor-1",
                })
            }
        );
    }

    #[test]
    fn test_caller_supplied_supervisor_id_is_overridden() {
        let instruction = supervisor().route(
            "call_supervisor",
            json!({ "supervisor_agent_id": "attacker" }),
            &state(),
        );

        match instruction {
            Instruction::CallSupervisor { payload } => {
                assert_eq!(payload["supervisor_agent_id"], json!("supervisor-1"));
            }
            other => panic!("expected CallSupervisor, got {other:?}"),
        }
    }

    #[test]
    fn test_call_supervisor_with_null_payload() {
        let instruction = supervisor().route("call_supervisor", Value::Null, &state());
        match instruction {
            Instruction::CallSupervisor { payload } => {
                assert_eq!(payload["supervisor_agent_id"], json!("supervisor-1"));
            }
            other => panic!("expected CallSupervisor, got {other:?}"),
        }
    }

    #[test]
    fn test_phases_map_one_to_one() {
        let payload = json!({ "agent_id": "a-1" });
        let cases = [
            ("speak", Instruction::Speak { payload: payload.clone() }),
            ("broadcast", Instruction::Broadcast { payload: payload.clone() }),
            ("delegate", Instruction::Delegate { payload: payload.clone() }),
            ("agent_spoke", Instruction::AgentSpoke { payload: payload.clone() }),
            (
                "agents_broadcasted",
                Instruction::AgentsBroadcasted { payload: payload.clone() },
            ),
        ];

        for (phase, expected) in cases {
            let instruction = supervisor().route(phase, payload.clone(), &state());
            assert_eq!(instruction, expected, "phase: {phase}");
        }
    }

    #[test]
    fn test_finish_carries_reason() {
        let instruction = supervisor().route("finish", json!({ "reason": "all done" }), &state());
        assert_eq!(
            instruction,
            Instruction::Finish {
                reason: "all done".to_string()
            }
        );
    }

    #[test]
    fn test_finish_defaults_reason() {
        let instruction = supervisor().route("finish", json!({}), &state());
        assert_eq!(
            instruction,
            Instruction::Finish {
                reason: "completed".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_phase_fails_closed() {
        for phase in ["", "bogus", "CALL_SUPERVISOR", "speak "] {
            let instruction = supervisor().route(phase, json!({}), &state());
            assert_eq!(
                instruction,
                Instruction::Finish {
                    reason: "unknown_phase".to_string()
                },
                "phase: {phase:?}"
            );
        }
    }

    #[test]
    fn test_state_is_untouched() {
        let state = state();
        let before = state.clone();
        let _ = supervisor().route("speak", json!({}), &state);
        assert_eq!(state, before);
    }
}
