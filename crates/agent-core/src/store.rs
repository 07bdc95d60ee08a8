//! State persistence seam
//!
//! The store that holds `AgentState` between steps is an external
//! collaborator; this module only fixes the contract: read before resuming a
//! step, write after a step completes, keyed by operation id, with a
//! version check so two concurrent "next step" deliveries cannot race on
//! stale state. An in-memory implementation is provided for tests and local
//! mode.

use crate::{AgentState, Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Persistence contract for durable agent state
///
/// `save` must fail with [`Error::StaleState`] when the stored version does
/// not match the version the caller loaded, and increment the version on
/// success. Only the execution callback currently processing a given
/// `(operation_id, step_index)` may write that operation's state.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the current state of an operation
    async fn load(&self, operation_id: &str) -> Result<Option<AgentState>>;

    /// Persist a state, enforcing the optimistic version check
    ///
    /// Returns the new version number.
    async fn save(&self, state: &AgentState) -> Result<u64>;
}

/// In-memory state store
#[derive(Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<String, AgentState>>,
}

impl MemoryStateStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, operation_id: &str) -> Result<Option<AgentState>> {
        let states = self
            .states
            .lock()
            .map_err(|e| Error::Generic(format!("state store poisoned: {e}")))?;
        Ok(states.get(operation_id).cloned())
    }

    async fn save(&self, state: &AgentState) -> Result<u64> {
        let mut states = self
            .states
            .lock()
            .map_err(|e| Error::Generic(format!("state store poisoned: {e}")))?;

        if let Some(existing) = states.get(&state.operation_id) {
            if existing.version != state.version {
                return Err(Error::StaleState {
                    operation_id: state.operation_id.clone(),
                    expected: state.version,
                    found: existing.version,
                });
            }
        }

        let mut next = state.clone();
        next.version += 1;
        let version = next.version;
        debug!(
            operation_id = %state.operation_id,
            version = version,
            step_count = state.step_count,
            "Persisted agent state"
        );
        states.insert(state.operation_id.clone(), next);
        Ok(version)
    }
}
