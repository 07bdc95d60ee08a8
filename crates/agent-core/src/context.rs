//! Execution context
//!
//! `ExecutionContext` is the opaque record carried between steps: the queue
//! schedules it alongside an operation and the execution callback receives
//! it back verbatim. It is a serializable key-value store with typed
//! accessors for the fields every backend agrees on.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Phase the next step should execute in
    pub const PHASE: &str = "phase";
    /// Phase payload
    pub const PAYLOAD: &str = "payload";
    /// Operation this context belongs to
    pub const OPERATION_ID: &str = "operation_id";
}

/// Opaque context passed between steps
///
/// # Example
///
/// ```
/// use agent_core::ExecutionContext;
///
/// let ctx = ExecutionContext::new()
///     .with_phase("call_supervisor")
///     .with_operation_id("op-123");
///
/// assert_eq!(ctx.phase(), Some("call_supervisor"));
/// assert_eq!(ctx.operation_id(), Some("op-123"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Key-value storage for context data
    #[serde(flatten)]
    data: HashMap<String, serde_json::Value>,
}

impl ExecutionContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the phase
    pub fn with_phase(mut self, phase: impl Into<String>) -> Self {
        self.insert(keys::PHASE, serde_json::json!(phase.into()));
        self
    }

    /// Set the phase payload
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.insert(keys::PAYLOAD, payload);
        self
    }

    /// Set the operation id
    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.insert(keys::OPERATION_ID, serde_json::json!(operation_id.into()));
        self
    }

    /// Get the phase
    pub fn phase(&self) -> Option<&str> {
        self.get(keys::PHASE).and_then(|v| v.as_str())
    }

    /// Get the phase payload
    pub fn payload(&self) -> Option<&serde_json::Value> {
        self.get(keys::PAYLOAD)
    }

    /// Get the operation id
    pub fn operation_id(&self) -> Option<&str> {
        self.get(keys::OPERATION_ID).and_then(|v| v.as_str())
    }

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_chain() {
        let ctx = ExecutionContext::new()
            .with_phase("speak")
            .with_payload(json!({ "agentId": "a-1" }))
            .with_operation_id("op-1");

        assert_eq!(ctx.phase(), Some("speak"));
        assert_eq!(ctx.payload(), Some(&json!({ "agentId": "a-1" })));
        assert_eq!(ctx.operation_id(), Some("op-1"));
    }

    #[test]
    fn test_serde_flattens_keys() {
        let ctx = ExecutionContext::new().with_phase("init");
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value, json!({ "phase": "init" }));

        let back: ExecutionContext = serde_json::from_value(value).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn test_empty_context() {
        let ctx = ExecutionContext::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.len(), 0);
        assert!(ctx.phase().is_none());
    }
}
