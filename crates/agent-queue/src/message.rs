//! Queue message and status types

use std::time::Duration;

use agent_core::ExecutionContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scheduling priority for a queued step
///
/// Priority selects the base delay tier; it is advisory ordering, not a
/// hard real-time guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Interactive work, shortest base delay
    High,
    /// Regular step continuation
    #[default]
    Normal,
    /// Deprioritized work, e.g. operations that keep erroring
    Low,
}

impl Priority {
    /// The lowercase wire label for this priority
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }
}

/// One unit of scheduled work: run one step of one operation, later
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Operation this step belongs to
    pub operation_id: String,

    /// Zero-based index of the step to execute
    pub step_index: u64,

    /// Execution context handed to the callback when the message fires
    pub context: ExecutionContext,

    /// Optional opaque payload carried alongside the context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// How long to wait before executing; backend default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Duration>,

    /// Scheduling priority
    #[serde(default)]
    pub priority: Priority,

    /// Broker-side retry budget; meaningless for the local backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
}

impl QueueMessage {
    /// Create a message with default priority and no delay
    pub fn new(
        operation_id: impl Into<String>,
        step_index: u64,
        context: ExecutionContext,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            step_index,
            context,
            payload: None,
            delay: None,
            priority: Priority::default(),
            retries: None,
        }
    }

    /// Set the execution delay
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the scheduling priority
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the opaque payload
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the broker retry budget
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }
}

/// Point-in-time counters for a queue backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Backend identifier, e.g. `local` or `http`
    pub backend: String,

    /// Messages accepted since the service was created
    pub scheduled: u64,

    /// Messages accepted but not yet executed, where the backend can know
    pub pending: u64,

    /// Messages whose callback ran to completion, where the backend can know
    pub completed: u64,
}

/// Result of a queue health probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Whether the backend considers itself able to accept work
    pub healthy: bool,

    /// Backend identifier
    pub backend: String,

    /// Human-readable detail when unhealthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl HealthStatus {
    /// A healthy status for the given backend
    pub fn healthy(backend: impl Into<String>) -> Self {
        Self {
            healthy: true,
            backend: backend.into(),
            detail: None,
        }
    }

    /// An unhealthy status with detail
    pub fn unhealthy(backend: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            healthy: false,
            backend: backend.into(),
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builder() {
        let message = QueueMessage::new("op-1", 3, ExecutionContext::new())
            .with_delay(Duration::from_millis(150))
            .with_priority(Priority::High)
            .with_retries(2);

        assert_eq!(message.operation_id, "op-1");
        assert_eq!(message.step_index, 3);
        assert_eq!(message.delay, Some(Duration::from_millis(150)));
        assert_eq!(message.priority, Priority::High);
        assert_eq!(message.retries, Some(2));
        assert!(message.payload.is_none());
    }

    #[test]
    fn test_priority_serde() {
        assert_eq!(
            serde_json::to_value(Priority::High).unwrap(),
            serde_json::json!("high")
        );
        let parsed: Priority = serde_json::from_value(serde_json::json!("low")).unwrap();
        assert_eq!(parsed, Priority::Low);
    }

    #[test]
    fn test_priority_defaults_to_normal() {
        assert_eq!(Priority::default(), Priority::Normal);
    }

    #[test]
    fn test_priority_wire_labels() {
        assert_eq!(Priority::High.as_str(), "high");
        assert_eq!(Priority::Normal.as_str(), "normal");
        assert_eq!(Priority::Low.as_str(), "low");
    }
}
