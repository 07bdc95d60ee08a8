//! Queue service trait and the execution callback contract

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use agent_core::ExecutionContext;

use crate::error::Result;
use crate::message::{HealthStatus, QueueMessage, QueueStats};

/// Callback invoked when a scheduled message fires.
///
/// Receives the operation id, the step index to execute, and the execution
/// context carried by the message. Backends that execute in-process bind
/// this at construction time; a service without a callback cannot exist,
/// which closes the window where a message could fire into nothing.
///
/// Contract: at most one invocation per `(operation_id, step_index)` may
/// write that operation's state, and the callback must tolerate duplicate
/// deliveries (brokers retry).
pub type ExecutionCallback =
    Arc<dyn Fn(String, u64, ExecutionContext) -> BoxFuture<'static, Result<()>> + Send + Sync>;

/// Backend-agnostic scheduling interface.
///
/// Errors surface synchronously from `schedule_message`; once a message is
/// accepted, execution failures are the callback's (or the broker's)
/// concern, not the scheduler's.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Schedule a single message, returning its task id.
    async fn schedule_message(&self, message: QueueMessage) -> Result<String>;

    /// Schedule several messages, returning their task ids in order.
    ///
    /// Fails fast: the first rejected message aborts the batch and any ids
    /// already returned by the backend remain scheduled.
    async fn schedule_batch_messages(&self, messages: Vec<QueueMessage>) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(messages.len());
        for message in messages {
            ids.push(self.schedule_message(message).await?);
        }
        Ok(ids)
    }

    /// Cancel a scheduled task that has not fired yet.
    ///
    /// Returns `true` when the task was found and cancelled, `false` when
    /// it already fired or the id is unknown.
    async fn cancel_scheduled_task(&self, task_id: &str) -> Result<bool>;

    /// Point-in-time counters for this backend.
    async fn queue_stats(&self) -> Result<QueueStats>;

    /// Probe backend health without side effects.
    async fn health_check(&self) -> Result<HealthStatus>;
}
