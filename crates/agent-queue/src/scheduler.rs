//! Step scheduler
//!
//! Bridges step execution and the queue: after a step completes, decides
//! whether the operation continues, at what priority, and with what delay,
//! then enqueues the next step. The decision logic is pure and separately
//! testable; only the final enqueue touches the backend.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use agent_core::{AgentState, ExecutionContext, Status};

use crate::delay::calculate_delay;
use crate::error::Result;
use crate::message::{Priority, QueueMessage};
use crate::service::QueueService;

/// What one executed step left behind
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Agent state after the step was applied
    pub state: AgentState,

    /// Context for the next step; `None` means the run yielded no
    /// continuation and the operation stops here
    pub next_context: Option<ExecutionContext>,

    /// Whether the step invoked any tools
    pub had_tool_calls: bool,

    /// Whether the step recovered from an execution error
    pub had_errors: bool,

    /// Optional payload to carry to the next step
    pub payload: Option<Value>,
}

/// Decide whether an operation should keep stepping
pub fn should_continue(outcome: &StepOutcome) -> bool {
    outcome.state.status == Status::Running && outcome.next_context.is_some()
}

/// Priority for the step after this outcome
///
/// Erroring operations drop to low priority so healthy ones are not paced
/// behind their backoff.
pub fn next_priority(outcome: &StepOutcome) -> Priority {
    if outcome.had_errors {
        Priority::Low
    } else {
        Priority::Normal
    }
}

/// Schedules operation steps onto a queue backend
pub struct StepScheduler {
    queue: Arc<dyn QueueService>,
}

impl StepScheduler {
    /// Create a scheduler over the given backend
    pub fn new(queue: Arc<dyn QueueService>) -> Self {
        Self { queue }
    }

    /// Enqueue the first step of a fresh operation
    ///
    /// First steps run at high priority with the minimal delay so a new
    /// operation feels immediate.
    pub async fn schedule_first(
        &self,
        operation_id: &str,
        context: ExecutionContext,
    ) -> Result<String> {
        let delay = calculate_delay(Priority::High, 0, false, false);
        let message = QueueMessage::new(operation_id, 0, context)
            .with_priority(Priority::High)
            .with_delay(delay);

        let task_id = self.queue.schedule_message(message).await?;
        info!(operation_id = %operation_id, task_id = %task_id, "Scheduled first step");
        Ok(task_id)
    }

    /// Enqueue the next step after an outcome, if the operation continues
    ///
    /// Returns the scheduled task id, or `None` when the operation reached
    /// a terminal status or yielded no continuation context.
    pub async fn schedule_next(&self, outcome: &StepOutcome) -> Result<Option<String>> {
        if !should_continue(outcome) {
            debug!(
                operation_id = %outcome.state.operation_id,
                status = %outcome.state.status,
                "Operation does not continue"
            );
            return Ok(None);
        }

        let Some(context) = outcome.next_context.clone() else {
            return Ok(None);
        };

        let step_index = outcome.state.step_count;
        let priority = next_priority(outcome);
        let delay = calculate_delay(
            priority,
            step_index,
            outcome.had_tool_calls,
            outcome.had_errors,
        );

        let mut message = QueueMessage::new(&outcome.state.operation_id, step_index, context)
            .with_priority(priority)
            .with_delay(delay);
        if let Some(payload) = outcome.payload.clone() {
            message = message.with_payload(payload);
        }

        let task_id = self.queue.schedule_message(message).await?;
        debug!(
            operation_id = %outcome.state.operation_id,
            step_index,
            task_id = %task_id,
            delay_ms = delay.as_millis() as u64,
            "Scheduled next step"
        );
        Ok(Some(task_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalQueueService;
    use crate::message::{HealthStatus, QueueStats};
    use crate::service::ExecutionCallback;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct CapturingQueue {
        messages: Mutex<Vec<QueueMessage>>,
    }

    impl CapturingQueue {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                messages: Mutex::new(Vec::new()),
            })
        }

        fn captured(&self) -> Vec<QueueMessage> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QueueService for CapturingQueue {
        async fn schedule_message(&self, message: QueueMessage) -> Result<String> {
            let mut messages = self.messages.lock().unwrap();
            messages.push(message);
            Ok(format!("task-{}", messages.len()))
        }

        async fn cancel_scheduled_task(&self, _task_id: &str) -> Result<bool> {
            Ok(false)
        }

        async fn queue_stats(&self) -> Result<QueueStats> {
            Ok(QueueStats {
                backend: "capture".to_string(),
                scheduled: 0,
                pending: 0,
                completed: 0,
            })
        }

        async fn health_check(&self) -> Result<HealthStatus> {
            Ok(HealthStatus::healthy("capture"))
        }
    }

    fn outcome(status: Status, with_context: bool) -> StepOutcome {
        let mut state = AgentState::new("op-1");
        state.step_count = 2;
        state.status = status;
        StepOutcome {
            state,
            next_context: with_context.then(ExecutionContext::new),
            had_tool_calls: false,
            had_errors: false,
            payload: None,
        }
    }

    #[test]
    fn test_should_continue_requires_running_and_context() {
        assert!(should_continue(&outcome(Status::Running, true)));
        assert!(!should_continue(&outcome(Status::Running, false)));
        assert!(!should_continue(&outcome(Status::Done, true)));
        assert!(!should_continue(&outcome(Status::Error, true)));
    }

    #[test]
    fn test_erroring_outcome_drops_priority() {
        let mut erroring = outcome(Status::Running, true);
        erroring.had_errors = true;
        assert_eq!(next_priority(&erroring), Priority::Low);
        assert_eq!(next_priority(&outcome(Status::Running, true)), Priority::Normal);
    }

    #[tokio::test]
    async fn test_schedule_next_builds_message_from_outcome() {
        let queue = CapturingQueue::new();
        let scheduler = StepScheduler::new(queue.clone());

        let mut done = outcome(Status::Running, true);
        done.had_tool_calls = true;

        let task_id = scheduler.schedule_next(&done).await.unwrap();
        assert_eq!(task_id, Some("task-1".to_string()));

        let captured = queue.captured();
        assert_eq!(captured.len(), 1);
        let message = &captured[0];
        assert_eq!(message.operation_id, "op-1");
        assert_eq!(message.step_index, 2);
        assert_eq!(message.priority, Priority::Normal);
        // Normal base plus the tool call penalty.
        assert_eq!(message.delay, Some(Duration::from_millis(150)));
    }

    #[tokio::test]
    async fn test_terminal_outcome_schedules_nothing() {
        let queue = CapturingQueue::new();
        let scheduler = StepScheduler::new(queue.clone());

        let task_id = scheduler.schedule_next(&outcome(Status::Done, true)).await.unwrap();
        assert_eq!(task_id, None);
        assert!(queue.captured().is_empty());
    }

    #[tokio::test]
    async fn test_schedule_first_is_high_priority() {
        let queue = CapturingQueue::new();
        let scheduler = StepScheduler::new(queue.clone());

        scheduler
            .schedule_first("op-9", ExecutionContext::new())
            .await
            .unwrap();

        let captured = queue.captured();
        let message = &captured[0];
        assert_eq!(message.operation_id, "op-9");
        assert_eq!(message.step_index, 0);
        assert_eq!(message.priority, Priority::High);
        assert_eq!(message.delay, Some(Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_scheduler_over_local_backend_executes_step() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let callback: ExecutionCallback = Arc::new(move |operation_id, step_index, _context| {
            let tx = tx.clone();
            Box::pin(async move {
                let _ = tx.send((operation_id, step_index));
                Ok(())
            })
        });
        let scheduler = StepScheduler::new(Arc::new(LocalQueueService::new(callback)));

        scheduler
            .schedule_next(&outcome(Status::Running, true))
            .await
            .unwrap();

        let fired = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("callback should fire")
            .unwrap();
        assert_eq!(fired, ("op-1".to_string(), 2));
    }
}
