//! In-process queue backend
//!
//! Development backend that schedules steps with plain tokio timers. The
//! execution callback is bound at construction, so every message accepted
//! by this service already has somewhere to land. Cancellation is real up
//! to the moment the timer fires; after that it is a no-op.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::Result;
use crate::message::{HealthStatus, QueueMessage, QueueStats};
use crate::service::{ExecutionCallback, QueueService};

const BACKEND: &str = "local";

/// Delay applied when a message carries none.
const DEFAULT_DELAY: Duration = Duration::from_millis(50);

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<()>>>>;

/// Timer-based queue service for single-process deployments
pub struct LocalQueueService {
    callback: ExecutionCallback,
    pending: PendingMap,
    next_task: AtomicU64,
    scheduled: AtomicU64,
    completed: Arc<AtomicU64>,
}

impl LocalQueueService {
    /// Create a service with its execution callback bound
    pub fn new(callback: ExecutionCallback) -> Self {
        Self {
            callback,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_task: AtomicU64::new(0),
            scheduled: AtomicU64::new(0),
            completed: Arc::new(AtomicU64::new(0)),
        }
    }

    fn pending_len(&self) -> u64 {
        let map = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.len() as u64
    }
}

#[async_trait]
impl QueueService for LocalQueueService {
    async fn schedule_message(&self, message: QueueMessage) -> Result<String> {
        let task_id = format!("local-{}", self.next_task.fetch_add(1, Ordering::Relaxed) + 1);
        let delay = message.delay.unwrap_or(DEFAULT_DELAY);

        // The map entry doubles as the claim token: whichever side removes
        // it first wins, so a fired timer and a cancel can never both act.
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        {
            let mut map = self
                .pending
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            map.insert(task_id.clone(), cancel_tx);
        }

        self.scheduled.fetch_add(1, Ordering::Relaxed);
        debug!(
            task_id = %task_id,
            operation_id = %message.operation_id,
            step_index = message.step_index,
            delay_ms = delay.as_millis() as u64,
            "Scheduled local task"
        );

        let callback = Arc::clone(&self.callback);
        let pending = Arc::clone(&self.pending);
        let completed = Arc::clone(&self.completed);
        let QueueMessage {
            operation_id,
            step_index,
            context,
            ..
        } = message;
        let spawned_id = task_id.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = &mut cancel_rx => return,
            }

            let claimed = {
                let mut map = pending
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                map.remove(&spawned_id).is_some()
            };
            if !claimed {
                // Cancelled between the timer firing and the claim.
                return;
            }

            match callback(operation_id.clone(), step_index, context).await {
                Ok(()) => {
                    completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(error) => {
                    warn!(
                        task_id = %spawned_id,
                        operation_id = %operation_id,
                        step_index,
                        %error,
                        "Scheduled step execution failed"
                    );
                }
            }
        });

        Ok(task_id)
    }

    async fn cancel_scheduled_task(&self, task_id: &str) -> Result<bool> {
        let cancel_tx = {
            let mut map = self
                .pending
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            map.remove(task_id)
        };

        match cancel_tx {
            Some(tx) => {
                // Send failure means the task is mid-claim; removing the
                // entry already prevented it from executing.
                let _ = tx.send(());
                debug!(task_id = %task_id, "Cancelled local task");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn queue_stats(&self) -> Result<QueueStats> {
        Ok(QueueStats {
            backend: BACKEND.to_string(),
            scheduled: self.scheduled.load(Ordering::Relaxed),
            pending: self.pending_len(),
            completed: self.completed.load(Ordering::Relaxed),
        })
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        Ok(HealthStatus::healthy(BACKEND))
    }
}
