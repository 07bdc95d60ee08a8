//! HTTP broker queue backend
//!
//! Publishes step messages to a QStash-compatible broker over its v2 REST
//! API. The broker owns delivery: it holds the message for the requested
//! delay, retries on failure, and finally POSTs the payload to the
//! configured destination URL, where a webhook handler drives the runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use agent_core::ExecutionContext;

use crate::error::{Error, Result};
use crate::message::{HealthStatus, Priority, QueueMessage, QueueStats};
use crate::service::QueueService;

const BACKEND: &str = "http";

/// Connection settings for a QStash-compatible broker
#[derive(Debug, Clone)]
pub struct HttpQueueConfig {
    /// Broker base URL, e.g. `https://qstash.upstash.io`
    pub base_url: String,

    /// Bearer token for the broker API
    pub token: String,

    /// Destination URL the broker delivers messages to
    pub destination: String,

    /// Default broker retry budget for messages that carry none
    pub default_retries: u32,
}

impl HttpQueueConfig {
    /// Create a config with the default retry budget
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            destination: destination.into(),
            default_retries: 3,
        }
    }
}

/// Wire body delivered to the destination when the message fires.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishBody {
    context: ExecutionContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
    priority: Priority,
    operation_id: String,
    step_index: u64,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    message_id: String,
}

/// Format a delay for the broker's delay header.
///
/// The broker only understands whole seconds, so milliseconds round up;
/// a scheduled delay may stretch but never shrinks to zero.
fn delay_header_value(delay: Duration) -> String {
    format!("{}s", delay.as_millis().div_ceil(1000))
}

fn publish_body(message: &QueueMessage, timestamp: i64) -> PublishBody {
    PublishBody {
        context: message.context.clone(),
        payload: message.payload.clone(),
        priority: message.priority,
        operation_id: message.operation_id.clone(),
        step_index: message.step_index,
        timestamp,
    }
}

/// Queue service backed by a QStash-compatible HTTP broker
pub struct HttpQueueService {
    config: HttpQueueConfig,
    client: reqwest::Client,
    scheduled: AtomicU64,
}

impl HttpQueueService {
    /// Create a service for the given broker
    pub fn new(config: HttpQueueConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            scheduled: AtomicU64::new(0),
        }
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn publish_url(&self) -> String {
        format!("{}/v2/publish/{}", self.base(), self.config.destination)
    }

    fn cancel_url(&self, task_id: &str) -> String {
        format!("{}/v2/messages/{}", self.base(), task_id)
    }

    fn keys_url(&self) -> String {
        format!("{}/v2/keys", self.base())
    }
}

#[async_trait]
impl QueueService for HttpQueueService {
    async fn schedule_message(&self, message: QueueMessage) -> Result<String> {
        let body = publish_body(&message, chrono::Utc::now().timestamp_millis());
        let retries = message.retries.unwrap_or(self.config.default_retries);

        let mut request = self
            .client
            .post(self.publish_url())
            .bearer_auth(&self.config.token)
            .header("Upstash-Retries", retries.to_string())
            .header("Upstash-Forward-Priority", message.priority.as_str())
            .header(
                "Upstash-Forward-Step-Index",
                message.step_index.to_string(),
            )
            .json(&body);

        if let Some(delay) = message.delay {
            request = request.header("Upstash-Delay", delay_header_value(delay));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let published: PublishResponse = response.json().await?;
        self.scheduled.fetch_add(1, Ordering::Relaxed);
        debug!(
            message_id = %published.message_id,
            operation_id = %message.operation_id,
            step_index = message.step_index,
            "Published step message to broker"
        );
        Ok(published.message_id)
    }

    async fn cancel_scheduled_task(&self, task_id: &str) -> Result<bool> {
        let response = self
            .client
            .delete(self.cancel_url(task_id))
            .bearer_auth(&self.config.token)
            .send()
            .await?;

        // The broker answers 404 for messages that already delivered.
        Ok(response.status().is_success())
    }

    async fn queue_stats(&self) -> Result<QueueStats> {
        // Pending and completed counts live broker-side; only the publish
        // counter is known locally.
        Ok(QueueStats {
            backend: BACKEND.to_string(),
            scheduled: self.scheduled.load(Ordering::Relaxed),
            pending: 0,
            completed: 0,
        })
    }

    async fn health_check(&self) -> Result<HealthStatus> {
        let probe = self
            .client
            .get(self.keys_url())
            .bearer_auth(&self.config.token)
            .send()
            .await;

        match probe {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::healthy(BACKEND)),
            Ok(response) => Ok(HealthStatus::unhealthy(
                BACKEND,
                format!("broker answered status {}", response.status().as_u16()),
            )),
            Err(error) => Ok(HealthStatus::unhealthy(BACKEND, error.to_string())),
        }
    }
}
