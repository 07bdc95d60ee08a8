//! Queue service for the agent execution runtime
//!
//! Abstracts what happens between one step and the next: either immediate
//! in-process continuation behind a timer (local development) or a durable,
//! delayed, retryable message published to an external broker (production).
//! The queue sits beside the runtime, not inside it: it only decides when
//! and where the next invocation of the execution callback happens.

pub mod delay;
pub mod error;
pub mod http;
pub mod local;
pub mod message;
pub mod scheduler;
pub mod service;

pub use delay::calculate_delay;
pub use error::{Error, Result};
pub use http::{HttpQueueConfig, HttpQueueService};
pub use local::LocalQueueService;
pub use message::{HealthStatus, Priority, QueueMessage, QueueStats};
pub use scheduler::{StepOutcome, StepScheduler};
pub use service::{ExecutionCallback, QueueService};
