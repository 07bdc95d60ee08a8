//! Shared utilities for agent-exec
//!
//! This crate provides common functionality used across the agent-exec
//! workspace, including logging setup and configuration management.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, QueueBackend};
pub use logging::{init_tracing, init_tracing_json};
