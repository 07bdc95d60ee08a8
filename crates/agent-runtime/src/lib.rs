//! The agent execution core loop
//!
//! This crate drives a decision function (an [`agent_core::Agent`]) through
//! its instruction sequence: prompts suspend the run until the caller
//! supplies a value, tool calls execute inside the run with streamed chunks
//! surfaced as events, and interruption is cooperative and idempotent. The
//! driver is pull-based: the caller alternates "read next event" / "if
//! paused, supply resume value".

pub mod driver;
pub mod runtime;

// Re-export key types
pub use driver::{InterruptHandle, Run};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder, RuntimeConfig};
