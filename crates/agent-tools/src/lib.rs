//! Tool management and execution for the agent execution runtime
//!
//! This crate resolves tool names to handlers and normalizes the three
//! handler result shapes (plain value, future, stream) into the uniform
//! sequence the runtime consumes.

pub mod executor;
pub mod registry;
pub mod tool;

pub use executor::{ToolExecution, ToolExecutor, aggregate_chunks};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolOutput};
