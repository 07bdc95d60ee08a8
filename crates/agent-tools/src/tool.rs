//! Tool trait definition

use agent_core::Result;
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use serde_json::Value;

/// The result shape a tool handler produced
///
/// The shape is decided once per invocation (tagged capability dispatch,
/// not duck-typing at every call): a handler either has its value ready,
/// defers it behind a future, or streams it incrementally. The executor
/// normalizes all three into the same event sequence so callers never
/// branch on handler shape.
pub enum ToolOutput {
    /// The value is already settled
    Value(Value),
    /// The value settles later
    Future(BoxFuture<'static, Result<Value>>),
    /// The value arrives as incremental chunks
    Stream(BoxStream<'static, Result<Value>>),
}

impl std::fmt::Debug for ToolOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Future(_) => f.write_str("Future(..)"),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Trait for tools the runtime can execute
///
/// Tools are capabilities agents invoke through `CallTool` instructions.
/// Names are opaque to the runtime and must be unique within a registry.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Invoke the tool with positional arguments
    ///
    /// # Arguments
    ///
    /// * `args` - Tool input as a list of JSON values
    ///
    /// # Returns
    ///
    /// The tool output in whichever shape the handler produces
    async fn invoke(&self, args: Vec<Value>) -> Result<ToolOutput>;

    /// Get the tool's name
    ///
    /// Must be unique within a ToolRegistry
    fn name(&self) -> &str;

    /// Get the tool's description
    fn description(&self) -> &str {
        ""
    }
}
