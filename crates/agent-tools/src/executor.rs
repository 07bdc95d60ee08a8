//! Tool executor
//!
//! Normalizes the three tool output shapes into one settled result plus the
//! ordered chunk sequence a streaming handler produced. An unregistered
//! name resolves to a neutral null result rather than an error: a missing
//! capability degrades gracefully instead of crashing a multi-step
//! conversation mid-flight.

use crate::{ToolOutput, ToolRegistry};
use agent_core::{Error, Result};
use futures::StreamExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// The normalized outcome of one tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExecution {
    /// Chunks produced by a streaming handler, in production order
    pub chunks: Vec<Value>,
    /// The settled value the decision function resumes with
    pub resolved: Value,
}

impl ToolExecution {
    fn settled(resolved: Value) -> Self {
        Self {
            chunks: Vec::new(),
            resolved,
        }
    }
}

/// Synthesize the aggregate value of a drained stream
///
/// When every chunk is textual the aggregate is their concatenation, so
/// text-generation tools stream into a single resumed value; otherwise the
/// last chunk wins verbatim, so non-text tools resume with their final
/// payload. An empty stream aggregates to null.
pub fn aggregate_chunks(chunks: &[Value]) -> Value {
    if chunks.is_empty() {
        return Value::Null;
    }
    let all_strings: Option<String> = chunks
        .iter()
        .map(|chunk| chunk.as_str().map(str::to_string))
        .collect();
    match all_strings {
        Some(joined) => Value::String(joined),
        None => chunks[chunks.len() - 1].clone(),
    }
}

/// Executes registered tools and normalizes their result shape
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    /// Create an executor over a registry
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Get a reference to the underlying registry
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Execute a tool by name
    ///
    /// # Arguments
    ///
    /// * `name` - Registered tool name; an unknown name yields a null result
    /// * `args` - Positional arguments forwarded to the handler
    ///
    /// # Returns
    ///
    /// The normalized execution: streamed chunks (if any) and the settled
    /// value. Handler failures, including mid-stream failures, propagate as
    /// errors.
    pub async fn execute(&self, name: &str, args: Vec<Value>) -> Result<ToolExecution> {
        let Some(tool) = self.registry.get(name) else {
            warn!(tool_name = %name, "Tool not registered, resolving to null");
            return Ok(ToolExecution::settled(Value::Null));
        };

        debug!(tool_name = %name, arg_count = args.len(), "Executing tool");

        match tool.invoke(args).await? {
            ToolOutput::Value(value) => Ok(ToolExecution::settled(value)),
            ToolOutput::Future(future) => Ok(ToolExecution::settled(future.await?)),
            ToolOutput::Stream(mut stream) => {
                let mut chunks = Vec::new();
                while let Some(item) = stream.next().await {
                    let chunk = item.map_err(|e| Error::ToolFailed {
                        tool: name.to_string(),
                        message: e.to_string(),
                    })?;
                    chunks.push(chunk);
                }
                let resolved = aggregate_chunks(&chunks);
                debug!(
                    tool_name = %name,
                    chunk_count = chunks.len(),
                    "Drained tool stream"
                );
                Ok(ToolExecution { chunks, resolved })
            }
        }
    }
}
