//! Runtime binding a decision function to its tool registry
//!
//! The AgentRuntime owns the dependencies one run needs (decision agent,
//! tool registry, configuration) and hands them to a [`Run`] driver when the
//! caller starts consuming events.

use crate::driver::Run;
use agent_core::{Agent, Result};
use agent_tools::{ToolExecutor, ToolRegistry};
use std::sync::Arc;
use tracing::info;

/// Configuration for one agent run
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Stable identifier for the operation this run belongs to
    pub operation_id: String,

    /// Maximum instruction cycles before the run is stopped
    pub max_steps: Option<u64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            operation_id: "local".to_string(),
            max_steps: None,
        }
    }
}

/// Runtime for executing one agent's decision loop
///
/// # Example
///
/// ```no_run
/// use agent_runtime::AgentRuntime;
/// use agent_tools::ToolRegistry;
/// use std::sync::Arc;
///
/// # async fn example(agent: Box<dyn agent_core::Agent>) -> agent_core::Result<()> {
/// let runtime = AgentRuntime::builder()
///     .agent(agent)
///     .tool_registry(Arc::new(ToolRegistry::new()))
///     .operation_id("op-123")
///     .build()?;
///
/// let mut run = runtime.run();
/// while let Some(event) = run.next(None).await? {
///     // inspect event; supply a resume value on the next call when paused
/// }
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    agent: Box<dyn Agent>,
    tool_registry: Arc<ToolRegistry>,
    config: RuntimeConfig,
}

impl AgentRuntime {
    /// Create a new agent runtime
    pub fn new(
        agent: Box<dyn Agent>,
        tool_registry: Arc<ToolRegistry>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            agent,
            tool_registry,
            config,
        }
    }

    /// Create a new runtime builder
    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    /// Get a reference to the tool registry
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Get a reference to the runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Start the run
    ///
    /// Consumes the runtime: one runtime drives exactly one event sequence.
    /// Concurrency across operations is achieved by independent runtime
    /// instances, never by sharing one.
    pub fn run(self) -> Run {
        info!(
            operation_id = %self.config.operation_id,
            agent = %self.agent.name(),
            tool_count = self.tool_registry.len(),
            "Starting agent run"
        );
        Run::new(
            self.agent,
            ToolExecutor::new(self.tool_registry),
            self.config,
        )
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    agent: Option<Box<dyn Agent>>,
    tool_registry: Arc<ToolRegistry>,
    config: RuntimeConfig,
}

impl AgentRuntimeBuilder {
    /// Create a new runtime builder
    pub fn new() -> Self {
        Self {
            agent: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: RuntimeConfig::default(),
        }
    }

    /// Set the decision agent
    pub fn agent(mut self, agent: Box<dyn Agent>) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the operation id
    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.config.operation_id = operation_id.into();
        self
    }

    /// Set the maximum instruction cycles
    pub fn max_steps(mut self, max: u64) -> Self {
        self.config.max_steps = Some(max);
        self
    }

    /// Build the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the agent is not set
    pub fn build(self) -> Result<AgentRuntime> {
        let agent = self
            .agent
            .ok_or_else(|| agent_core::Error::Generic("Agent not set".to_string()))?;

        Ok(AgentRuntime::new(agent, self.tool_registry, self.config))
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::ScriptedAgent;

    #[test]
    fn test_runtime_config_default() {
        let config = RuntimeConfig::default();
        assert_eq!(config.operation_id, "local");
        assert!(config.max_steps.is_none());
    }

    #[test]
    fn test_runtime_builder() {
        let runtime = AgentRuntime::builder()
            .agent(Box::new(ScriptedAgent::new(vec![])))
            .operation_id("op-7")
            .max_steps(5)
            .build()
            .unwrap();

        assert_eq!(runtime.config().operation_id, "op-7");
        assert_eq!(runtime.config().max_steps, Some(5));
    }

    #[test]
    fn test_builder_requires_agent() {
        let result = AgentRuntime::builder().build();
        assert!(result.is_err());
    }
}
