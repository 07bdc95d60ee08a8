//! Command-line interface for agent-exec

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::info;

use agent_core::{Agent, Error, Instruction, RunEvent, Step};
use agent_queue::{ExecutionCallback, HttpQueueConfig, HttpQueueService, LocalQueueService, QueueService};
use agent_runtime::AgentRuntime;
use agent_tools::{Tool, ToolOutput, ToolRegistry};
use agent_utils::{Config, QueueBackend};

#[derive(Parser, Debug)]
#[command(name = "agent-cli")]
#[command(about = "CLI for the agent-exec runtime", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an interactive demo agent against the local runtime
    Demo {
        /// Maximum instruction cycles before the run is stopped
        #[arg(long)]
        max_steps: Option<u64>,
    },
    /// Probe the configured queue backend
    Health,
}

/// Adds up numeric arguments
struct SumTool;

#[async_trait]
impl Tool for SumTool {
    async fn invoke(&self, args: Vec<Value>) -> agent_core::Result<ToolOutput> {
        let sum: f64 = args.iter().filter_map(Value::as_f64).sum();
        Ok(ToolOutput::Value(json!(sum)))
    }

    fn name(&self) -> &str {
        "sum"
    }

    fn description(&self) -> &str {
        "Add up numeric arguments"
    }
}

/// Scripted decision loop: ask for a name, add two numbers, greet, finish
#[derive(Default)]
struct DemoAgent {
    step: usize,
    user_name: String,
}

#[async_trait]
impl Agent for DemoAgent {
    async fn decide(&mut self, resume: Option<Value>) -> agent_core::Result<Step> {
        let step = self.step;
        self.step += 1;
        match step {
            0 => Ok(Step::Yield(Instruction::Prompt {
                payload: "What is your name?".to_string(),
            })),
            1 => {
                self.user_name = resume
                    .as_ref()
                    .and_then(Value::as_str)
                    .unwrap_or("stranger")
                    .to_string();
                Ok(Step::Yield(Instruction::CallTool {
                    tool: "sum".to_string(),
                    args: vec![json!(2), json!(3)],
                }))
            }
            2 => {
                let sum = resume.unwrap_or(Value::Null);
                Ok(Step::Yield(Instruction::Prompt {
                    payload: format!("hi {}, the sum is {sum}", self.user_name),
                }))
            }
            _ => Ok(Step::Return(json!("completed"))),
        }
    }

    fn name(&self) -> &str {
        "demo"
    }
}

fn read_line(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt} > ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn run_demo(max_steps: Option<u64>) -> anyhow::Result<()> {
    let registry = Arc::new(ToolRegistry::new());
    registry.register(Arc::new(SumTool));

    let mut builder = AgentRuntime::builder()
        .agent(Box::new(DemoAgent::default()))
        .tool_registry(registry)
        .operation_id("demo");
    if let Some(max) = max_steps {
        builder = builder.max_steps(max);
    }
    let mut run = builder.build()?.run();

    let mut resume: Option<Value> = None;
    while let Some(event) = run.next(resume.take()).await? {
        match event {
            RunEvent::Paused { instruction } => match instruction {
                Instruction::Prompt { payload } => {
                    let answer = read_line(&payload)?;
                    resume = Some(json!(answer));
                }
                other => {
                    return Err(Error::Generic(format!(
                        "demo cannot answer instruction: {}",
                        other.kind()
                    ))
                    .into());
                }
            },
            RunEvent::Running { data } => println!("... {data}"),
            RunEvent::Finished { value } => println!("finished: {value}"),
            RunEvent::Stopped { reason } => println!("stopped: {reason}"),
        }
    }

    let state = run.state();
    info!(
        operation_id = %state.operation_id,
        steps = state.step_count,
        status = %state.status,
        "Demo run complete"
    );
    Ok(())
}

async fn run_health() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let noop: ExecutionCallback = Arc::new(|_, _, _| Box::pin(async { Ok(()) }));

    let queue: Arc<dyn QueueService> = match config.queue_backend {
        QueueBackend::Local => Arc::new(LocalQueueService::new(noop)),
        QueueBackend::Http => {
            let base_url = config
                .broker_url
                .ok_or_else(|| anyhow::anyhow!("broker url not configured"))?;
            let token = config
                .broker_token
                .ok_or_else(|| anyhow::anyhow!("broker token not configured"))?;
            let destination = config
                .broker_destination
                .ok_or_else(|| anyhow::anyhow!("broker destination not configured"))?;
            Arc::new(HttpQueueService::new(HttpQueueConfig::new(
                base_url,
                token,
                destination,
            )))
        }
    };

    let health = queue.health_check().await?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    agent_utils::init_tracing();

    let args = Args::parse();
    match args.command {
        Command::Demo { max_steps } => run_demo(max_steps).await,
        Command::Health => run_health().await,
    }
}
