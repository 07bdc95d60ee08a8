//! Core protocol for the agent execution runtime
//!
//! This crate defines the vocabulary exchanged between an agent's decision
//! logic and the runtime: instructions, run events, the durable agent state,
//! and the seams (decision trait, state store) the runtime drives them through.

pub mod agent;
pub mod context;
pub mod error;
pub mod event;
pub mod instruction;
pub mod state;
pub mod store;

pub use agent::{Agent, ScriptedAgent, Step};
pub use context::ExecutionContext;
pub use error::{Error, Result};
pub use event::RunEvent;
pub use instruction::Instruction;
pub use state::{AgentState, Message, Status, Usage};
pub use store::{MemoryStateStore, StateStore};
