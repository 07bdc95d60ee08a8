//! Multi-agent group orchestration
//!
//! This crate provides the supervisor that drives multi-agent sessions: a
//! stateless router from orchestration phases to runtime instructions. It
//! embeds no model call and never loops; the caller owns the round trip.

pub mod supervisor;

pub use supervisor::{GroupOrchestrationSupervisor, SupervisorConfig};
