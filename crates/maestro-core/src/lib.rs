//! Core types and error definitions for the Maestro orchestrator.
//!
//! This crate provides the foundational types shared across all Maestro
//! crates: the error taxonomy, the agent descriptor model produced by
//! discovery, and the queue payload types exchanged between the async
//! submission path and the background processor.
//!
//! # Main types
//!
//! - [`MaestroError`] — Closed error taxonomy for all Maestro subsystems.
//! - [`MaestroResult`] — Convenience alias for `Result<T, MaestroError>`.
//! - [`AgentDescriptor`] — Canonical record of one discovered agent.
//! - [`AgentSkill`] — A named capability advertised by an agent.
//! - [`TaskMessage`] — Payload of the `agent-tasks` queue.
//! - [`ResponseMessage`] — Payload of the `agent-responses` queue.
//! - [`ResponseRecord`] — A response as returned to a polling caller.

mod error;
mod model;

pub use error::{MaestroError, MaestroResult};
pub use model::{
    AgentDescriptor, AgentSkill, ResponseMessage, ResponseRecord, TaskMessage, WELL_KNOWN_SUFFIX,
};

/// Name of the queue carrying [`TaskMessage`] payloads.
pub const TASK_QUEUE: &str = "agent-tasks";

/// Name of the queue carrying [`ResponseMessage`] payloads.
pub const RESPONSE_QUEUE: &str = "agent-responses";
