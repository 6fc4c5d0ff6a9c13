//! The Maestro orchestration engine.
//!
//! Ties the registry, router, and queue substrate together behind one
//! facade:
//!
//! - [`AgentDispatcher`] performs the outbound `/task` call to a selected
//!   agent.
//! - [`Orchestrator`] exposes the operations the API layer consumes:
//!   discover, list, sync execute, async enqueue, response polling, and
//!   processor supervision.
//! - [`QueueProcessor`] is the background loop that turns queued tasks
//!   into agent calls and published responses.
//! - [`ResponseReader`] drains the response queue filtered by requester.

mod dispatch;
mod engine;
mod processor;
mod reader;

pub use dispatch::AgentDispatcher;
pub use engine::{Orchestrator, TaskOutcome};
pub use processor::{ProcessorConfig, QueueProcessor};
pub use reader::ResponseReader;
