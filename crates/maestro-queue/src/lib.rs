//! Queue substrate abstraction for Maestro.
//!
//! The orchestrator only needs five primitives from a message broker:
//! send, batched receive, complete, dead-letter, and abandon — all
//! at-least-once. [`QueueTransport`] captures that contract as an
//! object-safe trait; [`InMemoryBroker`] implements it for local runs and
//! tests. A production deployment plugs in a broker-backed impl without
//! touching the processor or reader.

mod broker;
mod transport;

pub use broker::InMemoryBroker;
pub use transport::{DeadLetteredMessage, Envelope, QueueTransport};
