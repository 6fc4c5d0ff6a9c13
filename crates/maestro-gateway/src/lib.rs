//! HTTP surface for the Maestro orchestrator.
//!
//! A thin axum layer over [`maestro_orchestrator::Orchestrator`]: route
//! handlers translate between HTTP and the protocol-agnostic engine
//! operations, and map the error taxonomy to status codes. No
//! orchestration logic lives here.

mod server;

pub use server::{AppState, GatewayServer};
