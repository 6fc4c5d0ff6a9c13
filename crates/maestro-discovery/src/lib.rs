//! Agent discovery and the in-memory agent registry.
//!
//! Discovery fetches agent cards from configured well-known endpoints,
//! resolves the two card shapes in the wild (A2A nests skills under
//! `capabilities.skills`, ADK puts them at the top level) into the
//! canonical [`maestro_core::AgentDescriptor`], and stores them in the
//! [`AgentRegistry`]. A failing endpoint is logged and skipped; it never
//! aborts the pass.

mod card;
mod client;
mod registry;

pub use client::DiscoveryClient;
pub use registry::AgentRegistry;
