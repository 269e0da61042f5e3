//! # ragkit-server
//!
//! The HTTP surface over a [`ragkit::PipelineContext`]: initialization,
//! document loading, querying, status, and history endpoints.
//!
//! The pipeline context is injected into the router as shared state; every
//! handler goes through its single lock, so requests that touch pipeline
//! state are serialized.

pub mod models;
pub mod server;

pub use server::{AppState, ServerConfig, app_router, run_server, startup};
