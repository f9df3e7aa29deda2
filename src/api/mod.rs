//! Funnel API Server module
//!
//! HTTP REST API consumed by the dashboard front end.
//! Run with `funnel-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
