//! docscan HTTP server
//!
//! Routes uploads through the [`llm_bridge::Extractor`] and serves the
//! frontend.

pub mod api;
pub mod config;
pub mod error;

pub use api::{build_router, AppState, ExtractResponse};
pub use config::ServerConfig;
pub use error::ApiError;
