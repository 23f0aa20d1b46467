//! Core pipeline for docscan
//!
//! This crate provides the model-free half of document text extraction:
//! image preparation, document categories and their prompts, formatting of
//! raw model output into HTML and key/value data, and the result store.

pub mod error;
pub mod format;
pub mod preprocess;
pub mod prompts;
pub mod store;
pub mod types;

pub use error::PipelineError;
pub use format::{format_text, FormattedText, Layout};
pub use preprocess::{prepare_upload, PreparedImage};
pub use store::ResultStore;
pub use types::*;
