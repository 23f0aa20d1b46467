//! Model gateway abstraction
//!
//! The rest of the system talks to the vision model only through
//! [`VisionGateway`], so tests can swap in [`crate::mock::ScriptedGateway`].

use async_trait::async_trait;
use core_pipeline::{PipelineError, PreparedImage};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The model could not be found or loaded at startup
    #[error("model '{model}' is not available: {reason}")]
    ModelUnavailable { model: String, reason: String },

    #[error("request to model server failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Model server answered with a non-success status
    #[error("model server error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    Image(#[from] PipelineError),

    #[error("{0}")]
    Other(String),
}

/// A loaded vision-language model
#[async_trait]
pub trait VisionGateway: Send + Sync {
    /// Name of the model answering requests
    fn model_name(&self) -> &str;

    /// Generate text for `image` conditioned on `prompt`
    ///
    /// Decoding is deterministic: the same image and prompt give the same text.
    async fn generate(
        &self,
        image: &PreparedImage,
        prompt: &str,
        max_new_tokens: u32,
    ) -> Result<String, GatewayError>;

    /// Release accelerator memory held by the model
    async fn clear_cache(&self) -> Result<(), GatewayError>;
}
