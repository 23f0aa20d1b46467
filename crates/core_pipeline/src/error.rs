//! Error types for image preparation

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Uploaded bytes are not an image the decoder understands
    #[error("cannot identify image file: {0}")]
    Decode(#[source] image::ImageError),

    /// Decoded image has a zero-sized side
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    /// Re-encoding for the model failed
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
}
