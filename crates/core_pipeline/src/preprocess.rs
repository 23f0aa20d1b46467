//! Image preprocessing module
//!
//! Turns uploaded bytes into the image handed to the vision model:
//! - Decoding and RGB conversion
//! - Downscaling so the longest side stays within [`MAX_IMAGE_DIMENSION`]
//! - JPEG encoding for transport
//! - SHA-256 hashing of the prepared pixels

use crate::error::PipelineError;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb};
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};

/// Longest side, in pixels, an image may have when sent to the model
pub const MAX_IMAGE_DIMENSION: u32 = 1280;

const JPEG_QUALITY: u8 = 90;

/// Type alias for image with RGB pixels
pub type RgbImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// An uploaded image normalised for inference
///
/// The JPEG sent to the model is encoded at most once per image.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pixels: RgbImage,
    jpeg: OnceCell<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap an RGB image, downscaling it if needed
    pub fn new(pixels: RgbImage) -> Result<Self, PipelineError> {
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::EmptyImage { width, height });
        }
        Ok(Self {
            pixels: fit_within(pixels, MAX_IMAGE_DIMENSION),
            jpeg: OnceCell::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// JPEG bytes sent to the model, encoded on first use
    pub fn jpeg(&self) -> Result<&[u8], PipelineError> {
        self.jpeg
            .get_or_try_init(|| encode_jpeg(&self.pixels))
            .map(Vec::as_slice)
    }

    /// JPEG bytes if they have been encoded already
    pub fn encoded_jpeg(&self) -> Option<&[u8]> {
        self.jpeg.get().map(Vec::as_slice)
    }

    /// Content hash of the prepared pixels
    pub fn content_hash(&self) -> String {
        compute_image_hash(&self.pixels)
    }
}

fn encode_jpeg(pixels: &RgbImage) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode_image(pixels)
        .map_err(PipelineError::Encode)?;
    Ok(buf)
}

/// Decode uploaded bytes into a [`PreparedImage`]
///
/// Any format the `image` crate can sniff is accepted. Alpha and palette
/// images are flattened to 3-channel RGB. The JPEG for the model is encoded
/// here too, so callers on a blocking thread pay for all CPU work up front.
pub fn prepare_upload(bytes: &[u8]) -> Result<PreparedImage, PipelineError> {
    let decoded = image::load_from_memory(bytes).map_err(PipelineError::Decode)?;
    let rgb = decoded.to_rgb8();
    tracing::debug!(
        width = rgb.width(),
        height = rgb.height(),
        "Decoded uploaded image"
    );
    let prepared = PreparedImage::new(rgb)?;
    prepared.jpeg()?;
    Ok(prepared)
}

/// Size an image of `width`x`height` is scaled to so its longest side is at most `max`
///
/// Aspect ratio is kept; fractional sizes are truncated.
pub fn target_size(width: u32, height: u32, max: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max {
        return (width, height);
    }
    let scale = |side: u32| ((u64::from(side) * u64::from(max)) / u64::from(longest)).max(1) as u32;
    (scale(width), scale(height))
}

/// Downscale with Lanczos3 so the longest side is at most `max`
pub fn fit_within(image: RgbImage, max: u32) -> RgbImage {
    let (width, height) = image.dimensions();
    let (new_width, new_height) = target_size(width, height, max);
    if (new_width, new_height) == (width, height) {
        return image;
    }
    tracing::debug!(
        from = %format!("{}x{}", width, height),
        to = %format!("{}x{}", new_width, new_height),
        "Downscaling image"
    );
    imageops::resize(&image, new_width, new_height, FilterType::Lanczos3)
}

/// Compute SHA-256 hash of an image
///
/// Returns a 64-character hexadecimal string representing the SHA-256 hash
/// of the image's raw pixel data.
pub fn compute_image_hash(image: &RgbImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(image.as_raw());
    format!("{:x}", hasher.finalize())
}
