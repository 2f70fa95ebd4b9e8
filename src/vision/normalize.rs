//! Decodes an uploaded image and rescales it to fit the configured
//! width/height/pixel budget, preserving aspect ratio.

use crate::error::ChatError;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bounds an image must satisfy before it is handed to the model.
/// The pixel cap defaults to 1280 × 28 × 28, the patch-aligned budget
/// used by the Qwen2-VL family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageLimits {
    pub max_width: u32,
    pub max_height: u32,
    pub max_pixels: u32,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_width: 1280,
            max_height: 1280,
            max_pixels: 1_003_520,
        }
    }
}

/// A decoded pixel buffer guaranteed to be within `ImageLimits`.
/// Request-scoped; discarded after prompt encoding.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    image: DynamicImage,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Decode raw encoded bytes and downscale if any bound is exceeded.
/// Decode failure is an `ImageDecode` error; the caller drops the image
/// and continues text-only.
pub fn normalize(bytes: &[u8], limits: &ImageLimits) -> Result<NormalizedImage, ChatError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ChatError::ImageDecode(anyhow::Error::new(e)))?;

    match fit_dimensions(decoded.width(), decoded.height(), limits) {
        None => Ok(NormalizedImage { image: decoded }),
        Some((width, height)) => {
            debug!(
                from_width = decoded.width(),
                from_height = decoded.height(),
                to_width = width,
                to_height = height,
                "downscaling image to fit limits"
            );
            Ok(NormalizedImage {
                image: decoded.resize_exact(width, height, FilterType::Lanczos3),
            })
        }
    }
}

/// Returns the target dimensions for an oversized image, or `None` when the
/// image already fits. Scale is the tightest of the three constraints so one
/// resize satisfies all of them.
pub(crate) fn fit_dimensions(width: u32, height: u32, limits: &ImageLimits) -> Option<(u32, u32)> {
    let pixels = width as u64 * height as u64;
    if width <= limits.max_width
        && height <= limits.max_height
        && pixels <= limits.max_pixels as u64
    {
        return None;
    }

    let (w, h) = (width as f64, height as f64);
    let scale = (limits.max_width as f64 / w)
        .min(limits.max_height as f64 / h)
        .min((limits.max_pixels as f64 / (w * h)).sqrt());

    let mut target_w = ((w * scale).round() as u32).max(1);
    let mut target_h = ((h * scale).round() as u32).max(1);
    // Rounding both dimensions up can nudge the product past the pixel cap;
    // floor keeps it under.
    if target_w as u64 * target_h as u64 > limits.max_pixels as u64 {
        target_w = ((w * scale).floor() as u32).max(1);
        target_h = ((h * scale).floor() as u32).max(1);
    }
    Some((target_w, target_h))
}
