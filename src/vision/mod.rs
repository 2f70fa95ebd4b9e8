//! Image decoding and bounded-dimension normalization.

mod normalize;

pub use normalize::{normalize, ImageLimits, NormalizedImage};
