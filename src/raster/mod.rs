//! Raster stages: thresholding and boundary tracing.

pub mod binarize;
pub mod contour;

pub use binarize::{BinaryMask, Binarizer, load_grayscale, normalize_window_size};
pub use contour::{Contour, ContourExtractor, Outline};
