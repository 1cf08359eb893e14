//! Grayscale → binary mask conversion.
//!
//! The adaptive mode compares every pixel against the mean of the square
//! window centred on it, which copes with uneven lighting far better than a
//! single cutoff. Window sums come from a summed-area table, so the cost does
//! not depend on the window size.

use crate::config::ThresholdConfig;
use crate::errors::PipelineError;
use crate::float_types::Real;
use image::{GrayImage, Luma};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Make a window size usable: even sizes grow by one, anything below 3 becomes 3.
///
/// Already odd sizes of at least 3 are returned unchanged.
pub const fn normalize_window_size(window_size: u32) -> u32 {
    let mut size = window_size;
    if size % 2 == 0 {
        size += 1;
    }
    if size < 3 {
        size = 3;
    }
    size
}

/// Per-pixel foreground flags, row-major, same dimensions as the source raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl BinaryMask {
    /// All-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    /// Build a mask by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        let idx = y as usize * self.width as usize + x as usize;
        self.data[idx] = foreground;
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Rows of 0/1 flags, the layout `contour_tracing` consumes.
    pub fn to_bits(&self) -> Vec<Vec<i8>> {
        self.data
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|&v| v as i8).collect())
            .collect()
    }

    /// Foreground white on black, for inspection.
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if self.is_foreground(x, y) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }
}

/// Summed-area table with a zero row and column in front.
struct IntegralImage {
    stride: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(img: &GrayImage) -> Self {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let stride = w + 1;
        let mut sums = vec![0u64; stride * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0u64;
            for x in 0..w {
                row_sum += u64::from(img.get_pixel(x as u32, y as u32)[0]);
                sums[(y + 1) * stride + x + 1] = sums[y * stride + x + 1] + row_sum;
            }
        }
        Self { stride, sums }
    }

    /// Sum over the half-open rectangle `[x0, x1) × [y0, y1)`.
    fn sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let s = self.stride;
        self.sums[y1 * s + x1] + self.sums[y0 * s + x0]
            - self.sums[y0 * s + x1]
            - self.sums[y1 * s + x0]
    }
}

/// Turns a grayscale raster into a [`BinaryMask`], dark-on-light becoming foreground.
#[derive(Debug, Clone)]
pub struct Binarizer {
    mode: ThresholdConfig,
    debug_output: Option<PathBuf>,
}

impl Binarizer {
    pub fn new(mode: ThresholdConfig) -> Self {
        let mode = match mode {
            ThresholdConfig::AdaptiveMean { window_size, bias } => ThresholdConfig::AdaptiveMean {
                window_size: normalize_window_size(window_size),
                bias,
            },
            global => global,
        };
        Self {
            mode,
            debug_output: None,
        }
    }

    pub fn adaptive(window_size: u32, bias: Real) -> Self {
        Self::new(ThresholdConfig::AdaptiveMean { window_size, bias })
    }

    pub fn global(level: u8) -> Self {
        Self::new(ThresholdConfig::Global { level })
    }

    /// Also save every produced mask as a PNG at `path`.
    pub fn with_debug_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_output = Some(path.into());
        self
    }

    /// The effective mode, window size already normalized.
    pub const fn mode(&self) -> ThresholdConfig {
        self.mode
    }

    pub fn binarize(&self, img: &GrayImage) -> BinaryMask {
        let mask = match self.mode {
            ThresholdConfig::AdaptiveMean { window_size, bias } => {
                info!(
                    "Applying adaptive threshold with window_size={window_size}, bias={bias}"
                );
                adaptive_mean(img, window_size, bias)
            },
            ThresholdConfig::Global { level } => {
                info!("Applying global threshold at level {level}");
                BinaryMask::from_fn(img.width(), img.height(), |x, y| {
                    img.get_pixel(x, y)[0] < level
                })
            },
        };
        debug!(
            "mask {}x{} has {} foreground pixels",
            mask.width(),
            mask.height(),
            mask.foreground_count()
        );

        if let Some(path) = &self.debug_output {
            match mask.to_image().save(path) {
                Ok(()) => info!("Saved binary mask to {}", path.display()),
                Err(e) => warn!("Could not save binary mask to {}: {e}", path.display()),
            }
        }
        mask
    }
}

fn adaptive_mean(img: &GrayImage, window_size: u32, bias: Real) -> BinaryMask {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let integral = IntegralImage::new(img);
    let half = (window_size / 2) as usize;

    BinaryMask::from_fn(img.width(), img.height(), |x, y| {
        let (x, y) = (x as usize, y as usize);
        let x0 = x.saturating_sub(half);
        let y0 = y.saturating_sub(half);
        let x1 = (x + half + 1).min(w);
        let y1 = (y + half + 1).min(h);
        let count = ((x1 - x0) * (y1 - y0)) as Real;
        let mean = integral.sum(x0, y0, x1, y1) as Real / count;
        let value = Real::from(img.get_pixel(x as u32, y as u32)[0]);
        value < mean - bias
    })
}

/// Decode an image file and convert it to 8-bit grayscale.
pub fn load_grayscale(path: &Path) -> Result<GrayImage, PipelineError> {
    info!("Loading image: {}", path.display());
    let decoded = image::open(path).map_err(|e| PipelineError::InputDecode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let gray = decoded.to_luma8();
    if gray.width() == 0 || gray.height() == 0 {
        return Err(PipelineError::InputDecode {
            path: path.to_path_buf(),
            reason: "image is empty after decoding".to_string(),
        });
    }
    Ok(gray)
}
