//! Pipeline configuration.
//!
//! Every tunable of the image → silhouette → solid conversion lives in
//! [`PipelineConfig`]. Values can be loaded from a JSON file with
//! [`load_config`]; missing keys fall back to [`PipelineConfig::default`].

use crate::errors::PipelineError;
use crate::float_types::Real;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default extrusion height in output units.
pub const DEFAULT_HEIGHT: Real = 10.0;
/// Default adaptive threshold window (normalized to 141 before use).
pub const DEFAULT_WINDOW_SIZE: u32 = 140;
/// Samples taken per vector segment when re-reading a document.
pub const DEFAULT_SAMPLE_DENSITY: usize = 200;
/// Rings larger than this are skipped instead of repaired.
pub const DEFAULT_MAX_CONTOUR_POINTS: usize = 1_000_000;

/// How the grayscale raster is split into foreground and background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ThresholdConfig {
    /// Local mean over a `window_size` square minus `bias`.
    AdaptiveMean { window_size: u32, bias: Real },
    /// Single cutoff for the whole image.
    Global { level: u8 },
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::AdaptiveMean {
            window_size: DEFAULT_WINDOW_SIZE,
            bias: 0.0,
        }
    }
}

/// Which traced boundaries are kept.
///
/// The default is deliberately `WithHoles`: enclosed background stays open,
/// so a ring-shaped silhouette extrudes with its hollow core. `External`
/// gives the outer-boundary-only behaviour (`--external-only`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourMode {
    /// Outer boundaries only; enclosed background is filled in.
    External,
    /// Outer boundaries together with the holes they enclose.
    #[default]
    WithHoles,
}

/// STL flavour written by the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub threshold: ThresholdConfig,
    pub contour_mode: ContourMode,
    pub extrusion_height: Real,
    /// Points sampled per segment when building polygons from a vector document.
    pub sample_density: usize,
    /// Ramer–Douglas–Peucker tolerance; `0` keeps every corner.
    pub simplification_epsilon: Real,
    pub max_contour_points: usize,
    pub stl_format: StlFormat,
    /// Solid name written into ASCII STL headers.
    pub solid_name: String,
    /// Where to persist the traced outlines as SVG, if anywhere.
    pub vector_output: Option<PathBuf>,
    /// Where to save the binary mask for inspection, if anywhere.
    pub debug_mask: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: ThresholdConfig::default(),
            contour_mode: ContourMode::default(),
            extrusion_height: DEFAULT_HEIGHT,
            sample_density: DEFAULT_SAMPLE_DENSITY,
            simplification_epsilon: 0.0,
            max_contour_points: DEFAULT_MAX_CONTOUR_POINTS,
            stl_format: StlFormat::default(),
            solid_name: "silhouette".to_string(),
            vector_output: None,
            debug_mask: None,
        }
    }
}

impl PipelineConfig {
    /// Adaptive thresholding with the given window and bias, everything else default.
    pub fn adaptive(window_size: u32, bias: Real) -> Self {
        Self {
            threshold: ThresholdConfig::AdaptiveMean { window_size, bias },
            ..Self::default()
        }
    }

    pub fn with_height(mut self, height: Real) -> Self {
        self.extrusion_height = height;
        self
    }

    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.extrusion_height.is_finite() || self.extrusion_height <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "extrusion_height must be positive, got {}",
                self.extrusion_height
            )));
        }
        if !self.simplification_epsilon.is_finite() || self.simplification_epsilon < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "simplification_epsilon must be >= 0, got {}",
                self.simplification_epsilon
            )));
        }
        if let ThresholdConfig::AdaptiveMean { bias, .. } = self.threshold {
            if !bias.is_finite() {
                return Err(PipelineError::InvalidConfig(format!(
                    "bias must be finite, got {bias}"
                )));
            }
        }
        if self.sample_density < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "sample_density must be at least 2, got {}",
                self.sample_density
            )));
        }
        if self.max_contour_points < 3 {
            return Err(PipelineError::InvalidConfig(format!(
                "max_contour_points must be at least 3, got {}",
                self.max_contour_points
            )));
        }
        Ok(())
    }
}

/// Read a JSON configuration file.
pub fn load_config(path: &Path) -> Result<PipelineConfig, PipelineError> {
    let data = fs::read_to_string(path).map_err(|e| {
        PipelineError::InvalidConfig(format!("reading {}: {e}", path.display()))
    })?;
    serde_json::from_str(&data).map_err(|e| {
        PipelineError::InvalidConfig(format!("parsing {}: {e}", path.display()))
    })
}
