//! Turn a photographed or scanned **silhouette** into a printable solid.
//!
//! A grayscale image is split into foreground and background with an adaptive
//! mean threshold, the foreground boundaries are traced into closed outlines
//! (holes included), those outlines become valid [geo] polygons which are
//! unioned into one [`Sketch`], and the sketch is extruded into a watertight
//! triangle [`Mesh`] written as STL. Outlines can also be written to and read
//! back from SVG.
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64

#![forbid(unsafe_code)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod config;
pub mod errors;
pub mod float_types;
pub mod io;
pub mod mesh;
pub mod pipeline;
pub mod raster;
pub mod sketch;

#[cfg(any(
    all(feature = "f64", feature = "f32"),
    not(any(feature = "f64", feature = "f32"))
))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use config::PipelineConfig;
pub use errors::{ExtrusionError, PipelineError, ValidationError};
pub use mesh::Mesh;
pub use pipeline::Pipeline;
pub use sketch::Sketch;
