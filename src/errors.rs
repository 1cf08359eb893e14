//! Pipeline and ring validation errors

use crate::float_types::Real;
use crate::io::IoError;
use geo::Coord;
use std::path::PathBuf;

/// Why a single ring could not be turned into usable polygon geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A ring has fewer than three distinct points
    #[error("(TooFewPoints) ring has {0} distinct points, at least 3 are required")]
    TooFewPoints(usize),
    /// A ring exceeds the configured point budget
    #[error("(TooManyPoints) ring has {count} points, the limit is {limit}")]
    TooManyPoints { count: usize, limit: usize },
    /// The coordinate has a NaN or infinite component
    #[error("(InvalidCoordinate) coordinate ({}, {}) is not finite", .0.x, .0.y)]
    InvalidCoordinate(Coord<Real>),
    /// Two edges of the ring cross or touch away from their shared vertex
    #[error("(RingSelfIntersection) ring self-intersects at ({}, {})", .0.x, .0.y)]
    RingSelfIntersection(Coord<Real>),
    /// The ring encloses no area
    #[error("(ZeroArea) ring encloses no area")]
    ZeroArea,
    /// Repair produced nothing with positive area
    #[error("(EmptyAfterRepair) ring is empty after repair")]
    EmptyAfterRepair,
}

/// Reason an individual polygon could not be extruded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtrusionError {
    #[error("extrusion height must be positive and finite, got {0}")]
    InvalidHeight(Real),
    #[error("ring {ring} has {points} usable points, at least 3 are required")]
    TooFewPoints { ring: usize, points: usize },
    #[error("triangulation covers {covered} of {expected} square units")]
    Triangulation { covered: Real, expected: Real },
    #[error("solid is not closed: {boundary_edges} boundary and {non_manifold_edges} non-manifold edges")]
    NotWatertight {
        boundary_edges: usize,
        non_manifold_edges: usize,
    },
}

/// Failures surfaced to the caller of a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The source image is missing, unreadable or empty
    #[error("failed to load image {path}: {reason}")]
    InputDecode { path: PathBuf, reason: String },

    /// Nothing usable survived tracing, sampling and repair
    #[error("no valid polygons found in the silhouette")]
    GeometryEmpty,

    /// A specific ring failed repair
    #[error("ring {index} is invalid: {source}")]
    GeometryInvalid {
        index: usize,
        #[source]
        source: ValidationError,
    },

    /// No polygon of the merged geometry could be extruded
    #[error("extrusion failed for all {polygons} polygon(s): {source}")]
    Extrusion {
        polygons: usize,
        #[source]
        source: ExtrusionError,
    },

    /// The output file could not be written or verified
    #[error("failed to export {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: IoError,
    },

    /// An SVG document could not be read or parsed
    #[error("invalid vector document: {0}")]
    VectorDocument(#[source] IoError),

    /// Rejected configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
