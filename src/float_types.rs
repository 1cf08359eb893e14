//! Scalar precision and geometric tolerance.
//!
//! Exactly one of the `f64` (default) and `f32` features picks [`Real`] and
//! the matching parry build.

#[cfg(feature = "f64")]
pub use parry3d_f64 as parry3d;
#[cfg(feature = "f32")]
pub use parry3d;

#[cfg(feature = "f64")]
pub type Real = f64;
#[cfg(feature = "f32")]
pub type Real = f32;

#[cfg(feature = "f64")]
pub const TAU: Real = std::f64::consts::TAU;
#[cfg(feature = "f32")]
pub const TAU: Real = std::f32::consts::TAU;

#[cfg(feature = "f64")]
const DEFAULT_TOLERANCE: Real = 1e-9;
#[cfg(feature = "f32")]
const DEFAULT_TOLERANCE: Real = 1e-4;

/// Environment variable overriding [`tolerance`], read once per process.
pub const TOLERANCE_ENV: &str = "SILHOUETTE_TOLERANCE";

static TOLERANCE: std::sync::OnceLock<Real> = std::sync::OnceLock::new();

/// Distance below which points count as coincident or collinear, and area
/// below which a polygon counts as empty.
pub fn tolerance() -> Real {
    *TOLERANCE.get_or_init(|| {
        std::env::var(TOLERANCE_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<Real>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .unwrap_or(DEFAULT_TOLERANCE)
    })
}
