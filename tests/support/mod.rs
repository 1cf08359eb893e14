//! Test support library
//! Synthetic silhouette images, temp paths and float helpers shared by the tests.
#![allow(dead_code)]

use geo::Coord;
use image::{GrayImage, Luma};
use silhouette3d::float_types::Real;
use silhouette3d::mesh::Mesh;
use std::path::PathBuf;

pub const WHITE: u8 = 255;
pub const BLACK: u8 = 0;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Returns the bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]` of a mesh.
pub fn bounding_box(mesh: &Mesh) -> [Real; 6] {
    let bb = mesh.bounding_box();
    [bb.mins.x, bb.mins.y, bb.mins.z, bb.maxs.x, bb.maxs.y, bb.maxs.z]
}

/// White canvas with black pixels wherever `ink(x, y)` holds.
pub fn silhouette(width: u32, height: u32, ink: impl Fn(u32, u32) -> bool) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if ink(x, y) { Luma([BLACK]) } else { Luma([WHITE]) }
    })
}

/// Black square covering `[lo, hi)` on both axes of a `size`×`size` canvas.
pub fn square_image(size: u32, lo: u32, hi: u32) -> GrayImage {
    silhouette(size, size, |x, y| (lo..hi).contains(&x) && (lo..hi).contains(&y))
}

/// Two separate 30×30 squares side by side on a 120×60 canvas.
pub fn two_blobs_image() -> GrayImage {
    silhouette(120, 60, |x, y| {
        (15..45).contains(&y) && ((10..40).contains(&x) || (70..100).contains(&x))
    })
}

/// Black ring between radius 15 and 30 around the centre of a 100×100 canvas.
pub fn annulus_image() -> GrayImage {
    silhouette(100, 100, |x, y| {
        let dx = x as Real + 0.5 - 50.0;
        let dy = y as Real + 0.5 - 50.0;
        let r = (dx * dx + dy * dy).sqrt();
        (15.0..30.0).contains(&r)
    })
}

/// Two 10×10 squares meeting only at the corner (15, 15).
pub fn diagonal_squares_image() -> GrayImage {
    silhouette(30, 30, |x, y| {
        ((5..15).contains(&x) && (5..15).contains(&y)) || ((15..25).contains(&x) && (15..25).contains(&y))
    })
}

/// Deterministic speckle: every pixel black or white from a linear congruential sequence.
pub fn noise_image(width: u32, height: u32, seed: u64) -> GrayImage {
    let mut state = seed;
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for _ in 0..width * height {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        pixels.push(if (state >> 33) & 1 == 1 { BLACK } else { WHITE });
    }
    GrayImage::from_raw(width, height, pixels).expect("buffer matches dimensions")
}

/// Fresh path under the system temp directory, unique per process and name.
pub fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("silhouette3d-tests-{}", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}

pub fn coords(points: &[(Real, Real)]) -> Vec<Coord<Real>> {
    points.iter().map(|&(x, y)| Coord { x, y }).collect()
}

/// Distance from `p` to the closed ring through `ring`.
pub fn distance_to_ring(p: Coord<Real>, ring: &[Coord<Real>]) -> Real {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            let len_sq = dx * dx + dy * dy;
            let t = if len_sq == 0.0 {
                0.0
            } else {
                (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
            };
            ((p.x - a.x - t * dx).powi(2) + (p.y - a.y - t * dy).powi(2)).sqrt()
        })
        .fold(Real::MAX, Real::min)
}
