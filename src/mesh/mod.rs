//! Indexed triangle meshes produced by extrusion.

use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use nalgebra::{Point3, Vector3};
use std::sync::OnceLock;

pub mod extrude;
pub mod manifold;

pub use extrude::Extruder;
pub use manifold::MeshAnalysis;

/// Shared vertex positions and counter-clockwise (outward facing) index triples.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Point3<Real>>,
    pub triangles: Vec<[usize; 3]>,

    /// Lazily calculated AABB that spans `vertices`.
    pub bounding_box: OnceLock<Aabb>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(vertices: Vec<Point3<Real>>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            triangles,
            bounding_box: OnceLock::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Concatenate `other`, shifting its indices past the current vertices.
    /// No vertices are shared between the two parts.
    pub fn append(&mut self, other: Mesh) {
        let offset = self.vertices.len();
        self.vertices.extend(other.vertices);
        self.triangles.extend(
            other
                .triangles
                .into_iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
        self.bounding_box = OnceLock::new();
    }

    /// Axis aligned bounding box (cached after first call)
    pub fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
            for v in &self.vertices {
                mins.x = mins.x.min(v.x);
                mins.y = mins.y.min(v.y);
                mins.z = mins.z.min(v.z);
                maxs.x = maxs.x.max(v.x);
                maxs.y = maxs.y.max(v.y);
                maxs.z = maxs.z.max(v.z);
            }
            if self.vertices.is_empty() {
                Aabb::new(Point3::origin(), Point3::origin())
            } else {
                Aabb::new(mins, maxs)
            }
        })
    }

    pub fn triangle_points(&self, index: usize) -> [Point3<Real>; 3] {
        self.triangles[index].map(|i| self.vertices[i])
    }

    /// Unit facet normal from the winding, zero for degenerate triangles.
    pub fn triangle_normal(&self, index: usize) -> Vector3<Real> {
        let [a, b, c] = self.triangle_points(index);
        let n = (b - a).cross(&(c - a));
        n.try_normalize(Real::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Enclosed volume by the divergence theorem; positive for outward winding.
    pub fn signed_volume(&self) -> Real {
        (0..self.triangles.len())
            .map(|i| {
                let [a, b, c] = self.triangle_points(i);
                a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
            })
            .sum()
    }

    pub fn surface_area(&self) -> Real {
        (0..self.triangles.len())
            .map(|i| {
                let [a, b, c] = self.triangle_points(i);
                (b - a).cross(&(c - a)).norm() / 2.0
            })
            .sum()
    }

    /// Every triangle index refers to an existing vertex.
    pub fn indices_in_range(&self) -> bool {
        let n = self.vertices.len();
        self.triangles.iter().flatten().all(|&i| i < n)
    }
}
