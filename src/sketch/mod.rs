//! Planar silhouette geometry.
//!
//! [`RingSet`]s (dense point loops of one outline or SVG path) are turned into
//! valid polygons by the [`builder`], and everything found in one image is
//! unioned into a single [`Sketch`] by [`merge`].

use crate::float_types::Real;
use crate::raster::contour::Outline;
use geo::{Area, Coord, MultiPolygon, Polygon};

pub mod builder;
pub mod merge;

pub use builder::PolygonBuilder;
pub use merge::merge_polygons;

/// Point loops filled together with the even-odd rule: the first ring is
/// usually an exterior and the rings it encloses are holes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingSet {
    pub rings: Vec<Vec<Coord<Real>>>,
}

impl RingSet {
    pub fn point_count(&self) -> usize {
        self.rings.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

impl From<&Outline> for RingSet {
    fn from(outline: &Outline) -> Self {
        Self {
            rings: outline.rings().map(|r| r.coords()).collect(),
        }
    }
}

/// The merged silhouette: one polygon, or several with disjoint interiors.
#[derive(Debug, Clone, PartialEq)]
pub enum Sketch {
    Single(Polygon<Real>),
    Multi(MultiPolygon<Real>),
}

impl Sketch {
    /// `None` when `multi` holds no polygon.
    pub fn from_multi_polygon(mut multi: MultiPolygon<Real>) -> Option<Self> {
        match multi.0.len() {
            0 => None,
            1 => multi.0.pop().map(Sketch::Single),
            _ => Some(Sketch::Multi(multi)),
        }
    }

    /// Top-level polygons, in order.
    pub fn polygons(&self) -> &[Polygon<Real>] {
        match self {
            Sketch::Single(polygon) => std::slice::from_ref(polygon),
            Sketch::Multi(multi) => &multi.0,
        }
    }

    pub fn into_polygons(self) -> Vec<Polygon<Real>> {
        match self {
            Sketch::Single(polygon) => vec![polygon],
            Sketch::Multi(multi) => multi.0,
        }
    }

    pub fn len(&self) -> usize {
        self.polygons().len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons().is_empty()
    }

    /// Filled area, holes excluded.
    pub fn area(&self) -> Real {
        self.polygons().iter().map(|p| p.unsigned_area()).sum()
    }

    pub fn hole_count(&self) -> usize {
        self.polygons().iter().map(|p| p.interiors().len()).sum()
    }

    pub fn to_multi_polygon(&self) -> MultiPolygon<Real> {
        MultiPolygon::new(self.polygons().to_vec())
    }
}
