//! Point sequence → valid simple polygons.
//!
//! A ring is cleaned, optionally simplified, and checked for simplicity.
//! Rings that cross or touch themselves are repaired with a zero-distance
//! self-union, which resolves the crossings and may split the ring into
//! several polygons. Whatever ends up with no area is dropped.

use crate::errors::{PipelineError, ValidationError};
use crate::float_types::{Real, tolerance};
use crate::sketch::RingSet;
use geo::line_intersection::{LineIntersection, line_intersection};
use geo::{Area, BooleanOps, Coord, Line, LineString, MultiPolygon, Polygon, Simplify};
use log::{debug, warn};

/// Builds validated polygons from dense rings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonBuilder {
    simplification_epsilon: Real,
    max_points: usize,
}

impl Default for PolygonBuilder {
    fn default() -> Self {
        Self::new(0.0, crate::config::DEFAULT_MAX_CONTOUR_POINTS)
    }
}

impl PolygonBuilder {
    pub const fn new(simplification_epsilon: Real, max_points: usize) -> Self {
        Self {
            simplification_epsilon,
            max_points,
        }
    }

    /// One ring as an exterior, repaired if needed.
    pub fn build_ring(&self, points: &[Coord<Real>]) -> Result<MultiPolygon<Real>, ValidationError> {
        if points.len() > self.max_points {
            return Err(ValidationError::TooManyPoints {
                count: points.len(),
                limit: self.max_points,
            });
        }
        let mut ring = clean_ring(points)?;
        if self.simplification_epsilon > 0.0 {
            ring = simplify_ring(&ring, self.simplification_epsilon);
            if ring.len() < 3 {
                return Err(ValidationError::TooFewPoints(ring.len()));
            }
        }

        let polygon = Polygon::new(LineString::new(ring), vec![]);
        let result = match validate_polygon(&polygon) {
            Ok(()) => MultiPolygon::new(vec![polygon]),
            Err(reason) => {
                debug!("repairing ring: {reason}");
                repair(&polygon)
            },
        };

        let kept = drop_empty(result);
        if kept.0.is_empty() {
            return Err(ValidationError::EmptyAfterRepair);
        }
        Ok(kept)
    }

    /// All rings of a set combined with the even-odd rule.
    ///
    /// Rings that cannot be repaired are skipped; the set fails only when none survives.
    pub fn build(&self, set: &RingSet) -> Result<MultiPolygon<Real>, ValidationError> {
        let mut combined: Option<MultiPolygon<Real>> = None;
        let mut first_error = None;
        for (i, ring) in set.rings.iter().enumerate() {
            match self.build_ring(ring) {
                Ok(shape) => {
                    combined = Some(match combined {
                        None => shape,
                        Some(acc) => acc.xor(&shape),
                    });
                },
                Err(e) => {
                    warn!("ring {i} skipped: {e}");
                    first_error.get_or_insert(e);
                },
            }
        }
        match combined.map(drop_empty) {
            Some(shape) if !shape.0.is_empty() => Ok(shape),
            _ => Err(first_error.unwrap_or(ValidationError::EmptyAfterRepair)),
        }
    }

    /// Build every set, logging and skipping the ones that fail.
    pub fn build_all(&self, sets: &[RingSet]) -> Vec<MultiPolygon<Real>> {
        let mut built = Vec::with_capacity(sets.len());
        for (index, set) in sets.iter().enumerate() {
            match self.build(set) {
                Ok(shape) => {
                    debug!("Polygon {index} area: {:.2}", shape.unsigned_area());
                    built.push(shape);
                },
                Err(source) => {
                    let e = PipelineError::GeometryInvalid { index, source };
                    warn!("{e}, ignored.");
                },
            }
        }
        built
    }
}

/// Reject non-finite coordinates, drop consecutive duplicates and the closing point.
pub fn clean_ring(points: &[Coord<Real>]) -> Result<Vec<Coord<Real>>, ValidationError> {
    if let Some(bad) = points.iter().find(|c| !(c.x.is_finite() && c.y.is_finite())) {
        return Err(ValidationError::InvalidCoordinate(*bad));
    }
    let mut ring: Vec<Coord<Real>> = points.to_vec();
    ring.dedup();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    let ring = drop_straight_points(ring);
    if ring.len() < 3 {
        return Err(ValidationError::TooFewPoints(ring.len()));
    }
    Ok(ring)
}

/// Remove points lying on the straight run between their neighbours.
///
/// A point is dropped only when the ring keeps going forward through it and it
/// sits within `tolerance()` of the line joining its neighbours, so spikes that
/// double back survive for the simplicity check.
pub(crate) fn drop_straight_points(ring: Vec<Coord<Real>>) -> Vec<Coord<Real>> {
    let eps = tolerance();
    let mut out: Vec<Coord<Real>> = Vec::with_capacity(ring.len());
    for p in ring {
        while out.len() >= 2 && is_straight(out[out.len() - 2], out[out.len() - 1], p, eps) {
            out.pop();
        }
        out.push(p);
    }
    // the seam between last and first point
    loop {
        let n = out.len();
        if n < 3 {
            break;
        }
        if is_straight(out[n - 2], out[n - 1], out[0], eps) {
            out.pop();
        } else if is_straight(out[n - 1], out[0], out[1], eps) {
            out.remove(0);
        } else {
            break;
        }
    }
    out
}

#[inline]
fn is_straight(a: Coord<Real>, b: Coord<Real>, c: Coord<Real>, eps: Real) -> bool {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let (bcx, bcy) = (c.x - b.x, c.y - b.y);
    let cross = abx * bcy - aby * bcx;
    let dot = abx * bcx + aby * bcy;
    dot > 0.0 && cross.abs() <= eps * distance(a, c)
}

/// Simple-polygon check: enough points, non-zero area, every ring simple.
pub fn validate_polygon(polygon: &Polygon<Real>) -> Result<(), ValidationError> {
    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
        let coords = open_coords(ring);
        if coords.len() < 3 {
            return Err(ValidationError::TooFewPoints(coords.len()));
        }
        if let Some(at) = ring_self_intersection(&coords) {
            return Err(ValidationError::RingSelfIntersection(at));
        }
    }
    if polygon.unsigned_area() <= tolerance() {
        return Err(ValidationError::ZeroArea);
    }
    Ok(())
}

/// Resolve self-intersections by unioning the polygon with nothing.
///
/// Valid input comes back unchanged up to ring start point and orientation.
pub fn repair(polygon: &Polygon<Real>) -> MultiPolygon<Real> {
    MultiPolygon::new(vec![polygon.clone()]).union(&MultiPolygon::new(vec![]))
}

fn drop_empty(shape: MultiPolygon<Real>) -> MultiPolygon<Real> {
    let eps = tolerance();
    let (kept, dropped): (Vec<_>, Vec<_>) = shape
        .0
        .into_iter()
        .partition(|p| p.exterior().0.len() >= 4 && p.unsigned_area() > eps);
    if !dropped.is_empty() {
        warn!("{} polygon(s) with zero area discarded", dropped.len());
    }
    MultiPolygon::new(kept)
}

/// Ring coordinates without the repeated closing point.
fn open_coords(ring: &LineString<Real>) -> Vec<Coord<Real>> {
    let mut coords = ring.0.clone();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    coords
}

/// First point where two edges of the closed ring meet other than at a shared vertex.
///
/// Edges are swept by x-extent so only overlapping candidates are tested.
pub fn ring_self_intersection(ring: &[Coord<Real>]) -> Option<Coord<Real>> {
    let n = ring.len();
    if n < 3 {
        return None;
    }
    let edges: Vec<Line<Real>> = (0..n).map(|i| Line::new(ring[i], ring[(i + 1) % n])).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| min_x(&edges[a]).total_cmp(&min_x(&edges[b])));

    for (k, &i) in order.iter().enumerate() {
        let max_i = max_x(&edges[i]);
        for &j in &order[k + 1..] {
            if min_x(&edges[j]) > max_i {
                break;
            }
            let adjacent = (i + 1) % n == j || (j + 1) % n == i;
            match line_intersection(edges[i], edges[j]) {
                None => {},
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    if !(adjacent && is_shared_vertex_only(&edges[i], &edges[j], intersection)) {
                        return Some(intersection);
                    }
                },
                Some(LineIntersection::Collinear { intersection }) => {
                    if !adjacent || intersection.start != intersection.end {
                        return Some(intersection.start);
                    }
                },
            }
        }
    }
    None
}

fn is_shared_vertex_only(a: &Line<Real>, b: &Line<Real>, at: Coord<Real>) -> bool {
    (at == a.end && at == b.start) || (at == a.start && at == b.end)
}

#[inline]
fn min_x(line: &Line<Real>) -> Real {
    line.start.x.min(line.end.x)
}

#[inline]
fn max_x(line: &Line<Real>) -> Real {
    line.start.x.max(line.end.x)
}

/// Ramer–Douglas–Peucker on a closed ring, anchored at its first point.
fn simplify_ring(ring: &[Coord<Real>], epsilon: Real) -> Vec<Coord<Real>> {
    let polygon = Polygon::new(LineString::new(ring.to_vec()), vec![]).simplify(&epsilon);
    open_coords(polygon.exterior())
}

fn distance(a: Coord<Real>, b: Coord<Real>) -> Real {
    (a.x - b.x).hypot(a.y - b.y)
}
