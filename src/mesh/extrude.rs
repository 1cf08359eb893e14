//! Linear extrusion of planar polygons into closed prisms.
//!
//! Each ring point gets a bottom copy at `z = 0` and a top copy at
//! `z = height`. The caps come from an ear-cut triangulation of the polygon
//! and every ring edge becomes a quad of two wall triangles. The caps reuse
//! the ring positions the walls are built from, including at points a ring
//! passes through twice, so each edge is shared by exactly two triangles.
//! A solid that still has open or overused edges is rejected.

use crate::errors::{ExtrusionError, PipelineError};
use crate::float_types::{Real, TAU};
use crate::mesh::Mesh;
use crate::sketch::Sketch;
use crate::sketch::builder::drop_straight_points;
use geo::orient::Direction;
use hashbrown::{HashMap, HashSet};
use geo::{Area, Coord, LineString, Orient, Polygon, TriangulateEarcut};
use log::{debug, info, warn};
use nalgebra::Point3;

/// Relative difference allowed between the cap triangles' area and the polygon's.
const COVERAGE_TOLERANCE: Real = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extruder {
    height: Real,
}

impl Extruder {
    pub fn new(height: Real) -> Result<Self, ExtrusionError> {
        if !height.is_finite() || height <= 0.0 {
            return Err(ExtrusionError::InvalidHeight(height));
        }
        Ok(Self { height })
    }

    pub const fn height(&self) -> Real {
        self.height
    }

    /// Extrude every polygon of the sketch and concatenate the solids.
    ///
    /// Polygons that fail are logged and left out; the call fails only when
    /// none of them can be extruded.
    pub fn extrude(&self, sketch: &Sketch) -> Result<Mesh, PipelineError> {
        let polygons = sketch.polygons();
        let mut mesh = Mesh::new();
        let mut first_error = None;
        for (i, polygon) in polygons.iter().enumerate() {
            match self.extrude_polygon(polygon) {
                Ok(solid) => {
                    debug!(
                        "polygon {i}: {} vertices, {} triangles",
                        solid.vertex_count(),
                        solid.triangle_count()
                    );
                    mesh.append(solid);
                },
                Err(e) => {
                    warn!("Extrusion of polygon {i} failed: {e}");
                    first_error.get_or_insert(e);
                },
            }
        }

        if mesh.is_empty() {
            return Err(PipelineError::Extrusion {
                polygons: polygons.len(),
                source: first_error.unwrap_or(ExtrusionError::TooFewPoints { ring: 0, points: 0 }),
            });
        }
        info!(
            "Extruded {} polygon(s) to height {}: {} vertices, {} triangles",
            polygons.len(),
            self.height,
            mesh.vertex_count(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// One closed prism for a polygon and its holes.
    pub fn extrude_polygon(&self, polygon: &Polygon<Real>) -> Result<Mesh, ExtrusionError> {
        let oriented = polygon.orient(Direction::Default);

        let exterior = clean_ring(oriented.exterior());
        if exterior.len() < 3 {
            return Err(ExtrusionError::TooFewPoints {
                ring: 0,
                points: exterior.len(),
            });
        }
        let mut rings = vec![exterior];
        for (h, hole) in oriented.interiors().iter().enumerate() {
            let ring = clean_ring(hole);
            if ring.len() < 3 {
                debug!("hole {h} collapses to {} points, dropped", ring.len());
                continue;
            }
            rings.push(ring);
        }

        let flat: Vec<Coord<Real>> = rings.iter().flatten().copied().collect();
        let corners = wedge_corners(&flat, &rings);
        let mut caps = triangulate_caps(&rings)?;
        stitch_caps(&flat, &rings, &corners, &mut caps);

        let k = flat.len();
        let mut vertices = Vec::with_capacity(2 * k);
        vertices.extend(flat.iter().map(|c| Point3::new(c.x, c.y, 0.0)));
        vertices.extend(flat.iter().map(|c| Point3::new(c.x, c.y, self.height)));

        let mut triangles = Vec::with_capacity(2 * caps.len() + 2 * k);
        for &[a, b, c] in &caps {
            triangles.push([a + k, b + k, c + k]);
            triangles.push([c, b, a]);
        }

        let mut offset = 0;
        for ring in &rings {
            let m = ring.len();
            for i in 0..m {
                let a = offset + i;
                let b = corners[offset + (i + 1) % m];
                triangles.push([a, b, b + k]);
                triangles.push([a, b + k, a + k]);
            }
            offset += m;
        }

        let mesh = Mesh::from_parts(vertices, triangles);
        let analysis = mesh.analyze_manifold();
        if !analysis.is_watertight() {
            return Err(ExtrusionError::NotWatertight {
                boundary_edges: analysis.boundary_edges,
                non_manifold_edges: analysis.non_manifold_edges,
            });
        }
        Ok(mesh)
    }
}

/// Open ring without duplicate, closing or collinear points.
fn clean_ring(ring: &LineString<Real>) -> Vec<Coord<Real>> {
    let mut points: Vec<Coord<Real>> = ring.0.clone();
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    drop_straight_points(points)
}

#[inline]
fn cross(a: Coord<Real>, b: Coord<Real>, c: Coord<Real>) -> Real {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Counter-clockwise cap triangles indexing into the concatenated rings.
fn triangulate_caps(rings: &[Vec<Coord<Real>>]) -> Result<Vec<[usize; 3]>, ExtrusionError> {
    let polygon = Polygon::new(
        LineString::new(rings[0].clone()),
        rings[1..].iter().map(|r| LineString::new(r.clone())).collect(),
    );
    let expected = polygon.unsigned_area();
    let raw = polygon.earcut_triangles_raw();

    // earcut may or may not keep each ring's closing point; map back either way
    let total: usize = rings.iter().map(Vec::len).sum();
    let flat_count = raw.vertices.len() / 2;
    let closed = if flat_count == total {
        false
    } else if flat_count == total + rings.len() {
        true
    } else {
        return Err(ExtrusionError::Triangulation {
            covered: 0.0,
            expected,
        });
    };
    let mut lookup = Vec::with_capacity(flat_count);
    let mut offset = 0;
    for ring in rings {
        lookup.extend(offset..offset + ring.len());
        if closed {
            lookup.push(offset);
        }
        offset += ring.len();
    }
    let flat: Vec<Coord<Real>> = rings.iter().flatten().copied().collect();

    let mut covered = 0.0;
    let mut triangles = Vec::with_capacity(raw.triangle_indices.len() / 3);
    for tri in raw.triangle_indices.chunks_exact(3) {
        let [a, b, c] = [lookup[tri[0]], lookup[tri[1]], lookup[tri[2]]];
        // slivers between two visits of one point
        if flat[a] == flat[b] || flat[b] == flat[c] || flat[c] == flat[a] {
            continue;
        }
        let area2 = cross(flat[a], flat[b], flat[c]);
        covered += area2.abs() / 2.0;
        triangles.push(if area2 < 0.0 { [a, c, b] } else { [a, b, c] });
    }

    if (covered - expected).abs() > COVERAGE_TOLERANCE * expected.max(1.0) {
        return Err(ExtrusionError::Triangulation { covered, expected });
    }
    Ok(triangles)
}

type PointKey = (u64, u64);

#[inline]
fn point_key(c: Coord<Real>) -> PointKey {
    // + 0.0 folds -0.0 into 0.0
    (u64::from((c.x + 0.0).to_bits()), u64::from((c.y + 0.0).to_bits()))
}

/// For every ring position, the position whose leaving edge bounds the same
/// interior wedge as the edge arriving there.
///
/// Distinct points map to themselves. Where the rings pass through a point
/// more than once, each arriving edge is paired with the first leaving edge
/// clockwise from it; the interior lies left of every edge once oriented.
/// The paired position is the vertex that wedge uses.
fn wedge_corners(flat: &[Coord<Real>], rings: &[Vec<Coord<Real>>]) -> Vec<usize> {
    let mut prev = Vec::with_capacity(flat.len());
    let mut next = Vec::with_capacity(flat.len());
    let mut offset = 0;
    for ring in rings {
        let m = ring.len();
        for i in 0..m {
            prev.push(offset + (i + m - 1) % m);
            next.push(offset + (i + 1) % m);
        }
        offset += m;
    }

    let mut visits: HashMap<PointKey, Vec<usize>> = HashMap::new();
    for (p, &c) in flat.iter().enumerate() {
        visits.entry(point_key(c)).or_default().push(p);
    }

    let mut corners: Vec<usize> = (0..flat.len()).collect();
    for group in visits.values().filter(|g| g.len() > 1) {
        let at = flat[group[0]];
        let heading = |p: usize| (flat[p].y - at.y).atan2(flat[p].x - at.x);
        let paired: Vec<(usize, usize)> = group
            .iter()
            .filter_map(|&q| {
                let arriving = heading(prev[q]);
                group
                    .iter()
                    .copied()
                    .min_by(|&a, &b| {
                        clockwise(arriving, heading(next[a]))
                            .total_cmp(&clockwise(arriving, heading(next[b])))
                    })
                    .map(|r| (q, r))
            })
            .collect();

        let leaving: HashSet<usize> = paired.iter().map(|&(_, r)| r).collect();
        if leaving.len() == group.len() {
            for (q, r) in paired {
                corners[q] = r;
            }
        } else {
            debug!("ambiguous wedges at ({}, {}), left unpaired", at.x, at.y);
        }
    }
    corners
}

/// Clockwise turn from heading `from` to heading `to`, in (0, 2π].
#[inline]
fn clockwise(from: Real, to: Real) -> Real {
    let turn = (from - to).rem_euclid(TAU);
    if turn == 0.0 { TAU } else { turn }
}

/// Re-index cap corners that sit on a point the rings visit more than once.
///
/// Earcut may name any visit of a repeated point. Corners are grouped across
/// the cap edges their triangles share, and each group takes the wedge
/// vertex of a boundary edge one of its triangles runs along, so every cap
/// edge meets the wall built from the same vertices.
fn stitch_caps(
    flat: &[Coord<Real>],
    rings: &[Vec<Coord<Real>>],
    corners: &[usize],
    caps: &mut [[usize; 3]],
) {
    let distinct: HashSet<PointKey> = flat.iter().map(|&c| point_key(c)).collect();
    if distinct.len() == flat.len() {
        return;
    }

    let mut boundary: HashMap<(PointKey, PointKey), (usize, usize)> = HashMap::new();
    let mut offset = 0;
    for ring in rings {
        let m = ring.len();
        for i in 0..m {
            let (a, b) = (offset + i, offset + (i + 1) % m);
            boundary
                .entry((point_key(flat[a]), point_key(flat[b])))
                .or_insert((a, corners[b]));
        }
        offset += m;
    }

    // corner slot 3·t + s is corner s of triangle t
    let slots = 3 * caps.len();
    let mut parent: Vec<usize> = (0..slots).collect();
    let mut assigned: Vec<Option<usize>> = vec![None; slots];
    let mut shared: HashMap<(PointKey, PointKey), Vec<(usize, usize)>> = HashMap::new();

    for (t, tri) in caps.iter().enumerate() {
        for s in 0..3 {
            let e = (s + 1) % 3;
            let (from, to) = (point_key(flat[tri[s]]), point_key(flat[tri[e]]));
            if let Some(&(a, b)) = boundary.get(&(from, to)) {
                assigned[3 * t + s] = Some(a);
                assigned[3 * t + e] = Some(b);
            }
            let entry = if from < to {
                ((from, to), (3 * t + s, 3 * t + e))
            } else {
                ((to, from), (3 * t + e, 3 * t + s))
            };
            shared.entry(entry.0).or_default().push(entry.1);
        }
    }

    for uses in shared.values() {
        if let [(a0, a1), (b0, b1)] = uses.as_slice() {
            union(&mut parent, *a0, *b0);
            union(&mut parent, *a1, *b1);
        }
    }

    let mut chosen: Vec<Option<usize>> = vec![None; slots];
    for slot in 0..slots {
        if let Some(index) = assigned[slot] {
            let root = find(&mut parent, slot);
            chosen[root].get_or_insert(index);
        }
    }
    for (t, tri) in caps.iter_mut().enumerate() {
        for (s, corner) in tri.iter_mut().enumerate() {
            let root = find(&mut parent, 3 * t + s);
            if let Some(index) = chosen[root] {
                *corner = index;
            }
        }
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let (ra, rb) = (find(parent, a), find(parent, b));
    if ra != rb {
        parent[rb] = ra;
    }
}
