//! Boundary tracing of foreground regions.
//!
//! Outlines follow the pixel cracks, so a vertex sits on a pixel corner and
//! the traced loop encloses exactly the foreground pixels. Tracing is done by
//! `contour_tracing`, which reports outer boundaries and holes alike as one
//! SVG path string; rings are then nested by containment to tell them apart.

use crate::config::ContourMode;
use crate::float_types::Real;
use crate::raster::binarize::BinaryMask;
use geo::{BoundingRect, Contains, Coord, LineString, Polygon, Rect};
use log::{debug, info, warn};

/// Closed loop of pixel-corner coordinates. The last point joins the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<[i32; 2]>,
}

impl Contour {
    /// Wrap a point loop, dropping a repeated closing point and collinear interior points.
    pub fn new(points: Vec<[i32; 2]>) -> Self {
        Self {
            points: simplify_collinear(points),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Twice the signed shoelace area; positive for counter-clockwise in a y-up frame.
    pub fn signed_area2(&self) -> i64 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let [x0, y0] = self.points[i];
                let [x1, y1] = self.points[(i + 1) % n];
                i64::from(x0) * i64::from(y1) - i64::from(x1) * i64::from(y0)
            })
            .sum()
    }

    pub fn area(&self) -> Real {
        self.signed_area2().unsigned_abs() as Real / 2.0
    }

    pub fn coords(&self) -> Vec<Coord<Real>> {
        self.points
            .iter()
            .map(|&[x, y]| Coord {
                x: x as Real,
                y: y as Real,
            })
            .collect()
    }

    /// Closed `LineString` (first point repeated at the end).
    pub fn to_line_string(&self) -> LineString<Real> {
        let mut ls = LineString::new(self.coords());
        ls.close();
        ls
    }
}

/// An outer boundary and the holes directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline {
    pub exterior: Contour,
    pub holes: Vec<Contour>,
}

impl Outline {
    /// Every ring, exterior first.
    pub fn rings(&self) -> impl Iterator<Item = &Contour> {
        std::iter::once(&self.exterior).chain(self.holes.iter())
    }

    /// Foreground area: exterior minus holes.
    pub fn area(&self) -> Real {
        self.exterior.area() - self.holes.iter().map(Contour::area).sum::<Real>()
    }
}

/// Traces the boundaries of every foreground region of a [`BinaryMask`].
#[derive(Debug, Clone)]
pub struct ContourExtractor {
    mode: ContourMode,
    max_points: usize,
}

impl Default for ContourExtractor {
    fn default() -> Self {
        Self::new(ContourMode::default(), crate::config::DEFAULT_MAX_CONTOUR_POINTS)
    }
}

impl ContourExtractor {
    pub const fn new(mode: ContourMode, max_points: usize) -> Self {
        Self { mode, max_points }
    }

    pub fn extract(&self, mask: &BinaryMask) -> Vec<Outline> {
        if mask.width() == 0 || mask.height() == 0 || mask.foreground_count() == 0 {
            info!("Found 0 contours.");
            return Vec::new();
        }

        let svg_path = contour_tracing::array::bits_to_paths(mask.to_bits(), true);
        let mut rings = Vec::new();
        for (i, pl) in parse_svg_path_into_polylines(&svg_path).into_iter().enumerate() {
            let contour = Contour::new(pl);
            if contour.len() < 3 {
                warn!("Contour {i} ignored due to insufficient points ({}).", contour.len());
            } else if contour.len() > self.max_points {
                warn!(
                    "Contour {i} ignored: {} points exceeds the limit of {}.",
                    contour.len(),
                    self.max_points
                );
            } else if contour.signed_area2() == 0 {
                warn!("Contour {i} ignored: it encloses no area.");
            } else {
                rings.push(contour);
            }
        }

        let outlines = nest_rings(rings, self.mode);
        info!(
            "Found {} contours ({} holes).",
            outlines.len(),
            outlines.iter().map(|o| o.holes.len()).sum::<usize>()
        );
        outlines
    }
}

/// Sort rings into outlines by how many other rings enclose them:
/// even depth is an outer boundary, odd depth a hole of its tightest container.
fn nest_rings(rings: Vec<Contour>, mode: ContourMode) -> Vec<Outline> {
    let polygons: Vec<Polygon<Real>> = rings
        .iter()
        .map(|r| Polygon::new(r.to_line_string(), vec![]))
        .collect();
    let bounds: Vec<Option<Rect<Real>>> = polygons.iter().map(|p| p.bounding_rect()).collect();
    let areas: Vec<Real> = rings.iter().map(Contour::area).collect();

    let n = rings.len();
    let mut depth = vec![0usize; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    for i in 0..n {
        for j in 0..n {
            if i == j || areas[j] <= areas[i] || !rect_contains(bounds[j], bounds[i]) {
                continue;
            }
            if polygons[j].contains(&polygons[i]) {
                depth[i] += 1;
                if parent[i].is_none_or(|p| areas[j] < areas[p]) {
                    parent[i] = Some(j);
                }
            }
        }
    }

    let mut slots: Vec<Option<usize>> = vec![None; n];
    let mut outlines = Vec::new();
    for i in (0..n).filter(|&i| depth[i] % 2 == 0) {
        if mode == ContourMode::External && depth[i] > 0 {
            continue;
        }
        slots[i] = Some(outlines.len());
        outlines.push(Outline {
            exterior: rings[i].clone(),
            holes: Vec::new(),
        });
    }
    if mode == ContourMode::WithHoles {
        for i in (0..n).filter(|&i| depth[i] % 2 == 1) {
            match parent[i].and_then(|p| slots[p]) {
                Some(slot) => outlines[slot].holes.push(rings[i].clone()),
                None => debug!("hole ring {i} has no enclosing outline, dropped"),
            }
        }
    }
    outlines
}

fn rect_contains(outer: Option<Rect<Real>>, inner: Option<Rect<Real>>) -> bool {
    match (outer, inner) {
        (Some(o), Some(i)) => {
            o.min().x <= i.min().x
                && o.min().y <= i.min().y
                && o.max().x >= i.max().x
                && o.max().y >= i.max().y
        },
        _ => false,
    }
}

/// Drop a repeated closing point, consecutive duplicates and points lying
/// on the straight line between their neighbours.
fn simplify_collinear(mut points: Vec<[i32; 2]>) -> Vec<[i32; 2]> {
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    loop {
        let n = points.len();
        if n < 3 {
            return points;
        }
        let keep: Vec<bool> = (0..n)
            .map(|i| {
                let [ax, ay] = points[(i + n - 1) % n];
                let [bx, by] = points[i];
                let [cx, cy] = points[(i + 1) % n];
                let cross = i64::from(bx - ax) * i64::from(cy - ay)
                    - i64::from(by - ay) * i64::from(cx - ax);
                cross != 0
            })
            .collect();
        if keep.iter().all(|&k| k) {
            return points;
        }
        points = points
            .into_iter()
            .zip(keep)
            .filter_map(|(p, k)| k.then_some(p))
            .collect();
    }
}

/// Parse the subset of SVG path syntax `contour_tracing` emits:
/// - `M x y` => move absolute
/// - `H x`   => horizontal line
/// - `V y`   => vertical line
/// - `Z`     => close path
///
/// Returns one polyline per sub-path, in integer pixel-corner coordinates.
fn parse_svg_path_into_polylines(path_str: &str) -> Vec<Vec<[i32; 2]>> {
    let mut polylines = Vec::new();
    let mut current_poly = Vec::new();

    let mut current_x = 0_i32;
    let mut current_y = 0_i32;
    let mut chars = path_str.trim().chars().peekable();

    fn read_number<I: Iterator<Item = char>>(iter: &mut std::iter::Peekable<I>) -> Option<i32> {
        let mut buf = String::new();
        while let Some(&ch) = iter.peek() {
            if ch.is_whitespace() || ch == ',' {
                iter.next();
            } else {
                break;
            }
        }
        while let Some(&ch) = iter.peek() {
            if ch.is_ascii_digit() || ch == '.' || ch == '-' {
                buf.push(ch);
                iter.next();
            } else {
                break;
            }
        }
        if buf.is_empty() {
            return None;
        }
        buf.parse::<i32>()
            .ok()
            .or_else(|| buf.parse::<f64>().ok().map(|v| v.round() as i32))
    }

    while let Some(ch) = chars.next() {
        match ch {
            'M' | 'm' => {
                if !current_poly.is_empty() {
                    polylines.push(std::mem::take(&mut current_poly));
                }
                current_x = read_number(&mut chars).unwrap_or(current_x);
                current_y = read_number(&mut chars).unwrap_or(current_y);
                current_poly.push([current_x, current_y]);
            },
            'H' | 'h' => {
                current_x = read_number(&mut chars).unwrap_or(current_x);
                current_poly.push([current_x, current_y]);
            },
            'V' | 'v' => {
                current_y = read_number(&mut chars).unwrap_or(current_y);
                current_poly.push([current_x, current_y]);
            },
            'Z' | 'z' => {
                if !current_poly.is_empty() {
                    polylines.push(std::mem::take(&mut current_poly));
                }
            },
            _ => {},
        }
    }

    if !current_poly.is_empty() {
        polylines.push(current_poly);
    }

    polylines
}
