//! SVG persistence of traced outlines and dense re-sampling of vector paths.
//!
//! The written document is sized to the source raster, uses pixel units with
//! the origin top-left and y pointing down, and stores one even-odd filled
//! `<path>` per outline (exterior sub-path first, then its holes). Reading
//! accepts the full SVG path grammar so documents edited by other tools can
//! be fed back into the pipeline.

use crate::float_types::{Real, TAU};
use crate::io::{IoError, verify_written};
use crate::raster::contour::Outline;
use crate::sketch::RingSet;
use geo::Coord;
use log::{debug, info, warn};
use std::path::Path as FsPath;
use svg::Document;
use svg::node::element::path::{Command, Data, Position};
use svg::node::element::tag::Type;
use svg::node::element::{Path, tag};
use svg::parser::Event;

/// Samples per segment used unless configured otherwise.
pub const DEFAULT_SAMPLES: usize = 200;
/// Lower bound on samples per segment (both end points).
pub const MIN_SAMPLES: usize = 2;
/// Upper bound on samples per segment.
pub const MAX_SAMPLES: usize = 10_000;

/// Elliptical arc in centre parameterisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipticalArc {
    pub from: Coord<Real>,
    pub to: Coord<Real>,
    pub center: Coord<Real>,
    pub radii: Coord<Real>,
    /// x-axis rotation in radians
    pub rotation: Real,
    pub start_angle: Real,
    pub sweep_angle: Real,
    /// SVG flags, kept so the arc can be written back unchanged
    pub large_arc: bool,
    pub sweep: bool,
}

impl EllipticalArc {
    /// Endpoint → centre conversion (SVG 1.1, appendix F.6.5).
    ///
    /// Degenerate arcs (zero radius or coincident end points) become lines.
    pub fn from_endpoints(
        from: Coord<Real>,
        to: Coord<Real>,
        radii: Coord<Real>,
        rotation_degrees: Real,
        large_arc: bool,
        sweep: bool,
    ) -> Segment {
        let (mut rx, mut ry) = (radii.x.abs(), radii.y.abs());
        if rx == 0.0 || ry == 0.0 || from == to {
            return Segment::Line { from, to };
        }
        let phi = rotation_degrees.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();

        let dx = (from.x - to.x) / 2.0;
        let dy = (from.y - to.y) / 2.0;
        let x1p = cos_phi * dx + sin_phi * dy;
        let y1p = -sin_phi * dx + cos_phi * dy;

        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let scale = lambda.sqrt();
            rx *= scale;
            ry *= scale;
        }

        let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
        let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
        let mut coef = if den > 0.0 { (num / den).max(0.0).sqrt() } else { 0.0 };
        if large_arc == sweep {
            coef = -coef;
        }
        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;

        let center = Coord {
            x: cos_phi * cxp - sin_phi * cyp + (from.x + to.x) / 2.0,
            y: sin_phi * cxp + cos_phi * cyp + (from.y + to.y) / 2.0,
        };

        let angle = |ux: Real, uy: Real, vx: Real, vy: Real| (ux * vy - uy * vx).atan2(ux * vx + uy * vy);
        let ux = (x1p - cxp) / rx;
        let uy = (y1p - cyp) / ry;
        let vx = (-x1p - cxp) / rx;
        let vy = (-y1p - cyp) / ry;
        let start_angle = angle(1.0, 0.0, ux, uy);
        let mut sweep_angle = angle(ux, uy, vx, vy);
        if !sweep && sweep_angle > 0.0 {
            sweep_angle -= TAU;
        } else if sweep && sweep_angle < 0.0 {
            sweep_angle += TAU;
        }

        Segment::Arc(EllipticalArc {
            from,
            to,
            center,
            radii: Coord { x: rx, y: ry },
            rotation: phi,
            start_angle,
            sweep_angle,
            large_arc,
            sweep,
        })
    }

    pub fn point_at(&self, t: Real) -> Coord<Real> {
        if t <= 0.0 {
            return self.from;
        }
        if t >= 1.0 {
            return self.to;
        }
        let theta = self.start_angle + t * self.sweep_angle;
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_phi, cos_phi) = self.rotation.sin_cos();
        Coord {
            x: self.center.x + self.radii.x * cos_phi * cos_t - self.radii.y * sin_phi * sin_t,
            y: self.center.y + self.radii.x * sin_phi * cos_t + self.radii.y * cos_phi * sin_t,
        }
    }
}

/// One drawing primitive of a sub-path, with explicit end points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line {
        from: Coord<Real>,
        to: Coord<Real>,
    },
    Quadratic {
        from: Coord<Real>,
        ctrl: Coord<Real>,
        to: Coord<Real>,
    },
    Cubic {
        from: Coord<Real>,
        ctrl1: Coord<Real>,
        ctrl2: Coord<Real>,
        to: Coord<Real>,
    },
    Arc(EllipticalArc),
}

impl Segment {
    pub const fn start(&self) -> Coord<Real> {
        match self {
            Segment::Line { from, .. }
            | Segment::Quadratic { from, .. }
            | Segment::Cubic { from, .. } => *from,
            Segment::Arc(arc) => arc.from,
        }
    }

    pub const fn end(&self) -> Coord<Real> {
        match self {
            Segment::Line { to, .. } | Segment::Quadratic { to, .. } | Segment::Cubic { to, .. } => {
                *to
            },
            Segment::Arc(arc) => arc.to,
        }
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: Real) -> Coord<Real> {
        let s = 1.0 - t;
        match *self {
            Segment::Line { from, to } => Coord {
                x: from.x + (to.x - from.x) * t,
                y: from.y + (to.y - from.y) * t,
            },
            Segment::Quadratic { from, ctrl, to } => Coord {
                x: s * s * from.x + 2.0 * s * t * ctrl.x + t * t * to.x,
                y: s * s * from.y + 2.0 * s * t * ctrl.y + t * t * to.y,
            },
            Segment::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                let (a, b, c, d) = (s * s * s, 3.0 * s * s * t, 3.0 * s * t * t, t * t * t);
                Coord {
                    x: a * from.x + b * ctrl1.x + c * ctrl2.x + d * to.x,
                    y: a * from.y + b * ctrl1.y + c * ctrl2.y + d * to.y,
                }
            },
            Segment::Arc(ref arc) => arc.point_at(t),
        }
    }
}

/// A run of segments started by a "move"; `closed` returns to `start`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubPath {
    pub start: Coord<Real>,
    pub segments: Vec<Segment>,
    pub closed: bool,
}

impl SubPath {
    /// Closed polygonal sub-path through `points`.
    pub fn polygon(points: &[Coord<Real>]) -> Option<Self> {
        let (&start, rest) = points.split_first()?;
        let mut segments = Vec::with_capacity(points.len());
        let mut from = start;
        for &to in rest {
            segments.push(Segment::Line { from, to });
            from = to;
        }
        Some(Self {
            start,
            segments,
            closed: true,
        })
    }

    /// Current end point (the start when nothing has been drawn).
    pub fn end(&self) -> Coord<Real> {
        self.segments.last().map_or(self.start, Segment::end)
    }

    /// Segment joining the end back to the start, if the sub-path is closed and open-ended.
    pub fn closing_segment(&self) -> Option<Segment> {
        let end = self.end();
        (self.closed && end != self.start).then_some(Segment::Line {
            from: end,
            to: self.start,
        })
    }

    /// Start point followed by every segment end point.
    pub fn vertices(&self) -> Vec<Coord<Real>> {
        std::iter::once(self.start)
            .chain(self.segments.iter().map(Segment::end))
            .collect()
    }
}

/// One `<path>` element: several sub-paths filled together with the even-odd rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorPath {
    pub subpaths: Vec<SubPath>,
}

/// An SVG document in pixel units.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorDocument {
    pub width: Real,
    pub height: Real,
    pub paths: Vec<VectorPath>,
}

impl VectorDocument {
    /// Encode traced outlines, one path per outline and one closed sub-path per ring.
    pub fn from_outlines(outlines: &[Outline], width: u32, height: u32) -> Self {
        let paths = outlines
            .iter()
            .map(|outline| VectorPath {
                subpaths: outline
                    .rings()
                    .filter_map(|ring| SubPath::polygon(&ring.coords()))
                    .collect(),
            })
            .collect();
        Self {
            width: width as Real,
            height: height as Real,
            paths,
        }
    }

    pub fn subpath_count(&self) -> usize {
        self.paths.iter().map(|p| p.subpaths.len()).sum()
    }

    pub fn to_svg(&self) -> Document {
        let mut document = Document::new()
            .set("width", format_number(self.width))
            .set("height", format_number(self.height))
            .set(
                "viewBox",
                format!("0 0 {} {}", format_number(self.width), format_number(self.height)),
            );

        for path in &self.paths {
            let mut data = Data::new();
            for subpath in &path.subpaths {
                data = data.move_to(pair(subpath.start));
                for segment in &subpath.segments {
                    data = match *segment {
                        Segment::Line { to, .. } => data.line_to(pair(to)),
                        Segment::Quadratic { ctrl, to, .. } => data.quadratic_curve_to((
                            ctrl.x as f32,
                            ctrl.y as f32,
                            to.x as f32,
                            to.y as f32,
                        )),
                        Segment::Cubic {
                            ctrl1, ctrl2, to, ..
                        } => data.cubic_curve_to((
                            ctrl1.x as f32,
                            ctrl1.y as f32,
                            ctrl2.x as f32,
                            ctrl2.y as f32,
                            to.x as f32,
                            to.y as f32,
                        )),
                        Segment::Arc(ref arc) => data.elliptical_arc_to((
                            arc.radii.x as f32,
                            arc.radii.y as f32,
                            arc.rotation.to_degrees() as f32,
                            if arc.large_arc { 1.0_f32 } else { 0.0 },
                            if arc.sweep { 1.0_f32 } else { 0.0 },
                            arc.to.x as f32,
                            arc.to.y as f32,
                        )),
                    };
                }
                if subpath.closed {
                    data = data.close();
                }
            }
            document = document.add(
                Path::new()
                    .set("fill", "black")
                    .set("fill-rule", "evenodd")
                    .set("d", data),
            );
        }
        document
    }

    pub fn to_svg_string(&self) -> String {
        self.to_svg().to_string()
    }

    /// Write the document and confirm the file landed on disk.
    pub fn write_svg(&self, path: &FsPath) -> Result<(), IoError> {
        svg::save(path, &self.to_svg())?;
        verify_written(path)?;
        info!(
            "SVG with {} sub-paths saved to: {}",
            self.subpath_count(),
            path.display()
        );
        Ok(())
    }

    pub fn read_svg(path: &FsPath) -> Result<Self, IoError> {
        info!("Parsing SVG file: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::parse_svg(&content)
    }

    pub fn parse_svg(content: &str) -> Result<Self, IoError> {
        let mut width = None;
        let mut height = None;
        let mut view_box = None;
        let mut paths = Vec::new();

        for event in svg::read(content)? {
            if let Event::Tag(name, kind, attributes) = event {
                if kind == Type::End {
                    continue;
                }
                if name == tag::SVG {
                    width = attributes.get("width").and_then(|v| parse_length(v));
                    height = attributes.get("height").and_then(|v| parse_length(v));
                    view_box = attributes.get("viewBox").and_then(|v| parse_view_box(v));
                } else if name == tag::Path {
                    if let Some(d) = attributes.get("d") {
                        let data = Data::parse(d)?;
                        paths.push(path_from_data(&data)?);
                    }
                }
            }
        }

        let (width, height) = match (width, height, view_box) {
            (Some(w), Some(h), _) => (w, h),
            (_, _, Some((w, h))) => (w, h),
            _ => {
                return Err(IoError::MalformedInput(
                    "svg element has neither width/height nor viewBox".to_string(),
                ));
            },
        };
        info!("Number of paths found in SVG: {}", paths.len());
        Ok(Self {
            width,
            height,
            paths,
        })
    }
}

#[inline]
fn pair(c: Coord<Real>) -> (f32, f32) {
    (c.x as f32, c.y as f32)
}

fn format_number(v: Real) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Leading number of a length attribute such as `"120"`, `"120px"` or `"12.5"`.
fn parse_length(value: &str) -> Option<Real> {
    let trimmed = value.trim();
    let end = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || c == 'e'))
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

fn parse_view_box(value: &str) -> Option<(Real, Real)> {
    let numbers: Vec<Real> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match numbers.as_slice() {
        [_, _, w, h] => Some((*w, *h)),
        _ => None,
    }
}

/// Incremental state while walking the commands of one `d` attribute.
#[derive(Default)]
struct PathWalker {
    subpaths: Vec<SubPath>,
    current: Option<SubPath>,
    cursor: Coord<Real>,
    /// Second control point of the previous cubic, for `S`.
    last_cubic_ctrl: Option<Coord<Real>>,
    /// Control point of the previous quadratic, for `T`.
    last_quad_ctrl: Option<Coord<Real>>,
}

impl PathWalker {
    fn resolve(&self, position: &Position, x: Real, y: Real) -> Coord<Real> {
        match position {
            Position::Absolute => Coord { x, y },
            Position::Relative => Coord {
                x: self.cursor.x + x,
                y: self.cursor.y + y,
            },
        }
    }

    fn move_to(&mut self, to: Coord<Real>) {
        self.finish();
        self.current = Some(SubPath {
            start: to,
            segments: Vec::new(),
            closed: false,
        });
        self.cursor = to;
    }

    fn push(&mut self, segment: Segment) -> Result<(), IoError> {
        let current = self
            .current
            .as_mut()
            .ok_or_else(|| IoError::MalformedPath("drawing command before moveto".to_string()))?;
        current.segments.push(segment);
        self.cursor = segment.end();
        self.last_cubic_ctrl = None;
        self.last_quad_ctrl = None;
        match segment {
            Segment::Cubic { ctrl2, .. } => self.last_cubic_ctrl = Some(ctrl2),
            Segment::Quadratic { ctrl, .. } => self.last_quad_ctrl = Some(ctrl),
            _ => {},
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut subpath) = self.current.take() {
            subpath.closed = true;
            self.cursor = subpath.start;
            self.subpaths.push(subpath);
        }
        self.last_cubic_ctrl = None;
        self.last_quad_ctrl = None;
    }

    fn finish(&mut self) {
        if let Some(subpath) = self.current.take() {
            if !subpath.segments.is_empty() {
                self.subpaths.push(subpath);
            }
        }
    }

    fn reflect(&self, ctrl: Option<Coord<Real>>) -> Coord<Real> {
        ctrl.map_or(self.cursor, |c| Coord {
            x: 2.0 * self.cursor.x - c.x,
            y: 2.0 * self.cursor.y - c.y,
        })
    }
}

fn chunks<'a>(params: &'a [f32], arity: usize, name: &str) -> Result<std::slice::Chunks<'a, f32>, IoError> {
    if params.is_empty() || params.len() % arity != 0 {
        return Err(IoError::MalformedPath(format!(
            "{name} expects a multiple of {arity} numbers, got {}",
            params.len()
        )));
    }
    Ok(params.chunks(arity))
}

fn path_from_data(data: &Data) -> Result<VectorPath, IoError> {
    let mut walker = PathWalker::default();

    for command in data.iter() {
        match command {
            Command::Move(position, params) => {
                for (i, p) in chunks(params, 2, "moveto")?.enumerate() {
                    let to = walker.resolve(position, p[0] as Real, p[1] as Real);
                    if i == 0 {
                        walker.move_to(to);
                    } else {
                        let from = walker.cursor;
                        walker.push(Segment::Line { from, to })?;
                    }
                }
            },
            Command::Line(position, params) => {
                for p in chunks(params, 2, "lineto")? {
                    let from = walker.cursor;
                    let to = walker.resolve(position, p[0] as Real, p[1] as Real);
                    walker.push(Segment::Line { from, to })?;
                }
            },
            Command::HorizontalLine(position, params) => {
                for p in chunks(params, 1, "horizontal lineto")? {
                    let from = walker.cursor;
                    let x = match position {
                        Position::Absolute => p[0] as Real,
                        Position::Relative => from.x + p[0] as Real,
                    };
                    walker.push(Segment::Line {
                        from,
                        to: Coord { x, y: from.y },
                    })?;
                }
            },
            Command::VerticalLine(position, params) => {
                for p in chunks(params, 1, "vertical lineto")? {
                    let from = walker.cursor;
                    let y = match position {
                        Position::Absolute => p[0] as Real,
                        Position::Relative => from.y + p[0] as Real,
                    };
                    walker.push(Segment::Line {
                        from,
                        to: Coord { x: from.x, y },
                    })?;
                }
            },
            Command::QuadraticCurve(position, params) => {
                for p in chunks(params, 4, "quadratic curveto")? {
                    let from = walker.cursor;
                    let ctrl = walker.resolve(position, p[0] as Real, p[1] as Real);
                    let to = walker.resolve(position, p[2] as Real, p[3] as Real);
                    walker.push(Segment::Quadratic { from, ctrl, to })?;
                }
            },
            Command::SmoothQuadraticCurve(position, params) => {
                for p in chunks(params, 2, "smooth quadratic curveto")? {
                    let from = walker.cursor;
                    let ctrl = walker.reflect(walker.last_quad_ctrl);
                    let to = walker.resolve(position, p[0] as Real, p[1] as Real);
                    walker.push(Segment::Quadratic { from, ctrl, to })?;
                }
            },
            Command::CubicCurve(position, params) => {
                for p in chunks(params, 6, "cubic curveto")? {
                    let from = walker.cursor;
                    let ctrl1 = walker.resolve(position, p[0] as Real, p[1] as Real);
                    let ctrl2 = walker.resolve(position, p[2] as Real, p[3] as Real);
                    let to = walker.resolve(position, p[4] as Real, p[5] as Real);
                    walker.push(Segment::Cubic {
                        from,
                        ctrl1,
                        ctrl2,
                        to,
                    })?;
                }
            },
            Command::SmoothCubicCurve(position, params) => {
                for p in chunks(params, 4, "smooth cubic curveto")? {
                    let from = walker.cursor;
                    let ctrl1 = walker.reflect(walker.last_cubic_ctrl);
                    let ctrl2 = walker.resolve(position, p[0] as Real, p[1] as Real);
                    let to = walker.resolve(position, p[2] as Real, p[3] as Real);
                    walker.push(Segment::Cubic {
                        from,
                        ctrl1,
                        ctrl2,
                        to,
                    })?;
                }
            },
            Command::EllipticalArc(position, params) => {
                for p in chunks(params, 7, "elliptical arc")? {
                    let from = walker.cursor;
                    let to = walker.resolve(position, p[5] as Real, p[6] as Real);
                    walker.push(EllipticalArc::from_endpoints(
                        from,
                        to,
                        Coord {
                            x: p[0] as Real,
                            y: p[1] as Real,
                        },
                        p[2] as Real,
                        p[3] != 0.0,
                        p[4] != 0.0,
                    ))?;
                }
            },
            Command::Close => walker.close(),
        }
    }
    walker.finish();

    Ok(VectorPath {
        subpaths: walker.subpaths,
    })
}

/// Turns vector sub-paths into dense point rings by evenly spaced parametric sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSampler {
    samples_per_segment: usize,
}

impl Default for PathSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES)
    }
}

impl PathSampler {
    /// `samples_per_segment` is clamped to `[MIN_SAMPLES, MAX_SAMPLES]`.
    pub fn new(samples_per_segment: usize) -> Self {
        let clamped = samples_per_segment.clamp(MIN_SAMPLES, MAX_SAMPLES);
        if clamped != samples_per_segment {
            warn!("sample density {samples_per_segment} clamped to {clamped}");
        }
        Self {
            samples_per_segment: clamped,
        }
    }

    pub const fn samples_per_segment(&self) -> usize {
        self.samples_per_segment
    }

    /// `n` points at `t = 0, 1/(n-1), …, 1`.
    pub fn sample_segment(&self, segment: &Segment) -> impl Iterator<Item = Coord<Real>> + '_ {
        let last = (self.samples_per_segment - 1) as Real;
        let segment = *segment;
        (0..self.samples_per_segment).map(move |i| segment.point_at(i as Real / last))
    }

    /// Every segment sampled in order, including the implicit closing line.
    pub fn sample_subpath(&self, subpath: &SubPath) -> Vec<Coord<Real>> {
        let mut points = Vec::with_capacity((subpath.segments.len() + 1) * self.samples_per_segment);
        for segment in subpath.segments.iter().chain(subpath.closing_segment().iter()) {
            points.extend(self.sample_segment(segment));
        }
        points
    }

    pub fn sample_path(&self, path: &VectorPath) -> RingSet {
        RingSet {
            rings: path
                .subpaths
                .iter()
                .map(|sp| self.sample_subpath(sp))
                .filter(|ring| !ring.is_empty())
                .collect(),
        }
    }

    pub fn sample_document(&self, document: &VectorDocument) -> Vec<RingSet> {
        let sets: Vec<RingSet> = document.paths.iter().map(|p| self.sample_path(p)).collect();
        debug!(
            "sampled {} paths at {} points per segment into {} points",
            sets.len(),
            self.samples_per_segment,
            sets.iter().map(RingSet::point_count).sum::<usize>()
        );
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: Real, y: Real) -> Coord<Real> {
        Coord { x, y }
    }

    #[test]
    fn relative_and_shorthand_commands() {
        let doc = VectorDocument::parse_svg(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><path d="m 1 1 h 4 v 3 H 1 z"/></svg>"#,
        )
        .unwrap();
        assert_eq!(doc.width, 20.0);
        assert_eq!(doc.height, 10.0);
        let sub = &doc.paths[0].subpaths[0];
        assert!(sub.closed);
        assert_eq!(
            sub.vertices(),
            vec![c(1.0, 1.0), c(5.0, 1.0), c(5.0, 4.0), c(1.0, 4.0)]
        );
        assert_eq!(sub.closing_segment().map(|s| s.end()), Some(c(1.0, 1.0)));
    }

    #[test]
    fn closing_svg_tag_keeps_document_size() {
        let doc = VectorDocument::parse_svg(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><path d="M 0 0 L 4 0 L 4 4 Z"/></svg>"#,
        )
        .unwrap();
        assert_eq!((doc.width, doc.height), (20.0, 10.0));
        assert_eq!(doc.paths.len(), 1);

        let text = doc.to_svg_string();
        assert!(text.trim_end().ends_with("</svg>"));
        let again = VectorDocument::parse_svg(&text).unwrap();
        assert_eq!((again.width, again.height), (20.0, 10.0));
    }

    #[test]
    fn half_circle_arc_passes_through_apex() {
        let seg = EllipticalArc::from_endpoints(c(0.0, 0.0), c(2.0, 0.0), c(1.0, 1.0), 0.0, false, true);
        let Segment::Arc(arc) = seg else {
            panic!("expected an arc");
        };
        assert!((arc.center.x - 1.0).abs() < 1e-9);
        assert!(arc.center.y.abs() < 1e-9);
        let mid = arc.point_at(0.5);
        assert!((mid.x - 1.0).abs() < 1e-9);
        assert!((mid.y.abs() - 1.0).abs() < 1e-9);
        assert_eq!(arc.point_at(1.0), c(2.0, 0.0));
    }

    #[test]
    fn degenerate_arc_is_a_line() {
        let seg = EllipticalArc::from_endpoints(c(0.0, 0.0), c(3.0, 0.0), c(0.0, 2.0), 0.0, false, false);
        assert_eq!(seg, Segment::Line { from: c(0.0, 0.0), to: c(3.0, 0.0) });
    }

    #[test]
    fn sampler_includes_both_ends() {
        let sampler = PathSampler::new(5);
        let seg = Segment::Line { from: c(0.0, 0.0), to: c(4.0, 0.0) };
        let pts: Vec<_> = sampler.sample_segment(&seg).collect();
        assert_eq!(pts, vec![c(0.0, 0.0), c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0), c(4.0, 0.0)]);
    }

    #[test]
    fn sample_density_is_clamped() {
        assert_eq!(PathSampler::new(0).samples_per_segment(), MIN_SAMPLES);
        assert_eq!(PathSampler::new(1 << 30).samples_per_segment(), MAX_SAMPLES);
    }

    #[test]
    fn cubic_end_points_are_exact() {
        let seg = Segment::Cubic {
            from: c(0.0, 0.0),
            ctrl1: c(0.0, 1.0),
            ctrl2: c(1.0, 1.0),
            to: c(1.0, 0.0),
        };
        assert_eq!(seg.point_at(0.0), c(0.0, 0.0));
        assert_eq!(seg.point_at(1.0), c(1.0, 0.0));
        assert!((seg.point_at(0.5).y - 0.75).abs() < 1e-12);
    }
}
