//! Union of all polygons found in one image.

use crate::errors::PipelineError;
use crate::float_types::{Real, tolerance};
use crate::sketch::Sketch;
use geo::orient::Direction;
use geo::{Area, BooleanOps, MultiPolygon, Orient};
use log::info;

/// Union `shapes` into one silhouette with pairwise-disjoint interiors.
///
/// Operands are combined in a balanced tree, so the result does not depend
/// on the input order beyond floating-point noise.
pub fn merge_polygons(shapes: Vec<MultiPolygon<Real>>) -> Result<Sketch, PipelineError> {
    let count = shapes.len();
    let mut level: Vec<MultiPolygon<Real>> = shapes.into_iter().filter(|s| !s.0.is_empty()).collect();
    if level.is_empty() {
        return Err(PipelineError::GeometryEmpty);
    }
    let operands = level.len();

    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut iter = level.into_iter();
        while let Some(a) = iter.next() {
            next.push(match iter.next() {
                Some(b) => a.union(&b),
                None => a,
            });
        }
        level = next;
    }

    let mut merged = level.pop().unwrap_or_else(|| MultiPolygon::new(vec![]));
    if operands == 1 {
        // a single operand still goes through the overlay to resolve shared edges
        merged = merged.union(&MultiPolygon::new(vec![]));
    }
    let eps = tolerance();
    merged.0.retain(|p| p.unsigned_area() > eps);
    let merged = merged.orient(Direction::Default);

    let sketch = Sketch::from_multi_polygon(merged).ok_or(PipelineError::GeometryEmpty)?;
    info!(
        "Merged {count} shapes into {} polygon(s), total area {:.2}",
        sketch.len(),
        sketch.area()
    );
    Ok(sketch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Polygon, polygon};

    fn square(x0: Real, y0: Real, size: Real) -> MultiPolygon<Real> {
        let p: Polygon<Real> = polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ];
        MultiPolygon::new(vec![p])
    }

    #[test]
    fn overlapping_squares_become_one() {
        let merged = merge_polygons(vec![square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)]).unwrap();
        assert_eq!(merged.len(), 1);
        assert!((merged.area() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_squares_stay_apart() {
        let merged = merge_polygons(vec![
            square(0.0, 0.0, 1.0),
            square(5.0, 0.0, 1.0),
            square(10.0, 0.0, 1.0),
        ])
        .unwrap();
        assert_eq!(merged.len(), 3);
        assert!((merged.area() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn lone_shape_among_empties_is_still_resolved() {
        let mut pair = square(0.0, 0.0, 1.0);
        pair.0.extend(square(1.0, 0.0, 1.0).0);
        let merged = merge_polygons(vec![MultiPolygon::new(vec![]), pair]).unwrap();
        assert_eq!(merged.len(), 1);
        assert!((merged.area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn nothing_to_merge_is_empty() {
        assert!(matches!(merge_polygons(vec![]), Err(PipelineError::GeometryEmpty)));
        assert!(matches!(
            merge_polygons(vec![MultiPolygon::new(vec![])]),
            Err(PipelineError::GeometryEmpty)
        ));
    }
}
