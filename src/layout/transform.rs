//! Placement transform from an element's local frame to drawing coordinates.
//!
//! Every element kind describes its footprint (terminals and strokes) in an
//! unrotated local frame where the element axis runs along +x. Mirroring for
//! `reverse` and `flip` is applied to the footprint first, since what it means
//! depends on the kind. The transform here then does the rest:
//!
//! 1. **Rotate** about the local origin by `theta`
//! 2. **Translate** so the local origin lands on `origin`
//!
//! ## Rotation Convention
//!
//! Angles are in degrees, counter-clockwise positive, with y pointing up:
//! - 0° = element axis points right
//! - 90° = points up
//! - 180° = points left
//! - 270° = points down
//!
//! Quarter turns are computed exactly (see [`Point::rotated`]), so layouts
//! made only of up/down/left/right placements carry no rounding error.

use crate::layout::types::{BoundingBox, Point};

/// Rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Where the local origin lands in drawing coordinates
    pub origin: Point,
    /// Rotation angle in degrees (counter-clockwise positive)
    pub theta: f64,
}

impl Transform {
    pub fn new(origin: Point, theta: f64) -> Self {
        Self { origin, theta }
    }

    pub fn identity() -> Self {
        Self::new(Point::origin(), 0.0)
    }

    /// Build the transform that maps local point `local` onto `target`.
    ///
    /// Used to pin an element's anchor terminal to its start point.
    pub fn pinning(local: Point, target: Point, theta: f64) -> Self {
        Self::new(target - local.rotated(theta), theta)
    }

    /// Check if this is effectively a no-op
    pub fn is_identity(&self) -> bool {
        self.theta.abs() < f64::EPSILON && self.origin == Point::origin()
    }

    /// Map a local point into drawing coordinates.
    pub fn transform_point(&self, point: Point) -> Point {
        self.origin + point.rotated(self.theta)
    }

    /// Map a local direction (no translation).
    pub fn transform_vector(&self, vector: Point) -> Point {
        vector.rotated(self.theta)
    }

    /// Transform a bounding box using the "loose bounds" algorithm.
    ///
    /// Rather than computing mathematically tight bounds for the rotated
    /// symbol, we rotate the 4 corners of the local box and take the box of
    /// those rotated corners. For quarter turns this is exact.
    pub fn transform_bounds(&self, bounds: &BoundingBox) -> BoundingBox {
        let corners = bounds.corners().map(|c| self.transform_point(c));
        BoundingBox::from_points(corners).unwrap_or(*bounds)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-10;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_identity_transform() {
        let t = Transform::identity();
        assert!(t.is_identity());
        let p = Point::new(3.0, 4.0);
        assert_eq!(t.transform_point(p), p);
    }

    #[test]
    fn test_rotate_then_translate() {
        let t = Transform::new(Point::new(10.0, 0.0), 90.0);
        assert_eq!(t.transform_point(Point::new(2.0, 0.0)), Point::new(10.0, 2.0));
        assert_eq!(t.transform_vector(Point::new(2.0, 0.0)), Point::new(0.0, 2.0));
    }

    #[test]
    fn test_pinning_places_local_point_on_target() {
        let local = Point::new(1.4, -1.0);
        let target = Point::new(5.0, 5.0);
        for theta in [0.0, 90.0, 180.0, 270.0] {
            let t = Transform::pinning(local, target, theta);
            let p = t.transform_point(local);
            assert!(approx_eq(p.x, target.x) && approx_eq(p.y, target.y));
        }
    }

    #[test]
    fn test_arbitrary_angle() {
        let t = Transform::new(Point::origin(), 45.0);
        let p = t.transform_point(Point::new(1.0, 0.0));
        let expected = std::f64::consts::FRAC_1_SQRT_2;
        assert!(approx_eq(p.x, expected));
        assert!(approx_eq(p.y, expected));
    }

    #[test]
    fn test_transform_bounds_quarter_turn() {
        let t = Transform::new(Point::new(1.0, 1.0), 90.0);
        let bb = BoundingBox::new(0.0, -0.25, 2.0, 0.5);
        let rotated = t.transform_bounds(&bb);
        assert_eq!(rotated, BoundingBox::new(0.75, 1.0, 0.5, 2.0));
    }

    #[test]
    fn test_transform_bounds_loose_at_45() {
        let t = Transform::new(Point::origin(), 45.0);
        let bb = BoundingBox::new(-1.0, -1.0, 2.0, 2.0);
        let rotated = t.transform_bounds(&bb);
        let diagonal = 2.0_f64.sqrt();
        assert!(approx_eq(rotated.width, 2.0 * diagonal));
        assert!(approx_eq(rotated.height, 2.0 * diagonal));
    }
}
