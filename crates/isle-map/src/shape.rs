//! Collider shapes for terrain patches and structures.
//!
//! Shapes are the only geometry the map knows about. They are static: a
//! shape never moves after the map is built.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Bounds;

/// Collider shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Circle defined by center and radius
    Circle {
        /// Circle center
        center: Vec2,
        /// Circle radius
        radius: f32,
    },
    /// Axis-aligned rectangle
    Rect {
        /// Rectangle extent
        bounds: Bounds,
    },
}

impl Shape {
    /// Create a circle shape.
    #[must_use]
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self::Circle { center, radius }
    }

    /// Create a rectangle from min/max corners.
    #[must_use]
    pub fn rect_min_max(min: Vec2, max: Vec2) -> Self {
        Self::Rect {
            bounds: Bounds::from_min_max(min, max),
        }
    }

    /// Create a rectangle centered on a point.
    #[must_use]
    pub fn rect_centered(center: Vec2, width: f32, height: f32) -> Self {
        let half = Vec2::new(width, height) * 0.5;
        Self::rect_min_max(center - half, center + half)
    }

    /// Get the bounding box of this shape.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match self {
            Shape::Circle { center, radius } => {
                Bounds::from_min_max(*center - Vec2::splat(*radius), *center + Vec2::splat(*radius))
            }
            Shape::Rect { bounds } => *bounds,
        }
    }

    /// Geometric center of the shape.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        match self {
            Shape::Circle { center, .. } => *center,
            Shape::Rect { bounds } => bounds.center(),
        }
    }

    /// Check if a point is inside this shape.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        match self {
            Shape::Circle { center, radius } => center.distance_squared(point) <= radius * radius,
            Shape::Rect { bounds } => bounds.contains(point),
        }
    }

    /// Check if a probe circle overlaps this shape.
    #[must_use]
    pub fn intersects_circle(&self, point: Vec2, probe_radius: f32) -> bool {
        match self {
            Shape::Circle { center, radius } => {
                let reach = radius + probe_radius;
                center.distance_squared(point) <= reach * reach
            }
            Shape::Rect { bounds } => bounds.intersects_circle(point, probe_radius),
        }
    }

    /// Returns `false` for degenerate shapes (zero/negative size, NaN).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Shape::Circle { center, radius } => center.is_finite() && *radius > 0.0,
            Shape::Rect { bounds } => {
                bounds.min.is_finite()
                    && bounds.max.is_finite()
                    && bounds.max.x > bounds.min.x
                    && bounds.max.y > bounds.min.y
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_contains() {
        let shape = Shape::circle(Vec2::new(1.0, 1.0), 0.5);
        assert!(shape.contains(Vec2::new(1.2, 1.2)));
        assert!(!shape.contains(Vec2::new(2.0, 1.0)));
    }

    #[test]
    fn circle_probe_reaches_past_edge() {
        let shape = Shape::circle(Vec2::ZERO, 1.0);
        assert!(!shape.contains(Vec2::new(1.05, 0.0)));
        assert!(shape.intersects_circle(Vec2::new(1.05, 0.0), 0.1));
    }

    #[test]
    fn rect_centered_bounds() {
        let shape = Shape::rect_centered(Vec2::new(2.0, 0.0), 2.0, 1.0);
        let bounds = shape.bounds();
        assert_eq!(bounds.min, Vec2::new(1.0, -0.5));
        assert_eq!(bounds.max, Vec2::new(3.0, 0.5));
        assert_eq!(shape.center(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn degenerate_shapes_are_invalid() {
        assert!(!Shape::circle(Vec2::ZERO, 0.0).is_valid());
        assert!(!Shape::rect_min_max(Vec2::ONE, Vec2::ZERO).is_valid());
        assert!(Shape::rect_min_max(Vec2::ZERO, Vec2::ONE).is_valid());
    }
}
