//! Planar geometry primitives for region layout
//!
//! Areas are axis-aligned boxes positioned in region space; every layout
//! decision (abutment, overlap, connector matching) is made in the XY plane.
//! Z is carried through untouched so stacked content keeps its elevation.

use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Tolerance for exact-ish float comparisons.
pub const EPSILON: f32 = 0.000_001;

/// Returns true when `a` is within `epsilon` of `b`.
pub fn epsilon_test(a: f32, b: f32, epsilon: f32) -> bool {
    a >= b - epsilon && a <= b + epsilon
}

/// A point or offset in region space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3 { x, y, z }
    }

    /// Squared length of the full vector.
    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Planar distance to another point, ignoring Z.
    pub fn distance_2d(self, other: Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Each component rounded to the nearest integer.
    pub fn rounded(self) -> Vec3 {
        Vec3::new(self.x.round(), self.y.round(), self.z.round())
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// One side of an axis-aligned box in the XY plane.
///
/// North is +Y, East is +X.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub fn all() -> &'static [Side] {
        &[Side::North, Side::East, Side::South, Side::West]
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Side::North => "North",
            Side::East => "East",
            Side::South => "South",
            Side::West => "West",
        }
    }

    /// True for East/West sides, whose edges run along the Y axis.
    pub fn is_vertical_edge(&self) -> bool {
        matches!(self, Side::East | Side::West)
    }
}

/// Result of a containment query between boxes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Containment {
    Disjoint,
    Intersects,
    Contains,
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Aabb {
        Aabb { min, max }
    }

    /// The inverted box: min at +inf, max at -inf. Unioning points or boxes
    /// into it yields their tight bound.
    pub fn inverted_limit() -> Aabb {
        Aabb {
            min: Vec3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vec3::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Extent along X.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Extent along Y.
    pub fn length(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Vec3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Vec3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    pub fn translate(&self, offset: Vec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Grows (or with a negative amount, shrinks) the box on all sides.
    pub fn expand(&self, amount: f32) -> Aabb {
        let v = Vec3::new(amount, amount, amount);
        Aabb {
            min: self.min - v,
            max: self.max + v,
        }
    }

    /// XY containment of another box.
    pub fn contains_xy(&self, bounds: &Aabb) -> Containment {
        if bounds.min.x > self.max.x
            || bounds.max.x < self.min.x
            || bounds.min.y > self.max.y
            || bounds.max.y < self.min.y
        {
            Containment::Disjoint
        } else if bounds.min.x >= self.min.x
            && bounds.max.x <= self.max.x
            && bounds.min.y >= self.min.y
            && bounds.max.y <= self.max.y
        {
            Containment::Contains
        } else {
            Containment::Intersects
        }
    }

    /// XY containment against this box expanded by `epsilon`. A negative
    /// epsilon shrinks the box, tolerating that much overlap.
    pub fn contains_xy_eps(&self, bounds: &Aabb, epsilon: f32) -> Containment {
        self.expand(epsilon).contains_xy(bounds)
    }

    /// Planar distance from `point` to this box; zero inside.
    pub fn distance_to_point_2d(&self, point: Vec3) -> f32 {
        let mut distance_sq = 0.0;
        for (value, min, max) in [
            (point.x, self.min.x, self.max.x),
            (point.y, self.min.y, self.max.y),
        ] {
            if value < min {
                distance_sq += (min - value) * (min - value);
            } else if value > max {
                distance_sq += (value - max) * (value - max);
            }
        }
        if distance_sq > EPSILON {
            distance_sq.sqrt()
        } else {
            0.0
        }
    }

    /// Min and max rounded to the nearest integer.
    pub fn rounded(&self) -> Aabb {
        Aabb {
            min: self.min.rounded(),
            max: self.max.rounded(),
        }
    }
}

impl std::fmt::Display for Aabb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// A line segment, axis-aligned in all layout uses.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

impl Segment {
    pub fn new(start: Vec3, end: Vec3) -> Segment {
        Segment { start, end }
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).length_sq().sqrt()
    }

    /// Planar distance from `point` to the segment.
    pub fn distance_to_point_2d(&self, point: Vec3) -> f32 {
        let a = Vec3::new(self.start.x, self.start.y, 0.0);
        let b = Vec3::new(self.end.x, self.end.y, 0.0);
        let c = Vec3::new(point.x, point.y, 0.0);

        let ba = b - a;
        let ca = c - a;
        let dot_c_ba = ca.x * ba.x + ca.y * ba.y;
        if dot_c_ba <= 0.0 {
            return ca.length_sq().sqrt();
        }
        let dot_ba = ba.length_sq();
        if dot_c_ba >= dot_ba {
            let cb = c - b;
            return cb.length_sq().sqrt();
        }
        (ca.length_sq() - dot_c_ba * (dot_c_ba / dot_ba)).max(0.0).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_xy() {
        let outer = Aabb::new(Vec3::ZERO, Vec3::new(100.0, 100.0, 0.0));
        let inner = Aabb::new(Vec3::new(10.0, 10.0, 0.0), Vec3::new(90.0, 90.0, 0.0));
        let crossing = Aabb::new(Vec3::new(50.0, 50.0, 0.0), Vec3::new(150.0, 150.0, 0.0));
        let apart = Aabb::new(Vec3::new(200.0, 0.0, 0.0), Vec3::new(300.0, 100.0, 0.0));

        assert_eq!(outer.contains_xy(&inner), Containment::Contains);
        assert_eq!(outer.contains_xy(&crossing), Containment::Intersects);
        assert_eq!(outer.contains_xy(&apart), Containment::Disjoint);
    }

    #[test]
    fn test_contains_xy_negative_epsilon_tolerates_overlap() {
        let a = Aabb::new(Vec3::ZERO, Vec3::new(512.0, 512.0, 0.0));
        // Overlaps by 100 units along X, inside the 128-unit tolerance.
        let b = Aabb::new(Vec3::new(412.0, 0.0, 0.0), Vec3::new(924.0, 512.0, 0.0));
        assert_eq!(a.contains_xy_eps(&b, -128.0), Containment::Disjoint);
        // Overlapping by 200 units is a real collision.
        let c = Aabb::new(Vec3::new(312.0, 0.0, 0.0), Vec3::new(824.0, 512.0, 0.0));
        assert_ne!(a.contains_xy_eps(&c, -128.0), Containment::Disjoint);
    }

    #[test]
    fn test_distance_to_point_2d() {
        let b = Aabb::new(Vec3::ZERO, Vec3::new(100.0, 100.0, 0.0));
        assert_eq!(b.distance_to_point_2d(Vec3::new(50.0, 50.0, 0.0)), 0.0);
        assert_eq!(b.distance_to_point_2d(Vec3::new(130.0, 50.0, 0.0)), 30.0);
        let corner = b.distance_to_point_2d(Vec3::new(103.0, 104.0, 0.0));
        assert!((corner - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_segment_distance() {
        let seg = Segment::new(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0));
        assert!(seg.distance_to_point_2d(Vec3::new(50.0, 0.0, 0.0)) < EPSILON);
        assert!((seg.distance_to_point_2d(Vec3::new(50.0, 7.0, 0.0)) - 7.0).abs() < 0.001);
        assert!((seg.distance_to_point_2d(Vec3::new(-3.0, 0.0, 0.0)) - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_union_and_rounding() {
        let mut bound = Aabb::inverted_limit();
        bound = bound.union(&Aabb::new(Vec3::ZERO, Vec3::new(10.0, 10.0, 0.0)));
        bound = bound.union(&Aabb::new(
            Vec3::new(-5.0, 2.0, 0.0),
            Vec3::new(3.0, 20.0, 0.0),
        ));
        assert_eq!(bound.min, Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(bound.max, Vec3::new(10.0, 20.0, 0.0));

        let fuzzy = Aabb::new(
            Vec3::new(0.4, -0.4, 0.0),
            Vec3::new(99.6, 100.2, 0.0),
        );
        let rounded = fuzzy.rounded();
        assert_eq!(rounded.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(rounded.max, Vec3::new(100.0, 100.0, 0.0));
    }

    #[test]
    fn test_side_opposites() {
        for side in Side::all() {
            assert_eq!(side.opposite().opposite(), *side);
        }
        assert!(Side::East.is_vertical_edge());
        assert!(!Side::North.is_vertical_edge());
    }
}
