//! Planar coordinate type.
//!
//! Junction and lane-endpoint positions come from the simulation's 2-D world
//! space, so distances are plain Euclidean rather than great-circle.  `f32`
//! matches the precision of the source data.

/// A position in world space.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to `other`.
    #[inline]
    pub fn distance_to(self, other: Vec2) -> f32 {
        self.distance_squared_to(other).sqrt()
    }

    /// Squared distance, for comparisons.
    #[inline]
    pub fn distance_squared_to(self, other: Vec2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}
