//! # Bounds
//!
//! Axis-aligned bounding box of a position buffer.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner
    pub min: DVec3,
    /// Maximum corner
    pub max: DVec3,
}

impl Bounds {
    /// Creates a bounding box from two corners.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Computes the bounds of a set of points, or `None` when there are none.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mesh_builder::Bounds;
    /// use glam::DVec3;
    ///
    /// let b = Bounds::from_points(&[DVec3::ZERO, DVec3::new(1.0, -2.0, 3.0)]).unwrap();
    /// assert_eq!(b.min, DVec3::new(0.0, -2.0, 0.0));
    /// assert_eq!(b.max, DVec3::new(1.0, 0.0, 3.0));
    /// ```
    pub fn from_points(points: &[DVec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for p in rest {
            min = min.min(*p);
            max = max.max(*p);
        }
        Some(Self { min, max })
    }

    /// Edge lengths along each axis.
    #[inline]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Grows the box to include `point`.
    pub fn expand(&mut self, point: DVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Returns true if `point` lies inside or on the box.
    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_points_have_no_bounds() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_single_point_bounds() {
        let p = DVec3::new(1.0, 2.0, 3.0);
        let b = Bounds::from_points(&[p]).unwrap();
        assert_eq!(b.min, p);
        assert_eq!(b.max, p);
        assert_eq!(b.size(), DVec3::ZERO);
    }

    #[test]
    fn test_expand_and_contains() {
        let mut b = Bounds::new(DVec3::ZERO, DVec3::ONE);
        assert!(b.contains(DVec3::splat(0.5)));
        assert!(!b.contains(DVec3::splat(2.0)));
        b.expand(DVec3::splat(2.0));
        assert!(b.contains(DVec3::splat(2.0)));
        assert_eq!(b.center(), DVec3::ONE);
    }
}
