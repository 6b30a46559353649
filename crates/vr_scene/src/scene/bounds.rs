//! Axis-aligned bounding boxes in an object's local space

use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box used for gaze hit tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }
    
    /// Create an AABB centered at a point with given half-extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }
    
    /// Unit cube centered at the origin, the bounds of a default quad or box mesh
    pub fn unit() -> Self {
        Self::from_center_extents(Vec3::zeros(), Vec3::new(0.5, 0.5, 0.5))
    }
    
    /// Center of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
    
    /// Half-size of the box
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
    
    /// Whether the point lies inside or on the box
    pub fn contains_point(&self, point: Vec3) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }
    
    /// Whether two boxes overlap
    pub fn intersects(&self, other: &AABB) -> bool {
        (0..3).all(|axis| self.min[axis] <= other.max[axis] && self.max[axis] >= other.min[axis])
    }
    
    /// Slab test against a ray
    ///
    /// Returns the ray parameter of the entry point (0 when the origin is
    /// inside the box), or `None` when the ray misses or the box lies behind it.
    /// `direction` need not be normalized.
    pub fn intersect_ray(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        
        for axis in 0..3 {
            if direction[axis] == 0.0 {
                // Parallel to this slab: must already be between its planes
                if origin[axis] < self.min[axis] || origin[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / direction[axis];
            let t1 = (self.min[axis] - origin[axis]) * inv;
            let t2 = (self.max[axis] - origin[axis]) * inv;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }
        
        if t_exit >= t_enter && t_exit >= 0.0 {
            Some(t_enter.max(0.0))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_center_and_extents() {
        let aabb = AABB::new(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(3.0, 4.0, 6.0));
        assert_relative_eq!(aabb.center(), Vec3::new(1.0, 2.0, 4.0));
        assert_relative_eq!(aabb.extents(), Vec3::new(2.0, 2.0, 2.0));
        assert!(aabb.contains_point(Vec3::new(3.0, 4.0, 6.0)));
        assert!(!aabb.contains_point(Vec3::new(3.1, 4.0, 6.0)));
    }

    #[test]
    fn test_ray_hits_box_in_front() {
        let aabb = AABB::unit();
        let t = aabb.intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(t.unwrap(), 4.5);
    }

    #[test]
    fn test_ray_misses_box_behind_or_beside() {
        let aabb = AABB::unit();
        assert!(aabb.intersect_ray(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0)).is_none());
        assert!(aabb.intersect_ray(Vec3::new(2.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0)).is_none());
    }

    #[test]
    fn test_ray_from_inside_starts_at_zero() {
        let aabb = AABB::unit();
        let t = aabb.intersect_ray(Vec3::zeros(), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(t, Some(0.0));
    }

    #[test]
    fn test_overlap() {
        let a = AABB::unit();
        let b = AABB::from_center_extents(Vec3::new(0.9, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.5));
        let c = AABB::from_center_extents(Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.5, 0.5, 0.5));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }
}
