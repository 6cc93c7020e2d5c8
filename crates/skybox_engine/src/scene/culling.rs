//! Bounding volumes and view-frustum tests

use nalgebra::Point3;

use crate::foundation::math::{Mat4, Vec3, Vec4};

/// Axis-Aligned Bounding Box for spatial queries
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

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Bounds of this box after an affine transform
    ///
    /// All eight corners are transformed, so the result stays conservative
    /// under rotation.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let mut min = Vec3::repeat(f32::INFINITY);
        let mut max = Vec3::repeat(f32::NEG_INFINITY);

        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = matrix.transform_point(&Point3::from(corner)).coords;
            min = min.inf(&p);
            max = max.sup(&p);
        }

        Self { min, max }
    }
}

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self {
            normal: normal.normalize(),
            distance,
        }
    }

    /// Plane `ax + by + cz + d = 0`, normalized so distances are in world units
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.xyz();
        let length = normal.norm();
        if length <= f32::EPSILON {
            return Self {
                normal: Vec3::zeros(),
                distance: coefficients.w,
            };
        }
        Self {
            normal: normal / length,
            distance: coefficients.w / length,
        }
    }

    /// Calculate signed distance from plane to point (positive = inside)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// Frustum for visibility culling
#[derive(Debug, Clone)]
pub struct Frustum {
    /// Six planes: left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for clip space with depth in [0, 1]: the
    /// near plane is the third row alone rather than `w + z`.
    pub fn from_matrix(vp_matrix: &Mat4) -> Self {
        let row = |i: usize| -> Vec4 { vp_matrix.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Check if an AABB is inside or intersects the frustum
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        for plane in &self.planes {
            // Corner furthest along the plane normal
            let mut p = aabb.min;
            if plane.normal.x >= 0.0 {
                p.x = aabb.max.x;
            }
            if plane.normal.y >= 0.0 {
                p.y = aabb.max.y;
            }
            if plane.normal.z >= 0.0 {
                p.z = aabb.max.z;
            }

            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Camera;
    use approx::assert_relative_eq;

    fn forward_camera() -> Camera {
        let mut camera = Camera::perspective(Vec3::zeros(), 60.0, 1.0, 0.1, 100.0);
        camera.look_at(Vec3::new(0.0, 0.0, -1.0), Vec3::y());
        camera
    }

    #[test]
    fn test_aabb_basics() {
        let aabb = AABB::from_center_extents(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(aabb.center(), Vec3::new(1.0, 0.0, 0.0));
        assert!(aabb.contains_point(Vec3::new(2.0, 1.0, -1.0)));
        assert!(!aabb.contains_point(Vec3::new(2.1, 0.0, 0.0)));

        let other = AABB::new(Vec3::new(1.5, 0.5, 0.5), Vec3::new(3.0, 3.0, 3.0));
        assert!(aabb.intersects(&other));
        assert!(!aabb.intersects(&AABB::new(Vec3::repeat(5.0), Vec3::repeat(6.0))));
    }

    #[test]
    fn test_aabb_transformed_by_translation() {
        let aabb = AABB::new(Vec3::repeat(-1.0), Vec3::repeat(1.0));
        let moved = aabb.transformed(&Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0)));
        assert_relative_eq!(moved.min, Vec3::new(0.0, 1.0, 2.0));
        assert_relative_eq!(moved.max, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_plane_from_coefficients_normalizes() {
        let plane = Plane::from_coefficients(Vec4::new(0.0, 2.0, 0.0, 4.0));
        assert_relative_eq!(plane.normal, Vec3::y());
        assert_relative_eq!(plane.distance, 2.0);
        assert_relative_eq!(plane.distance_to_point(Vec3::zeros()), 2.0);
    }

    #[test]
    fn test_frustum_keeps_box_in_front() {
        let frustum = Frustum::from_matrix(&forward_camera().view_projection_matrix());
        let ahead = AABB::from_center_extents(Vec3::new(0.0, 0.0, -10.0), Vec3::repeat(1.0));
        assert!(frustum.intersects_aabb(&ahead));
    }

    #[test]
    fn test_frustum_rejects_box_behind_and_beyond_far() {
        let frustum = Frustum::from_matrix(&forward_camera().view_projection_matrix());
        let behind = AABB::from_center_extents(Vec3::new(0.0, 0.0, 10.0), Vec3::repeat(1.0));
        let beyond = AABB::from_center_extents(Vec3::new(0.0, 0.0, -200.0), Vec3::repeat(1.0));
        let aside = AABB::from_center_extents(Vec3::new(50.0, 0.0, -5.0), Vec3::repeat(1.0));
        assert!(!frustum.intersects_aabb(&behind));
        assert!(!frustum.intersects_aabb(&beyond));
        assert!(!frustum.intersects_aabb(&aside));
    }

    #[test]
    fn test_frustum_keeps_box_around_camera() {
        let frustum = Frustum::from_matrix(&forward_camera().view_projection_matrix());
        let around = AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(1.0));
        assert!(frustum.intersects_aabb(&around));
    }
}
