//! Camera component
//!
//! A camera is attached to a scene object; its position and orientation come
//! from that object's world transform. The component only carries projection
//! parameters.

use serde::{Deserialize, Serialize};
use crate::foundation::math::{perspective, utils, Mat4};

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Distance to near clipping plane
    pub near: f32,
    /// Distance to far clipping plane
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_degrees: 90.0,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    /// Create a perspective camera
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self { fov_degrees, aspect, near, far }
    }
    
    /// Set the aspect ratio
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }
    
    /// Set the clipping planes
    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near = near;
        self.far = far;
        self
    }
    
    /// Projection matrix, right-handed with depth in [0, 1]
    pub fn projection_matrix(&self) -> Mat4 {
        perspective(utils::deg_to_rad(self.fov_degrees), self.aspect, self.near, self.far)
    }
}
