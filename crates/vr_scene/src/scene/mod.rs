//! Scene graph
//!
//! ```text
//! SceneDescription ──build──▶ Scene (arena of SceneObject)
//!                              │
//!                              └─ whole_scene_objects() ──▶ renderer
//! ```

pub mod bounds;
pub mod camera;
pub mod scene_object;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod look_detector;
pub mod description;

pub use bounds::AABB;
pub use camera::Camera;
pub use scene_object::{RenderData, SceneObject};
pub use scene::{DirtyFlags, Scene, SceneError};
pub use look_detector::{LookEvent, LookStateDetector};
pub use description::{BoundsDescription, ObjectDescription, SceneDescription};
