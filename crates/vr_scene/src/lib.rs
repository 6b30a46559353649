//! # VR Scene
//!
//! Scene graph and texture lifecycle core for a virtual-reality engine.
//!
//! ## Features
//!
//! - **Scene graph**: arena-owned hierarchy with generation-checked handles
//!   and deterministic breadth-first flattening for the renderer
//! - **Textures**: RGBA8 resources with atomic in-place updates and lazily
//!   created GPU handles that are released exactly once
//! - **Image decoding**: PNG to RGBA8 with explicit pixel-format reporting
//! - **Sessions**: explicit per-context state, a render-thread task queue and
//!   a pluggable head-mounted display runtime
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vr_scene::prelude::*;
//!
//! fn main() -> Result<(), SessionError> {
//!     vr_scene::foundation::logging::init();
//!
//!     let mut session = Session::new(SessionConfig::default());
//!     let panel = session.scene_mut().add_object(
//!         SceneObject::new("panel")
//!             .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, -2.0)))
//!             .with_bounds(AABB::unit()),
//!     )?;
//!
//!     let mut backend = HeadlessBackend::new();
//!     let stats = session.render_frame(&mut backend)?;
//!     println!("{} objects, looking at panel: {}", stats.objects, session.is_looking_at(panel)?);
//!
//!     session.shutdown(&mut backend);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod assets;
pub mod render;
pub mod scene;
pub mod session;

pub use session::{
    FrameStats, HmdRuntime, LoadReport, NullHmdRuntime, RenderTask, RenderTaskSender, Session,
    SessionError,
};

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        FrameStats, HmdRuntime, LoadReport, NullHmdRuntime, RenderTaskSender, Session, SessionError,
        foundation::{
            collections::{NodeId, TextureHandle},
            math::{Mat4, Quat, Transform, Vec3},
        },
        config::{Config, SessionConfig},
        assets::{AssetSource, FileAssetSource, ImageDecoder, MemoryAssetSource, PixelFormat},
        render::{
            FrameView, GraphicsBackend, HeadlessBackend, SamplingParameters, TextureError,
            TextureResource, TextureTable,
        },
        scene::{
            BoundsDescription, Camera, DirtyFlags, LookEvent, LookStateDetector, ObjectDescription,
            RenderData, Scene, SceneDescription, SceneError, SceneObject, AABB,
        },
    };
}
