//! Rendering boundary
//!
//! This crate does not draw anything itself. It owns texture resources and
//! hands a [`FrameView`] to a [`GraphicsBackend`] once per frame. GPU objects
//! are created by the backend on first use and released through it exactly
//! once.

pub mod texture;
pub mod texture_table;
pub mod headless;

pub use texture::{
    TextureResource, TextureError, SamplingParameters,
    FilterMode, WrapMode, MipmapPolicy, RGBA8_STRIDE,
};
pub use texture_table::{TextureTable, SyncReport};
pub use headless::{HeadlessBackend, FrameRecord};
pub use crate::assets::PixelFormat;

use thiserror::Error;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Mat4;
use crate::scene::{DirtyFlags, Scene};

/// Backend-owned GPU texture identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GpuTextureId(pub u64);

/// Errors reported by a graphics backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
    
    /// The backend does not know this GPU texture
    #[error("Unknown GPU texture: {0:?}")]
    UnknownTexture(GpuTextureId),
}

/// Everything a backend may read while drawing one frame
///
/// The view borrows the scene immutably, so the hierarchy cannot change while
/// a backend iterates `objects`.
#[derive(Debug)]
pub struct FrameView<'a> {
    /// Scene being drawn
    pub scene: &'a Scene,
    /// Texture resources referenced by the scene's render data
    pub textures: &'a TextureTable,
    /// Flattened scene objects, breadth-first by insertion order
    pub objects: &'a [NodeId],
    /// Main camera, if one is set and still alive
    pub main_camera: Option<NodeId>,
    /// View matrix derived from the main camera
    pub view: Mat4,
    /// Projection matrix derived from the main camera
    pub projection: Mat4,
    /// What changed since the last drawn frame
    pub dirty: DirtyFlags,
    /// Whether culling results must be recomputed this frame
    pub recull: bool,
    /// Whether frustum culling is active
    pub frustum_active: bool,
    /// Whether occlusion culling is enabled
    pub occlusion_enabled: bool,
    /// Monotonic frame counter of the session
    pub frame_index: u64,
}

impl FrameView<'_> {
    /// Objects whose whole ancestor chain is visible, in flattened order
    pub fn shown_objects(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.objects
            .iter()
            .copied()
            .filter(|&id| self.scene.is_shown(id).unwrap_or(false))
    }
}

/// GPU-facing collaborator that consumes frames
pub trait GraphicsBackend {
    /// Create an empty GPU texture with the given sampling parameters
    fn create_texture(&mut self, sampling: &SamplingParameters) -> Result<GpuTextureId, RenderError>;
    
    /// Upload RGBA8 pixel data, replacing the texture's contents
    fn upload_texture(
        &mut self,
        id: GpuTextureId,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<(), RenderError>;
    
    /// Release a GPU texture
    fn destroy_texture(&mut self, id: GpuTextureId);
    
    /// Draw one frame
    fn draw_frame(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError>;
}
