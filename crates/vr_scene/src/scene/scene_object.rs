//! Scene object: one node of the hierarchy
//!
//! Objects are built detached with the `with_*` methods and handed to a
//! [`Scene`](super::Scene), which owns them and maintains parent/child links.

use crate::foundation::collections::{NodeId, TextureHandle};
use crate::foundation::math::Transform;
use super::{AABB, Camera};

/// Renderable payload attached to a scene object
#[derive(Debug, Clone, PartialEq)]
pub struct RenderData {
    /// Name of the mesh the backend should draw
    pub mesh: Option<String>,
    /// Texture to sample, if any
    ///
    /// A handle that no longer resolves renders as untextured.
    pub texture: Option<TextureHandle>,
    /// Opacity in [0, 1]
    pub opacity: f32,
}

impl Default for RenderData {
    fn default() -> Self {
        Self {
            mesh: None,
            texture: None,
            opacity: 1.0,
        }
    }
}

impl RenderData {
    /// Render data for a named mesh
    pub fn mesh(name: impl Into<String>) -> Self {
        Self {
            mesh: Some(name.into()),
            ..Self::default()
        }
    }
    
    /// Attach a texture
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }
    
    /// Set opacity, clamped to [0, 1]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

/// A node in the scene hierarchy
#[derive(Debug, Clone)]
pub struct SceneObject {
    name: String,
    transform: Transform,
    visible: bool,
    render_data: Option<RenderData>,
    bounds: Option<AABB>,
    camera: Option<Camera>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneObject {
    /// Create a visible, detached object with an identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            visible: true,
            render_data: None,
            bounds: None,
            camera: None,
            parent: None,
            children: Vec::new(),
        }
    }
    
    /// Set the local transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
    
    /// Attach render data
    pub fn with_render_data(mut self, render_data: RenderData) -> Self {
        self.render_data = Some(render_data);
        self
    }
    
    /// Set local-space bounds
    pub fn with_bounds(mut self, bounds: AABB) -> Self {
        self.bounds = Some(bounds);
        self
    }
    
    /// Attach a camera component
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }
    
    /// Set the visibility flag
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
    
    /// Object name
    pub fn name(&self) -> &str {
        &self.name
    }
    
    /// Local transform relative to the parent
    pub fn transform(&self) -> &Transform {
        &self.transform
    }
    
    /// Own visibility flag; ancestors are not considered
    pub fn is_visible(&self) -> bool {
        self.visible
    }
    
    /// Attached render data
    pub fn render_data(&self) -> Option<&RenderData> {
        self.render_data.as_ref()
    }
    
    /// Local-space bounds
    pub fn bounds(&self) -> Option<&AABB> {
        self.bounds.as_ref()
    }
    
    /// Camera component
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }
    
    /// Current parent
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
    
    /// Direct children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
    
    pub(crate) fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }
    
    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
    
    pub(crate) fn set_render_data(&mut self, render_data: Option<RenderData>) {
        self.render_data = render_data;
    }
    
    pub(crate) fn set_bounds(&mut self, bounds: Option<AABB>) {
        self.bounds = bounds;
    }
    
    pub(crate) fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
    }
}
