//! Declarative scene descriptions
//!
//! A [`SceneDescription`] is a serde tree of objects that can be stored as
//! TOML or RON through [`Config`]. Building it produces a fresh [`Scene`];
//! texture names are resolved by the caller so that loading and sharing stay
//! with whoever owns the texture table.

use serde::{Deserialize, Serialize};
use crate::config::Config;
use crate::foundation::collections::{NodeId, TextureHandle};
use crate::foundation::math::{Transform, Vec3};
use super::{AABB, Camera, RenderData, Scene, SceneError, SceneObject};

/// Local-space bounds as stored in a description
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsDescription {
    /// Minimum corner
    pub min: [f32; 3],
    /// Maximum corner
    pub max: [f32; 3],
}

impl From<BoundsDescription> for AABB {
    fn from(bounds: BoundsDescription) -> Self {
        AABB::new(Vec3::from(bounds.min), Vec3::from(bounds.max))
    }
}

/// One object and its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectDescription {
    /// Object name
    pub name: String,
    /// Local position
    pub position: [f32; 3],
    /// Local rotation as Euler angles in degrees (X, Y, Z)
    pub rotation: [f32; 3],
    /// Local scale
    pub scale: [f32; 3],
    /// Own visibility flag
    pub visible: bool,
    /// Mesh name for the renderer
    pub mesh: Option<String>,
    /// Texture asset name
    pub texture: Option<String>,
    /// Opacity in [0, 1]
    pub opacity: f32,
    /// Local-space bounds for gaze tests
    pub bounds: Option<BoundsDescription>,
    /// Camera component
    pub camera: Option<Camera>,
    /// Whether this object becomes the scene's main camera
    pub main_camera: bool,
    /// Children, attached in order
    pub children: Vec<ObjectDescription>,
}

impl Default for ObjectDescription {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
            visible: true,
            mesh: None,
            texture: None,
            opacity: 1.0,
            bounds: None,
            camera: None,
            main_camera: false,
            children: Vec::new(),
        }
    }
}

impl ObjectDescription {
    /// Named object with default placement
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Local transform described by position, rotation and scale
    pub fn transform(&self) -> Transform {
        Transform::from_euler_degrees(
            Vec3::from(self.position),
            Vec3::from(self.rotation),
            Vec3::from(self.scale),
        )
    }

    /// Detached scene object for this description, without its children
    ///
    /// Render data is attached when a mesh or a texture is named.
    pub fn to_scene_object(&self, texture: Option<TextureHandle>) -> SceneObject {
        let mut object = SceneObject::new(self.name.clone())
            .with_transform(self.transform())
            .with_visible(self.visible);

        if self.mesh.is_some() || self.texture.is_some() {
            object = object.with_render_data(RenderData {
                mesh: self.mesh.clone(),
                texture,
                opacity: self.opacity.clamp(0.0, 1.0),
            });
        }
        if let Some(bounds) = self.bounds {
            object = object.with_bounds(bounds.into());
        }
        if let Some(camera) = self.camera {
            object = object.with_camera(camera);
        }
        object
    }

    /// Number of objects in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }

    fn instantiate<F>(
        &self,
        scene: &mut Scene,
        parent: NodeId,
        resolve_texture: &mut F,
        main_camera: &mut Option<NodeId>,
    ) -> Result<NodeId, SceneError>
    where
        F: FnMut(&str) -> Option<TextureHandle>,
    {
        let texture = self.texture.as_deref().and_then(&mut *resolve_texture);
        let id = scene.insert_object(self.to_scene_object(texture));
        scene.add_child(parent, id)?;

        if self.main_camera {
            match main_camera {
                None => *main_camera = Some(id),
                Some(_) => log::warn!(
                    "Object '{}' is marked as main camera but one is already set; ignoring",
                    self.name
                ),
            }
        }

        for child in &self.children {
            child.instantiate(scene, id, resolve_texture, main_camera)?;
        }
        Ok(id)
    }
}

/// A complete scene
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    /// Top-level objects
    pub objects: Vec<ObjectDescription>,
    /// Initial occlusion culling toggle
    pub occlusion_enabled: bool,
}

impl Config for SceneDescription {}

impl SceneDescription {
    /// Total number of described objects
    pub fn object_count(&self) -> usize {
        self.objects.iter().map(ObjectDescription::subtree_len).sum()
    }

    /// Build a new scene, attaching objects in description order
    ///
    /// `resolve_texture` maps a texture asset name to a handle; returning
    /// `None` leaves the object untextured.
    pub fn build_scene<F>(&self, mut resolve_texture: F) -> Result<Scene, SceneError>
    where
        F: FnMut(&str) -> Option<TextureHandle>,
    {
        let mut scene = Scene::new();
        let root = scene.root();
        let mut main_camera = None;

        for object in &self.objects {
            object.instantiate(&mut scene, root, &mut resolve_texture, &mut main_camera)?;
        }
        if main_camera.is_some() {
            scene.set_main_camera(main_camera)?;
        }
        scene.set_occlusion_enabled(self.occlusion_enabled);

        log::debug!("Built scene with {} objects", scene.object_count());
        Ok(scene)
    }
}
