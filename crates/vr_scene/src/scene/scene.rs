//! Scene: arena-owned object hierarchy plus per-frame render state
//!
//! All objects live in a single generation-checked arena owned by the
//! [`Scene`]. Ids are tagged with the issuing scene and are rejected by any
//! other scene. Parent links are plain ids; children are ordered id lists. A
//! hidden root node anchors the top-level objects.
//!
//! The scene is single-threaded. Other threads reach it through the session's
//! render task queue.

use bitflags::bitflags;
use thiserror::Error;
use crate::foundation::collections::{NodeId, NodeKey, SceneTag, SlotMap};
use crate::foundation::math::{Mat4, Point3, Transform, Vec3};
use super::{AABB, Camera, RenderData, SceneObject};

bitflags! {
    /// What changed since the renderer last cleared the dirty state
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u32 {
        /// Objects were attached, detached or destroyed
        const HIERARCHY = 1 << 0;
        /// A local transform changed
        const TRANSFORM = 1 << 1;
        /// A visibility flag changed
        const VISIBILITY = 1 << 2;
        /// The main camera or a camera component changed
        const CAMERA = 1 << 3;
        /// Render data or bounds changed
        const RENDER_DATA = 1 << 4;
        /// Frustum or occlusion culling was switched on or off
        const CULLING = 1 << 5;
    }
}

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// The mutation would break the tree structure
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// The id does not refer to a live object
    #[error("Invalid scene object handle: {0:?}")]
    InvalidHandle(NodeId),
}

/// Root container of a scene object hierarchy
#[derive(Debug)]
pub struct Scene {
    tag: SceneTag,
    objects: SlotMap<NodeKey, SceneObject>,
    root: NodeId,
    main_camera: Option<NodeId>,
    dirty: DirtyFlags,
    dirty_count: u64,
    frustum_active: bool,
    occlusion_enabled: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene
    ///
    /// A new scene starts fully dirty so the first frame derives culling state.
    pub fn new() -> Self {
        let tag = SceneTag::next();
        let mut objects = SlotMap::with_key();
        let root = NodeId::new(tag, objects.insert(SceneObject::new("root")));
        Self {
            tag,
            objects,
            root,
            main_camera: None,
            dirty: DirtyFlags::all(),
            dirty_count: 0,
            frustum_active: true,
            occlusion_enabled: false,
        }
    }

    /// Root node; its children are the scene's top-level objects
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Tag carried by every id this scene issues
    pub fn tag(&self) -> SceneTag {
        self.tag
    }

    /// Number of live objects, excluding the root
    pub fn object_count(&self) -> usize {
        self.objects.len() - 1
    }

    /// Whether the id refers to a live object
    pub fn contains(&self, id: NodeId) -> bool {
        id.scene() == self.tag && self.objects.contains_key(id.key())
    }

    /// Look up an object
    pub fn object(&self, id: NodeId) -> Result<&SceneObject, SceneError> {
        if id.scene() != self.tag {
            return Err(SceneError::InvalidHandle(id));
        }
        self.objects.get(id.key()).ok_or(SceneError::InvalidHandle(id))
    }

    fn object_mut(&mut self, id: NodeId) -> Result<&mut SceneObject, SceneError> {
        if id.scene() != self.tag {
            return Err(SceneError::InvalidHandle(id));
        }
        self.objects.get_mut(id.key()).ok_or(SceneError::InvalidHandle(id))
    }

    /// Create a detached, empty object
    pub fn create_object(&mut self, name: impl Into<String>) -> NodeId {
        self.insert_object(SceneObject::new(name))
    }

    /// Take ownership of a detached object
    pub fn insert_object(&mut self, mut object: SceneObject) -> NodeId {
        object.parent = None;
        object.children.clear();
        let id = NodeId::new(self.tag, self.objects.insert(object));
        log::trace!("Created scene object {:?}", id);
        id
    }

    /// Insert an object and attach it to the root
    pub fn add_object(&mut self, object: SceneObject) -> Result<NodeId, SceneError> {
        let id = self.insert_object(object);
        self.add_child(self.root, id)?;
        Ok(id)
    }

    /// Append `child` to `parent`'s children
    ///
    /// The child must be detached. Re-parenting is an explicit
    /// [`detach`](Self::detach) followed by `add_child`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.object(parent)?;
        let current_parent = self.object(child)?.parent;

        if child == self.root {
            return Err(SceneError::InvalidHierarchy(
                "the scene root cannot be attached as a child".to_string(),
            ));
        }
        if child == parent {
            return Err(SceneError::InvalidHierarchy(format!(
                "{:?} cannot be its own child",
                child
            )));
        }
        if self.is_ancestor(child, parent)? {
            return Err(SceneError::InvalidHierarchy(format!(
                "{:?} is an ancestor of {:?}; attaching would create a cycle",
                child, parent
            )));
        }
        if let Some(existing) = current_parent {
            return Err(SceneError::InvalidHierarchy(format!(
                "{:?} is already a child of {:?}; detach it first",
                child, existing
            )));
        }

        self.object_mut(parent)?.children.push(child);
        self.object_mut(child)?.parent = Some(parent);
        self.mark_dirty(DirtyFlags::HIERARCHY);
        log::debug!("Attached {:?} to {:?}", child, parent);
        Ok(())
    }

    /// Remove `child` from `parent`'s children
    ///
    /// Returns `Ok(false)` without changing anything when `child` is not a
    /// child of `parent`. A removed child stays alive, detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, SceneError> {
        self.object(child)?;
        let siblings = &mut self.object_mut(parent)?.children;
        let Some(index) = siblings.iter().position(|&id| id == child) else {
            return Ok(false);
        };
        siblings.remove(index);
        self.object_mut(child)?.parent = None;
        self.mark_dirty(DirtyFlags::HIERARCHY);
        log::debug!("Detached {:?} from {:?}", child, parent);
        Ok(true)
    }

    /// Detach a node from its current parent, if any
    pub fn detach(&mut self, node: NodeId) -> Result<bool, SceneError> {
        match self.object(node)?.parent {
            Some(parent) => self.remove_child(parent, node),
            None => Ok(false),
        }
    }

    /// Destroy a node and all of its descendants
    ///
    /// Returns the number of objects released.
    pub fn destroy_object(&mut self, node: NodeId) -> Result<usize, SceneError> {
        self.object(node)?;
        if node == self.root {
            return Err(SceneError::InvalidHierarchy(
                "the scene root cannot be destroyed".to_string(),
            ));
        }

        self.detach(node)?;
        let mut doomed = vec![node];
        self.append_descendants(&mut doomed, 0);
        for &id in &doomed {
            self.objects.remove(id.key());
        }
        if self.main_camera.is_some_and(|camera| doomed.contains(&camera)) {
            log::debug!("Main camera destroyed with {:?}", node);
            self.mark_dirty(DirtyFlags::CAMERA);
        }
        self.mark_dirty(DirtyFlags::HIERARCHY);
        log::debug!("Destroyed {:?} and {} descendants", node, doomed.len() - 1);
        Ok(doomed.len())
    }

    /// Direct children in insertion order
    pub fn children(&self, node: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(self.object(node)?.children())
    }

    /// Current parent
    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.object(node)?.parent)
    }

    /// Whether `ancestor` is a strict ancestor of `node`
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> Result<bool, SceneError> {
        self.object(ancestor)?;
        let mut current = self.object(node)?.parent;
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.object(id)?.parent;
        }
        Ok(false)
    }

    /// First object with the given name, in flattening order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.whole_scene_objects()
            .into_iter()
            .find(|&id| self.object(id).is_ok_and(|object| object.name() == name))
    }

    /// Replace a node's local transform
    pub fn set_transform(&mut self, node: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.object_mut(node)?.set_transform(transform);
        self.mark_dirty(DirtyFlags::TRANSFORM);
        Ok(())
    }

    /// Set a node's own visibility flag
    pub fn set_visible(&mut self, node: NodeId, visible: bool) -> Result<(), SceneError> {
        let object = self.object_mut(node)?;
        if object.is_visible() != visible {
            object.set_visible(visible);
            self.mark_dirty(DirtyFlags::VISIBILITY);
        }
        Ok(())
    }

    /// Replace a node's render data
    pub fn set_render_data(&mut self, node: NodeId, render_data: Option<RenderData>) -> Result<(), SceneError> {
        self.object_mut(node)?.set_render_data(render_data);
        self.mark_dirty(DirtyFlags::RENDER_DATA);
        Ok(())
    }

    /// Replace a node's local-space bounds
    pub fn set_bounds(&mut self, node: NodeId, bounds: Option<AABB>) -> Result<(), SceneError> {
        self.object_mut(node)?.set_bounds(bounds);
        self.mark_dirty(DirtyFlags::RENDER_DATA);
        Ok(())
    }

    /// Replace a node's camera component
    pub fn set_camera(&mut self, node: NodeId, camera: Option<Camera>) -> Result<(), SceneError> {
        self.object_mut(node)?.set_camera(camera);
        self.mark_dirty(DirtyFlags::CAMERA);
        Ok(())
    }

    /// Ancestor chain from the root down to `node`, inclusive
    fn lineage(&self, node: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let mut chain = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            chain.push(id);
            current = self.object(id)?.parent;
        }
        chain.reverse();
        Ok(chain)
    }

    /// World transform, composing local transforms from the root down
    pub fn world_transform(&self, node: NodeId) -> Result<Transform, SceneError> {
        let mut world = Transform::identity();
        for id in self.lineage(node)? {
            world = world.combine(self.object(id)?.transform());
        }
        Ok(world)
    }

    /// World matrix, the product of local matrices from the root down
    pub fn world_matrix(&self, node: NodeId) -> Result<Mat4, SceneError> {
        let mut world = Mat4::identity();
        for id in self.lineage(node)? {
            world *= self.object(id)?.transform().to_matrix();
        }
        Ok(world)
    }

    /// Whether the node and every ancestor are visible
    pub fn is_shown(&self, node: NodeId) -> Result<bool, SceneError> {
        let mut current = Some(node);
        while let Some(id) = current {
            let object = self.object(id)?;
            if !object.is_visible() {
                return Ok(false);
            }
            current = object.parent;
        }
        Ok(true)
    }

    /// Append the descendants of `list[start..]` breadth-first
    ///
    /// Each visited node's children are appended to the end of the list, so
    /// the result is level order with siblings in insertion order.
    fn append_descendants(&self, list: &mut Vec<NodeId>, start: usize) {
        let mut cursor = start;
        while cursor < list.len() {
            if let Ok(object) = self.object(list[cursor]) {
                list.extend_from_slice(&object.children);
            }
            cursor += 1;
        }
    }

    /// Every object reachable from the root, excluding the root itself
    ///
    /// Breadth-first by insertion order. The returned list is a snapshot;
    /// later mutations do not affect it.
    pub fn whole_scene_objects(&self) -> Vec<NodeId> {
        let mut list = self.objects[self.root.key()].children.clone();
        self.append_descendants(&mut list, 0);
        list
    }

    /// Like [`whole_scene_objects`](Self::whole_scene_objects), restricted to
    /// objects whose whole ancestor chain is visible
    pub fn shown_scene_objects(&self) -> Vec<NodeId> {
        let root = &self.objects[self.root.key()];
        if !root.is_visible() {
            return Vec::new();
        }

        let visible = |id: &NodeId| self.object(*id).is_ok_and(SceneObject::is_visible);
        let mut list: Vec<NodeId> = root.children.iter().copied().filter(visible).collect();
        let mut cursor = 0;
        while cursor < list.len() {
            if let Ok(object) = self.object(list[cursor]) {
                list.extend(object.children.iter().copied().filter(visible));
            }
            cursor += 1;
        }
        list
    }

    /// Record a change for the renderer
    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
        self.dirty_count += 1;
    }

    /// Whether anything changed since the last [`clear_dirty`](Self::clear_dirty)
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Pending dirty flags
    pub fn dirty_flags(&self) -> DirtyFlags {
        self.dirty
    }

    /// Total number of recorded changes over the scene's lifetime
    pub fn dirty_count(&self) -> u64 {
        self.dirty_count
    }

    /// Acknowledge pending changes; called by the renderer after reculling
    pub fn clear_dirty(&mut self) {
        self.dirty = DirtyFlags::empty();
    }

    /// Enable or disable frustum culling
    pub fn set_frustum_active(&mut self, active: bool) {
        if self.frustum_active != active {
            self.frustum_active = active;
            self.mark_dirty(DirtyFlags::CULLING);
        }
    }

    /// Whether frustum culling is active
    pub fn is_frustum_active(&self) -> bool {
        self.frustum_active
    }

    /// Enable or disable occlusion culling
    pub fn set_occlusion_enabled(&mut self, enabled: bool) {
        if self.occlusion_enabled != enabled {
            self.occlusion_enabled = enabled;
            self.mark_dirty(DirtyFlags::CULLING);
        }
    }

    /// Whether occlusion culling is enabled
    pub fn is_occlusion_enabled(&self) -> bool {
        self.occlusion_enabled
    }

    /// Designate the main camera, or clear it with `None`
    ///
    /// The scene does not own the camera; destroying the node clears the
    /// reference implicitly.
    pub fn set_main_camera(&mut self, camera: Option<NodeId>) -> Result<(), SceneError> {
        if let Some(id) = camera {
            self.object(id)?;
        }
        self.main_camera = camera;
        self.mark_dirty(DirtyFlags::CAMERA);
        Ok(())
    }

    /// Main camera, if set and still alive
    pub fn main_camera(&self) -> Option<NodeId> {
        self.main_camera.filter(|&id| self.contains(id))
    }

    /// View matrix from the main camera, identity without one
    pub fn view_matrix(&self) -> Mat4 {
        self.main_camera()
            .and_then(|camera| self.world_matrix(camera).ok())
            .and_then(|world| world.try_inverse())
            .unwrap_or_else(Mat4::identity)
    }

    /// Projection from the main camera's component, or a default camera
    pub fn projection_matrix(&self) -> Mat4 {
        self.main_camera()
            .and_then(|id| self.object(id).ok())
            .and_then(SceneObject::camera)
            .copied()
            .unwrap_or_default()
            .projection_matrix()
    }

    /// Whether the main camera's forward ray hits the target's bounds
    ///
    /// False when there is no main camera, the target has no bounds, or the
    /// target is not shown.
    pub fn is_looking_at(&self, target: NodeId) -> Result<bool, SceneError> {
        let Some(bounds) = self.object(target)?.bounds().copied() else {
            return Ok(false);
        };
        if !self.is_shown(target)? {
            return Ok(false);
        }
        let Some(camera) = self.main_camera() else {
            return Ok(false);
        };

        let camera_world = self.world_matrix(camera)?;
        let origin = camera_world.transform_point(&Point3::origin());
        let forward = camera_world.transform_vector(&Vec3::new(0.0, 0.0, -1.0));

        let Some(to_local) = self.world_matrix(target)?.try_inverse() else {
            return Ok(false);
        };
        let local_origin = to_local.transform_point(&origin);
        let local_forward = to_local.transform_vector(&forward);

        Ok(bounds.intersect_ray(local_origin.coords, local_forward).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn named(scene: &mut Scene, name: &str) -> NodeId {
        scene.create_object(name)
    }

    #[test]
    fn test_two_level_flattening_order() {
        let mut scene = Scene::new();
        let a = named(&mut scene, "A");
        let b = named(&mut scene, "B");
        let c = named(&mut scene, "C");
        scene.add_child(scene.root(), a).unwrap();
        scene.add_child(scene.root(), b).unwrap();
        scene.add_child(a, c).unwrap();

        assert_eq!(scene.whole_scene_objects(), vec![a, b, c]);
    }

    #[test]
    fn test_deep_tree_is_level_order() {
        // root -> [a, b]; a -> [c, d]; b -> [e]; c -> [f]
        let mut scene = Scene::new();
        let ids: Vec<NodeId> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|name| scene.create_object(*name))
            .collect();
        let (a, b, c, d, e, f) = (ids[0], ids[1], ids[2], ids[3], ids[4], ids[5]);
        let root = scene.root();
        scene.add_child(root, a).unwrap();
        scene.add_child(root, b).unwrap();
        scene.add_child(a, c).unwrap();
        scene.add_child(a, d).unwrap();
        scene.add_child(b, e).unwrap();
        scene.add_child(c, f).unwrap();

        let flat = scene.whole_scene_objects();
        assert_eq!(flat, vec![a, b, c, d, e, f]);
        assert_eq!(flat.len(), scene.object_count());
    }

    #[test]
    fn test_empty_scene_flattens_to_nothing() {
        let scene = Scene::new();
        assert!(scene.whole_scene_objects().is_empty());
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn test_flattening_is_a_snapshot() {
        let mut scene = Scene::new();
        let a = scene.add_object(SceneObject::new("a")).unwrap();
        let snapshot = scene.whole_scene_objects();
        scene.add_object(SceneObject::new("b")).unwrap();
        scene.destroy_object(a).unwrap();

        assert_eq!(snapshot, vec![a]);
    }

    #[test]
    fn test_cycle_is_rejected_and_tree_unchanged() {
        let mut scene = Scene::new();
        let a = scene.add_object(SceneObject::new("a")).unwrap();
        let b = scene.create_object("b");
        scene.add_child(a, b).unwrap();
        let c = scene.create_object("c");
        scene.add_child(b, c).unwrap();
        let before = scene.whole_scene_objects();

        scene.detach(a).unwrap();
        let result = scene.add_child(c, a);
        assert!(matches!(result, Err(SceneError::InvalidHierarchy(_))));
        assert!(scene.children(c).unwrap().is_empty());
        assert_eq!(scene.parent(a).unwrap(), None);

        scene.add_child(scene.root(), a).unwrap();
        assert_eq!(scene.whole_scene_objects(), before);
    }

    #[test]
    fn test_self_and_root_attachment_rejected() {
        let mut scene = Scene::new();
        let a = scene.create_object("a");
        assert!(matches!(scene.add_child(a, a), Err(SceneError::InvalidHierarchy(_))));
        let root = scene.root();
        assert!(matches!(scene.add_child(a, root), Err(SceneError::InvalidHierarchy(_))));
    }

    #[test]
    fn test_attached_child_must_be_detached_first() {
        let mut scene = Scene::new();
        let a = scene.add_object(SceneObject::new("a")).unwrap();
        let b = scene.add_object(SceneObject::new("b")).unwrap();
        let c = scene.create_object("c");
        scene.add_child(a, c).unwrap();

        assert!(matches!(scene.add_child(b, c), Err(SceneError::InvalidHierarchy(_))));
        assert!(matches!(scene.add_child(a, c), Err(SceneError::InvalidHierarchy(_))));
        assert_eq!(scene.children(a).unwrap(), &[c]);

        assert!(scene.detach(c).unwrap());
        scene.add_child(b, c).unwrap();
        assert_eq!(scene.parent(c).unwrap(), Some(b));
        assert!(scene.children(a).unwrap().is_empty());
    }

    #[test]
    fn test_remove_absent_child_is_noop() {
        let mut scene = Scene::new();
        let a = scene.add_object(SceneObject::new("a")).unwrap();
        let b = scene.add_object(SceneObject::new("b")).unwrap();
        let stray = scene.create_object("stray");
        let before = scene.children(scene.root()).unwrap().to_vec();

        assert_eq!(scene.remove_child(scene.root(), stray), Ok(false));
        assert_eq!(scene.remove_child(a, b), Ok(false));
        assert_eq!(scene.children(scene.root()).unwrap(), before.as_slice());
    }

    #[test]
    fn test_remove_preserves_sibling_order() {
        let mut scene = Scene::new();
        let ids: Vec<NodeId> = (0..4)
            .map(|i| scene.add_object(SceneObject::new(format!("n{}", i))).unwrap())
            .collect();

        assert_eq!(scene.remove_child(scene.root(), ids[1]), Ok(true));
        assert_eq!(scene.children(scene.root()).unwrap(), &[ids[0], ids[2], ids[3]]);
        assert!(scene.contains(ids[1]));
        assert_eq!(scene.parent(ids[1]).unwrap(), None);
    }

    #[test]
    fn test_destroy_releases_descendants_and_fails_closed() {
        let mut scene = Scene::new();
        let a = scene.add_object(SceneObject::new("a")).unwrap();
        let b = scene.create_object("b");
        let c = scene.create_object("c");
        scene.add_child(a, b).unwrap();
        scene.add_child(b, c).unwrap();
        let keep = scene.add_object(SceneObject::new("keep")).unwrap();

        assert_eq!(scene.destroy_object(a), Ok(3));
        assert_eq!(scene.whole_scene_objects(), vec![keep]);
        for id in [a, b, c] {
            assert_eq!(scene.object(id).err(), Some(SceneError::InvalidHandle(id)));
        }
        assert!(matches!(scene.set_visible(c, false), Err(SceneError::InvalidHandle(_))));
        assert!(matches!(scene.destroy_object(scene.root()), Err(SceneError::InvalidHierarchy(_))));
    }

    #[test]
    fn test_shown_objects_respect_ancestor_visibility() {
        let mut scene = Scene::new();
        let a = scene.add_object(SceneObject::new("a")).unwrap();
        let b = scene.add_object(SceneObject::new("b")).unwrap();
        let c = scene.create_object("c");
        scene.add_child(a, c).unwrap();

        scene.set_visible(a, false).unwrap();
        assert_eq!(scene.shown_scene_objects(), vec![b]);
        assert!(!scene.is_shown(c).unwrap());
        assert!(scene.object(c).unwrap().is_visible());

        scene.set_visible(a, true).unwrap();
        assert_eq!(scene.shown_scene_objects(), vec![a, b, c]);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut scene = Scene::new();
        assert!(scene.is_dirty());
        scene.clear_dirty();
        assert!(!scene.is_dirty());

        let a = scene.add_object(SceneObject::new("a")).unwrap();
        assert_eq!(scene.dirty_flags(), DirtyFlags::HIERARCHY);
        scene.set_transform(a, Transform::from_position(Vec3::new(1.0, 0.0, 0.0))).unwrap();
        assert!(scene.dirty_flags().contains(DirtyFlags::HIERARCHY | DirtyFlags::TRANSFORM));

        let count = scene.dirty_count();
        scene.clear_dirty();
        assert!(!scene.is_dirty());
        assert_eq!(scene.dirty_count(), count);

        scene.set_occlusion_enabled(true);
        assert_eq!(scene.dirty_flags(), DirtyFlags::CULLING);
        scene.set_frustum_active(false);
        assert!(scene.is_occlusion_enabled());
        assert!(!scene.is_frustum_active());
    }

    #[test]
    fn test_culling_toggles_mark_dirty_only_on_change() {
        let mut scene = Scene::new();
        scene.clear_dirty();

        scene.set_occlusion_enabled(false);
        scene.set_frustum_active(true);
        assert!(!scene.is_dirty());

        scene.set_frustum_active(false);
        assert_eq!(scene.dirty_flags(), DirtyFlags::CULLING);
        scene.clear_dirty();
        scene.set_frustum_active(false);
        assert!(!scene.is_dirty());
    }

    #[test]
    fn test_ids_from_another_scene_are_rejected() {
        let mut first = Scene::new();
        let head = first.add_object(SceneObject::new("head")).unwrap();
        let mut second = Scene::new();
        let unrelated = second.add_object(SceneObject::new("unrelated")).unwrap();

        assert_ne!(first.tag(), second.tag());
        assert!(!second.contains(head));
        assert_eq!(second.object(head).err(), Some(SceneError::InvalidHandle(head)));
        assert!(matches!(second.set_visible(head, false), Err(SceneError::InvalidHandle(_))));
        assert!(matches!(second.add_child(unrelated, head), Err(SceneError::InvalidHandle(_))));
        assert!(matches!(second.set_main_camera(Some(head)), Err(SceneError::InvalidHandle(_))));
        assert!(matches!(second.destroy_object(first.root()), Err(SceneError::InvalidHandle(_))));
        assert_eq!(second.whole_scene_objects(), vec![unrelated]);
        assert_eq!(first.object(head).unwrap().name(), "head");
    }

    #[test]
    fn test_main_camera_is_non_owning() {
        let mut scene = Scene::new();
        let camera = scene
            .add_object(SceneObject::new("camera").with_camera(Camera::default()))
            .unwrap();
        scene.set_main_camera(Some(camera)).unwrap();
        assert_eq!(scene.main_camera(), Some(camera));

        scene.destroy_object(camera).unwrap();
        assert_eq!(scene.main_camera(), None);
        assert_relative_eq!(scene.view_matrix(), Mat4::identity());
        assert!(matches!(
            scene.set_main_camera(Some(camera)),
            Err(SceneError::InvalidHandle(_))
        ));
    }

    #[test]
    fn test_world_transform_composes_parents() {
        let mut scene = Scene::new();
        let parent = scene
            .add_object(SceneObject::new("parent").with_transform(Transform::from_position(Vec3::new(1.0, 2.0, 3.0))))
            .unwrap();
        let child = scene.insert_object(
            SceneObject::new("child").with_transform(Transform::from_position(Vec3::new(0.0, 0.0, -1.0))),
        );
        scene.add_child(parent, child).unwrap();

        let world = scene.world_transform(child).unwrap();
        assert_relative_eq!(world.position, Vec3::new(1.0, 2.0, 2.0));
        let matrix = scene.world_matrix(child).unwrap();
        assert_relative_eq!(matrix, world.to_matrix(), epsilon = 1e-6);
    }

    #[test]
    fn test_gaze_hits_object_in_front() {
        let mut scene = Scene::new();
        let camera = scene.add_object(SceneObject::new("camera")).unwrap();
        let panel = scene
            .add_object(
                SceneObject::new("panel")
                    .with_transform(Transform::from_position(Vec3::new(0.0, 0.0, -5.0)))
                    .with_bounds(AABB::unit()),
            )
            .unwrap();
        assert!(!scene.is_looking_at(panel).unwrap());

        scene.set_main_camera(Some(camera)).unwrap();
        assert!(scene.is_looking_at(panel).unwrap());

        let turned = Transform::from_euler_degrees(Vec3::zeros(), Vec3::new(0.0, 90.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        scene.set_transform(camera, turned).unwrap();
        assert!(!scene.is_looking_at(panel).unwrap());
    }

    #[test]
    fn test_gaze_ignores_hidden_and_unbounded_targets() {
        let mut scene = Scene::new();
        let camera = scene.add_object(SceneObject::new("camera")).unwrap();
        scene.set_main_camera(Some(camera)).unwrap();
        let front = Transform::from_position(Vec3::new(0.0, 0.0, -2.0));
        let bare = scene.add_object(SceneObject::new("bare").with_transform(front.clone())).unwrap();
        let hidden = scene
            .add_object(SceneObject::new("hidden").with_transform(front).with_bounds(AABB::unit()).with_visible(false))
            .unwrap();

        assert!(!scene.is_looking_at(bare).unwrap());
        assert!(!scene.is_looking_at(hidden).unwrap());
    }

    #[test]
    fn test_find_by_name() {
        let mut scene = Scene::new();
        let a = scene.add_object(SceneObject::new("a")).unwrap();
        let b = scene.create_object("target");
        scene.add_child(a, b).unwrap();
        assert_eq!(scene.find_by_name("target"), Some(b));
        assert_eq!(scene.find_by_name("missing"), None);
    }
}
