//! Handle types for arena-allocated storage
//!
//! Scene objects and textures live in slot maps. The keys carry a generation,
//! so a handle to a released slot never resolves to whatever reuses the slot.
//! Node ids additionally carry the tag of the scene that issued them, so an id
//! never resolves in a different scene.

use std::sync::atomic::{AtomicU64, Ordering};

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Slot key inside a single scene's arena
    pub(crate) struct NodeKey;

    /// Handle to a texture stored in a [`TextureTable`](crate::render::TextureTable)
    pub struct TextureHandle;
}

/// Identifies the scene that issued a [`NodeId`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneTag(u64);

static NEXT_SCENE_TAG: AtomicU64 = AtomicU64::new(1);

impl SceneTag {
    /// A tag no other scene in this process has been given
    pub(crate) fn next() -> Self {
        Self(NEXT_SCENE_TAG.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a scene object stored in a [`Scene`](crate::scene::Scene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    scene: SceneTag,
    key: NodeKey,
}

impl NodeId {
    pub(crate) fn new(scene: SceneTag, key: NodeKey) -> Self {
        Self { scene, key }
    }

    /// Tag of the scene that issued this id
    pub fn scene(&self) -> SceneTag {
        self.scene
    }

    pub(crate) fn key(&self) -> NodeKey {
        self.key
    }
}
