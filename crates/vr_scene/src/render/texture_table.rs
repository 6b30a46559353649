//! Arena of texture resources addressed by generation-checked handles

use crate::foundation::collections::{SlotMap, TextureHandle};
use super::{GraphicsBackend, TextureError, TextureResource};

/// Outcome of a [`TextureTable::sync`] pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// GPU textures created in this pass
    pub created: usize,
    /// Pixel uploads performed in this pass
    pub uploaded: usize,
    /// Creations or uploads the backend refused
    pub failed: usize,
}

/// Owns every texture of a session
///
/// A handle whose texture has been destroyed fails with
/// [`TextureError::InvalidHandle`], even after the slot is reused.
#[derive(Debug, Default)]
pub struct TextureTable {
    textures: SlotMap<TextureHandle, TextureResource>,
}

impl TextureTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            textures: SlotMap::with_key(),
        }
    }
    
    /// Take ownership of a texture and return its handle
    pub fn insert(&mut self, texture: TextureResource) -> TextureHandle {
        self.textures.insert(texture)
    }
    
    /// Whether the handle refers to a live texture
    pub fn contains(&self, handle: TextureHandle) -> bool {
        self.textures.contains_key(handle)
    }
    
    /// Look up a texture
    pub fn get(&self, handle: TextureHandle) -> Result<&TextureResource, TextureError> {
        self.textures.get(handle).ok_or(TextureError::InvalidHandle(handle))
    }
    
    // Never handed out: overwriting a resource in place would drop its GPU id.
    fn get_mut(&mut self, handle: TextureHandle) -> Result<&mut TextureResource, TextureError> {
        self.textures.get_mut(handle).ok_or(TextureError::InvalidHandle(handle))
    }
    
    /// Replace a texture's dimensions and pixels (see [`TextureResource::update`])
    pub fn update(
        &mut self,
        handle: TextureHandle,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    ) -> Result<(), TextureError> {
        self.get_mut(handle)?.update(width, height, pixels)
    }
    
    /// Swap in a new resource under an existing handle
    ///
    /// The old resource's GPU texture is released; the new one is created on
    /// the next [`sync`](Self::sync).
    pub fn replace(
        &mut self,
        handle: TextureHandle,
        texture: TextureResource,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<(), TextureError> {
        let mut old = std::mem::replace(self.get_mut(handle)?, texture);
        if let Some(id) = old.take_gpu_handle() {
            log::debug!("Releasing GPU texture {:?} of replaced {:?}", id, handle);
            backend.destroy_texture(id);
        }
        Ok(())
    }
    
    /// Remove a texture and release its GPU handle, if it has one
    pub fn destroy(
        &mut self,
        handle: TextureHandle,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<(), TextureError> {
        let mut texture = self
            .textures
            .remove(handle)
            .ok_or(TextureError::InvalidHandle(handle))?;
        if let Some(id) = texture.take_gpu_handle() {
            log::debug!("Releasing GPU texture {:?}", id);
            backend.destroy_texture(id);
        }
        Ok(())
    }
    
    /// Create missing GPU textures and upload changed pixel data
    ///
    /// Backend failures are logged and counted; the affected texture is
    /// retried on the next pass and simply renders as missing meanwhile.
    pub fn sync(&mut self, backend: &mut dyn GraphicsBackend) -> SyncReport {
        let mut report = SyncReport::default();
        
        for (handle, texture) in &mut self.textures {
            let id = match texture.gpu_handle() {
                Some(id) => id,
                None => match backend.create_texture(texture.sampling()) {
                    Ok(id) => {
                        texture.set_gpu_handle(id);
                        report.created += 1;
                        id
                    }
                    Err(e) => {
                        log::warn!("Failed to create GPU texture for {:?}: {}", handle, e);
                        report.failed += 1;
                        continue;
                    }
                },
            };
            
            if !texture.needs_upload() {
                continue;
            }
            match backend.upload_texture(id, texture.width(), texture.height(), texture.pixels()) {
                Ok(()) => {
                    texture.mark_uploaded();
                    report.uploaded += 1;
                    log::debug!(
                        "Uploaded {}x{} pixels to {:?}",
                        texture.width(),
                        texture.height(),
                        id
                    );
                }
                Err(e) => {
                    log::warn!("Failed to upload texture {:?}: {}", handle, e);
                    report.failed += 1;
                }
            }
        }
        
        report
    }
    
    /// Release every GPU handle and drop every texture
    pub fn release_all(&mut self, backend: &mut dyn GraphicsBackend) {
        let mut released = 0usize;
        for texture in self.textures.values_mut() {
            if let Some(id) = texture.take_gpu_handle() {
                backend.destroy_texture(id);
                released += 1;
            }
        }
        log::info!(
            "Released {} GPU textures, dropping {} texture resources",
            released,
            self.textures.len()
        );
        self.textures.clear();
    }
    
    /// Number of live textures
    pub fn len(&self) -> usize {
        self.textures.len()
    }
    
    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
    
    /// Number of textures currently holding a GPU handle
    pub fn gpu_resident_count(&self) -> usize {
        self.textures.values().filter(|t| t.gpu_handle().is_some()).count()
    }
    
    /// Iterate over all textures
    pub fn iter(&self) -> impl Iterator<Item = (TextureHandle, &TextureResource)> {
        self.textures.iter()
    }
}

impl Drop for TextureTable {
    fn drop(&mut self) {
        let leaked = self.gpu_resident_count();
        if leaked > 0 {
            log::warn!(
                "TextureTable dropped with {} GPU textures still allocated; call release_all first",
                leaked
            );
        }
    }
}
