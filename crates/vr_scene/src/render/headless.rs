//! Backend that records frames instead of drawing them
//!
//! Used by tests and by the viewer when no GPU is available.

use std::collections::HashMap;
use crate::foundation::collections::NodeId;
use super::{FrameView, GpuTextureId, GraphicsBackend, RenderError, SamplingParameters};

#[derive(Debug, Clone)]
struct HeadlessTexture {
    sampling: SamplingParameters,
    width: u32,
    height: u32,
    uploads: u32,
}

/// Summary of the most recently drawn frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Session frame counter
    pub frame_index: u64,
    /// Objects in the flattened list
    pub object_count: usize,
    /// Objects that would be drawn
    pub shown_count: usize,
    /// Shown objects whose texture had a live GPU handle
    pub textured_count: usize,
    /// Main camera used for the frame
    pub main_camera: Option<NodeId>,
    /// Whether the frame requested a recull
    pub recull: bool,
}

/// In-memory [`GraphicsBackend`]
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u64,
    live: HashMap<GpuTextureId, HeadlessTexture>,
    destroyed: Vec<GpuTextureId>,
    invalid_releases: usize,
    frames_drawn: u64,
    last_frame: Option<FrameRecord>,
    fail_uploads: bool,
    fail_creates: bool,
}

impl HeadlessBackend {
    /// Create a backend with no textures
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Make subsequent uploads fail, to exercise error paths
    pub fn set_fail_uploads(&mut self, fail: bool) {
        self.fail_uploads = fail;
    }
    
    /// Make subsequent texture creations fail
    pub fn set_fail_creates(&mut self, fail: bool) {
        self.fail_creates = fail;
    }
    
    /// Number of GPU textures currently alive
    pub fn live_texture_count(&self) -> usize {
        self.live.len()
    }
    
    /// GPU textures released so far, in release order
    pub fn destroyed_textures(&self) -> &[GpuTextureId] {
        &self.destroyed
    }
    
    /// Releases of ids that were never created or already released
    pub fn invalid_release_count(&self) -> usize {
        self.invalid_releases
    }
    
    /// Upload count of a live texture
    pub fn texture_upload_count(&self, id: GpuTextureId) -> Option<u32> {
        self.live.get(&id).map(|t| t.uploads)
    }
    
    /// Last uploaded size of a live texture
    pub fn texture_size(&self, id: GpuTextureId) -> Option<(u32, u32)> {
        self.live.get(&id).map(|t| (t.width, t.height))
    }
    
    /// Sampling parameters a live texture was created with
    pub fn texture_sampling(&self, id: GpuTextureId) -> Option<SamplingParameters> {
        self.live.get(&id).map(|t| t.sampling)
    }
    
    /// Total frames drawn
    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }
    
    /// Summary of the last frame
    pub fn last_frame(&self) -> Option<&FrameRecord> {
        self.last_frame.as_ref()
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn create_texture(&mut self, sampling: &SamplingParameters) -> Result<GpuTextureId, RenderError> {
        if self.fail_creates {
            return Err(RenderError::Backend("texture creation disabled".to_string()));
        }
        self.next_id += 1;
        let id = GpuTextureId(self.next_id);
        self.live.insert(id, HeadlessTexture {
            sampling: *sampling,
            width: 0,
            height: 0,
            uploads: 0,
        });
        Ok(id)
    }
    
    fn upload_texture(
        &mut self,
        id: GpuTextureId,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<(), RenderError> {
        if self.fail_uploads {
            return Err(RenderError::Backend("uploads disabled".to_string()));
        }
        let texture = self.live.get_mut(&id).ok_or(RenderError::UnknownTexture(id))?;
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::Backend(format!(
                "expected {} bytes for {}x{}, got {}",
                expected, width, height, pixels.len()
            )));
        }
        texture.width = width;
        texture.height = height;
        texture.uploads += 1;
        Ok(())
    }
    
    fn destroy_texture(&mut self, id: GpuTextureId) {
        if self.live.remove(&id).is_some() {
            self.destroyed.push(id);
        } else {
            log::error!("Release of unknown GPU texture {:?}", id);
            self.invalid_releases += 1;
        }
    }
    
    fn draw_frame(&mut self, frame: &FrameView<'_>) -> Result<(), RenderError> {
        let mut shown_count = 0;
        let mut textured_count = 0;
        for id in frame.shown_objects() {
            shown_count += 1;
            let texture = frame
                .scene
                .object(id)
                .ok()
                .and_then(|object| object.render_data())
                .and_then(|data| data.texture);
            let resident = texture
                .and_then(|handle| frame.textures.get(handle).ok())
                .and_then(|t| t.gpu_handle())
                .is_some_and(|gpu| self.live.contains_key(&gpu));
            if resident {
                textured_count += 1;
            }
        }
        
        self.frames_drawn += 1;
        self.last_frame = Some(FrameRecord {
            frame_index: frame.frame_index,
            object_count: frame.objects.len(),
            shown_count,
            textured_count,
            main_camera: frame.main_camera,
            recull: frame.recull,
        });
        log::trace!(
            "Headless frame {}: {} objects, {} shown",
            frame.frame_index,
            frame.objects.len(),
            shown_count
        );
        Ok(())
    }
}
