//! Texture resources
//!
//! A [`TextureResource`] owns its RGBA8 pixel data and the sampling
//! parameters chosen when it was created. It is either fully initialized
//! (non-zero dimensions and pixel data) or bare (no pixels yet). Updates
//! replace dimensions and pixels together or not at all.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::assets::{AssetSource, DecodedImage, ImageDecoder, ImageLoadError, PixelFormat};
use crate::foundation::collections::TextureHandle;
use super::GpuTextureId;

/// Bytes per RGBA8 pixel
pub const RGBA8_STRIDE: usize = 4;

/// Texture filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Nearest texel
    Nearest,
    /// Bilinear interpolation
    #[default]
    Linear,
}

/// Texture coordinate wrapping mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Clamp coordinates to the edge texels
    #[default]
    ClampToEdge,
    /// Tile the texture
    Repeat,
    /// Tile the texture, mirroring every other repetition
    MirroredRepeat,
}

/// Mipmap generation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MipmapPolicy {
    /// Single level, no mipmaps
    #[default]
    None,
    /// Generate the full mip chain on upload
    Generate,
}

/// GPU sampling configuration, fixed for the lifetime of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingParameters {
    /// Minification filter
    pub min_filter: FilterMode,
    /// Magnification filter
    pub mag_filter: FilterMode,
    /// Horizontal wrap mode
    pub wrap_s: WrapMode,
    /// Vertical wrap mode
    pub wrap_t: WrapMode,
    /// Mipmap policy
    pub mipmap: MipmapPolicy,
}

/// Texture creation and update errors
#[derive(Error, Debug)]
pub enum TextureError {
    /// Source pixel format is not RGBA8
    #[error("Unsupported texture format: {0:?} (only RGBA8 is accepted)")]
    UnsupportedFormat(PixelFormat),
    
    /// Image acquisition failed, or no pixel data was supplied
    #[error("Texture decode failed: {0}")]
    DecodeFailure(#[from] ImageLoadError),
    
    /// Width or height is zero, or their product overflows
    #[error("Invalid texture dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },
    
    /// Pixel buffer length does not equal `width * height * 4`
    #[error("Pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch {
        /// Required length in bytes
        expected: usize,
        /// Supplied length in bytes
        actual: usize,
    },
    
    /// Handle does not refer to a live texture
    #[error("Invalid texture handle: {0:?}")]
    InvalidHandle(TextureHandle),
}

/// CPU-side texture with lazily created GPU counterpart
#[derive(Debug)]
pub struct TextureResource {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    sampling: SamplingParameters,
    /// Bumped on every successful update
    version: u64,
    gpu: Option<GpuTextureId>,
    uploaded_version: Option<u64>,
}

impl TextureResource {
    /// Create a texture from an RGBA8 pixel buffer
    ///
    /// Takes ownership of `pixels`. Fails if the format is not RGBA8, the
    /// buffer is empty, a dimension is zero, or the buffer length does not
    /// match the dimensions.
    pub fn create_from_image(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        sampling: SamplingParameters,
    ) -> Result<Self, TextureError> {
        if format != PixelFormat::Rgba8 {
            return Err(TextureError::UnsupportedFormat(format));
        }
        if pixels.is_empty() {
            return Err(ImageLoadError::DecodeError("no pixel data".to_string()).into());
        }
        validate_rgba8(width, height, pixels.len())?;
        
        log::debug!("Created {}x{} texture ({:?})", width, height, sampling);
        Ok(Self {
            width,
            height,
            pixels,
            sampling,
            version: 0,
            gpu: None,
            uploaded_version: None,
        })
    }
    
    /// Create a texture from decoder output
    pub fn from_decoded(image: DecodedImage, sampling: SamplingParameters) -> Result<Self, TextureError> {
        Self::create_from_image(image.pixels, image.width, image.height, image.format, sampling)
    }
    
    /// Decode a named PNG asset and create a texture from it
    pub fn load(
        source: &dyn AssetSource,
        name: &str,
        sampling: SamplingParameters,
    ) -> Result<Self, TextureError> {
        let image = ImageDecoder::decode_asset(source, name)?;
        log::info!("Loaded texture '{}' ({}x{})", name, image.width, image.height);
        Self::from_decoded(image, sampling)
    }
    
    /// Create a bare texture: sampling parameters only, no pixel data
    pub fn create_bare(sampling: SamplingParameters) -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
            sampling,
            version: 0,
            gpu: None,
            uploaded_version: None,
        }
    }
    
    /// Replace dimensions and pixel data
    ///
    /// Either everything is replaced or, on error, nothing is.
    pub fn update(&mut self, width: u32, height: u32, pixels: Vec<u8>) -> Result<(), TextureError> {
        validate_rgba8(width, height, pixels.len())?;
        
        self.width = width;
        self.height = height;
        self.pixels = pixels;
        self.version += 1;
        log::trace!("Texture updated to {}x{} (version {})", width, height, self.version);
        Ok(())
    }
    
    /// Width in pixels (0 for a bare texture)
    pub fn width(&self) -> u32 {
        self.width
    }
    
    /// Height in pixels (0 for a bare texture)
    pub fn height(&self) -> u32 {
        self.height
    }
    
    /// Raw RGBA8 pixel data
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
    
    /// Pixel data viewed as one `[r, g, b, a]` array per texel
    pub fn texels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(&self.pixels)
    }
    
    /// Sampling parameters fixed at construction
    pub fn sampling(&self) -> &SamplingParameters {
        &self.sampling
    }
    
    /// Whether the texture has no pixel data yet
    pub fn is_bare(&self) -> bool {
        self.pixels.is_empty()
    }
    
    /// Content version, incremented by each successful update
    pub fn version(&self) -> u64 {
        self.version
    }
    
    /// GPU-side handle, once the renderer has created it
    pub fn gpu_handle(&self) -> Option<GpuTextureId> {
        self.gpu
    }
    
    /// Whether pixel data exists that the GPU copy has not seen
    pub fn needs_upload(&self) -> bool {
        !self.is_bare() && self.uploaded_version != Some(self.version)
    }
    
    pub(crate) fn set_gpu_handle(&mut self, id: GpuTextureId) {
        self.gpu = Some(id);
        self.uploaded_version = None;
    }
    
    pub(crate) fn mark_uploaded(&mut self) {
        self.uploaded_version = Some(self.version);
    }
    
    pub(crate) fn take_gpu_handle(&mut self) -> Option<GpuTextureId> {
        self.uploaded_version = None;
        self.gpu.take()
    }
}

/// Check dimensions and buffer length for RGBA8 data
fn validate_rgba8(width: u32, height: u32, len: usize) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::InvalidDimensions { width, height });
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(RGBA8_STRIDE))
        .ok_or(TextureError::InvalidDimensions { width, height })?;
    if len != expected {
        return Err(TextureError::BufferSizeMismatch { expected, actual: len });
    }
    Ok(())
}
