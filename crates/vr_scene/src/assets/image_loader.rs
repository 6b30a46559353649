//! Image decoding for texture data
//!
//! Decodes PNG byte streams into raw RGBA8 pixel buffers. The decoder reports
//! the native pixel format of the image and refuses anything that is not
//! 8-bit RGBA instead of converting it.

use std::io::Read;
use image::{ColorType, DynamicImage, ImageFormat};
use thiserror::Error;
use super::AssetSource;

/// Pixel layout of decoded or supplied image data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit red, green, blue, alpha
    Rgba8,
    /// 8-bit red, green, blue
    Rgb8,
    /// 8-bit luminance with alpha
    LumaAlpha8,
    /// 8-bit luminance
    Luma8,
    /// 16-bit red, green, blue, alpha
    Rgba16,
    /// 16-bit red, green, blue
    Rgb16,
    /// 16-bit luminance with alpha
    LumaAlpha16,
    /// 16-bit luminance
    Luma16,
    /// Any other layout
    Other,
}

impl PixelFormat {
    /// Bytes per pixel, when the layout is known
    pub fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Rgba8 => Some(4),
            Self::Rgb8 => Some(3),
            Self::LumaAlpha8 => Some(2),
            Self::Luma8 => Some(1),
            Self::Rgba16 => Some(8),
            Self::Rgb16 => Some(6),
            Self::LumaAlpha16 => Some(4),
            Self::Luma16 => Some(2),
            Self::Other => None,
        }
    }
}

impl From<ColorType> for PixelFormat {
    fn from(color: ColorType) -> Self {
        match color {
            ColorType::Rgba8 => Self::Rgba8,
            ColorType::Rgb8 => Self::Rgb8,
            ColorType::La8 => Self::LumaAlpha8,
            ColorType::L8 => Self::Luma8,
            ColorType::Rgba16 => Self::Rgba16,
            ColorType::Rgb16 => Self::Rgb16,
            ColorType::La16 => Self::LumaAlpha16,
            ColorType::L16 => Self::Luma16,
            _ => Self::Other,
        }
    }
}

/// Image acquisition errors
#[derive(Error, Debug)]
pub enum ImageLoadError {
    /// The byte source could not be opened or read
    #[error("Asset not found: {0}")]
    AssetNotFound(String),
    
    /// The bytes are not a valid image of the supported encoding
    #[error("Image decode error: {0}")]
    DecodeError(String),
    
    /// The image decoded fine but is not 8-bit RGBA
    #[error("Unsupported pixel format: {0:?} (only RGBA8 is supported)")]
    UnsupportedPixelFormat(PixelFormat),
}

/// Decoded image data ready for texture creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Pixel layout of `pixels` (always RGBA8 when produced by the decoder)
    pub format: PixelFormat,
    /// Raw pixel data, row-major, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Create a solid color RGBA8 image (placeholders and tests)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        let pixels = color.repeat(pixel_count);
        
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels,
        }
    }
    
    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.pixels.len()
    }
}

/// Stateless PNG decoder
///
/// Decoding blocks on reading the input; callers that cannot afford that on
/// the render thread should decode on a worker and hand the result over.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder;

impl ImageDecoder {
    /// Decode an encoded PNG byte buffer
    pub fn decode(bytes: &[u8]) -> Result<DecodedImage, ImageLoadError> {
        if bytes.is_empty() {
            return Err(ImageLoadError::DecodeError("empty input".to_string()));
        }
        
        let img = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| ImageLoadError::DecodeError(e.to_string()))?;
        
        let native = PixelFormat::from(img.color());
        let DynamicImage::ImageRgba8(rgba) = img else {
            log::debug!("Rejecting decoded image with native format {:?}", native);
            return Err(ImageLoadError::UnsupportedPixelFormat(native));
        };
        
        let (width, height) = rgba.dimensions();
        log::debug!("Decoded {}x{} RGBA8 image", width, height);
        
        Ok(DecodedImage {
            width,
            height,
            format: PixelFormat::Rgba8,
            pixels: rgba.into_raw(),
        })
    }
    
    /// Read a stream to the end and decode it
    pub fn decode_reader<R: Read>(mut reader: R) -> Result<DecodedImage, ImageLoadError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ImageLoadError::AssetNotFound(format!("read failed: {}", e)))?;
        Self::decode(&bytes)
    }
    
    /// Open a named asset and decode it
    pub fn decode_asset(source: &dyn AssetSource, name: &str) -> Result<DecodedImage, ImageLoadError> {
        let reader = source.open(name).map_err(|e| {
            log::debug!("Cannot open image asset '{}': {}", name, e);
            ImageLoadError::AssetNotFound(name.to_string())
        })?;
        Self::decode_reader(reader)
    }
}
