//! Asset access
//!
//! The engine reads encoded assets through the [`AssetSource`] trait: an
//! opaque readable-stream lookup keyed by a path-like name. Two sources are
//! provided: one backed by the filesystem and one backed by memory.

pub mod image_loader;

pub use image_loader::{DecodedImage, ImageDecoder, ImageLoadError, PixelFormat};

use crate::config::AssetConfig;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use thiserror::Error;

/// Readable byte source keyed by asset name
pub trait AssetSource {
    /// Open the named asset for reading
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>, AssetError>;
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),
    
    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Filesystem-backed asset source
///
/// Names are resolved against each search path in order; the first existing
/// file wins. A name that matches no search path is tried as given.
#[derive(Debug, Clone)]
pub struct FileAssetSource {
    search_paths: Vec<PathBuf>,
}

impl FileAssetSource {
    /// Create a source from explicit search paths
    pub fn new<I, P>(search_paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: search_paths.into_iter().map(Into::into).collect(),
        }
    }
    
    /// Create a source from asset configuration
    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(config.search_paths.iter().cloned())
    }
    
    /// Resolve an asset name to an existing file path
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
            .or_else(|| {
                let direct = PathBuf::from(name);
                direct.is_file().then_some(direct)
            })
    }
}

impl AssetSource for FileAssetSource {
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>, AssetError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))?;
        log::debug!("Opening asset '{}' at {:?}", name, path);
        Ok(Box::new(File::open(path)?))
    }
}

/// In-memory asset source
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Register an asset, replacing any previous asset with the same name
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(name.into(), bytes);
    }
    
    /// Builder-style [`insert`](Self::insert)
    pub fn with_asset(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }
    
    /// Number of registered assets
    pub fn len(&self) -> usize {
        self.assets.len()
    }
    
    /// Whether no assets are registered
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetSource for MemoryAssetSource {
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>, AssetError> {
        self.assets
            .get(name)
            .map(|bytes| Box::new(Cursor::new(bytes.as_slice())) as Box<dyn Read + '_>)
            .ok_or_else(|| AssetError::NotFound(name.to_string()))
    }
}
