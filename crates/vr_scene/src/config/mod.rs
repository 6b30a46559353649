//! Configuration system
//!
//! Session-level settings are plain serde structs. Any of them can be stored
//! as TOML or RON through the [`Config`] trait; the file extension picks the
//! format.

pub use serde::{Serialize, Deserialize};

use crate::render::SamplingParameters;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&contents, path)
    }
    
    /// Parse configuration text, using `path` only to pick the format
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }
    
    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };
        
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
    
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
    
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Asset lookup settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directories searched in order when resolving an asset name
    pub search_paths: Vec<String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            search_paths: vec!["assets".to_string(), ".".to_string()],
        }
    }
}

/// Texture creation defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Sampling parameters given to textures loaded from scene descriptions
    pub default_sampling: SamplingParameters,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter used when `RUST_LOG` is not set (e.g. `"info"`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// # Session Configuration
///
/// Everything a [`Session`](crate::session::Session) needs at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Asset lookup settings
    pub assets: AssetConfig,
    /// Texture creation defaults
    pub textures: TextureConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Upper bound on queued render-thread tasks executed per frame
    pub max_tasks_per_frame: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            assets: AssetConfig::default(),
            textures: TextureConfig::default(),
            logging: LoggingConfig::default(),
            max_tasks_per_frame: 16,
        }
    }
}

impl SessionConfig {
    /// Replace the asset search paths
    pub fn with_search_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets.search_paths = paths.into_iter().map(Into::into).collect();
        self
    }
    
    /// Set the default sampling parameters for loaded textures
    pub fn with_default_sampling(mut self, sampling: SamplingParameters) -> Self {
        self.textures.default_sampling = sampling;
        self
    }
    
    /// Set the fallback log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }
    
    /// Set the per-frame task budget
    pub fn with_max_tasks_per_frame(mut self, max: usize) -> Self {
        self.max_tasks_per_frame = max;
        self
    }
}

impl Config for SessionConfig {}
