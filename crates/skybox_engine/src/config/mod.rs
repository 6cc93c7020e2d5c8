//! Configuration system
//!
//! Settings are plain `serde` structs. Any of them can be loaded from or saved
//! to `.toml` and `.ron` files through the [`Config`] trait.

use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file, picking the format from the extension
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_str_with_format(&contents, ConfigFormat::from_path(path)?)
    }

    /// Parse configuration text in the given format
    fn from_str_with_format(contents: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Serialize configuration to text in the given format
    fn to_string_with_format(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = self.to_string_with_format(ConfigFormat::from_path(path)?)?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (`.toml`)
    Toml,
    /// Rusty Object Notation (`.ron`)
    Ron,
}

impl ConfigFormat {
    /// Resolve the format from a file path's extension
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        if path.ends_with(".toml") {
            Ok(Self::Toml)
        } else if path.ends_with(".ron") {
            Ok(Self::Ron)
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
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

/// Per-skybox settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyboxSettings {
    /// Half the edge length of the backdrop cube, in world units
    pub half_extent: f32,

    /// Name of the material parameter the environment cubemap is bound to
    pub environment_map_parameter: String,
}

impl Default for SkyboxSettings {
    fn default() -> Self {
        Self {
            half_extent: 1.0,
            environment_map_parameter: "environmentMap".to_string(),
        }
    }
}

impl Config for SkyboxSettings {}

/// High-level scene renderer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneRendererConfig {
    /// Enable frustum culling during scene traversal
    pub enable_frustum_culling: bool,

    /// Maximum objects drawn by the scene traversal per frame
    pub max_objects_per_frame: usize,
}

impl Default for SceneRendererConfig {
    fn default() -> Self {
        Self {
            enable_frustum_culling: true,
            max_objects_per_frame: 10000,
        }
    }
}

impl Config for SceneRendererConfig {}

/// Top-level settings file for applications embedding the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Scene renderer settings
    pub renderer: SceneRendererConfig,

    /// Skybox settings
    pub skybox: SkyboxSettings,

    /// Default log level (`error`, `warn`, `info`, `debug`, `trace`)
    pub log_level: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            renderer: SceneRendererConfig::default(),
            skybox: SkyboxSettings::default(),
            log_level: "info".to_string(),
        }
    }
}

impl EngineSettings {
    /// Parsed log level, falling back to `Info` for unknown names
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Config for EngineSettings {}
