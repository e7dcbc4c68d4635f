//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Chunk cache settings.
    pub world: WorldConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// How a sub-chunk response is merged into its column.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum SubChunkMerge {
    /// Fill the lowest empty slot, whatever vertical index the response names.
    /// A repeated response fills a second slot.
    #[default]
    Append,
    /// Store at the slot the response names, replacing what is there.
    Place,
}

/// Chunk cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Merge policy for sub-chunk responses.
    pub sub_chunk_merge: SubChunkMerge,
    /// Whether columns with more sub-chunks than were sent inline trigger a request.
    pub request_missing_sub_chunks: bool,
    /// Network block id of air, registered as handle 0.
    pub air_network_id: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write a JSON log file next to the config in debug builds.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            sub_chunk_merge: SubChunkMerge::Append,
            request_missing_sub_chunks: true,
            air_network_id: 0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }
}

/// Platform config directory for Strata, if one can be resolved.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("strata"))
}

/// Picks `explicit` if given, otherwise the platform default.
pub fn resolve_config_dir(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(dir) => Ok(dir.to_path_buf()),
        None => default_config_dir().ok_or(ConfigError::NoConfigDir),
    }
}

// --- Persistence ---

/// File name of the persisted config inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

impl Config {
    /// Path of the config file inside `config_dir`.
    pub fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE_NAME)
    }

    /// Reads `config.ron` from `config_dir`, writing the defaults there first
    /// if the file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::path_in(config_dir);
        if !path.exists() {
            let config = Self::default();
            config.save(config_dir)?;
            log::info!("wrote default config to {}", path.display());
            return Ok(config);
        }

        let config = Self::read_from(&path)?;
        log::info!("using config {}", path.display());
        Ok(config)
    }

    /// Writes this config to `config_dir`, creating the directory if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;
        std::fs::write(Self::path_in(config_dir), self.to_ron()?).map_err(ConfigError::WriteError)
    }

    /// Re-reads the file and returns the new config only if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read_from(&Self::path_in(config_dir))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("config changed on disk");
        Ok(Some(fresh))
    }

    /// Pretty RON text of this config.
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .struct_names(false)
            .enumerate_arrays(false);
        ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)
    }

    fn read_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&text).map_err(ConfigError::ParseError)
    }
}
