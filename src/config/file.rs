//! Optional `server-watcher.toml` file.
//!
//! Every field mirrors a CLI flag. CLI values take precedence; the merge
//! happens in [`super::WatcherConfig::from_parts`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::ConfigError;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "server-watcher.toml";

/// Raw config file contents.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: Option<PathBuf>,
    pub compilation_command: Option<String>,
    pub patterns: Option<Vec<String>>,
    pub ignore_patterns: Option<Vec<String>>,
    pub ignore_directories: bool,
    pub verbose: bool,
}

impl FileConfig {
    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(Self::parse_with_ignored(content)?.0)
    }

    /// Load the config file.
    ///
    /// An explicitly requested file must exist. The default file is optional.
    pub fn locate(explicit: Option<&Path>, root: &Path) -> Result<Option<Self>, ConfigError> {
        let path = match explicit {
            Some(path) => root.join(path),
            None => {
                let path = root.join(DEFAULT_CONFIG_FILE);
                if !path.exists() {
                    return Ok(None);
                }
                path
            }
        };
        Self::from_path(&path).map(Some)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        crate::debug!("config: loaded {}", path.display());
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        crate::error!("unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }
}
