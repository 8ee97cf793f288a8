//! Decides whether a changed path restarts the server.

use std::path::Path;

use crate::config::{PatternSet, WatcherConfig};

/// Inclusion patterns, ignore patterns and the ignore-directories flag.
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    patterns: PatternSet,
    ignore: PatternSet,
    ignore_directories: bool,
}

impl ChangeFilter {
    pub fn new(patterns: PatternSet, ignore: PatternSet, ignore_directories: bool) -> Self {
        Self {
            patterns,
            ignore,
            ignore_directories,
        }
    }

    pub fn from_config(config: &WatcherConfig) -> Self {
        Self::new(
            config.patterns.clone(),
            config.ignore.clone(),
            config.ignore_directories,
        )
    }

    /// A watched path that is not filtered out.
    pub fn is_actionable(&self, path: &Path) -> bool {
        self.is_watched(path) && self.should_trigger(path)
    }

    /// Path matches one of the inclusion patterns.
    pub fn is_watched(&self, path: &Path) -> bool {
        self.patterns.matches(path, path.is_dir())
    }

    /// False for an existing directory when directories are ignored, and for
    /// any path matching an ignore pattern.
    ///
    /// A deleted path is never a directory, so it is only filtered by pattern.
    pub fn should_trigger(&self, path: &Path) -> bool {
        let is_dir = path.is_dir();
        if self.ignore_directories && is_dir {
            return false;
        }
        !self.ignore.matches(path, is_dir)
    }
}
