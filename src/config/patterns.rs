//! Glob pattern sets for watch inclusion and ignore exclusion.
//!
//! Uses gitignore semantics from the `ignore` crate, rooted at the watch root.
//! A pattern without a `/` matches the base name at any depth, so `*.o` hits
//! `build/obj/main.o`. Only the path itself is matched, not its parents.

use std::fmt;
use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use super::ConfigError;

/// Default inclusion pattern: everything under the root.
pub const DEFAULT_WATCH_PATTERN: &str = "**/*";

/// Compiled set of glob patterns. An empty set matches nothing.
#[derive(Debug, Clone)]
pub struct PatternSet {
    sources: Vec<String>,
    matcher: Gitignore,
}

impl PatternSet {
    /// Compile patterns relative to `root`. Blank patterns are skipped.
    pub fn new<S: AsRef<str>>(root: &Path, patterns: &[S]) -> Result<Self, ConfigError> {
        let mut builder = GitignoreBuilder::new(root);
        let mut sources = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            builder
                .add_line(None, pattern)
                .map_err(|source| ConfigError::Pattern {
                    pattern: pattern.to_owned(),
                    source,
                })?;
            sources.push(pattern.to_owned());
        }

        let matcher = builder.build().map_err(|source| ConfigError::Pattern {
            pattern: sources.join(";"),
            source,
        })?;

        Ok(Self { sources, matcher })
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Check whether `path` matches any pattern in the set.
    pub fn matches(&self, path: &Path, is_dir: bool) -> bool {
        !self.is_empty() && self.matcher.matched(path, is_dir).is_ignore()
    }
}

impl fmt::Display for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&self.sources().join(";"))
        }
    }
}
