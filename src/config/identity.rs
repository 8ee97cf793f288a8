//! Server identity derived from the target path.
//!
//! The base name is the only selector used to stop the server: processes are
//! matched by name, not by a handle the supervisor owns. Any unrelated process
//! sharing the name is killed too. That is a known limitation and intentionally
//! kept, since tracking PIDs would change which processes get stopped.

use std::fmt;
use std::path::Path;

use super::ConfigError;

/// Base name of the supervised executable. Stable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    name: String,
}

impl ServerIdentity {
    /// Derive the identity from the configured server path.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "server path `{}` has no file name",
                    path.display()
                ))
            })?;
        Ok(Self { name })
    }

    /// Process name used for log prefixes and kill-by-name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
