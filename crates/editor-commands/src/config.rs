//! Engine configuration.
//!
//! Every field has a default, so an empty document (or `{}`) is a valid configuration.
//!
//! ```rust
//! use editor_commands::{EngineConfig, Platform};
//!
//! let config = EngineConfig::from_yaml_str("platform: mac\nemit_exec_events: false\n").unwrap();
//! assert_eq!(config.platform, Platform::Secondary);
//! assert!(config.copy_with_empty_selection);
//! ```

use crate::chord::Platform;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading an [`EngineConfig`].
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),
}

/// Settings that change how the engine resolves and runs commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Binding profile used by [`CommandEngine::handle_chord`](crate::CommandEngine::handle_chord).
    pub platform: Platform,
    /// Whether `cut` with an empty selection cuts the whole line.
    pub copy_with_empty_selection: bool,
    /// Whether `exec` / `afterExec` events are emitted around each request.
    pub emit_exec_events: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            copy_with_empty_selection: true,
            emit_exec_events: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Same configuration with a different binding profile.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}
