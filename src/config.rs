// Grouper configuration
//
// Everything that shapes a signature but is not part of the algorithm itself:
// how many frames contribute, and which frames count as application code.
// Changing either regroups crashes, so deployments pin them in a TOML file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fingerprint::DEFAULT_TOP_N_FRAMES;
use crate::in_app::InAppRules;

/// Errors loading a grouper configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {source}")]
    Parse { source: toml::de::Error },
}

/// Configuration of an [`ErrorGrouper`](crate::grouping::ErrorGrouper)
///
/// # Example
/// ```
/// use crashgroup::config::GrouperConfig;
///
/// let config = GrouperConfig::from_toml_str("top_n_frames = 5").unwrap();
/// assert_eq!(config.top_n_frames, 5);
/// // no [in_app] table: the embedded rule set applies
/// assert!(!config.in_app.java_vendor_packages.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrouperConfig {
    /// Frames of the primary lane that enter the signature
    #[serde(default = "default_top_n_frames")]
    pub top_n_frames: usize,

    /// In-app classification rules; an `[in_app]` table replaces the
    /// embedded defaults as a whole
    #[serde(default)]
    pub in_app: InAppRules,
}

fn default_top_n_frames() -> usize {
    DEFAULT_TOP_N_FRAMES
}

impl Default for GrouperConfig {
    fn default() -> Self {
        Self {
            top_n_frames: DEFAULT_TOP_N_FRAMES,
            in_app: InAppRules::default(),
        }
    }
}

impl GrouperConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse { source })
    }

    /// Load a configuration file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn with_top_n_frames(mut self, top_n_frames: usize) -> Self {
        self.top_n_frames = top_n_frames;
        self
    }

    pub fn with_in_app(mut self, in_app: InAppRules) -> Self {
        self.in_app = in_app;
        self
    }
}
