//! In-app frame classification
//!
//! Decides whether a frame belongs to application code or to a vendor,
//! framework or platform dependency. The rule set is data, not code: the
//! defaults ship embedded (`in-app-default.toml`) and every deployment can
//! replace them through the grouper configuration without recompiling.
//!
//! # Example TOML
//! ```toml
//! js_vendor_paths = ["node_modules/"]
//! java_vendor_packages = ["java.", "android."]
//! java_app_packages = ["com.example."]
//! ndk_vendor_libraries = ["libc.so"]
//! ndk_app_libraries = []
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../in-app-default.toml");

/// Configurable in-app predicate for all three lanes
///
/// Missing keys in a TOML file fall back to empty lists, so a partial file
/// only narrows what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InAppRules {
    /// Substrings of JS file paths that mark vendor code
    #[serde(default)]
    pub js_vendor_paths: Vec<String>,

    /// Java class prefixes that mark platform/library code
    #[serde(default)]
    pub java_vendor_packages: Vec<String>,

    /// Java class prefixes that are the ONLY in-app code (overrides vendor list)
    #[serde(default)]
    pub java_app_packages: Vec<String>,

    /// NDK library basenames that mark platform/engine code
    #[serde(default)]
    pub ndk_vendor_libraries: Vec<String>,

    /// NDK library basenames that are the ONLY in-app code (overrides vendor list)
    #[serde(default)]
    pub ndk_app_libraries: Vec<String>,
}

impl InAppRules {
    /// Rules that treat every frame as in-app
    pub fn empty() -> Self {
        Self {
            js_vendor_paths: Vec::new(),
            java_vendor_packages: Vec::new(),
            java_app_packages: Vec::new(),
            ndk_vendor_libraries: Vec::new(),
            ndk_app_libraries: Vec::new(),
        }
    }

    /// Load the rule set compiled into the binary
    pub fn embedded_defaults() -> Result<Self> {
        Self::from_toml_str(DEFAULT_TOML).context("Failed to parse embedded in-app-default.toml")
    }

    /// Parse rules from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML in-app rules")
    }

    /// Load rules from a TOML file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read in-app rules file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    /// JS frame is in-app unless its path contains a vendor substring
    pub fn is_js_in_app(&self, file: &str) -> bool {
        let normalized = file.replace('\\', "/");
        !self
            .js_vendor_paths
            .iter()
            .any(|vendor| normalized.contains(vendor.as_str()))
    }

    /// Java frame classification by fully-qualified class name
    pub fn is_java_in_app(&self, class: &str) -> bool {
        if class.is_empty() {
            return false;
        }
        if !self.java_app_packages.is_empty() {
            return self
                .java_app_packages
                .iter()
                .any(|prefix| class.starts_with(prefix.as_str()));
        }
        !self
            .java_vendor_packages
            .iter()
            .any(|prefix| class.starts_with(prefix.as_str()))
    }

    /// NDK frame classification by library basename
    pub fn is_ndk_in_app(&self, library: &str) -> bool {
        if !self.ndk_app_libraries.is_empty() {
            return self.ndk_app_libraries.iter().any(|lib| lib == library);
        }
        !self.ndk_vendor_libraries.iter().any(|lib| lib == library)
    }
}

impl Default for InAppRules {
    fn default() -> Self {
        Self::embedded_defaults().expect("embedded in-app-default.toml is valid")
    }
}
