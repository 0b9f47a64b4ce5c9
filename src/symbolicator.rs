//! Symbolication port
//!
//! Resolves minified JavaScript frames (source maps) and obfuscated Java
//! frames (ProGuard/R8 mappings) back to source locations. Artifact storage
//! and lookup live behind implementations of [`Symbolicator`]; the grouping
//! engine only sees frame lines in and frame lines out.
//!
//! ## Contract
//!
//! - Output is order- and length-preserving: line `i` of the result resolves
//!   line `i` of the input. Unresolvable lines are returned unchanged.
//! - Errors are returned, never panicked. The caller falls back to the raw
//!   lines of the failed lane ([`align_resolved`]).
//! - Implementations own their timeouts, retries and concurrency limits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frame::Lane;

/// Errors a symbolication backend may report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolicationError {
    #[error("No mapping artifact for {platform} {app_version} ({app_version_code})")]
    MappingNotFound {
        app_version: String,
        app_version_code: String,
        platform: String,
    },

    #[error("Symbolication backend unavailable: {0}")]
    Unavailable(String),

    #[error("Symbolication timed out after {0} ms")]
    Timeout(u64),

    #[error("Malformed mapping artifact: {0}")]
    InvalidArtifact(String),
}

/// Scoping context used to find the right mapping artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    /// Human-readable app version (`app.build_name`)
    pub app_version: String,
    /// Build number (`app.build_id`)
    pub app_version_code: String,
    /// Device OS (`os.name`)
    pub platform: String,
    pub bundle_id: Option<String>,
}

impl EventMeta {
    pub fn new(
        app_version: impl Into<String>,
        app_version_code: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            app_version: app_version.into(),
            app_version_code: app_version_code.into(),
            platform: platform.into(),
            bundle_id: None,
        }
    }

    pub fn with_bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = Some(bundle_id.into());
        self
    }
}

/// Port trait for frame symbolication
#[async_trait::async_trait]
pub trait Symbolicator: Send + Sync {
    /// Resolve JavaScript frame lines through the bundle's source map
    async fn symbolicate_js_in_place(
        &self,
        frame_lines: &[String],
        meta: &EventMeta,
    ) -> Result<Vec<String>, SymbolicationError>;

    /// Deobfuscate Java frame lines through the build's mapping file
    async fn retrace(
        &self,
        frame_lines: &[String],
        meta: &EventMeta,
    ) -> Result<Vec<String>, SymbolicationError>;
}

/// Symbolicator that resolves nothing
///
/// Used when no artifact backend is configured (the CLI, local tooling).
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSymbolicator;

#[async_trait::async_trait]
impl Symbolicator for PassthroughSymbolicator {
    async fn symbolicate_js_in_place(
        &self,
        frame_lines: &[String],
        _meta: &EventMeta,
    ) -> Result<Vec<String>, SymbolicationError> {
        Ok(frame_lines.to_vec())
    }

    async fn retrace(
        &self,
        frame_lines: &[String],
        _meta: &EventMeta,
    ) -> Result<Vec<String>, SymbolicationError> {
        Ok(frame_lines.to_vec())
    }
}

/// Resolved output for `raw`, at least one line per frame
///
/// A failed call yields `raw` unchanged. A short result keeps the raw line
/// for every missing index. Surplus lines are kept: retrace expands one
/// obfuscated frame into several when the compiler inlined code.
pub fn align_resolved(
    lane: Lane,
    raw: &[String],
    resolved: Result<Vec<String>, SymbolicationError>,
) -> Vec<String> {
    let mut resolved = match resolved {
        Ok(lines) => lines,
        Err(err) => {
            tracing::warn!(lane = %lane, frames = raw.len(), error = %err, "symbolication failed, using raw frames");
            return raw.to_vec();
        }
    };

    if resolved.len() < raw.len() {
        tracing::warn!(
            lane = %lane,
            expected = raw.len(),
            actual = resolved.len(),
            "symbolicator returned fewer lines than frames"
        );
        resolved.extend(raw[resolved.len()..].iter().cloned());
    }
    resolved
}
