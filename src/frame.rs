//! Stack frame data model
//!
//! A crash report may mix frames from several runtimes (a React Native app
//! that crashes inside a Java module, an NDK library called from Kotlin).
//! Each runtime is a [`Lane`]; every parsed frame belongs to exactly one lane.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language runtime responsible for a frame or a crash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Lane {
    Js,
    Java,
    Ndk,
    Unknown,
}

impl Lane {
    /// Fixed lane order used for every tie-break and fallback scan
    pub const PRIORITY: [Lane; 3] = [Lane::Js, Lane::Java, Lane::Ndk];

    /// Platform tag written into signatures and `Group::platform`
    pub fn platform_tag(self) -> &'static str {
        match self {
            Lane::Js => "js",
            Lane::Java => "java",
            Lane::Ndk => "android-ndk",
            Lane::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Lane::Js => "JS",
            Lane::Java => "JAVA",
            Lane::Ndk => "NDK",
            Lane::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

/// JavaScript / React Native frame payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsFrame {
    pub file: String,
    pub function: String,
    /// 1-based line, `None` when the runtime did not report one
    pub line: Option<u32>,
    pub column: Option<u32>,
}

/// Java / Kotlin frame payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaFrame {
    pub class: String,
    pub method: String,
    /// Source file, absent for `(Native Method)`-style frames without one
    pub file: Option<String>,
    pub line: Option<u32>,
}

/// Native (NDK) frame payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdkFrame {
    /// Library basename (e.g., "libc.so")
    pub library: String,
    /// Program counter as written in the trace, including any `0x` prefix
    pub program_counter_hex: String,
    pub symbol: Option<String>,
}

/// Lane-specific part of a [`Frame`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "lane", rename_all = "UPPERCASE")]
pub enum FrameKind {
    Js(JsFrame),
    Java(JavaFrame),
    Ndk(NdkFrame),
}

/// A single parsed stack frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Line exactly as it appeared in the raw trace
    pub raw_line: String,
    /// 0-based position among all recognised frames, top of stack first
    pub original_position: usize,
    /// Application code (as opposed to vendor/platform code); ranking only
    pub in_app: bool,
    pub kind: FrameKind,
}

impl Frame {
    pub fn lane(&self) -> Lane {
        match self.kind {
            FrameKind::Js(_) => Lane::Js,
            FrameKind::Java(_) => Lane::Java,
            FrameKind::Ndk(_) => Lane::Ndk,
        }
    }

    /// Raw line with surrounding whitespace removed
    pub fn token(&self) -> &str {
        self.raw_line.trim()
    }
}

/// Everything recovered from one raw stack trace, split by lane
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFrames {
    pub js_frames: Vec<Frame>,
    pub java_frames: Vec<Frame>,
    pub ndk_frames: Vec<Frame>,

    /// Exception types, outermost first, then the "caused by" chain
    pub js_types: Vec<String>,
    pub java_types: Vec<String>,
    pub ndk_types: Vec<String>,

    /// Lane of the outermost exception header, if one was recognised
    pub primary_exception_lane: Option<Lane>,

    /// The outermost exception header line, trimmed
    pub exception_header_line: Option<String>,

    /// Set when a React Native `JavascriptException` wrapper was seen
    pub react_native_js_exception: bool,
}

impl ParsedFrames {
    /// Frames of one lane (empty for `Lane::Unknown`)
    pub fn frames(&self, lane: Lane) -> &[Frame] {
        match lane {
            Lane::Js => &self.js_frames,
            Lane::Java => &self.java_frames,
            Lane::Ndk => &self.ndk_frames,
            Lane::Unknown => &[],
        }
    }

    /// Exception types of one lane (empty for `Lane::Unknown`)
    pub fn types(&self, lane: Lane) -> &[String] {
        match lane {
            Lane::Js => &self.js_types,
            Lane::Java => &self.java_types,
            Lane::Ndk => &self.ndk_types,
            Lane::Unknown => &[],
        }
    }

    pub fn frame_count(&self, lane: Lane) -> usize {
        self.frames(lane).len()
    }

    pub fn is_empty(&self) -> bool {
        Lane::PRIORITY.iter().all(|&lane| self.frame_count(lane) == 0)
    }

    /// Append a frame to the list of its own lane
    pub(crate) fn push_frame(&mut self, frame: Frame) {
        match frame.lane() {
            Lane::Js => self.js_frames.push(frame),
            Lane::Java => self.java_frames.push(frame),
            Lane::Ndk => self.ndk_frames.push(frame),
            Lane::Unknown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ndk(position: usize) -> Frame {
        Frame {
            raw_line: format!("  libfoo.so+0x{:x}  ", position),
            original_position: position,
            in_app: false,
            kind: FrameKind::Ndk(NdkFrame {
                library: "libfoo.so".to_string(),
                program_counter_hex: format!("0x{:x}", position),
                symbol: None,
            }),
        }
    }

    #[test]
    fn test_platform_tags() {
        assert_eq!(Lane::Js.platform_tag(), "js");
        assert_eq!(Lane::Java.platform_tag(), "java");
        assert_eq!(Lane::Ndk.platform_tag(), "android-ndk");
        assert_eq!(Lane::Unknown.platform_tag(), "unknown");
    }

    #[test]
    fn test_lane_display() {
        assert_eq!(Lane::Js.to_string(), "JS");
        assert_eq!(Lane::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_push_frame_routes_by_lane() {
        let mut parsed = ParsedFrames::default();
        assert!(parsed.is_empty());

        parsed.push_frame(ndk(0));
        parsed.push_frame(ndk(1));

        assert_eq!(parsed.frame_count(Lane::Ndk), 2);
        assert_eq!(parsed.frame_count(Lane::Js), 0);
        assert!(parsed.frames(Lane::Unknown).is_empty());
        assert!(!parsed.is_empty());
    }

    #[test]
    fn test_token_is_trimmed_raw_line() {
        let frame = ndk(16);
        assert_eq!(frame.token(), "libfoo.so+0x10");
        assert_eq!(frame.lane(), Lane::Ndk);
    }
}
