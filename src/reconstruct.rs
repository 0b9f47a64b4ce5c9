//! Symbolicated stack trace reconstruction
//!
//! After each lane has been resolved the full trace is reassembled in the
//! order the frames appeared in the raw text, so stored events show one
//! readable trace rather than three per-lane fragments.

use crate::frame::{Frame, Lane, ParsedFrames};

/// Parsed frames plus the resolved text of every frame, per lane
///
/// `js_resolved[i]` is the resolved line of `parsed.js_frames[i]` (same for
/// Java and NDK). NDK lines are never symbolicated and keep their raw text.
///
/// `java_retraced` is the whole retrace output, which may hold more lines
/// than there are Java frames when inlined code was expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompleteSymbolication {
    pub parsed: ParsedFrames,
    pub js_resolved: Vec<String>,
    pub java_resolved: Vec<String>,
    pub java_retraced: Vec<String>,
    pub ndk_resolved: Vec<String>,
}

impl CompleteSymbolication {
    /// Pair parsed frames with their resolved lines
    ///
    /// Vectors shorter than their lane are padded with raw lines; longer
    /// ones are cut. The uncut Java vector is kept for reconstruction.
    pub fn new(
        parsed: ParsedFrames,
        js_resolved: Vec<String>,
        java_resolved: Vec<String>,
    ) -> Self {
        let js_resolved = fit(&parsed.js_frames, js_resolved);
        let java_retraced = if parsed.java_frames.is_empty() {
            Vec::new()
        } else {
            fit_expanded(&parsed.java_frames, java_resolved)
        };
        let java_resolved = fit(&parsed.java_frames, java_retraced.clone());
        let ndk_resolved = parsed.ndk_frames.iter().map(|f| f.raw_line.clone()).collect();
        Self {
            parsed,
            js_resolved,
            java_resolved,
            java_retraced,
            ndk_resolved,
        }
    }

    /// Resolved lines of one lane, index-aligned with its frames
    pub fn resolved(&self, lane: Lane) -> &[String] {
        match lane {
            Lane::Js => &self.js_resolved,
            Lane::Java => &self.java_resolved,
            Lane::Ndk => &self.ndk_resolved,
            Lane::Unknown => &[],
        }
    }

    /// Resolved text of a frame of this trace, trimmed; raw text if unknown
    pub fn resolved_line<'a>(&'a self, frame: &'a Frame) -> &'a str {
        let lane = frame.lane();
        self.parsed
            .frames(lane)
            .binary_search_by_key(&frame.original_position, |f| f.original_position)
            .ok()
            .and_then(|index| self.resolved(lane).get(index))
            .map(|line| line.trim())
            .unwrap_or_else(|| frame.token())
    }

    /// Rebuild the full trace: header line, then every frame in source order
    ///
    /// Retraced Java lines stay together at the position of the first Java
    /// frame.
    pub fn reconstruct_stack_trace(&self) -> String {
        let mut out = String::new();

        if let Some(header) = self.header_line() {
            out.push_str(header);
            out.push('\n');
        }

        let mut lines: Vec<(usize, Lane, &str)> = Vec::new();
        for lane in [Lane::Js, Lane::Ndk] {
            lines.extend(
                self.parsed
                    .frames(lane)
                    .iter()
                    .zip(self.resolved(lane))
                    .map(|(frame, resolved)| (frame.original_position, lane, resolved.trim())),
            );
        }
        if let Some(first) = self.parsed.java_frames.first() {
            lines.extend(
                self.java_retraced
                    .iter()
                    .map(|resolved| (first.original_position, Lane::Java, resolved.trim())),
            );
        }
        // stable: expanded Java lines keep their retrace order
        lines.sort_by_key(|(position, _, _)| *position);

        for (_, lane, resolved) in lines {
            if lane == Lane::Js && !resolved.starts_with("at ") {
                out.push_str("  at ");
            } else {
                out.push_str("  ");
            }
            out.push_str(resolved);
            out.push('\n');
        }

        out
    }

    fn header_line(&self) -> Option<&str> {
        if let Some(header) = self.parsed.exception_header_line.as_deref() {
            return Some(header);
        }
        Lane::PRIORITY
            .iter()
            .find_map(|&lane| self.parsed.types(lane).first())
            .map(String::as_str)
    }
}

fn fit(frames: &[Frame], mut resolved: Vec<String>) -> Vec<String> {
    resolved.truncate(frames.len());
    for frame in &frames[resolved.len()..] {
        resolved.push(frame.raw_line.clone());
    }
    resolved
}

fn fit_expanded(frames: &[Frame], mut resolved: Vec<String>) -> Vec<String> {
    for frame in frames.iter().skip(resolved.len()) {
        resolved.push(frame.raw_line.clone());
    }
    resolved
}
