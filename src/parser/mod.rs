// Multi-runtime stack trace parsing
//
// A raw crash report is free text produced by whatever runtime crashed:
// V8/Hermes/JSC for JavaScript, ART for Java/Kotlin, debuggerd for native
// code, often interleaved (React Native wraps JS errors in Java exceptions).
//
// Parsing is best-effort and infallible. Every line is first scanned for
// exception headers and signal names, then offered to the lane matchers in
// a fixed order (JS, then Java, then NDK); the first match wins and
// unmatched lines are dropped. Frame positions are assigned across all
// lanes in source order so a full trace can be reassembled later.

pub mod java;
pub mod js;
pub mod ndk;

use crate::frame::{Frame, FrameKind, Lane, ParsedFrames};
use crate::in_app::InAppRules;

/// Frames and exception types of a single lane
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneParse {
    pub frames: Vec<Frame>,
    pub types: Vec<String>,
}

#[derive(Debug, Default)]
struct ParserState {
    saw_top_type: bool,
    frame_position: usize,
}

/// Parse a raw stack trace into per-lane frames and exception types
pub fn parse(raw: &str, rules: &InAppRules) -> ParsedFrames {
    parse_lines(raw.split(|c: char| c == '\n' || c == '\r'), rules)
}

/// Parse pre-split lines (see [`parse`])
pub fn parse_lines<'a, I>(lines: I, rules: &InAppRules) -> ParsedFrames
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parsed = ParsedFrames::default();
    let mut state = ParserState::default();

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        // frame lines can still carry a signal name
        detect_exception_types(line, trimmed, &mut parsed, &mut state);

        if let Some(kind) = match_frame(line) {
            let frame = Frame {
                raw_line: line.to_string(),
                original_position: state.frame_position,
                in_app: is_in_app(&kind, rules),
                kind,
            };
            state.frame_position += 1;
            parsed.push_frame(frame);
        }
    }

    parsed
}

/// JS lane only
pub fn parse_js(raw: &str, rules: &InAppRules) -> LaneParse {
    parse_lane(raw, Lane::Js, rules)
}

/// Java lane only
pub fn parse_java(raw: &str, rules: &InAppRules) -> LaneParse {
    parse_lane(raw, Lane::Java, rules)
}

/// NDK lane only
pub fn parse_ndk(raw: &str, rules: &InAppRules) -> LaneParse {
    parse_lane(raw, Lane::Ndk, rules)
}

fn parse_lane(raw: &str, lane: Lane, rules: &InAppRules) -> LaneParse {
    let mut parsed = parse(raw, rules);
    match lane {
        Lane::Js => LaneParse {
            frames: std::mem::take(&mut parsed.js_frames),
            types: std::mem::take(&mut parsed.js_types),
        },
        Lane::Java => LaneParse {
            frames: std::mem::take(&mut parsed.java_frames),
            types: std::mem::take(&mut parsed.java_types),
        },
        Lane::Ndk => LaneParse {
            frames: std::mem::take(&mut parsed.ndk_frames),
            types: std::mem::take(&mut parsed.ndk_types),
        },
        Lane::Unknown => LaneParse::default(),
    }
}

fn match_frame(line: &str) -> Option<FrameKind> {
    if let Some(frame) = js::match_frame(line) {
        return Some(FrameKind::Js(frame));
    }
    if let Some(frame) = java::match_frame(line) {
        return Some(FrameKind::Java(frame));
    }
    ndk::match_frame(line).map(FrameKind::Ndk)
}

fn is_in_app(kind: &FrameKind, rules: &InAppRules) -> bool {
    match kind {
        FrameKind::Js(frame) => rules.is_js_in_app(&frame.file),
        FrameKind::Java(frame) => rules.is_java_in_app(&frame.class),
        FrameKind::Ndk(frame) => rules.is_ndk_in_app(&frame.library),
    }
}

/// Header handling; the first header seen names the primary exception lane
fn detect_exception_types(
    line: &str,
    trimmed: &str,
    parsed: &mut ParsedFrames,
    state: &mut ParserState,
) {
    if let Some(js_type) = js::match_rn_exception(line) {
        parsed.react_native_js_exception = true;
        if !state.saw_top_type {
            record_top(parsed, state, Lane::Js, trimmed);
            parsed.js_types.push(js_type);
        }
        return;
    }

    if let Some(js_type) = js::match_error_header(trimmed) {
        if !state.saw_top_type {
            record_top(parsed, state, Lane::Js, trimmed);
            parsed.js_types.push(js_type);
        } else if parsed.js_types.is_empty() {
            parsed.js_types.push(js_type);
        }
        return;
    }

    if let Some(java_type) = java::match_caused_by(line) {
        parsed.java_types.push(java_type);
        return;
    }

    if let Some(signal) = ndk::match_signal(trimmed) {
        if !parsed.ndk_types.contains(&signal) {
            parsed.ndk_types.push(signal);
            if parsed.primary_exception_lane.is_none() {
                parsed.primary_exception_lane = Some(Lane::Ndk);
            }
        }
    }

    if !state.saw_top_type && !parsed.react_native_js_exception {
        if let Some(java_type) = java::match_top_header(trimmed) {
            record_top(parsed, state, Lane::Java, trimmed);
            parsed.java_types.push(java_type);
        }
    }
}

fn record_top(parsed: &mut ParsedFrames, state: &mut ParserState, lane: Lane, trimmed: &str) {
    parsed.primary_exception_lane = Some(lane);
    parsed.exception_header_line = Some(trimmed.to_string());
    state.saw_top_type = true;
}
