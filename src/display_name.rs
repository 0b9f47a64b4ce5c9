//! Human-readable crash group labels
//!
//! Labels are for dashboards and alerts only; nothing keys on them, so the
//! rendering may evolve without regrouping crashes.

use crate::frame::Lane;
use crate::parser::js;

/// Render the label of a crash group
///
/// - JAVA: `NullPointerException at onCreate(MainActivity.java:42) [EXC-...]`,
///   or `A caused by B at ...` when a cause chain exists
/// - JS: `TypeError in utils/helper.js:42:15 [EXC-...]`
/// - NDK: `SIGSEGV at libgame.so+0x1a2b [EXC-...]`
///
/// Without frames only the exception type and group id are shown.
pub fn build_display_name<T: AsRef<str>, U: AsRef<str>>(
    lane: Lane,
    exc_types: &[T],
    frames: &[U],
    group_id: &str,
) -> String {
    let primary_type = exc_types
        .first()
        .map(|t| t.as_ref())
        .unwrap_or_else(|| default_type(lane));

    let Some(first) = frames.first().map(|f| f.as_ref().trim()) else {
        return format!("{} [{}]", primary_type, group_id);
    };

    match lane {
        Lane::Java => {
            let headline = match exc_types {
                [outer, cause, ..] => format!("{} caused by {}", outer.as_ref(), cause.as_ref()),
                _ => primary_type.to_string(),
            };
            with_location(&headline, " at ", &java_location(first), group_id)
        }
        Lane::Js => {
            let location = frames
                .iter()
                .find_map(|f| js_location(f.as_ref()))
                .unwrap_or_else(|| first.to_string());
            with_location(primary_type, " in ", &location, group_id)
        }
        Lane::Ndk => with_location(primary_type, " at ", first, group_id),
        Lane::Unknown => format!("{} [{}]", primary_type, group_id),
    }
}

fn default_type(lane: Lane) -> &'static str {
    match lane {
        Lane::Ndk => "NativeError",
        _ => "Error",
    }
}

fn with_location(headline: &str, joiner: &str, location: &str, group_id: &str) -> String {
    if location.is_empty() {
        format!("{} [{}]", headline, group_id)
    } else {
        format!("{}{}{} [{}]", headline, joiner, location, group_id)
    }
}

/// `at com.example.Foo.bar(Foo.java:42)` → `bar(Foo.java:42)`
fn java_location(frame: &str) -> String {
    let frame = frame.trim();
    let frame = frame.strip_prefix("at ").unwrap_or(frame).trim_start();
    let qualified_end = frame.find('(').unwrap_or(frame.len());
    match frame[..qualified_end].rfind('.') {
        Some(dot) => frame[dot + 1..].to_string(),
        None => frame.to_string(),
    }
}

/// `fn@app/src/utils/helper.js:42:15` → `utils/helper.js:42:15`
fn js_location(frame: &str) -> Option<String> {
    let parsed = js::match_frame(frame)?;
    let normalized = parsed.file.replace('\\', "/");
    let segments: Vec<&str> = normalized.split('/').collect();
    let short = if segments.len() >= 2 {
        segments[segments.len() - 2..].join("/")
    } else {
        normalized.clone()
    };

    let mut location = short;
    if let Some(line) = parsed.line {
        location.push_str(&format!(":{}", line));
        if let Some(column) = parsed.column {
            location.push_str(&format!(":{}", column));
        }
    }
    Some(location)
}
