//! JavaScript / React Native frame and header recognition
//!
//! Shapes:
//! - `at func (file:line:col)` (V8 / Hermes)
//! - `at file:line:col` (anonymous)
//! - `func@file:line:col` (JSC / bundler compact)
//! - `func@file:offset` (minified bundle, single line)
//! - `TypeError: message` header
//! - `...JavascriptException: TypeError: message` React Native wrapper

use regex::Regex;
use std::sync::OnceLock;

use crate::frame::JsFrame;

fn re_at_func_file() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*at\s+(.+?)\s+\((.+):(\d+):(\d+)\)\s*$")
            .expect("re_at_func_file: pattern is valid and should always compile")
    })
}

fn re_at_file() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*at\s+(.+):(\d+):(\d+)\s*$")
            .expect("re_at_file: pattern is valid and should always compile")
    })
}

fn re_compact_with_col() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([^@\s]*)@(.+):(\d+):(\d+)\s*$")
            .expect("re_compact_with_col: pattern is valid and should always compile")
    })
}

fn re_compact_offset() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*([^@\s]*)@(.+):(\d+)\s*$")
            .expect("re_compact_offset: pattern is valid and should always compile")
    })
}

fn re_error_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^((?:[A-Za-z_$][A-Za-z0-9_$]*)?(?:Error|Exception)|Invariant Violation)(?:\s*:.*)?$")
            .expect("re_error_line: pattern is valid and should always compile")
    })
}

fn re_rn_exception() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"JavascriptException(?::\s*((?:[A-Za-z_$][A-Za-z0-9_$]*)?(?:Error|Exception)|Invariant Violation)\b)?")
            .expect("re_rn_exception: pattern is valid and should always compile")
    })
}

/// Recognise a JS frame line
pub fn match_frame(line: &str) -> Option<JsFrame> {
    if let Some(caps) = re_compact_with_col().captures(line) {
        return Some(build(&caps[1], &caps[2], Some(&caps[3]), Some(&caps[4])));
    }
    if let Some(caps) = re_compact_offset().captures(line) {
        // Minified bundles are a single line; the number is the column offset
        return Some(build(&caps[1], &caps[2], Some("1"), Some(&caps[3])));
    }
    if let Some(caps) = re_at_func_file().captures(line) {
        return Some(build(&caps[1], &caps[2], Some(&caps[3]), Some(&caps[4])));
    }
    if let Some(caps) = re_at_file().captures(line) {
        return Some(build("", &caps[1], Some(&caps[2]), Some(&caps[3])));
    }
    None
}

/// Error type of a `TypeError: message` style header (trimmed input)
pub fn match_error_header(trimmed: &str) -> Option<String> {
    re_error_line()
        .captures(trimmed)
        .map(|caps| caps[1].to_string())
}

/// React Native `JavascriptException` wrapper; yields the wrapped JS type
/// or `Error` when the wrapper names none
pub fn match_rn_exception(line: &str) -> Option<String> {
    re_rn_exception().captures(line).map(|caps| {
        caps.get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "Error".to_string())
    })
}

fn build(function: &str, file: &str, line: Option<&str>, column: Option<&str>) -> JsFrame {
    JsFrame {
        file: sanitize_file(file),
        function: normalize_function(function),
        line: line.and_then(|s| s.parse().ok()),
        column: column.and_then(|s| s.parse().ok()),
    }
}

/// `bound foo` → `foo`; empty or `<anonymous>` → `anonymous`
pub fn normalize_function(function: &str) -> String {
    let f = function.trim();
    let f = f.strip_prefix("bound ").unwrap_or(f).trim();
    if f.is_empty() || f == "<anonymous>" {
        "anonymous".to_string()
    } else {
        f.to_string()
    }
}

/// Drop `?query` and `#fragment` from a script path
pub fn sanitize_file(file: &str) -> String {
    let f = file.trim();
    let f = f.split('?').next().unwrap_or(f);
    let f = f.split('#').next().unwrap_or(f);
    f.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v8_frame() {
        let frame = match_frame("    at f (a.js:1:1)").unwrap();
        assert_eq!(frame.function, "f");
        assert_eq!(frame.file, "a.js");
        assert_eq!(frame.line, Some(1));
        assert_eq!(frame.column, Some(1));
    }

    #[test]
    fn test_v8_frame_with_url_and_spaces_in_function() {
        let frame =
            match_frame("    at Object.<anonymous> (http://10.0.2.2:8081/index.bundle?platform=android:12:34)")
                .unwrap();
        assert_eq!(frame.function, "Object.<anonymous>");
        assert_eq!(frame.file, "http://10.0.2.2:8081/index.bundle");
        assert_eq!(frame.line, Some(12));
        assert_eq!(frame.column, Some(34));

        let frame = match_frame("    at new Widget (app/Widget.js:3:9)").unwrap();
        assert_eq!(frame.function, "new Widget");
    }

    #[test]
    fn test_anonymous_at_file() {
        let frame = match_frame("at index.android.bundle:1:1000").unwrap();
        assert_eq!(frame.function, "anonymous");
        assert_eq!(frame.file, "index.android.bundle");
        assert_eq!(frame.column, Some(1000));
    }

    #[test]
    fn test_compact_frames() {
        let frame = match_frame("myFunction@app/utils/helper.js:42:15").unwrap();
        assert_eq!(frame.function, "myFunction");
        assert_eq!(frame.file, "app/utils/helper.js");
        assert_eq!(frame.line, Some(42));
        assert_eq!(frame.column, Some(15));

        let frame = match_frame("@index.android.bundle:1:77").unwrap();
        assert_eq!(frame.function, "anonymous");

        let frame = match_frame("onPress@index.android.bundle:1453").unwrap();
        assert_eq!(frame.line, Some(1));
        assert_eq!(frame.column, Some(1453));
    }

    #[test]
    fn test_java_frame_is_not_js() {
        assert!(match_frame("    at a.B.c(B.java:10)").is_none());
        assert!(match_frame("    at android.os.Looper.loop(Native Method)").is_none());
        assert!(match_frame("libfoo.so+0x1234").is_none());
    }

    #[test]
    fn test_error_header() {
        assert_eq!(match_error_header("Error: Test"), Some("Error".to_string()));
        assert_eq!(
            match_error_header("TypeError: undefined is not a function"),
            Some("TypeError".to_string())
        );
        assert_eq!(
            match_error_header("Invariant Violation: boom"),
            Some("Invariant Violation".to_string())
        );
        assert_eq!(match_error_header("RangeError"), Some("RangeError".to_string()));
        assert_eq!(match_error_header("java.lang.NullPointerException: x"), None);
        assert_eq!(match_error_header("Caused by: a.b.FooException"), None);
        assert_eq!(match_error_header("ErrorBoundary rendered"), None);
    }

    #[test]
    fn test_rn_exception() {
        assert_eq!(
            match_rn_exception("com.facebook.react.common.JavascriptException: TypeError: x is null"),
            Some("TypeError".to_string())
        );
        assert_eq!(
            match_rn_exception("com.facebook.react.common.JavascriptException: boom"),
            Some("Error".to_string())
        );
        assert_eq!(match_rn_exception("java.lang.IllegalStateException"), None);
    }

    #[test]
    fn test_normalize_and_sanitize() {
        assert_eq!(normalize_function("bound handler"), "handler");
        assert_eq!(normalize_function("<anonymous>"), "anonymous");
        assert_eq!(normalize_function("  "), "anonymous");
        assert_eq!(sanitize_file("main.js?v=3#L1"), "main.js");
        assert_eq!(sanitize_file("main.js#frag"), "main.js");
    }
}
