//! Java / Kotlin / Android frame and header recognition
//!
//! Shapes:
//! - `at com.example.Foo.bar(Foo.java:42)` frame
//! - `at com.example.Foo.bar(Native Method)` / `(Unknown Source)` frame
//! - `com.example.FooException: message` outer header
//! - `Exception in thread "main" com.example.FooException: message` outer header
//! - `Caused by: com.example.BarException: message` chained header

use regex::Regex;
use std::sync::OnceLock;

use crate::frame::JavaFrame;

fn re_at_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*at\s+([^\s(]+)\(([^)]*)\)\s*$")
            .expect("re_at_line: pattern is valid and should always compile")
    })
}

fn re_top_type() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(?:Exception in thread ".*?"\s+)?([\w$]+(?:\.[\w$]+)+)(?::.*)?$"#)
            .expect("re_top_type: pattern is valid and should always compile")
    })
}

fn re_caused_by() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*Caused by:\s*([\w.$]+)(?::.*)?$")
            .expect("re_caused_by: pattern is valid and should always compile")
    })
}

fn re_anonymous_class() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\d+").expect("re_anonymous_class: pattern is valid and should always compile")
    })
}

/// Recognise a Java frame line
pub fn match_frame(line: &str) -> Option<JavaFrame> {
    let caps = re_at_line().captures(line)?;
    let (class, method) = split_class_method(&caps[1]);
    let (file, line_no) = split_file_line(&caps[2]);
    Some(JavaFrame {
        class,
        method,
        file,
        line: line_no,
    })
}

/// Simple type name of an outermost `pkg.FooException: message` header
pub fn match_top_header(trimmed: &str) -> Option<String> {
    re_top_type()
        .captures(trimmed)
        .map(|caps| simple_name(&caps[1]))
}

/// Simple type name of a `Caused by: pkg.BarException` line
pub fn match_caused_by(line: &str) -> Option<String> {
    re_caused_by()
        .captures(line)
        .map(|caps| simple_name(&caps[1]))
}

/// `java.lang.NullPointerException` → `NullPointerException`
pub fn simple_name(fqcn: &str) -> String {
    fqcn.rsplit('.').next().unwrap_or(fqcn).to_string()
}

/// Split `module//pkg.Class$1.method` into (`pkg.Class`, `method`)
fn split_class_method(qualified: &str) -> (String, String) {
    let qualified = match qualified.rfind('/') {
        Some(slash) => &qualified[slash + 1..],
        None => qualified,
    };
    match qualified.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < qualified.len() => {
            let class = re_anonymous_class()
                .replace_all(&qualified[..dot], "")
                .into_owned();
            let method = &qualified[dot + 1..];
            let method = if method.contains("lambda$") {
                "lambda".to_string()
            } else {
                method.to_string()
            };
            (class, method)
        }
        _ => (qualified.to_string(), String::new()),
    }
}

/// Split `Foo.java:42` into (`Foo.java`, 42); `Native Method` has no line
fn split_file_line(location: &str) -> (Option<String>, Option<u32>) {
    let location = location.trim();
    if location.is_empty() {
        return (None, None);
    }
    match location.split_once(':') {
        Some((file, line)) if !file.is_empty() => {
            (Some(file.to_string()), line.trim().parse().ok())
        }
        _ => (Some(location.to_string()), None),
    }
}
