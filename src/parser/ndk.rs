//! Native (NDK) frame and signal recognition
//!
//! Shapes:
//! - `libfoo.so+0x1a2b` and `libfoo.so+0x1a2b symbol` (compact)
//! - `#00 pc 0001a2b4  /data/app/.../lib/arm64/libfoo.so (symbol+20)` (tombstone)
//! - `signal 11 (SIGSEGV), code 1 (SEGV_MAPERR)` signal names anywhere

use regex::Regex;
use std::sync::OnceLock;

use crate::frame::NdkFrame;

fn re_tombstone() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*#\d+\s+pc\s+([0-9a-fA-Fx]+)\s+(\S+)(?:\s+\(([^)]+)\))?.*$")
            .expect("re_tombstone: pattern is valid and should always compile")
    })
}

fn re_compact() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\S+?\.so)\+(0x[0-9a-fA-F]+)(?:\s+(.+?))?\s*$")
            .expect("re_compact: pattern is valid and should always compile")
    })
}

fn re_signal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bSIG(?:SEGV|ABRT|BUS|FPE|ILL|TRAP|SYS|KILL|PIPE|STKFLT|QUIT)\b")
            .expect("re_signal: pattern is valid and should always compile")
    })
}

/// Recognise an NDK frame line
pub fn match_frame(line: &str) -> Option<NdkFrame> {
    if let Some(caps) = re_tombstone().captures(line) {
        return Some(NdkFrame {
            library: basename(&caps[2]),
            program_counter_hex: caps[1].to_string(),
            symbol: caps.get(3).and_then(|m| normalize_symbol(m.as_str())),
        });
    }
    if let Some(caps) = re_compact().captures(line) {
        return Some(NdkFrame {
            library: basename(&caps[1]),
            program_counter_hex: caps[2].to_string(),
            symbol: caps.get(3).and_then(|m| normalize_symbol(m.as_str())),
        });
    }
    None
}

/// Signal name mentioned on the line (e.g., `SIGSEGV`)
pub fn match_signal(trimmed: &str) -> Option<String> {
    re_signal().find(trimmed).map(|m| m.as_str().to_string())
}

/// `abort+124` → `abort`; blank → none
fn normalize_symbol(symbol: &str) -> Option<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return None;
    }
    let name = symbol.split('+').next().unwrap_or(symbol).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn basename(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    match normalized.rfind('/') {
        Some(slash) => normalized[slash + 1..].to_string(),
        None => normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_frame() {
        let frame = match_frame("libnative.so+0x1234").unwrap();
        assert_eq!(frame.library, "libnative.so");
        assert_eq!(frame.program_counter_hex, "0x1234");
        assert_eq!(frame.symbol, None);

        let frame = match_frame("  libgame.so+0xdeadbeef  Engine::tick+16").unwrap();
        assert_eq!(frame.library, "libgame.so");
        assert_eq!(frame.symbol.as_deref(), Some("Engine::tick"));
    }

    #[test]
    fn test_tombstone_frame() {
        let frame = match_frame(
            "    #00 pc 000000000004f1c4  /apex/com.android.runtime/lib64/bionic/libc.so (abort+164)",
        )
        .unwrap();
        assert_eq!(frame.library, "libc.so");
        assert_eq!(frame.program_counter_hex, "000000000004f1c4");
        assert_eq!(frame.symbol.as_deref(), Some("abort"));

        let frame = match_frame("#01 pc 0x00012345 /data/app/lib/arm64/libgame.so").unwrap();
        assert_eq!(frame.library, "libgame.so");
        assert_eq!(frame.symbol, None);
    }

    #[test]
    fn test_non_native_lines() {
        assert!(match_frame("    at a.B.c(B.java:10)").is_none());
        assert!(match_frame("Error: Test").is_none());
        assert!(match_frame("f@a.js:1:1").is_none());
    }

    #[test]
    fn test_signal() {
        assert_eq!(
            match_signal("signal 11 (SIGSEGV), code 1 (SEGV_MAPERR), fault addr 0x0"),
            Some("SIGSEGV".to_string())
        );
        assert_eq!(match_signal("Fatal signal 6 (SIGABRT)"), Some("SIGABRT".to_string()));
        assert_eq!(match_signal("at com.example.SIGNALS.run(S.java:1)"), None);
    }
}
