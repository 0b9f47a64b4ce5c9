//! Crash fingerprinting
//!
//! Turns parsed frames into a stable group identity:
//! 1. pick the primary lane ([`choose_primary`])
//! 2. pick its exception types ([`types_for_primary`]) and top frames
//!    ([`select_primary_tokens`])
//! 3. render the canonical signature ([`build_signature`])
//! 4. hash it ([`group_id`])
//!
//! Everything here is pure. The group id of a signature must never change
//! between releases or restarts: existing crash groups are keyed by it.
//!
//! # Hash choice
//! `group_id` is `EXC-` followed by the first 16 hex digits (64 bits) of the
//! SHA-256 digest of the UTF-8 signature, uppercased. The full lowercase
//! digest is kept as [`Group::fingerprint`].
//!
//! # Example
//! ```
//! use crashgroup::fingerprint::{build_signature, group_id};
//!
//! let signature = build_signature("ndk", &[] as &[&str], &[] as &[&str]);
//! assert_eq!(signature, "v1|platform:ndk|exc:|frames:");
//!
//! let id = group_id(&signature);
//! assert!(id.starts_with("EXC-"));
//! assert_eq!(id, group_id(&signature));
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::display_name::build_display_name;
use crate::frame::{Frame, Lane, ParsedFrames};

/// Signature format version; bump only together with a regrouping migration
pub const SIGNATURE_VERSION: &str = "v1";

/// Prefix of every group id
pub const GROUP_ID_PREFIX: &str = "EXC-";

/// Hex digits of the digest kept in the group id
pub const GROUP_ID_HEX_LEN: usize = 16;

/// Frames contributing to a signature unless configured otherwise
pub const DEFAULT_TOP_N_FRAMES: usize = 10;

/// Identity of a crash group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub platform: String,
    pub signature: String,
    pub group_id: String,
    pub display_name: String,
    /// Full SHA-256 hex digest of `signature`
    pub fingerprint: String,
}

impl Group {
    /// Build the group for already-selected exception types and frame tokens
    pub fn from_tokens<T: AsRef<str>, U: AsRef<str>>(
        lane: Lane,
        exc_types: &[T],
        tokens: &[U],
    ) -> Self {
        let platform = lane.platform_tag();
        let signature = build_signature(platform, exc_types, tokens);
        let fingerprint = fingerprint(&signature);
        let group_id = group_id_from_fingerprint(&fingerprint);
        let display_name = build_display_name(lane, exc_types, tokens, &group_id);

        Group {
            platform: platform.to_string(),
            signature,
            group_id,
            display_name,
            fingerprint,
        }
    }
}

/// Choose the lane that identifies the crash
///
/// 1. no frames anywhere → `Unknown`
/// 2. the exception-header hint, if that lane has frames
/// 3. the lane with most frames, ties broken JS > JAVA > NDK
pub fn choose_primary(parsed: &ParsedFrames) -> Lane {
    if parsed.is_empty() {
        return Lane::Unknown;
    }

    if let Some(hint) = parsed.primary_exception_lane {
        if parsed.frame_count(hint) > 0 {
            return hint;
        }
    }

    let mut best = Lane::Unknown;
    let mut best_count = 0;
    for lane in Lane::PRIORITY {
        let count = parsed.frame_count(lane);
        // strict > keeps the earlier (higher priority) lane on ties
        if count > best_count {
            best = lane;
            best_count = count;
        }
    }
    best
}

/// Exception types for the chosen lane, falling back to the first
/// non-empty list in JS, JAVA, NDK order
pub fn types_for_primary(parsed: &ParsedFrames, lane: Lane) -> Vec<String> {
    let own = parsed.types(lane);
    if !own.is_empty() {
        return own.to_vec();
    }
    Lane::PRIORITY
        .iter()
        .map(|&fallback| parsed.types(fallback))
        .find(|types| !types.is_empty())
        .map(<[String]>::to_vec)
        .unwrap_or_default()
}

/// Top `top_n` frames of the lane, in-app frames only when there are any
pub fn select_primary_tokens(parsed: &ParsedFrames, lane: Lane, top_n: usize) -> Vec<&Frame> {
    let frames = parsed.frames(lane);
    let any_in_app = frames.iter().any(|f| f.in_app);

    let mut chosen: Vec<&Frame> = frames
        .iter()
        .filter(|f| !any_in_app || f.in_app)
        .collect();
    chosen.sort_by_key(|f| f.original_position);
    chosen.truncate(top_n);
    chosen
}

/// `v1|platform:{platform}|exc:{a>b}|frames:{x>y}`
pub fn build_signature<T: AsRef<str>, U: AsRef<str>>(
    platform: &str,
    exc_types: &[T],
    tokens: &[U],
) -> String {
    let capacity = 32
        + platform.len()
        + exc_types.iter().map(|t| t.as_ref().len() + 1).sum::<usize>()
        + tokens.iter().map(|t| t.as_ref().len() + 1).sum::<usize>();
    let mut signature = String::with_capacity(capacity);

    signature.push_str(SIGNATURE_VERSION);
    signature.push_str("|platform:");
    signature.push_str(platform);
    signature.push_str("|exc:");
    push_joined(&mut signature, exc_types);
    signature.push_str("|frames:");
    push_joined(&mut signature, tokens);
    signature
}

fn push_joined<T: AsRef<str>>(out: &mut String, parts: &[T]) {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push('>');
        }
        out.push_str(part.as_ref());
    }
}

/// Lowercase SHA-256 hex digest of the signature
pub fn fingerprint(signature: &str) -> String {
    hex::encode(Sha256::digest(signature.as_bytes()))
}

/// Stable group id: `EXC-` + first 16 uppercase hex digits of SHA-256
pub fn group_id(signature: &str) -> String {
    group_id_from_fingerprint(&fingerprint(signature))
}

fn group_id_from_fingerprint(fingerprint: &str) -> String {
    let head = &fingerprint[..GROUP_ID_HEX_LEN.min(fingerprint.len())];
    format!("{}{}", GROUP_ID_PREFIX, head.to_ascii_uppercase())
}
