//! crashgroup - crash stack-trace parsing, symbolication and error grouping
//!
//! This library turns raw crash stack traces from mobile apps (JavaScript /
//! React Native, Java / Kotlin, native NDK code, or any mix of them) into
//! stable crash groups. Identical crashes always map to the same `EXC-` group
//! id, across releases and restarts, so they can be counted and alerted on.
//!
//! # Example
//! ```
//! use crashgroup::{group_unsymbolicated, GrouperConfig};
//!
//! let result = group_unsymbolicated(
//!     "java.lang.NullPointerException: x\n    at a.B.c(B.java:10)",
//!     &GrouperConfig::default(),
//! );
//! assert_eq!(result.group.platform, "java");
//! assert!(result.group.signature.contains("exc:NullPointerException"));
//! ```

pub mod cli;
pub mod config;
pub mod display_name;
pub mod event;
pub mod fingerprint;
pub mod frame;
pub mod grouping;
pub mod in_app;
pub mod otlp;
pub mod parser;
pub mod reconstruct;
pub mod symbolicator;

pub use config::{ConfigError, GrouperConfig};
pub use event::StackTraceEvent;
pub use fingerprint::Group;
pub use frame::{Frame, FrameKind, Lane, ParsedFrames};
pub use grouping::{group_unsymbolicated, ErrorGrouper, ProcessingResult};
pub use in_app::InAppRules;
pub use otlp::{span_id_hex, trace_id_hex, OtlpDecodeError};
pub use reconstruct::CompleteSymbolication;
pub use symbolicator::{EventMeta, PassthroughSymbolicator, SymbolicationError, Symbolicator};
