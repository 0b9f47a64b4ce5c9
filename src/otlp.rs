//! OTLP log-export boundary
//!
//! Crash reports arrive as OpenTelemetry log records: one `ResourceLogs` per
//! app session (build, OS, device), one `LogRecord` per crash. This module
//! decodes export requests and reads the attributes the grouper needs.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::common::v1::{any_value::Value as AnyValueKind, KeyValue};
use prost::Message;
use thiserror::Error;

/// Attribute keys read from resources and log records
pub mod attr {
    // Resource attributes
    pub const APP_BUILD_NAME: &str = "app.build_name";
    pub const APP_BUILD_ID: &str = "app.build_id";
    pub const OS_NAME: &str = "os.name";
    pub const OS_VERSION: &str = "os.version";
    pub const DEVICE_MODEL_NAME: &str = "device.model.name";
    pub const RUM_SDK_VERSION: &str = "rum.sdk.version";
    pub const ACTIVE_INTERACTIONS: &str = "pulse.interaction.active.names";
    pub const BUNDLE_ID: &str = "app.bundle_id";

    // Log record attributes
    pub const PULSE_TYPE: &str = "pulse.type";
    pub const EXCEPTION_STACKTRACE: &str = "exception.stacktrace";
    pub const EXCEPTION_MESSAGE: &str = "exception.message";
    pub const EXCEPTION_TYPE: &str = "exception.type";
    pub const SCREEN_NAME: &str = "screen.name";
    pub const USER_ID: &str = "user.id";
    pub const SESSION_ID: &str = "session.id";
}

/// `pulse.type` value marking a crash record
pub const CRASH_PULSE_TYPE: &str = "crash";

const TRACE_ID_LEN: usize = 16;
const SPAN_ID_LEN: usize = 8;

/// Errors decoding an export request body
#[derive(Error, Debug)]
pub enum OtlpDecodeError {
    #[error("Protobuf decode error: {source}")]
    Protobuf { source: prost::DecodeError },

    #[error("JSON decode error: {source}")]
    Json { source: serde_json::Error },
}

/// Decode a binary protobuf `ExportLogsServiceRequest`
pub fn decode_protobuf(body: &[u8]) -> Result<ExportLogsServiceRequest, OtlpDecodeError> {
    ExportLogsServiceRequest::decode(body).map_err(|source| OtlpDecodeError::Protobuf { source })
}

/// Decode an OTLP/JSON `ExportLogsServiceRequest`
pub fn decode_json(body: &[u8]) -> Result<ExportLogsServiceRequest, OtlpDecodeError> {
    serde_json::from_slice(body).map_err(|source| OtlpDecodeError::Json { source })
}

/// String-valued attributes by key
///
/// Non-string values are skipped. When a key repeats, the last value wins.
pub fn attributes_to_map(attrs: &[KeyValue]) -> HashMap<&str, &str> {
    let mut map = HashMap::with_capacity(attrs.len());
    for kv in attrs {
        if let Some(AnyValueKind::StringValue(s)) = kv.value.as_ref().and_then(|v| v.value.as_ref())
        {
            map.insert(kv.key.as_str(), s.as_str());
        }
    }
    map
}

/// Owned string attribute, empty when absent
pub fn string_attr(map: &HashMap<&str, &str>, key: &str) -> String {
    map.get(key).map(|s| s.to_string()).unwrap_or_default()
}

/// Lowercase hex of a 16-byte trace id; `None` for any other length
pub fn trace_id_hex(bytes: &[u8]) -> Option<String> {
    fixed_len_hex(bytes, TRACE_ID_LEN)
}

/// Lowercase hex of an 8-byte span id; `None` for any other length
pub fn span_id_hex(bytes: &[u8]) -> Option<String> {
    fixed_len_hex(bytes, SPAN_ID_LEN)
}

fn fixed_len_hex(bytes: &[u8], len: usize) -> Option<String> {
    (bytes.len() == len).then(|| hex::encode(bytes))
}

/// Unix nanoseconds as UTC `YYYY-MM-DD HH:MM:SS.fffffffff`
pub fn format_timestamp(unix_nanos: u64) -> String {
    let secs = (unix_nanos / 1_000_000_000) as i64;
    let nanos = (unix_nanos % 1_000_000_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos)
        .unwrap_or_default()
        .format("%Y-%m-%d %H:%M:%S%.9f")
        .to_string()
}

/// Names in a JSON array attribute (`["checkout","login"]`)
///
/// Invalid JSON yields an empty list.
pub fn parse_interactions(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(names) => names,
        Err(err) => {
            tracing::warn!(value = raw, error = %err, "ignoring malformed interaction list");
            Vec::new()
        }
    }
}
