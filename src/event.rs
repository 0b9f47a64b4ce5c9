//! Grouped crash event, one row per crash record
//!
//! Field names serialize as the PascalCase column names of the crash events
//! table (`GroupId`, `ExceptionStackTrace`, ...). `GroupId` is the join key
//! used by alerting and analytics.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StackTraceEvent {
    /// Observed time, UTC `YYYY-MM-DD HH:MM:SS.fffffffff`
    pub timestamp: String,
    pub pulse_type: String,

    pub app_version: String,
    pub app_version_code: String,
    pub platform: String,
    pub os_version: String,
    pub device_model: String,
    pub sdk_version: String,

    pub screen_name: String,
    pub user_id: String,
    pub session_id: String,
    pub interactions: Vec<String>,

    pub exception_message: String,
    pub exception_type: String,

    /// Display name of the group
    pub title: String,
    pub signature: String,
    pub fingerprint: String,
    pub group_id: String,

    /// Reconstructed, symbolicated trace
    pub exception_stack_trace: String,
    /// Trace exactly as received
    pub exception_stack_trace_raw: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub span_id: Option<String>,
}
