//! Error grouping orchestrator
//!
//! Wires the pipeline together for one raw trace:
//!
//! ```text
//! raw text → parse → symbolicate (JS ∥ Java) → choose lane
//!          → types + top frames → signature → group id → display name
//! ```
//!
//! and for an OTLP log-export batch, where every crash record goes through
//! the same pipeline concurrently and becomes one [`StackTraceEvent`].
//!
//! Grouping never fails. Unparseable text groups as `unknown`; a failed
//! symbolication degrades to the raw frames of that lane only.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::{join, join_all};
use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs};

use crate::config::GrouperConfig;
use crate::event::StackTraceEvent;
use crate::fingerprint::{choose_primary, select_primary_tokens, types_for_primary, Group};
use crate::frame::{Frame, Lane};
use crate::otlp::{self, attr, CRASH_PULSE_TYPE};
use crate::parser;
use crate::reconstruct::CompleteSymbolication;
use crate::symbolicator::{align_resolved, EventMeta, Symbolicator};

/// Outcome of grouping one raw stack trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub group: Group,
    /// Lane the group was derived from
    pub lane: Lane,
    /// Exception types that entered the signature
    pub exception_types: Vec<String>,
    /// Parsed frames with their resolved text
    pub complete: CompleteSymbolication,
}

/// Groups crash stack traces, resolving frames through a [`Symbolicator`]
#[derive(Clone)]
pub struct ErrorGrouper {
    symbolicator: Arc<dyn Symbolicator>,
    config: GrouperConfig,
}

impl std::fmt::Debug for ErrorGrouper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorGrouper")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ErrorGrouper {
    pub fn new(symbolicator: Arc<dyn Symbolicator>) -> Self {
        Self::with_config(symbolicator, GrouperConfig::default())
    }

    pub fn with_config(symbolicator: Arc<dyn Symbolicator>, config: GrouperConfig) -> Self {
        Self {
            symbolicator,
            config,
        }
    }

    pub fn config(&self) -> &GrouperConfig {
        &self.config
    }

    /// Group one raw stack trace, symbolicating JS and Java frames
    ///
    /// Both lanes are resolved concurrently. NDK frames are kept as written.
    pub async fn process_with_complete_symbolication(
        &self,
        raw_stack_trace: &str,
        meta: &EventMeta,
    ) -> ProcessingResult {
        let parsed = parser::parse(raw_stack_trace, &self.config.in_app);

        let js_raw = raw_lines(&parsed.js_frames);
        let java_raw = raw_lines(&parsed.java_frames);
        let (js_resolved, java_resolved) = join(
            self.resolve(Lane::Js, &js_raw, meta),
            self.resolve(Lane::Java, &java_raw, meta),
        )
        .await;

        let complete = CompleteSymbolication::new(parsed, js_resolved, java_resolved);
        group_complete(complete, self.config.top_n_frames)
    }

    async fn resolve(&self, lane: Lane, raw: &[String], meta: &EventMeta) -> Vec<String> {
        if raw.is_empty() {
            return Vec::new();
        }
        let resolved = match lane {
            Lane::Js => self.symbolicator.symbolicate_js_in_place(raw, meta).await,
            Lane::Java => self.symbolicator.retrace(raw, meta).await,
            Lane::Ndk | Lane::Unknown => return raw.to_vec(),
        };
        align_resolved(lane, raw, resolved)
    }

    /// Group every crash record of an OTLP log-export batch
    ///
    /// Only records with `pulse.type == "crash"` are processed. Events come
    /// out in batch order (resource, scope, record).
    pub async fn process(&self, request: &ExportLogsServiceRequest) -> Vec<StackTraceEvent> {
        let resources: Vec<ResourceContext> = request
            .resource_logs
            .iter()
            .map(ResourceContext::from_resource_logs)
            .collect();

        let mut pending = Vec::new();
        for (resource_logs, resource) in request.resource_logs.iter().zip(&resources) {
            for scope_logs in &resource_logs.scope_logs {
                for record in &scope_logs.log_records {
                    let attrs = otlp::attributes_to_map(&record.attributes);
                    if is_crash(&attrs) {
                        pending.push(self.process_record(resource, record, attrs));
                    }
                }
            }
        }

        tracing::debug!(records = pending.len(), "grouping crash batch");
        join_all(pending).await
    }

    async fn process_record(
        &self,
        resource: &ResourceContext,
        record: &LogRecord,
        attrs: HashMap<&str, &str>,
    ) -> StackTraceEvent {
        let raw_stack_trace = otlp::string_attr(&attrs, attr::EXCEPTION_STACKTRACE);

        let result = self
            .process_with_complete_symbolication(&raw_stack_trace, &resource.meta)
            .await;
        tracing::debug!(
            group_id = %result.group.group_id,
            lane = %result.lane,
            "grouped crash record"
        );

        StackTraceEvent {
            timestamp: otlp::format_timestamp(record.observed_time_unix_nano),
            pulse_type: otlp::string_attr(&attrs, attr::PULSE_TYPE),
            app_version: resource.meta.app_version.clone(),
            app_version_code: resource.meta.app_version_code.clone(),
            platform: resource.meta.platform.clone(),
            os_version: resource.os_version.clone(),
            device_model: resource.device_model.clone(),
            sdk_version: resource.sdk_version.clone(),
            screen_name: otlp::string_attr(&attrs, attr::SCREEN_NAME),
            user_id: otlp::string_attr(&attrs, attr::USER_ID),
            session_id: otlp::string_attr(&attrs, attr::SESSION_ID),
            interactions: resource.interactions.clone(),
            exception_message: otlp::string_attr(&attrs, attr::EXCEPTION_MESSAGE),
            exception_type: otlp::string_attr(&attrs, attr::EXCEPTION_TYPE),
            exception_stack_trace: result.complete.reconstruct_stack_trace(),
            exception_stack_trace_raw: raw_stack_trace,
            title: result.group.display_name,
            signature: result.group.signature,
            fingerprint: result.group.fingerprint,
            group_id: result.group.group_id,
            trace_id: otlp::trace_id_hex(&record.trace_id),
            span_id: otlp::span_id_hex(&record.span_id),
        }
    }
}

/// Group a trace without symbolication
///
/// Same result as [`ErrorGrouper::process_with_complete_symbolication`] with
/// a symbolicator that resolves nothing.
pub fn group_unsymbolicated(raw_stack_trace: &str, config: &GrouperConfig) -> ProcessingResult {
    let parsed = parser::parse(raw_stack_trace, &config.in_app);
    let js_raw = raw_lines(&parsed.js_frames);
    let java_raw = raw_lines(&parsed.java_frames);
    let complete = CompleteSymbolication::new(parsed, js_raw, java_raw);
    group_complete(complete, config.top_n_frames)
}

/// Lane selection, fingerprinting and naming over resolved frames
fn group_complete(complete: CompleteSymbolication, top_n_frames: usize) -> ProcessingResult {
    let lane = choose_primary(&complete.parsed);
    let exception_types = types_for_primary(&complete.parsed, lane);
    let tokens: Vec<&str> = select_primary_tokens(&complete.parsed, lane, top_n_frames)
        .into_iter()
        .map(|frame| complete.resolved_line(frame))
        .collect();

    let group = Group::from_tokens(lane, &exception_types, &tokens);

    ProcessingResult {
        group,
        lane,
        exception_types,
        complete,
    }
}

fn raw_lines(frames: &[Frame]) -> Vec<String> {
    frames.iter().map(|f| f.raw_line.clone()).collect()
}

fn is_crash(attrs: &HashMap<&str, &str>) -> bool {
    attrs
        .get(attr::PULSE_TYPE)
        .is_some_and(|pulse_type| *pulse_type == CRASH_PULSE_TYPE)
}

/// Resource attributes shared by every record of a `ResourceLogs`
#[derive(Debug, Clone, Default)]
struct ResourceContext {
    meta: EventMeta,
    os_version: String,
    device_model: String,
    sdk_version: String,
    interactions: Vec<String>,
}

impl ResourceContext {
    fn from_resource_logs(resource_logs: &ResourceLogs) -> Self {
        let Some(resource) = resource_logs.resource.as_ref() else {
            return Self::default();
        };
        let attrs = otlp::attributes_to_map(&resource.attributes);

        let mut meta = EventMeta::new(
            otlp::string_attr(&attrs, attr::APP_BUILD_NAME),
            otlp::string_attr(&attrs, attr::APP_BUILD_ID),
            otlp::string_attr(&attrs, attr::OS_NAME),
        );
        meta.bundle_id = attrs.get(attr::BUNDLE_ID).map(|s| s.to_string());

        Self {
            meta,
            os_version: otlp::string_attr(&attrs, attr::OS_VERSION),
            device_model: otlp::string_attr(&attrs, attr::DEVICE_MODEL_NAME),
            sdk_version: otlp::string_attr(&attrs, attr::RUM_SDK_VERSION),
            interactions: otlp::parse_interactions(attrs.get(attr::ACTIVE_INTERACTIONS).copied()),
        }
    }
}
