//! Grouping of OTLP log-export batches into StackTraceEvents

use std::sync::Arc;

use opentelemetry_proto::tonic::collector::logs::v1::ExportLogsServiceRequest;
use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue, KeyValue};
use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
use opentelemetry_proto::tonic::resource::v1::Resource;
use prost::Message;

use crashgroup::otlp::{decode_json, decode_protobuf};
use crashgroup::{
    ErrorGrouper, EventMeta, PassthroughSymbolicator, SymbolicationError, Symbolicator,
};

fn make_kv(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.to_string(),
        value: Some(AnyValue {
            value: Some(any_value::Value::StringValue(value.to_string())),
        }),
    }
}

fn resource(attrs: &[(&str, &str)]) -> Option<Resource> {
    Some(Resource {
        attributes: attrs.iter().map(|(k, v)| make_kv(k, v)).collect(),
        ..Default::default()
    })
}

fn crash(stacktrace: &str, extra: &[(&str, &str)]) -> LogRecord {
    let mut attributes = vec![
        make_kv("pulse.type", "crash"),
        make_kv("exception.stacktrace", stacktrace),
    ];
    attributes.extend(extra.iter().map(|(k, v)| make_kv(k, v)));
    LogRecord {
        observed_time_unix_nano: 1_700_000_000_123_456_789,
        attributes,
        ..Default::default()
    }
}

fn android_batch() -> ExportLogsServiceRequest {
    ExportLogsServiceRequest {
        resource_logs: vec![
            ResourceLogs {
                resource: resource(&[
                    ("app.build_name", "3.4.0"),
                    ("app.build_id", "340"),
                    ("os.name", "android"),
                    ("os.version", "14"),
                    ("device.model.name", "Pixel 8"),
                    ("rum.sdk.version", "1.2.0"),
                    ("pulse.interaction.active.names", r#"["checkout","payment"]"#),
                ]),
                scope_logs: vec![ScopeLogs {
                    log_records: vec![
                        LogRecord {
                            trace_id: (1u8..=16).collect(),
                            span_id: vec![0xab; 8],
                            ..crash(
                                "java.lang.NullPointerException: x\n    at a.B.c(B.java:10)",
                                &[
                                    ("exception.message", "x"),
                                    ("exception.type", "java.lang.NullPointerException"),
                                    ("screen.name", "CheckoutActivity"),
                                    ("user.id", "u-1"),
                                    ("session.id", "s-1"),
                                ],
                            )
                        },
                        LogRecord {
                            attributes: vec![make_kv("pulse.type", "anr")],
                            ..Default::default()
                        },
                        crash("Error: Test\n    at f (a.js:1:1)", &[]),
                    ],
                    ..Default::default()
                }],
                ..Default::default()
            },
            ResourceLogs {
                resource: resource(&[("os.name", "ios"), ("app.build_name", "9.0")]),
                scope_logs: vec![
                    ScopeLogs {
                        log_records: vec![crash("", &[])],
                        ..Default::default()
                    },
                    ScopeLogs {
                        log_records: vec![LogRecord {
                            attributes: vec![make_kv("pulse.type", "crash")],
                            ..Default::default()
                        }],
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
        ],
    }
}

fn passthrough() -> ErrorGrouper {
    ErrorGrouper::new(Arc::new(PassthroughSymbolicator))
}

#[tokio::test]
async fn test_batch_emits_one_event_per_crash_in_order() {
    let events = passthrough().process(&android_batch()).await;

    assert_eq!(events.len(), 4);
    let platforms: Vec<&str> = events.iter().map(|e| e.platform.as_str()).collect();
    assert_eq!(platforms, vec!["android", "android", "ios", "ios"]);
    assert!(events[0].signature.contains("exc:NullPointerException"));
    assert!(events[1].signature.starts_with("v1|platform:js|"));
    assert_eq!(events[2].signature, "v1|platform:unknown|exc:|frames:");
    assert_eq!(events[3].exception_stack_trace_raw, "");
}

#[tokio::test]
async fn test_event_columns_are_populated() {
    let events = passthrough().process(&android_batch()).await;
    let event = &events[0];

    assert_eq!(event.timestamp, "2023-11-14 22:13:20.123456789");
    assert_eq!(event.pulse_type, "crash");
    assert_eq!(event.app_version, "3.4.0");
    assert_eq!(event.app_version_code, "340");
    assert_eq!(event.os_version, "14");
    assert_eq!(event.device_model, "Pixel 8");
    assert_eq!(event.sdk_version, "1.2.0");
    assert_eq!(event.interactions, vec!["checkout", "payment"]);
    assert_eq!(event.screen_name, "CheckoutActivity");
    assert_eq!(event.user_id, "u-1");
    assert_eq!(event.session_id, "s-1");
    assert_eq!(event.exception_message, "x");
    assert_eq!(event.exception_type, "java.lang.NullPointerException");
    assert_eq!(
        event.exception_stack_trace_raw,
        "java.lang.NullPointerException: x\n    at a.B.c(B.java:10)"
    );
    assert_eq!(
        event.exception_stack_trace,
        "java.lang.NullPointerException: x\n  at a.B.c(B.java:10)\n"
    );
    assert!(event.group_id.starts_with("EXC-"));
    assert_eq!(
        event.title,
        format!("NullPointerException at c(B.java:10) [{}]", event.group_id)
    );
    assert_eq!(event.fingerprint.len(), 64);
    assert_eq!(
        event.trace_id.as_deref(),
        Some("0102030405060708090a0b0c0d0e0f10")
    );
    assert_eq!(event.span_id.as_deref(), Some("abababababababab"));

    // no correlation ids on the JS record
    assert_eq!(events[1].trace_id, None);
    assert_eq!(events[1].span_id, None);
}

#[tokio::test]
async fn test_group_ids_match_single_trace_grouping() {
    let grouper = passthrough();
    let events = grouper.process(&android_batch()).await;

    let single = grouper
        .process_with_complete_symbolication(
            "Error: Test\n    at f (a.js:1:1)",
            &EventMeta::new("3.4.0", "340", "android"),
        )
        .await;
    assert_eq!(events[1].group_id, single.group.group_id);
}

#[tokio::test]
async fn test_empty_batch() {
    let events = passthrough()
        .process(&ExportLogsServiceRequest::default())
        .await;
    assert!(events.is_empty());
}

/// Fails JS resolution for one app version only
struct FlakyForVersion(&'static str);

#[async_trait::async_trait]
impl Symbolicator for FlakyForVersion {
    async fn symbolicate_js_in_place(
        &self,
        frame_lines: &[String],
        meta: &EventMeta,
    ) -> Result<Vec<String>, SymbolicationError> {
        if meta.app_version == self.0 {
            return Err(SymbolicationError::Timeout(250));
        }
        Ok(frame_lines.iter().map(|l| format!("resolved {}", l.trim())).collect())
    }

    async fn retrace(
        &self,
        frame_lines: &[String],
        _meta: &EventMeta,
    ) -> Result<Vec<String>, SymbolicationError> {
        Ok(frame_lines.to_vec())
    }
}

#[tokio::test]
async fn test_one_record_failing_does_not_affect_others() {
    let js_trace = "Error: Test\n    at f (a.js:1:1)";
    let request = ExportLogsServiceRequest {
        resource_logs: vec![
            ResourceLogs {
                resource: resource(&[("app.build_name", "1.0")]),
                scope_logs: vec![ScopeLogs {
                    log_records: vec![crash(js_trace, &[])],
                    ..Default::default()
                }],
                ..Default::default()
            },
            ResourceLogs {
                resource: resource(&[("app.build_name", "2.0")]),
                scope_logs: vec![ScopeLogs {
                    log_records: vec![crash(js_trace, &[])],
                    ..Default::default()
                }],
                ..Default::default()
            },
        ],
    };

    let grouper = ErrorGrouper::new(Arc::new(FlakyForVersion("1.0")));
    let events = grouper.process(&request).await;

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].signature,
        "v1|platform:js|exc:Error|frames:at f (a.js:1:1)"
    );
    assert_eq!(
        events[1].signature,
        "v1|platform:js|exc:Error|frames:resolved at f (a.js:1:1)"
    );
}

#[tokio::test]
async fn test_protobuf_body_round_trip_through_grouper() {
    let body = android_batch().encode_to_vec();
    let request = decode_protobuf(&body).unwrap();
    let events = passthrough().process(&request).await;
    assert_eq!(events.len(), 4);
}

#[tokio::test]
async fn test_json_body() {
    let body = br#"{
        "resourceLogs": [{
            "resource": {"attributes": [
                {"key": "os.name", "value": {"stringValue": "android"}},
                {"key": "app.build_name", "value": {"stringValue": "5.0.1"}},
                {"key": "pulse.interaction.active.names", "value": {"stringValue": "{broken"}}
            ]},
            "scopeLogs": [{
                "logRecords": [{
                    "observedTimeUnixNano": "1700000000000000000",
                    "attributes": [
                        {"key": "pulse.type", "value": {"stringValue": "crash"}},
                        {"key": "exception.stacktrace", "value": {"stringValue": "libgame.so+0x10"}}
                    ]
                }]
            }]
        }]
    }"#;
    let request = decode_json(body).unwrap();
    let events = passthrough().process(&request).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].app_version, "5.0.1");
    assert!(events[0].interactions.is_empty());
    assert_eq!(events[0].timestamp, "2023-11-14 22:13:20.000000000");
    assert_eq!(
        events[0].signature,
        "v1|platform:android-ndk|exc:|frames:libgame.so+0x10"
    );
}
