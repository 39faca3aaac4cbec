//! # Test library functions
//!
//! Common helpers for the transformer integration tests: building Firehose events,
//! reading responses and emulating the CloudWatch Logs JSON API with wiremock.
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use std::env::set_var;
use transformer_lib::TransformResult;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const DESCRIBE_LOG_STREAMS_TARGET: &str = "Logs_20140328.DescribeLogStreams";
pub const PUT_LOG_EVENTS_TARGET: &str = "Logs_20140328.PutLogEvents";

/// # Builds a Firehose event from plain-text payloads
pub fn firehose_event(records: &[(&str, &str)]) -> Value {
    event_with_records(
        records
            .iter()
            .map(|(record_id, text)| record_json(record_id, &STANDARD.encode(text)))
            .collect(),
    )
}

/// # Builds a Firehose event with the `data` fields used as given
pub fn raw_firehose_event(records: &[(&str, &str)]) -> Value {
    event_with_records(
        records
            .iter()
            .map(|(record_id, data)| record_json(record_id, data))
            .collect(),
    )
}

fn record_json(record_id: &str, data: &str) -> Value {
    json!({
        "recordId": record_id,
        "approximateArrivalTimestamp": 1704794445000_i64,
        "data": data
    })
}

fn event_with_records(records: Vec<Value>) -> Value {
    json!({
        "invocationId": "00540a87-5050-496a-84e4-e7d92bbaf5e2",
        "deliveryStreamArn": "arn:aws:firehose:us-east-1:123456789012:deliverystream/application-logs",
        "region": "us-east-1",
        "records": records
    })
}

/// # Decodes the base64 data of a result
pub fn decoded_data(result: &TransformResult) -> String {
    let data = result.data.as_deref().unwrap_or_default();
    String::from_utf8(STANDARD.decode(data).unwrap()).unwrap()
}

/// # Parses the newline-delimited JSON line of a structured result
pub fn decoded_json(result: &TransformResult) -> Value {
    let line = decoded_data(result);
    assert!(line.ends_with('\n'), "expected a trailing newline in {line:?}");
    serde_json::from_str(line.trim_end()).unwrap()
}

/// # Sets static credentials so the SDK can sign requests to the mock server
pub fn set_test_credentials() {
    set_var("AWS_ACCESS_KEY_ID", "test-access-key");
    set_var("AWS_SECRET_ACCESS_KEY", "test-secret-key");
    set_var("AWS_REGION", "us-east-1");
}

/// # Answers DescribeLogStreams with a single stream holding `token`
pub async fn mount_describe_log_streams(server: &MockServer, stream: &str, token: Option<&str>) {
    let mut log_stream = json!({ "logStreamName": stream });
    if let Some(token) = token {
        log_stream["uploadSequenceToken"] = json!(token);
    }
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", DESCRIBE_LOG_STREAMS_TARGET))
        .respond_with(aws_json_response(200, json!({ "logStreams": [log_stream] })))
        .mount(server)
        .await;
}

/// # Answers every PutLogEvents call with `next_token`
pub async fn mount_put_log_events(server: &MockServer, next_token: &str) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", PUT_LOG_EVENTS_TARGET))
        .respond_with(aws_json_response(200, json!({ "nextSequenceToken": next_token })))
        .mount(server)
        .await;
}

/// # Rejects every PutLogEvents call with an invalid sequence token error
pub async fn mount_put_log_events_failure(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", PUT_LOG_EVENTS_TARGET))
        .respond_with(aws_json_response(
            400,
            json!({
                "__type": "InvalidSequenceTokenException",
                "message": "The given sequenceToken is invalid."
            }),
        ))
        .mount(server)
        .await;
}

/// # The JSON bodies of the requests received for an API target
pub async fn requests_for(server: &MockServer, target: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| target_of(request) == Some(target))
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

fn target_of(request: &Request) -> Option<&str> {
    request
        .headers
        .get("x-amz-target")
        .and_then(|value| value.to_str().ok())
}

fn aws_json_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.to_string(), "application/x-amz-json-1.1")
}
