//! ## Log structuring transform
//!
//! Turns each record of a batch into a line of newline-delimited JSON:
//!
//! * JSON objects are passed through with a fresh `@timestamp`.
//! * Anything else is treated as a free-text log line and wrapped in a
//!   [`StructuredLogEntry`].
//!
//! Records that cannot be decoded are returned as `ProcessingFailed` with their
//! original data, and the rest of the batch carries on.
use crate::error::TransformError;
use crate::firehose::{encode, FirehoseRecord, TransformResult};
use crate::heuristics::{classify_level, extract_timestamp, LogLevel};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// Tag identifying records that did not come from a managed AWS service.
pub const EXTERNAL_SOURCE: &str = "on-premise";

/// Field holding the processing time on every output record.
pub const TIMESTAMP_FIELD: &str = "@timestamp";

/// # A free-text log line after parsing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredLogEntry {
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    pub message: String,
    pub level: LogLevel,
    pub source: String,
    #[serde(rename = "log_timestamp", skip_serializing_if = "Option::is_none")]
    pub extracted_timestamp: Option<String>,
}

impl StructuredLogEntry {
    pub fn parse(line: &str, now: DateTime<Utc>) -> StructuredLogEntry {
        StructuredLogEntry {
            timestamp: iso_timestamp(now),
            message: line.to_string(),
            level: classify_level(line),
            source: EXTERNAL_SOURCE.to_string(),
            extracted_timestamp: extract_timestamp(line),
        }
    }
}

fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// # Structures one trimmed log line as a single line of JSON
///
/// The returned string does not include the trailing newline.
pub fn structure_line(line: &str, now: DateTime<Utc>) -> Result<String, TransformError> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(mut fields)) => {
            fields.insert(TIMESTAMP_FIELD.to_string(), Value::String(iso_timestamp(now)));
            Ok(serde_json::to_string(&fields)?)
        }
        _ => Ok(serde_json::to_string(&StructuredLogEntry::parse(line, now))?),
    }
}

/// # Transforms a single record into base64 newline-delimited JSON
pub fn transform_record(
    record: &FirehoseRecord,
    now: DateTime<Utc>,
) -> Result<String, TransformError> {
    let text = record.decode()?;
    let mut structured = structure_line(text.trim(), now)?;
    structured.push('\n');
    Ok(encode(structured))
}

/// # Transforms a batch, one result per record in input order
pub fn transform(records: &[FirehoseRecord]) -> Vec<TransformResult> {
    records.iter().fold(
        Vec::with_capacity(records.len()),
        |mut results, record| {
            let result = match transform_record(record, Utc::now()) {
                Ok(data) => TransformResult::ok(&record.record_id, data),
                Err(err) => {
                    error!(record_id = %record.record_id, "Error processing record: {err}");
                    TransformResult::failed(&record.record_id, record.raw_data().map(str::to_string))
                }
            };
            results.push(result);
            results
        },
    )
}

#[cfg(test)]
mod test {
    use crate::firehose::{encode, FirehoseRecord, RecordResult};
    use crate::structure::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 9, 12, 0, 0).unwrap()
    }

    fn record(record_id: &str, text: &str) -> FirehoseRecord {
        FirehoseRecord::new(record_id, encode(text))
    }

    fn decode_output(data: &str) -> String {
        String::from_utf8(STANDARD.decode(data).unwrap()).unwrap()
    }

    #[test]
    fn structures_a_plain_text_line() {
        let line = structure_line("2024-01-09 10:30:45 [ERROR] Application error: boom", fixed_time())
            .unwrap();

        assert_eq!(
            line,
            r#"{"@timestamp":"2024-01-09T12:00:00.000000Z","message":"2024-01-09 10:30:45 [ERROR] Application error: boom","level":"ERROR","source":"on-premise","log_timestamp":"2024-01-09T10:30:45"}"#
        );
    }

    #[test]
    fn omits_log_timestamp_when_none_is_found() {
        let value: Value =
            serde_json::from_str(&structure_line("plain message", fixed_time()).unwrap()).unwrap();

        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "plain message");
        assert!(value.get("log_timestamp").is_none());
    }

    #[test]
    fn passes_json_objects_through_with_a_fresh_timestamp() {
        let line = structure_line(
            r#"{"msg":"hi","@timestamp":"old","nested":{"a":1}}"#,
            fixed_time(),
        )
        .unwrap();

        assert_eq!(
            line,
            r#"{"msg":"hi","@timestamp":"2024-01-09T12:00:00.000000Z","nested":{"a":1}}"#
        );
    }

    #[test]
    fn json_scalars_are_treated_as_text() {
        let value: Value =
            serde_json::from_str(&structure_line("42", fixed_time()).unwrap()).unwrap();

        assert_eq!(value["message"], "42");
        assert_eq!(value["source"], "on-premise");
    }

    #[test]
    fn transform_record_appends_a_newline_and_trims_input() {
        let data = transform_record(&record("1", "  WARN: low memory \n"), fixed_time()).unwrap();
        let output = decode_output(&data);

        assert!(output.ends_with("}\n"));
        let value: Value = serde_json::from_str(output.trim_end()).unwrap();
        assert_eq!(value["message"], "WARN: low memory");
        assert_eq!(value["level"], "WARN");
    }

    #[test]
    fn structuring_twice_only_changes_the_timestamp() {
        let first = transform_record(&record("1", r#"{"user":"ann","count":3}"#), fixed_time())
            .unwrap();
        let later = fixed_time() + chrono::Duration::seconds(5);
        let second = transform_record(
            &FirehoseRecord::new("1", first.clone()),
            later,
        )
        .unwrap();

        let first: Value = serde_json::from_str(decode_output(&first).trim_end()).unwrap();
        let second: Value = serde_json::from_str(decode_output(&second).trim_end()).unwrap();
        assert_eq!(first["user"], second["user"]);
        assert_eq!(first["count"], second["count"]);
        assert_eq!(second["@timestamp"], "2024-01-09T12:00:05.000000Z");
        assert_ne!(first["@timestamp"], second["@timestamp"]);
    }

    #[test]
    fn malformed_record_fails_alone_and_keeps_its_data() {
        let records = vec![
            record("1", "first"),
            FirehoseRecord::new("2", "%%% not base64"),
            record("3", r#"{"ok":true}"#),
        ];

        let results = transform(&records);

        assert_eq!(results.len(), 3);
        let ids: Vec<&str> = results.iter().map(|r| r.record_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(results[0].result, RecordResult::Ok);
        assert_eq!(results[1].result, RecordResult::ProcessingFailed);
        assert_eq!(results[1].data.as_deref(), Some("%%% not base64"));
        assert_eq!(results[2].result, RecordResult::Ok);
        assert_eq!(
            serde_json::from_str::<Value>(decode_output(results[2].data.as_ref().unwrap()).trim_end())
                .unwrap()["ok"],
            json!(true)
        );
    }

    #[test]
    fn record_without_string_data_fails_without_data() {
        let records = vec![
            FirehoseRecord {
                record_id: "1".to_string(),
                data: Some(json!(7)),
            },
            record("2", "hello"),
        ];

        let results = transform(&records);

        assert_eq!(results[0].result, RecordResult::ProcessingFailed);
        assert_eq!(results[0].data, None);
        assert_eq!(results[1].result, RecordResult::Ok);
    }

    #[test]
    fn large_integers_pass_through_unchanged() {
        let line = structure_line(
            r#"{"trace_id":123456789012345678901234567890,"x":1,"ratio":0.10}"#,
            fixed_time(),
        )
        .unwrap();

        assert_eq!(
            line,
            r#"{"trace_id":123456789012345678901234567890,"x":1,"ratio":0.10,"@timestamp":"2024-01-09T12:00:00.000000Z"}"#
        );
    }

    #[test]
    fn empty_batch_yields_no_results() {
        assert!(transform(&[]).is_empty());
    }
}
