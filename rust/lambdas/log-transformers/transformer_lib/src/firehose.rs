//! # Firehose record-transformation contract
//!
//! The delivery stream invokes a transformer with:
//! ```json
//! {
//!   "records": [
//!     { "recordId": "49546986683135544286507457936321625675700192471156785154", "data": "aGVsbG8=" }
//!   ]
//! }
//! ```
//! and expects one output record per input record, in the same order:
//! ```json
//! {
//!   "records": [
//!     { "recordId": "49546986683135544286507457936321625675700192471156785154", "result": "Ok", "data": "..." }
//!   ]
//! }
//! ```
use crate::error::{BatchError, DecodeError};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// # The batch handed to one invocation
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseEvent {
    #[serde(default)]
    pub invocation_id: Option<String>,
    #[serde(default)]
    pub delivery_stream_arn: Option<String>,
    pub records: Vec<FirehoseRecord>,
}

/// # A single encoded input record
///
/// `data` is kept as raw JSON so that a missing or mistyped payload fails only
/// its own record when decoded.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseRecord {
    pub record_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// # Per-record status understood by the delivery stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RecordResult {
    Ok,
    ProcessingFailed,
}

/// # One transformed output record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub record_id: String,
    pub result: RecordResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// # The invocation response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FirehoseResponse {
    pub records: Vec<TransformResult>,
}

impl FirehoseRecord {
    pub fn new(record_id: impl Into<String>, data: impl Into<String>) -> Self {
        FirehoseRecord {
            record_id: record_id.into(),
            data: Some(Value::String(data.into())),
        }
    }

    /// The base64 payload, if the record carries one as a string.
    pub fn raw_data(&self) -> Option<&str> {
        self.data.as_ref().and_then(Value::as_str)
    }

    /// # Decodes the record payload into text
    pub fn decode(&self) -> Result<String, DecodeError> {
        let data = self.raw_data().ok_or(DecodeError::MissingData)?;
        let bytes = STANDARD.decode(data.as_bytes())?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl TransformResult {
    pub fn ok(record_id: impl Into<String>, data: String) -> Self {
        TransformResult {
            record_id: record_id.into(),
            result: RecordResult::Ok,
            data: Some(data),
        }
    }

    pub fn failed(record_id: impl Into<String>, data: Option<String>) -> Self {
        TransformResult {
            record_id: record_id.into(),
            result: RecordResult::ProcessingFailed,
            data,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == RecordResult::Ok
    }
}

impl FirehoseEvent {
    /// # Parses the raw invocation payload
    pub fn from_value(value: Value) -> Result<FirehoseEvent, BatchError> {
        Ok(serde_json::from_value(value)?)
    }
}

impl FirehoseResponse {
    /// # Fails every record that can still be identified in a malformed payload
    ///
    /// Entries without a string `recordId` cannot be answered and are skipped.
    pub fn failed_for(raw_event: &Value) -> FirehoseResponse {
        let records = raw_event
            .get("records")
            .and_then(Value::as_array)
            .map(|records| {
                records
                    .iter()
                    .filter_map(|record| record.get("recordId").and_then(Value::as_str))
                    .map(|record_id| TransformResult::failed(record_id, None))
                    .collect()
            })
            .unwrap_or_default();
        FirehoseResponse { records }
    }

    pub fn accepted(&self) -> usize {
        self.records.iter().filter(|record| record.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.accepted()
    }
}

/// # Base64-encodes bytes for the response
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}
