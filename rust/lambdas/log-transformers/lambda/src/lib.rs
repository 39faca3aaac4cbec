//! Firehose transformation lambdas
//!
//! Two handlers sharing the Firehose record-transformation contract:
//!
//! * `structurer` turns raw log lines into newline-delimited JSON for the
//!   delivery stream to store.
//! * `forwarder` appends the records to the CloudWatch Logs stream named by
//!   `LOG_GROUP_NAME` and returns empty records so the delivery stream stores
//!   nothing.
//!
//! Given the following input:
//! ```json
//! {
//!   "records": [
//!     { "recordId": "1", "data": "MjAyNC0wMS0wOSAxMDozMDo0NSBbRVJST1JdIGRpc2sgZnVsbA==" }
//!   ]
//! }
//! ```
//! either lambda answers with one `{recordId, result, data}` entry per record. A
//! payload that is not a record batch is answered with `ProcessingFailed` for
//! every `recordId` that can be found in it.
use serde_json::Value;
use tracing::{error, info};
use transformer_lib::firehose::{FirehoseEvent, FirehoseResponse};
use transformer_lib::{forward, structure, ForwarderConfig, LogSink};

/// # Handles one invocation of the structuring transform
pub fn process_structuring_event(event: Value) -> FirehoseResponse {
    let batch = match FirehoseEvent::from_value(event.clone()) {
        Ok(batch) => batch,
        Err(err) => {
            error!("Error in log structuring transform: {err}");
            return FirehoseResponse::failed_for(&event);
        }
    };

    let response = FirehoseResponse {
        records: structure::transform(&batch.records),
    };
    info!(
        invocation_id = batch.invocation_id.as_deref().unwrap_or_default(),
        delivery_stream = batch.delivery_stream_arn.as_deref().unwrap_or_default(),
        records = response.records.len(),
        accepted = response.accepted(),
        failed = response.failed(),
        "Structured record batch"
    );
    response
}

/// # Handles one invocation of the sink forwarder
///
/// The sink is created once per process and `config` is read for every
/// invocation.
pub async fn process_forwarding_event<S: LogSink>(
    event: Value,
    sink: &S,
    config: &ForwarderConfig,
) -> FirehoseResponse {
    let batch = match FirehoseEvent::from_value(event.clone()) {
        Ok(batch) => batch,
        Err(err) => {
            error!("Error in CloudWatch Logs sender: {err}");
            return FirehoseResponse::failed_for(&event);
        }
    };

    let response = FirehoseResponse {
        records: forward::forward(sink, &batch.records, config).await,
    };
    info!(
        invocation_id = batch.invocation_id.as_deref().unwrap_or_default(),
        delivery_stream = batch.delivery_stream_arn.as_deref().unwrap_or_default(),
        records = response.records.len(),
        accepted = response.accepted(),
        failed = response.failed(),
        log_group = %config.log_group_name,
        log_stream = %config.log_stream_name,
        "Forwarded record batch"
    );
    response
}

/// # Installs the log subscriber used by both binaries
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
}

#[cfg(test)]
mod test {
    use crate::process_structuring_event;
    use serde_json::json;
    use transformer_lib::RecordResult;

    #[test]
    fn structures_every_record_in_order() {
        let event = json!({"records": [
            {"recordId": "a", "data": "aGVsbG8="},
            {"recordId": "b", "data": "e30="}
        ]});

        let response = process_structuring_event(event);

        let ids: Vec<&str> = response.records.iter().map(|r| r.record_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(response.records.iter().all(|r| r.result == RecordResult::Ok));
    }

    #[test]
    fn mistyped_data_fails_only_its_record() {
        let event = json!({"records": [
            {"recordId": "1", "data": 7},
            {"recordId": "2", "data": "aGVsbG8="},
            {"recordId": "3"}
        ]});

        let response = process_structuring_event(event);

        let results: Vec<(&str, RecordResult)> = response
            .records
            .iter()
            .map(|r| (r.record_id.as_str(), r.result))
            .collect();
        assert_eq!(
            results,
            vec![
                ("1", RecordResult::ProcessingFailed),
                ("2", RecordResult::Ok),
                ("3", RecordResult::ProcessingFailed)
            ]
        );
        assert_eq!(response.records[0].data, None);
    }

    #[test]
    fn malformed_batch_fails_every_identifiable_record() {
        let event = json!({"records": [
            {"recordId": "a", "data": "aGVsbG8="},
            {"data": "aGVsbG8="},
            {"recordId": "c", "data": "aGVsbG8="}
        ]});

        let response = process_structuring_event(event);

        let ids: Vec<&str> = response.records.iter().map(|r| r.record_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(response
            .records
            .iter()
            .all(|r| r.result == RecordResult::ProcessingFailed && r.data.is_none()));
    }

    #[test]
    fn event_without_records_yields_an_empty_response() {
        assert!(process_structuring_event(json!({})).records.is_empty());
    }
}
