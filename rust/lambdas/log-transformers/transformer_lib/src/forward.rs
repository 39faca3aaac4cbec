//! ## Sink forwarder
//!
//! Sends the decoded records of a batch to a log stream and answers the delivery
//! stream with empty `Ok` records, so nothing is persisted downstream.
//!
//! A record that cannot be decoded is failed on its own. If the log stream
//! rejects the write, every record of the batch is failed so the delivery
//! stream retries or redrives the whole batch.
use crate::config::ForwarderConfig;
use crate::error::{DecodeError, SinkAppendError};
use crate::firehose::{FirehoseRecord, RecordResult, TransformResult};
use crate::sink::{LogEntry, LogSink, MAX_ENTRIES_PER_APPEND};
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info};

/// # Turns a record into the message text sent to the log stream
///
/// JSON payloads are re-serialized compactly, anything else is sent as the
/// trimmed text. Returns `None` when there is nothing to send.
pub fn message_text(record: &FirehoseRecord) -> Result<Option<String>, DecodeError> {
    let text = record.decode()?;
    let trimmed = text.trim();
    let message = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value.to_string(),
        Err(_) => trimmed.to_string(),
    };
    Ok(Some(message).filter(|message| !message.is_empty()))
}

/// # Appends entries in chunks, threading the continuation cursor
///
/// Entries are sorted by timestamp first. Returns the number of entries sent.
pub async fn append_all<S: LogSink>(
    sink: &S,
    config: &ForwarderConfig,
    mut entries: Vec<LogEntry>,
) -> Result<usize, SinkAppendError> {
    entries.sort_by_key(|entry| entry.timestamp);

    let state = sink
        .describe_stream_state(&config.log_group_name, &config.log_stream_name)
        .await?;
    let mut cursor = state.cursor.filter(|cursor| !cursor.is_empty());

    for chunk in entries.chunks(MAX_ENTRIES_PER_APPEND) {
        let outcome = sink
            .append_entries(
                &config.log_group_name,
                &config.log_stream_name,
                chunk,
                cursor.as_deref(),
            )
            .await?;
        cursor = outcome.next_cursor.filter(|cursor| !cursor.is_empty());
        info!(
            count = chunk.len(),
            "Sent log events to {}/{}",
            config.log_group_name,
            config.log_stream_name
        );
    }
    Ok(entries.len())
}

/// # Forwards a batch to the log sink
///
/// Returns one result per record in input order.
pub async fn forward<S: LogSink>(
    sink: &S,
    records: &[FirehoseRecord],
    config: &ForwarderConfig,
) -> Vec<TransformResult> {
    let mut entries: Vec<LogEntry> = Vec::new();
    let mut results: Vec<TransformResult> = Vec::with_capacity(records.len());

    for record in records {
        match message_text(record) {
            Ok(message) => {
                if let Some(message) = message {
                    entries.push(LogEntry {
                        timestamp: Utc::now().timestamp_millis(),
                        message,
                    });
                }
                results.push(TransformResult::ok(&record.record_id, String::new()));
            }
            Err(err) => {
                error!(record_id = %record.record_id, "Error processing record: {err}");
                results.push(TransformResult::failed(&record.record_id, None));
            }
        }
    }

    let sent = if entries.is_empty() {
        0
    } else {
        match append_all(sink, config, entries).await {
            Ok(sent) => sent,
            Err(err) => {
                error!("Error sending to log stream: {err}");
                for result in results.iter_mut() {
                    result.result = RecordResult::ProcessingFailed;
                }
                0
            }
        }
    };

    info!("Processed {sent} log events to {}", config.log_group_name);
    results
}
