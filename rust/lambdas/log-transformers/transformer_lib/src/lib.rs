//! ## Firehose log transformer library
//!
//! Shared code for the two record transformers invoked by a Kinesis Data Firehose
//! delivery stream:
//!
//! * [`structure::transform`] turns raw log lines into newline-delimited JSON.
//! * [`forward::forward`] sends the decoded records to a CloudWatch Logs stream
//!   and tells the delivery stream not to store them.
//!
//! Both return exactly one [`TransformResult`] per input record, in order, and
//! never fail the invocation itself.
pub mod cloudwatch;
pub mod config;
pub mod error;
pub mod firehose;
pub mod forward;
pub mod heuristics;
pub mod sink;
pub mod structure;

pub use cloudwatch::CloudWatchLogsSink;
pub use config::ForwarderConfig;
pub use error::{BatchError, DecodeError, SinkAppendError, TransformError};
pub use firehose::{FirehoseEvent, FirehoseRecord, FirehoseResponse, RecordResult, TransformResult};
pub use heuristics::{classify_level, extract_timestamp, LogLevel};
pub use sink::{AppendOutcome, LogEntry, LogSink, StreamState};
