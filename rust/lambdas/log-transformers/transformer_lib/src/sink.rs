use crate::error::SinkAppendError;
use std::future::Future;

/// Maximum number of events accepted by a single append call.
pub const MAX_ENTRIES_PER_APPEND: usize = 10_000;

/// # A log event ready to be appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub message: String,
}

/// # The current write position of a log stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamState {
    pub cursor: Option<String>,
}

/// # The result of one append call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    pub next_cursor: Option<String>,
}

/// # Destination of forwarded log events
pub trait LogSink: Send + Sync {
    /// Look up the stream whose name starts with `stream_prefix` and return its
    /// continuation cursor, if any.
    fn describe_stream_state(
        &self,
        group: &str,
        stream_prefix: &str,
    ) -> impl Future<Output = Result<StreamState, SinkAppendError>> + Send;

    /// Append `entries` in order. `cursor` is the value returned by the previous
    /// call or by [`LogSink::describe_stream_state`].
    fn append_entries(
        &self,
        group: &str,
        stream: &str,
        entries: &[LogEntry],
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<AppendOutcome, SinkAppendError>> + Send;
}
