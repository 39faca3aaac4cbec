use thiserror::Error;

/// Boxed error carried by sink failures, so both SDK and test sinks fit.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// # A record whose payload could not be turned back into text
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("record data is missing or not a string")]
    MissingData,

    #[error("record data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("record data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// # Failure to turn a single record into its transformed form
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("failed to serialize structured record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// # The log sink refused or could not be reached for a write
#[derive(Debug, Error)]
pub enum SinkAppendError {
    #[error("failed to describe log stream {stream} in {group}: {source}")]
    Describe {
        group: String,
        stream: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to append {count} log events to {group}/{stream}: {source}")]
    Append {
        group: String,
        stream: String,
        count: usize,
        #[source]
        source: BoxError,
    },
}

/// # The invocation payload is not a record batch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("malformed record batch: {0}")]
    Malformed(#[from] serde_json::Error),
}
