use std::env;

pub const DEFAULT_LOG_GROUP_NAME: &str = "/aws/kinesis/application-logs";

/// The stream is provisioned alongside the log group and is never created here.
pub const DEFAULT_LOG_STREAM_NAME: &str = "firehose-delivery";

/// # Where the forwarder appends log events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderConfig {
    pub log_group_name: String,
    pub log_stream_name: String,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        ForwarderConfig {
            log_group_name: DEFAULT_LOG_GROUP_NAME.to_string(),
            log_stream_name: DEFAULT_LOG_STREAM_NAME.to_string(),
        }
    }
}

impl ForwarderConfig {
    /// # Reads the destination from `LOG_GROUP_NAME` and `LOG_STREAM_NAME`
    pub fn from_env() -> ForwarderConfig {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ForwarderConfig {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        ForwarderConfig {
            log_group_name: non_empty("LOG_GROUP_NAME")
                .unwrap_or_else(|| DEFAULT_LOG_GROUP_NAME.to_string()),
            log_stream_name: non_empty("LOG_STREAM_NAME")
                .unwrap_or_else(|| DEFAULT_LOG_STREAM_NAME.to_string()),
        }
    }
}
