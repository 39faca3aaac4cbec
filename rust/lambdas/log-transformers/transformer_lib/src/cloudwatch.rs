//! ## CloudWatch Logs sink
//!
//! [`LogSink`] backed by `DescribeLogStreams` and `PutLogEvents`.
use crate::error::SinkAppendError;
use crate::sink::{AppendOutcome, LogEntry, LogSink, StreamState};
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_cloudwatchlogs::error::DisplayErrorContext;
use aws_sdk_cloudwatchlogs::types::InputLogEvent;
use aws_sdk_cloudwatchlogs::Client as CloudWatchLogsClient;
use tracing::debug;

const FALLBACK_REGION: &str = "us-east-1";

/// # Writes log events to a CloudWatch Logs stream
#[derive(Debug, Clone)]
pub struct CloudWatchLogsSink {
    client: CloudWatchLogsClient,
}

impl CloudWatchLogsSink {
    pub fn new(client: CloudWatchLogsClient) -> Self {
        CloudWatchLogsSink { client }
    }

    /// # Builds the sink from the default AWS configuration
    ///
    /// `potential_endpoint_url` overrides the service endpoint, which is how the
    /// integration tests point the client at a mock server.
    pub async fn from_env(potential_endpoint_url: Option<&str>) -> Self {
        let config = aws_config(potential_endpoint_url).await;
        CloudWatchLogsSink::new(CloudWatchLogsClient::new(&config))
    }
}

/// # Creates an AWS SDK config object
async fn aws_config(potential_endpoint_url: Option<&str>) -> SdkConfig {
    let region_provider = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);
    let loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
    match potential_endpoint_url {
        Some(endpoint_url) => loader.endpoint_url(endpoint_url).load().await,
        None => loader.load().await,
    }
}

impl LogSink for CloudWatchLogsSink {
    async fn describe_stream_state(
        &self,
        group: &str,
        stream_prefix: &str,
    ) -> Result<StreamState, SinkAppendError> {
        let output = self
            .client
            .describe_log_streams()
            .log_group_name(group)
            .log_stream_name_prefix(stream_prefix)
            .send()
            .await
            .map_err(|err| SinkAppendError::Describe {
                group: group.to_string(),
                stream: stream_prefix.to_string(),
                source: DisplayErrorContext(err).to_string().into(),
            })?;

        let cursor = output
            .log_streams()
            .first()
            .and_then(|stream| stream.upload_sequence_token())
            .map(str::to_string);
        debug!(group, stream_prefix, ?cursor, "Described log stream");
        Ok(StreamState { cursor })
    }

    async fn append_entries(
        &self,
        group: &str,
        stream: &str,
        entries: &[LogEntry],
        cursor: Option<&str>,
    ) -> Result<AppendOutcome, SinkAppendError> {
        let append_error = |source: String| SinkAppendError::Append {
            group: group.to_string(),
            stream: stream.to_string(),
            count: entries.len(),
            source: source.into(),
        };

        let events = entries
            .iter()
            .map(|entry| {
                InputLogEvent::builder()
                    .timestamp(entry.timestamp)
                    .message(&entry.message)
                    .build()
            })
            .collect::<Result<Vec<InputLogEvent>, _>>()
            .map_err(|err| append_error(err.to_string()))?;

        let output = self
            .client
            .put_log_events()
            .log_group_name(group)
            .log_stream_name(stream)
            .set_log_events(Some(events))
            .set_sequence_token(cursor.map(str::to_string))
            .send()
            .await
            .map_err(|err| append_error(DisplayErrorContext(err).to_string()))?;

        if let Some(rejected) = output.rejected_log_events_info() {
            debug!(?rejected, "CloudWatch Logs rejected part of the batch");
        }
        Ok(AppendOutcome {
            next_cursor: output.next_sequence_token().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod test {
    use crate::cloudwatch::*;

    #[tokio::test]
    async fn test_aws_config_falls_back_to_a_region() {
        let config = aws_config(None).await;

        assert!(config.region().is_some());
    }

    #[tokio::test]
    async fn test_aws_config_endpoint_url() {
        let config_default_endpoint = aws_config(None).await;
        assert_eq!(config_default_endpoint.endpoint_url(), None);

        let config_custom_endpoint = aws_config(Some("https://example.com")).await;
        assert_eq!(
            config_custom_endpoint.endpoint_url().unwrap(),
            "https://example.com"
        );
    }
}
