use lambda::{init_tracing, process_forwarding_event};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use transformer_lib::{CloudWatchLogsSink, FirehoseResponse, ForwarderConfig};

async fn function_handler(
    event: LambdaEvent<Value>,
    sink: &CloudWatchLogsSink,
) -> Result<FirehoseResponse, Error> {
    let config = ForwarderConfig::from_env();
    Ok(process_forwarding_event(event.payload, sink, &config).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let sink = CloudWatchLogsSink::from_env(None).await;
    run(service_fn(|event| function_handler(event, &sink))).await
}
