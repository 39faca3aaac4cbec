use lambda::{init_tracing, process_structuring_event};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use transformer_lib::FirehoseResponse;

async fn function_handler(event: LambdaEvent<Value>) -> Result<FirehoseResponse, Error> {
    Ok(process_structuring_event(event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    run(service_fn(function_handler)).await
}
