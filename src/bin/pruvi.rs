use anyhow::Result;
use pruvi::cli;

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    let action = cli::start()?;

    let result = action.execute().await;

    // flush any batched spans before exiting
    cli::telemetry::shutdown_tracer();

    result
}
