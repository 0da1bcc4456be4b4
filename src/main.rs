use engineers_hub::configuration::get_configuration;
use engineers_hub::startup::Application;
use engineers_hub::telemetry::get_subscriber;
use engineers_hub::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // only logs at the specified level and higher are emitted; override with
    // RUST_LOG
    let subscriber = get_subscriber("engineers-hub", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;
    let app = Application::build(cfg).await?;
    tracing::info!("listening on port {}", app.get_port());

    if let Err(e) = app.run_until_stopped().await {
        tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "server failed"
        );
        return Err(e.into());
    }
    tracing::info!("server exited gracefully");
    Ok(())
}
