use dashboards::{AppState, Config, ScheduleApi, TrackerApi, build_http_client, router};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let http = build_http_client(&config)?;
    let state = AppState::new(
        ScheduleApi::new(http.clone(), config.schedule_api.as_str()),
        TrackerApi::new(http, config.tracker_api.as_str()),
    );
    info!(
        schedule_api = %config.schedule_api,
        tracker_api = %config.tracker_api,
        "backends configured"
    );

    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}
