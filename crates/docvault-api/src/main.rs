//! # docvault-api: Binary Entry Point
//!
//! Reads configuration from the environment, connects the optional
//! database, wires the blob store, and serves HTTP until Ctrl-C.

use anyhow::Context;
use docvault_api::config::AppConfig;
use metrics_exporter_prometheus::PrometheusBuilder;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("installing Prometheus recorder")?;

    let config = AppConfig::from_env().context("reading configuration")?;
    let port = config.port;

    let pool = docvault_api::db::init_pool(config.database_url.as_deref().map(String::as_str))
        .await
        .map_err(|e| {
            tracing::error!("database initialization failed: {e}");
            e
        })?;

    let state = docvault_api::bootstrap::bootstrap(config, pool)
        .await
        .map_err(|e| {
            tracing::error!("bootstrap failed: {e}");
            e
        })?
        .with_metrics(metrics);

    let app = docvault_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("docvault API listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("shut down");
    Ok(())
}

/// `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
