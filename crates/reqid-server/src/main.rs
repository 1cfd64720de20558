//! reqid-server: HTTP server that labels every request with random
//! correlation identifiers and exposes them to downstream stages.

mod config;
mod server;

use config::ServerSettings;
use reqid::RequestIdLayer;
use server::AppState;

fn main() -> anyhow::Result<()> {
    // Parse CLI args
    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1).cloned())
        .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
        .or_else(|| std::env::var("REQID_CONFIG").ok())
        .unwrap_or_else(|| "reqid.toml".to_string());

    let settings = ServerSettings::load(&config_path)?;

    // Build the tokio runtime first: the tonic gRPC exporter needs a reactor context
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let _tracing_guard = reqid_tracing::init_tracing(&settings.tracing);

        tracing::info!(
            config_path = %config_path,
            listen_address = %settings.server.listen_address,
            "Starting reqid-server"
        );

        run(settings, config_path).await
    })
}

async fn run(settings: ServerSettings, config_path: String) -> anyhow::Result<()> {
    // A rejected configuration never reaches the pipeline
    let request_ids = RequestIdLayer::activate(&settings.request_id).map_err(|e| {
        tracing::error!(error = %e, "Invalid request_id configuration");
        e
    })?;

    let state = AppState {
        config_path,
        ids: request_ids.config_handle().clone(),
    };

    server::run(&settings.server.listen_address, state, request_ids).await
}
