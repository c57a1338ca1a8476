use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};

use skycast_core::config::Config;
use skycast_core::error::AppError;
use skycast_core::settings::SettingsStore;
use skycast_state::{AppState, EngineConfig, PollEngine, PrefStore};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            let message = e
                .downcast_ref::<AppError>()
                .map(AppError::user_message)
                .unwrap_or("An unexpected error occurred. Please try again.");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    skycast_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    tracing::info!("Data directory: {}", config.data_dir.display());

    let settings = SettingsStore::new(&config.data_dir);
    let prefs = PrefStore::new(&config.data_dir);
    let state = Arc::new(AppState::new(settings, prefs).context("Failed to build API clients")?);
    state.load_preferences();

    let engine = Arc::new(PollEngine::new(state.clone(), EngineConfig::default()));
    let shutdown = engine.shutdown_token();
    let runner = engine.clone();
    let engine_task = tokio::spawn(async move { runner.run().await });

    let server = tokio::spawn(skycast_server::serve(
        state.clone(),
        config.kiosk.window_classes.clone(),
        config.server.listen_port,
        shutdown.clone(),
    ));

    // Initial position: configured start, then IP geolocation. Polling
    // begins as soon as either resolves; a failure here just means no
    // weather until the user picks a spot on the map.
    if let Err(e) = state.resolve_start_coordinates().await {
        tracing::warn!("Could not resolve a starting position: {}", e.user_message());
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutting down");
    shutdown.cancel();

    engine_task.await.ok();
    server.await.ok();
    Ok(())
}
