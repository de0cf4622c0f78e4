//! Interval Timer - An interval-training timer daemon
//!
//! This is the main entry point for the interval-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use interval_timer::{
    api::create_router,
    config::Config,
    settings::SettingsStore,
    state::{AppState, SystemClock},
    tasks::{cue_dispatcher_task, ticker_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("interval_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting interval-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, settings={}",
          config.host, config.port, config.tick_ms, config.settings_dir.display());

    let settings = SettingsStore::open(&config.settings_dir);

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        settings,
        Arc::new(SystemClock),
    ));

    // Start the session ticker background task
    let ticker_state = Arc::clone(&state);
    let tick = config.tick();
    tokio::spawn(async move {
        ticker_task(ticker_state, tick).await;
    });

    // Start the cue dispatcher background task
    let cue_state = Arc::clone(&state);
    let cue_command = config.cue_command.clone();
    tokio::spawn(async move {
        cue_dispatcher_task(cue_state, cue_command).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start      - Start a session from stored settings");
    info!("  POST /pause      - Pause the running phase");
    info!("  POST /resume     - Resume a paused phase");
    info!("  POST /reset      - Discard the session");
    info!("  POST /skip       - Jump to the next phase");
    info!("  POST /back       - Return to the previous phase");
    info!("  GET  /status     - Current phase and remaining time");
    info!("  GET  /settings   - Stored settings (PUT to update)");
    info!("  GET  /events     - Phase and cue event stream");
    info!("  GET  /health     - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
