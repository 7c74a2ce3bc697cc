pub mod config;
pub mod controller;
pub mod mapping;
pub mod output;

use crate::controller::{ControllerPoller, GilrsRegistry, PollerCore, PollerHandle};
use crate::mapping::{CommandFactory, EventTranslator};
use crate::output::TracingSurface;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config::default_config_path);
    info!("Using configuration {}", config_path.display());
    let app_config = config::load_or_create(&config_path).await?;

    let factory = CommandFactory::from_config(&app_config.mapping)
        .map_err(|e| eyre!("Failed to build commands: {}", e))?;
    let surface = TracingSurface::new(app_config.screen.clone());
    let translator = EventTranslator::new(factory, Box::new(surface));

    let registry = GilrsRegistry::new(Some(app_config.collector_settings()))
        .map_err(|e| eyre!("Failed to open gamepad registry: {}", e))?;

    let poller = ControllerPoller::create(
        PollerCore::new(translator, Vec::new()),
        Some(app_config.poller_settings()),
    );
    let handle = poller.handle();
    let controllers = registry
        .controllers()
        .map_err(|e| eyre!("Failed to enumerate gamepads: {}", e))?;
    handle.update_controllers(controllers).await;

    let poller = poller.start();

    let shutdown = CancellationToken::new();
    let refresh_task = tokio::spawn(run_refresh_loop(
        registry,
        handle,
        Duration::from_millis(app_config.refresh_interval_ms.max(1)),
        shutdown.clone(),
    ));

    info!("padmap running, press Ctrl+C to quit");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| eyre!("Failed to listen for Ctrl+C: {}", e))?;

    info!("Shutting down");
    shutdown.cancel();
    refresh_task
        .await
        .map_err(|e| eyre!("Refresh task failed: {}", e))?;
    poller
        .stop()
        .await
        .map_err(|e| eyre!("Failed to stop poller: {}", e))?;

    Ok(())
}

// Re-enumerates gamepads and swaps the poller's set when it changed
async fn run_refresh_loop(
    registry: GilrsRegistry,
    handle: PollerHandle,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut interval_timer = tokio::time::interval(period);
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = interval_timer.tick() => {}
        }

        let connected = match registry.connected_ids() {
            Ok(ids) => ids,
            Err(e) => {
                error!("Failed to list gamepads: {}", e);
                continue;
            }
        };
        let polled = handle.controller_ids().await;
        if connected == polled {
            debug!("Gamepad set unchanged: {:?}", connected);
            continue;
        }

        info!(
            "Gamepad set changed: {:?} -> {:?} ({} commands active)",
            polled,
            connected,
            handle.active_count().await
        );
        match registry.controllers() {
            Ok(controllers) => handle.update_controllers(controllers).await,
            Err(e) => error!("Failed to enumerate gamepads: {}", e),
        }
    }
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| value.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
