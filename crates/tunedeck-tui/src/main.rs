// tunedeck entry point.
//
// Startup sequence:
// 1. Load config (created from defaults on first run)
// 2. Initialize tracing (log to file, not terminal)
// 3. Open the settings store
// 4. Build the player client and data source
// 5. Create mpsc channels
// 6. Spawn app logic task
// 7. Run the TUI until the user quits
// 8. Cleanup on exit

use std::sync::Arc;

use tunedeck_api::{DataSource, PlayerClient, SubscriptionKind};
use tunedeck_tui::app;
use tunedeck_tui::config::{self, EventsMode};
use tunedeck_tui::settings::SettingsStore;
use tunedeck_tui::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let (config, config_path) = config::load_config().context("failed to load configuration")?;

    // 2. Initialize tracing
    init_tracing(&config.logging.filter)?;
    info!("tunedeck starting up");
    info!(
        "Config loaded from {}: server={}, events={:?}",
        config_path.display(),
        config.server.url,
        config.events.mode
    );

    // 3. Settings store
    let data_dir = config::data_dir().context("failed to resolve data directory")?;
    let settings_store =
        SettingsStore::open(&data_dir).context("failed to open settings store")?;
    info!("Settings loaded from {}", settings_store.path().display());

    // 4. Player client and data source
    let client = PlayerClient::new(&config.server.url).context("invalid server url")?;
    let kind = match config.events.mode {
        EventsMode::Updates => SubscriptionKind::Updates,
        EventsMode::Events => SubscriptionKind::Events,
    };

    // 5. Channels
    let (source_tx, source_rx) = mpsc::channel(256);
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let source = DataSource::new(client.clone(), kind, config.data_source_config(), source_tx);
    let app_state = app::AppState::new(&config, Arc::new(client), settings_store);

    // 6. App logic task
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(source_rx, source, cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 7. TUI (blocks until 'q' + confirm or Ctrl+C)
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 8. Cleanup: give the app task a moment to stop the subscription
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), app_handle).await;

    info!("tunedeck shut down cleanly");
    Ok(())
}

/// Log to `logs/tunedeck.log`; the terminal belongs to the TUI.
/// `RUST_LOG` overrides the configured filter.
fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("tunedeck.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
