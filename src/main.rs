use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use standby_auth::bootstrap_accounts;
use standby_calendar::{AgendaFetcher, GoogleCalendarBackend};
use standby_core::{AppError, Config, DisplayConfig};
use standby_services::{state_channel, AgendaRetention, RefreshLoop, StateReceiver};
use standby_weather::WeatherProvider;

/// Bedside clock, weather and agenda display.
#[derive(Debug, Parser)]
#[command(name = "standby", version, about)]
struct Cli {
    /// Run in a window instead of full screen
    #[arg(long)]
    window: bool,

    /// Change to this directory before startup
    #[arg(long, value_name = "DIR")]
    cwd: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(dir) = &cli.cwd {
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change directory to {}", dir.display()))?;
    }

    dotenvy::dotenv().ok();
    standby_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let tz = config.display.tz()?;
    tracing::info!("Standby starting (timezone {})", tz);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("standby-refresh")
        .build()
        .context("Failed to start async runtime")?;

    let fetch_timeout = config.refresh.fetch_timeout();

    // consent prompts happen here, never inside a refresh cycle
    let accounts = runtime.block_on(bootstrap_accounts(&config.calendar, fetch_timeout));

    let weather =
        WeatherProvider::new(&config.weather, config.display.language, fetch_timeout)?;
    let backend = GoogleCalendarBackend::from_config(&config.calendar, accounts, fetch_timeout)?;
    let agenda = AgendaFetcher::new(backend, config.calendar.accounts.clone(), tz);

    let (tx, rx) = state_channel();
    let refresh = RefreshLoop::new(
        weather,
        agenda,
        config.refresh.interval(),
        AgendaRetention::from_keep_flag(config.calendar.keep_agenda_on_total_failure),
        tx,
    );

    let shutdown = CancellationToken::new();
    let refresh_task = runtime.spawn(refresh.run(shutdown.clone()));

    let displayed = run_display(&config.display, cli.window, rx);

    shutdown.cancel();
    if let Err(e) = runtime.block_on(refresh_task) {
        tracing::warn!("Refresh task ended abnormally: {}", e);
    }
    runtime.shutdown_timeout(fetch_timeout);

    if let Err(e) = displayed {
        tracing::error!("{} ({})", e.user_message(), e);
        return Err(e.into());
    }
    tracing::info!("Standby stopped");
    Ok(())
}

#[cfg(feature = "simulator")]
fn run_display(
    display: &DisplayConfig,
    windowed: bool,
    state: StateReceiver,
) -> Result<(), AppError> {
    use standby_ui::{FrameLoop, FrameOptions, SdlScreen};

    let (width, height) = display.canvas_size(windowed);
    let screen = SdlScreen::open("Standby", width, height)?;
    let options = FrameOptions::from_config(display)?;

    FrameLoop::new(screen, state, options).run()?;
    Ok(())
}

#[cfg(not(feature = "simulator"))]
fn run_display(
    _display: &DisplayConfig,
    _windowed: bool,
    _state: StateReceiver,
) -> Result<(), AppError> {
    Err(standby_core::DisplayError::InitFailed(
        "built without a display backend; enable the `simulator` feature".to_string(),
    )
    .into())
}
