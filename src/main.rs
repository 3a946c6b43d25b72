#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::io::{self, stdout};
use std::path::PathBuf;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use walkin::camera::{Camera, CommandCamera, NoCamera};
use walkin::config::{AppConfig, Environment, log_dir};
use walkin::submission::IntakeClient;
use walkin::tui::App;

/// Walk-in visitor registration terminal.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Deployment environment: `development`, `stage`, or production.
    #[arg(long)]
    env: Option<String>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Sends tracing output to a daily log file; the terminal belongs to the UI.
#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
fn init_logging(config: &AppConfig) -> Result<WorkerGuard, io::Error> {
    let dir = log_dir().unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&dir)?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
        dir,
        "walkin.log",
    ));
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("walkin={}", config.log_level).into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let _guard = init_logging(&config)?;

    let environment = Environment::from_param(cli.env.as_deref());
    let client = IntakeClient::new(&config, environment)?;
    let camera: Box<dyn Camera> = match CommandCamera::from_command(&config.camera_command) {
        Some(camera) => Box::new(camera),
        None => Box::new(NoCamera),
    };
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        %environment,
        endpoint = client.endpoint(),
        "starting walk-in registration"
    );

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restore_terminal();
        original_hook(info);
    }));

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = App::new(client, camera).and_then(|mut app| app.run(&mut terminal));

    let restore_result = restore_terminal();
    match result {
        Err(e) => Err(e.into()),
        Ok(()) => restore_result.map_err(Into::into),
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[mutants::skip]
fn restore_terminal() -> Result<(), io::Error> {
    let raw_result = disable_raw_mode();
    let screen_result = execute!(stdout(), LeaveAlternateScreen);
    raw_result.and(screen_result)
}
