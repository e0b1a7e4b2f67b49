use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tabtray_app::config::load_config;
use tabtray_app::persistence::FileSettings;
use tabtray_app::runtime::TrayRuntime;
use tabtray_core::{
    Clock, InMemorySettings, LogTelemetry, ManualClock, SettingsValues, SystemClock, TraySettings,
};
use tracing_subscriber::EnvFilter;

/// Drives the tab tray from a script of JSON commands and prints every
/// rendered tray view as a JSON line.
#[derive(Debug, Parser)]
#[command(name = "tabtray", version)]
struct Cli {
    /// TOML file with thresholds, cache sizes and feature defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// TOML file holding the user's settings; created on first change.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Command script, one JSON object per line. Reads stdin when omitted.
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("tabtray: bootstrap failed")?;

    let defaults = SettingsValues::from_config(&config);
    let settings: Arc<dyn TraySettings> = match &cli.settings {
        Some(path) => Arc::new(
            FileSettings::open(path, defaults).context("tabtray: failed to open settings")?,
        ),
        None => Arc::new(InMemorySettings::new(defaults)),
    };
    let clock = Arc::new(ManualClock::new(SystemClock.now_millis()));

    let mut runtime = TrayRuntime::bootstrap(&config, settings, Arc::new(LogTelemetry), clock);
    let stdout = io::stdout().lock();
    let emitted = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("tabtray: cannot open script {}", path.display()))?;
            runtime.run_script(BufReader::new(file), stdout)
        }
        None => runtime.run_script(io::stdin().lock(), stdout),
    }
    .context("tabtray: script failed")?;

    tracing::info!(views = emitted, "script finished");
    runtime.shutdown();
    Ok(())
}
