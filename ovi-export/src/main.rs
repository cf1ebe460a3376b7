//! Point d'entrée CLI pour ovi-export

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, EnvFilter};

use ovi_export::cli::{self, Commands};
use ovi_export::ExportConfig;

/// Variable de filtre de logs, prioritaire sur `RUST_LOG`
const LOG_ENV: &str = "OVI_EXPORT_LOG";

/// Charge le premier `.env` trouvé : répertoire courant (et parents), puis
/// répertoire du binaire. Retourne le chemin utilisé.
fn load_env() -> Option<PathBuf> {
    if let Ok(path) = dotenvy::dotenv() {
        return Some(path);
    }
    let candidate = std::env::current_exe().ok()?.parent()?.join(".env");
    dotenvy::from_path(&candidate).ok()?;
    Some(candidate)
}

/// Exporter les projets OVI/OMI d'un tenant en CSV ou GeoPackage
#[derive(Parser)]
#[command(name = "ovi-export")]
#[command(author, version)]
#[command(about = "Exporter les projets d'un tenant en CSV (plat/interprété) ou GeoPackage")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Fichier de configuration JSON
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // .env avant le parsing : les overrides OVI_EXPORT_* en dépendent
    let env_file = load_env();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match &env_file {
        Some(path) => debug!(path = %path.display(), "Environment file loaded"),
        None => debug!("No .env file found"),
    }

    let config = ExportConfig::resolve(cli.config.as_deref())?;
    debug!(?config, "Configuration resolved");

    cli::run(cli.command, &config)
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::from_default_env())
        .add_directive(level.into());

    // stdout reste réservé au rapport et à `inspect`
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
