//! keychanger - command-line front-end for the KeyChanger service
//!
//! Detects the musical key of an mp3/wav recording and downloads a
//! re-pitched copy, driving the same session orchestrator a GUI would.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kc_client::config::{CliOverrides, ClientConfig};
use kc_client::models::{AudioFile, SessionState};
use kc_client::services::HttpKeyService;
use kc_client::session::TransposeDraft;
use kc_common::config::{load_toml_config, LoggingConfig};
use kc_common::{transpose_key_name, KeyResult, OutputFormat};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Command-line arguments for keychanger
#[derive(Parser, Debug)]
#[command(name = "keychanger")]
#[command(about = "Detect the key of a recording and download it re-pitched")]
#[command(version, long_version = LONG_VERSION)]
struct Args {
    /// TOML config file (default: <config dir>/keychanger/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Key service base URL
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect the musical key of an audio file
    Analyze {
        file: PathBuf,

        /// Declared media type (sniffed from content when omitted)
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Analyze, then download a copy shifted by N semitones
    Transpose {
        file: PathBuf,

        /// Semitones to shift, -12..=12
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        shift: i32,

        /// Output format (mp3 or wav)
        #[arg(short, long, default_value = "mp3")]
        format: OutputFormat,

        /// Directory to save the transposed file into
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Declared media type (sniffed from content when omitted)
        #[arg(long)]
        media_type: Option<String>,
    },

    /// Show the key a shift would produce, without contacting the service
    Preview {
        key: String,

        #[arg(short = 'n', long, allow_negative_numbers = true)]
        shift: i32,
    },

    /// Check that the key service is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = load_toml_config(args.config.as_deref()).context("Failed to load config")?;
    init_tracing(&toml_config.logging)?;

    let output_dir = match &args.command {
        Command::Transpose { output_dir, .. } => output_dir.clone(),
        _ => None,
    };
    let cli = CliOverrides {
        server_url: args.server.clone(),
        output_dir,
    };
    let config = ClientConfig::resolve(&cli, &toml_config).context("Invalid configuration")?;

    match args.command {
        Command::Analyze { file, media_type } => {
            let orchestrator = kc_client::build_orchestrator(&config)?;
            let candidate = read_candidate(&file, media_type.as_deref()).await?;

            let state = orchestrator.select_file(candidate).await;
            let key_result = require_key(&state)?;
            print_key_result(key_result);
        }

        Command::Transpose {
            file,
            shift,
            format,
            media_type,
            ..
        } => {
            let orchestrator = kc_client::build_orchestrator(&config)?;
            let candidate = read_candidate(&file, media_type.as_deref()).await?;

            let state = orchestrator.select_file(candidate).await;
            let key_result = require_key(&state)?;
            print_key_result(key_result);

            let mut draft = TransposeDraft::for_result(key_result);
            draft.set_shift(shift)?;
            draft.set_format(format);
            println!(
                "Transposing {} -> {} ({:+} semitones, {})",
                draft.original_key(),
                draft.preview(),
                draft.shift(),
                draft.format()
            );

            let state = orchestrator.submit_transpose(draft.shift(), draft.format()).await;
            if let Some(message) = state.error_message() {
                bail!("{}", message);
            }
            if let Some(message) = state.success_message() {
                println!("{}", message);
            }
            if let Some(path) = state.last_download() {
                println!("Saved: {}", path.display());
            }
        }

        Command::Preview { key, shift } => {
            println!("{}", transpose_key_name(&key, shift));
        }

        Command::Health => {
            let service = HttpKeyService::new(&config)?;
            let health = service.health().await?;
            println!(
                "{}: {}{}",
                service.base_url(),
                health.status,
                health.message.map(|m| format!(" ({})", m)).unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,keychanger={0},kc_client={0},kc_common={0}",
            logging.level
        ))
    });

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    info!("keychanger {}", LONG_VERSION);
    Ok(())
}

async fn read_candidate(path: &Path, media_type: Option<&str>) -> Result<AudioFile> {
    AudioFile::from_path(path, media_type)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Key result of a finished analysis, or the session's error message
fn require_key(state: &SessionState) -> Result<&KeyResult> {
    if let Some(message) = state.error_message() {
        bail!("{}", message);
    }
    state
        .key_result()
        .context("Analysis finished without a key result")
}

fn print_key_result(result: &KeyResult) {
    println!(
        "Key: {}  confidence: {}% ({})",
        result.key,
        result.confidence_percent(),
        result.confidence_level()
    );
    if !result.is_reliable() {
        println!("Low confidence: the detected key may be inaccurate.");
    }
}
