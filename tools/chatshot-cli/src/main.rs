//! Chatshot CLI: compose fake chat conversations and export them as images.
//!
//! Usage:
//!   chatshot init <PATH>          Write a starter conversation document
//!   chatshot validate <PATH>      Validate a conversation document
//!   chatshot info <PATH>          Show conversation information
//!   chatshot export <PATH>        Export an animated GIF, one frame per message
//!   chatshot screenshot <PATH>    Export a PNG of the whole conversation
//!   chatshot check                Check fonts, presets and configuration

use std::path::PathBuf;

use chatshot_common::config::AppConfig;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "chatshot",
    about = "Fake chat screenshots and reveal animations",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Font file used for all text (overrides the configuration)
    #[arg(long, global = true)]
    font: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter conversation document
    Init {
        /// Path of the new document
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a conversation document
    Validate {
        /// Path to the conversation document
        path: PathBuf,
    },

    /// Show conversation information
    Info {
        /// Path to the conversation document
        path: PathBuf,
    },

    /// Export a looping GIF revealing one message per frame
    Export {
        /// Path to the conversation document
        path: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Resolution multiplier (defaults to the configured value)
        #[arg(long)]
        scale: Option<u32>,
    },

    /// Export a PNG of the full conversation
    Screenshot {
        /// Path to the conversation document
        path: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Resolution multiplier (defaults to the configured value)
        #[arg(long)]
        scale: Option<u32>,
    },

    /// Check fonts, presets and effective configuration
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if let Some(font) = cli.font {
        config.assets.font_path = Some(font);
    }
    chatshot_common::logging::init_logging(&config.logging);
    tracing::debug!(
        config = %chatshot_common::config::config_file_path().display(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Init { path, force } => commands::init::run(path, force),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Info { path } => commands::info::run(path),
        Commands::Export {
            path,
            output,
            scale,
        } => commands::export::run(path, output, scale, config).await,
        Commands::Screenshot {
            path,
            output,
            scale,
        } => commands::screenshot::run(path, output, scale, config).await,
        Commands::Check => commands::check::run(&config),
    }
}
