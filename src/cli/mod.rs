//! CLI Module
//!
//! Command-line interface for Neutron using Clap v4.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use commands::{cmd_config, cmd_init, cmd_recognize, cmd_synthesize, cmd_token};

pub use commands::load_config;

/// Neutron - Baidu speech recognition and synthesis from the terminal
#[derive(Parser, Debug)]
#[command(name = "neutron")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug mode (creates log files in .neutron/logs/)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transcribe an 8 kHz WAV file
    Recognize {
        /// Path to the WAV file
        file: PathBuf,

        /// Two-letter language code
        #[arg(short, long, default_value = "zh")]
        lang: String,
    },

    /// Synthesize text into an MP3 file
    Synthesize {
        /// Text to speak
        text: String,

        /// Two-letter language code
        #[arg(short, long)]
        lang: Option<String>,

        /// Speed (spd)
        #[arg(long)]
        speed: Option<u32>,

        /// Pitch (pit)
        #[arg(long)]
        pitch: Option<u32>,

        /// Volume (vol)
        #[arg(long)]
        volume: Option<u32>,

        /// Speaker voice (per)
        #[arg(long)]
        person: Option<u32>,

        /// Override the configured output directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Fetch an access token and show the session
    Token,

    /// Initialize configuration
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration
    Config {
        /// Show full configuration including secrets
        #[arg(short, long)]
        show_secrets: bool,
    },
}

/// Main CLI entry point
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    if cli.debug {
        tracing::info!("Debug mode enabled");
    }

    match cli.command {
        Commands::Recognize { file, lang } => cmd_recognize(&config, &file, &lang).await,
        Commands::Synthesize {
            text,
            lang,
            speed,
            pitch,
            volume,
            person,
            output_dir,
        } => {
            let mut options = config.synthesis.clone();
            if let Some(lang) = lang {
                options.language = lang;
            }
            if let Some(speed) = speed {
                options.speed = speed;
            }
            if let Some(pitch) = pitch {
                options.pitch = pitch;
            }
            if let Some(volume) = volume {
                options.volume = volume;
            }
            if let Some(person) = person {
                options.personality = person;
            }
            cmd_synthesize(&config, &text, &options, output_dir).await
        }
        Commands::Token => cmd_token(&config).await,
        Commands::Init { force } => cmd_init(force),
        Commands::Config { show_secrets } => cmd_config(&config, show_secrets),
    }
}
