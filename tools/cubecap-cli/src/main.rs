//! CubeCap CLI — Command-line interface for cubemap capture.
//!
//! Usage:
//!   cubecap capture <OBJECT> [OPTIONS]       Capture a cubemap around an object
//!   cubecap probe-export <PROBE> [OPTIONS]   Capture a reflection probe and export its settings
//!   cubecap info <OBJECT>                    Show an object's storage record
//!   cubecap consent [--grant | --revoke]     Manage high-resolution consent

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cubecap",
    about = "Six-face cubemap capture with per-object storage history",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Capture options shared by `capture` and `probe-export`.
#[derive(Debug, clap::Args)]
struct CaptureArgs {
    /// Storage root (defaults to the configured output root)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Per-face resolution (power of two, 256-8192)
    #[arg(short, long, default_value = "2048")]
    resolution: u32,

    /// Output format: png, jpg, or webp
    #[arg(short, long, default_value = "png")]
    format: String,

    /// Quality for lossy formats (0-100)
    #[arg(short, long, default_value = "95")]
    quality: u8,

    /// Substitute a flat color for the environment backdrop
    #[arg(long)]
    no_background: bool,

    /// Scene-layer culling mask (decimal or 0x-prefixed hex)
    #[arg(long, default_value = "4294967295", value_parser = parse_mask)]
    mask: u32,

    /// Overwrite existing output without asking
    #[arg(short, long)]
    yes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a cubemap around an object
    Capture {
        /// Object identifier
        object: String,

        #[command(flatten)]
        args: CaptureArgs,
    },

    /// Capture a reflection probe and export its settings alongside
    ProbeExport {
        /// Probe identifier
        probe: String,

        /// JSON file with probe parameters (defaults used when omitted)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        #[command(flatten)]
        args: CaptureArgs,
    },

    /// Show an object's storage record and capture history
    Info {
        /// Object identifier
        object: String,

        /// Storage root (defaults to the configured output root)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Grant or revoke consent for resolutions above 4096
    Consent {
        /// Grant consent
        #[arg(long, conflicts_with = "revoke")]
        grant: bool,

        /// Revoke consent
        #[arg(long)]
        revoke: bool,
    },
}

/// Accept a culling mask as decimal or 0x-prefixed hex.
fn parse_mask(s: &str) -> Result<u32, std::num::ParseIntError> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    cubecap_common::logging::init_logging(&cubecap_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
    });

    match cli.command {
        Commands::Capture { object, args } => commands::capture::run(object, None, args),
        Commands::ProbeExport {
            probe,
            settings,
            args,
        } => {
            let record = commands::capture::load_probe_settings(settings.as_deref())?;
            commands::capture::run(probe, Some(record), args)
        }
        Commands::Info { object, output } => commands::info::run(object, output),
        Commands::Consent { grant, revoke } => commands::consent::run(grant, revoke),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_accepts_decimal_and_hex() {
        assert_eq!(parse_mask("255"), Ok(255));
        assert_eq!(parse_mask("0xFF"), Ok(255));
        assert_eq!(parse_mask("0X10"), Ok(16));
        assert!(parse_mask("0xZZ").is_err());
        assert!(parse_mask("nope").is_err());
    }

    #[test]
    fn capture_command_parses_hex_mask() {
        let cli = Cli::try_parse_from(["cubecap", "capture", "Lamp", "--mask", "0x0F"]).unwrap();
        let Commands::Capture { args, .. } = cli.command else {
            panic!("expected the capture subcommand");
        };
        assert_eq!(args.mask, 15);
    }
}
