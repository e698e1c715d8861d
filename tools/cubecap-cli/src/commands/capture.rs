//! Run a capture (plain object or reflection probe).

use std::io::Write;
use std::path::Path;

use cubecap_capture_engine::{
    CaptureOrchestrator, DecisionPolicy, SoftwareRenderHost, TickOutcome,
};
use cubecap_common::config::{AppConfig, CaptureConfig, ImageFormat};
use cubecap_processing_core::Vec3;
use cubecap_storage_index::{ProbeExportRecord, StorageIndex};

use crate::CaptureArgs;

/// Overwrite policy for a terminal session: ask on stdin unless `--yes`.
struct TerminalPolicy {
    assume_yes: bool,
}

impl DecisionPolicy for TerminalPolicy {
    fn confirm_overwrite(&self, folder: &Path) -> bool {
        if self.assume_yes {
            return true;
        }
        print!(
            "Existing captures found in {}. Create a new capture? [y/N] ",
            folder.display()
        );
        std::io::stdout().flush().ok();

        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim(), "y" | "Y" | "yes")
    }
}

pub fn run(
    object: String,
    probe: Option<ProbeExportRecord>,
    args: CaptureArgs,
) -> anyhow::Result<()> {
    let app = AppConfig::load();
    let root = args.output.clone().unwrap_or(app.output_root.clone());

    let config = CaptureConfig {
        resolution: args.resolution,
        format: parse_format(&args.format, args.quality)?,
        include_background: !args.no_background,
        background_color: app.capture.background_color,
        culling_mask: args.mask,
    };

    println!("Capturing: {object}");
    println!("  Root: {}", root.display());
    println!("  Resolution: {}x{}", args.resolution, args.resolution);
    println!("  Format: {}", args.format);
    println!();

    let index = StorageIndex::open(&root);
    let mut orchestrator =
        CaptureOrchestrator::new(SoftwareRenderHost::new(), index, config, app.high_res_consent)
            .with_policy(Box::new(TerminalPolicy {
                assume_yes: args.yes,
            }));

    match probe {
        Some(settings) => orchestrator.request_probe_export(&object, Vec3::ZERO, settings)?,
        None => orchestrator.request_capture(&object, Vec3::ZERO)?,
    }

    match orchestrator.run_to_completion() {
        TickOutcome::Completed(path) => {
            println!("Capture complete: {}", path.display());
            Ok(())
        }
        TickOutcome::Aborted => anyhow::bail!("capture aborted"),
        other => anyhow::bail!("unexpected outcome: {other:?}"),
    }
}

/// Load probe parameters from a JSON file, or use defaults.
pub fn load_probe_settings(path: Option<&Path>) -> anyhow::Result<ProbeExportRecord> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&json)?)
        }
        None => Ok(ProbeExportRecord::default()),
    }
}

fn parse_format(name: &str, quality: u8) -> anyhow::Result<ImageFormat> {
    match name.to_ascii_lowercase().as_str() {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpg { quality }),
        "webp" => Ok(ImageFormat::Webp { quality }),
        other => anyhow::bail!("unknown format '{other}' (expected png, jpg, or webp)"),
    }
}
