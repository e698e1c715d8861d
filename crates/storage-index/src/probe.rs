//! Write-once export of reflection-probe capture parameters.

use std::path::Path;

use crate::record::ProbeExportRecord;

/// File written next to the face images when the source is a probe.
pub const PROBE_SETTINGS_FILE: &str = "probe_settings.json";

/// Serialize `record` to `probe_settings.json` inside `folder`.
///
/// Write-only, no retries. Failure is logged and non-fatal to the capture;
/// the return value only reports whether the file was written.
pub fn export_probe_settings(record: &ProbeExportRecord, folder: &Path) -> bool {
    let path = folder.join(PROBE_SETTINGS_FILE);
    let json = match serde_json::to_string_pretty(record) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize probe settings");
            return false;
        }
    };
    match std::fs::write(&path, json) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Exported probe settings");
            true
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to write probe settings");
            false
        }
    }
}
