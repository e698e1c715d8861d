//! Persistent per-object metadata records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Per-object storage metadata (`metadata.json` in each capture folder,
/// also persisted in the root index).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageRecord {
    /// Name of the object at the time the record was created.
    pub object_name: String,

    /// Output folder, relative to the storage root. Always of the form
    /// `CubemapOutput/Objects/<sanitized-name>_<timestamp>`.
    pub folder_path: PathBuf,

    /// Timestamp of the most recent capture.
    pub last_capture_date: Option<String>,

    /// Every capture timestamp, append-only, most recent last.
    #[serde(default)]
    pub capture_history: Vec<String>,

    /// Whether this object is a reflection probe source.
    pub is_probe_source: bool,
}

/// Flat snapshot of a reflection probe's capture-source parameters,
/// written once per capture as `probe_settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeExportRecord {
    pub importance: i32,
    pub intensity: f32,
    pub box_projection: bool,
    pub blend_distance: f32,
    pub box_size: [f32; 3],
    pub box_offset: [f32; 3],
    pub resolution: u32,
    pub hdr: bool,
    pub shadow_distance: f32,
    pub background_color: [f32; 4],
    pub near_clip_plane: f32,
    pub far_clip_plane: f32,
}

impl Default for ProbeExportRecord {
    fn default() -> Self {
        Self {
            importance: 1,
            intensity: 1.0,
            box_projection: false,
            blend_distance: 1.0,
            box_size: [10.0, 10.0, 10.0],
            box_offset: [0.0, 0.0, 0.0],
            resolution: 128,
            hdr: true,
            shadow_distance: 100.0,
            background_color: [0.0, 0.0, 0.0, 1.0],
            near_clip_plane: 0.3,
            far_clip_plane: 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips_through_json() {
        let record = StorageRecord {
            object_name: "Probe_Main".to_string(),
            folder_path: PathBuf::from("CubemapOutput/Objects/Probe_Main_2026-01-01_12-00-00"),
            last_capture_date: Some("2026-01-01_12-00-00".to_string()),
            capture_history: vec!["2026-01-01_12-00-00".to_string()],
            is_probe_source: true,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: StorageRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.object_name, record.object_name);
        assert_eq!(back.folder_path, record.folder_path);
        assert_eq!(back.capture_history, record.capture_history);
        assert!(back.is_probe_source);
    }

    #[test]
    fn history_defaults_to_empty_when_missing() {
        let json = r#"{
            "object_name": "Lamp",
            "folder_path": "CubemapOutput/Objects/Lamp_2026-01-01_12-00-00",
            "last_capture_date": null,
            "is_probe_source": false
        }"#;
        let record: StorageRecord = serde_json::from_str(json).unwrap();
        assert!(record.capture_history.is_empty());
    }
}
