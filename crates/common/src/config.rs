//! Application and capture configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{CubecapError, CubecapResult};

/// Smallest allowed per-face resolution.
pub const MIN_RESOLUTION: u32 = 256;

/// Largest allowed per-face resolution.
pub const MAX_RESOLUTION: u32 = 8192;

/// Resolutions above this require the persisted consent flag.
pub const CONSENT_THRESHOLD: u32 = 4096;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory that cubemap output is stored under.
    pub output_root: PathBuf,

    /// Default capture settings.
    pub capture: CaptureConfig,

    /// Consent to capture above [`CONSENT_THRESHOLD`]. Only ever set by an
    /// explicit confirmation step, never inferred from the resolution.
    pub high_res_consent: bool,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Settings for a single capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Per-face render/output size in pixels. Must be a power of two in
    /// `[MIN_RESOLUTION, MAX_RESOLUTION]`.
    pub resolution: u32,

    /// Output image encoding.
    pub format: ImageFormat,

    /// Render the environment backdrop, or substitute a flat color.
    pub include_background: bool,

    /// Flat color used when `include_background` is false (RGBA, 0.0-1.0).
    pub background_color: [f32; 4],

    /// Scene layers visible to the capture cameras.
    pub culling_mask: u32,
}

/// Output image encoding, with lossy quality where applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossless default.
    Png,
    /// Lossy, quality 0-100.
    Jpg { quality: u8 },
    /// Lossy with alpha, quality 0-100. May degrade to PNG on encoder
    /// failure.
    Webp { quality: u8 },
}

impl ImageFormat {
    /// File extension (without the dot) written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpg { .. } => "jpg",
            ImageFormat::Webp { .. } => "webp",
        }
    }

    /// Whether the destination format expects the opposite vertical scan
    /// origin from the render readback, requiring a flip before encoding.
    pub fn requires_vertical_flip(&self) -> bool {
        matches!(self, ImageFormat::Webp { .. })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "cubecap=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            capture: CaptureConfig::default(),
            high_res_consent: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            resolution: 2048,
            format: ImageFormat::Png,
            include_background: true,
            background_color: [0.0, 0.0, 0.0, 1.0],
            culling_mask: u32::MAX,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl CaptureConfig {
    /// Validate resolution bounds and the high-resolution consent gate.
    ///
    /// Called before any directory or camera allocation; a failure here must
    /// leave zero side effects behind.
    pub fn validate(&self, high_res_consent: bool) -> CubecapResult<()> {
        if self.resolution < MIN_RESOLUTION {
            return Err(CubecapError::config(format!(
                "resolution must be at least {MIN_RESOLUTION}, got {}",
                self.resolution
            )));
        }
        if self.resolution > MAX_RESOLUTION {
            return Err(CubecapError::config(format!(
                "resolution cannot exceed {MAX_RESOLUTION}, got {}",
                self.resolution
            )));
        }
        if !self.resolution.is_power_of_two() {
            return Err(CubecapError::config(format!(
                "resolution must be a power of two, got {}",
                self.resolution
            )));
        }
        if self.resolution > CONSENT_THRESHOLD && !high_res_consent {
            return Err(CubecapError::ConsentMissing);
        }
        if let ImageFormat::Jpg { quality } | ImageFormat::Webp { quality } = self.format {
            if quality > 100 {
                return Err(CubecapError::config(format!(
                    "quality must be 0-100, got {quality}"
                )));
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("cubecap").join("config.json")
}

/// Default output root directory.
fn default_output_root() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("cubecap")
}
