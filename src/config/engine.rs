use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{OverlayerError, OverlayerResult};

/// Default fraction of the video width an overlay occupies at 100% scale.
pub const DEFAULT_BASELINE_FRACTION: f64 = 0.30;

/// Engine-wide configuration shared by every request a session serves.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Overlay sizing policy.
    pub sizing: SizingPolicy,
    /// Output encoding settings.
    pub encode: EncodeSettings,
    /// External tool locations.
    pub tools: ToolPaths,
    /// Parent directory for per-request workspaces.
    pub workspace_root: PathBuf,
    /// Frames between progress events. `0` disables periodic progress.
    pub progress_every: u64,
    /// Logging configuration (used by the CLI).
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sizing: SizingPolicy::default(),
            encode: EncodeSettings::default(),
            tools: ToolPaths::default(),
            workspace_root: std::env::temp_dir().join("overlayer"),
            progress_every: 30,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_path(path: &Path) -> OverlayerResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_slice(&bytes).map_err(|e| {
            OverlayerError::config(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> OverlayerResult<()> {
        self.sizing.validate()?;
        if self.encode.video_codec.trim().is_empty() {
            return Err(OverlayerError::config("encode.video_codec must not be empty"));
        }
        if self.encode.audio_codec.trim().is_empty() {
            return Err(OverlayerError::config("encode.audio_codec must not be empty"));
        }
        if let Some(crf) = self.encode.crf
            && crf > 51
        {
            return Err(OverlayerError::config("encode.crf must be within 0..=51"));
        }
        Ok(())
    }
}

/// Rule fixing an overlay's default on-screen size before user scale is applied.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    /// At 100% scale the overlay spans this fraction of the video width.
    VideoWidthFraction(f64),
    /// At 100% scale the overlay keeps its natural pixel size.
    Natural,
}

/// Overlay sizing policy.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SizingPolicy {
    /// Baseline rule.
    pub baseline: Baseline,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            baseline: Baseline::VideoWidthFraction(DEFAULT_BASELINE_FRACTION),
        }
    }
}

impl SizingPolicy {
    /// Policy that keeps the overlay's natural size at 100% scale.
    pub fn natural() -> Self {
        Self {
            baseline: Baseline::Natural,
        }
    }

    /// Validate the configured fraction.
    pub fn validate(&self) -> OverlayerResult<()> {
        if let Baseline::VideoWidthFraction(f) = self.baseline
            && !(f.is_finite() && f > 0.0 && f <= 1.0)
        {
            return Err(OverlayerError::config(format!(
                "sizing baseline fraction must be within (0, 1], got {f}"
            )));
        }
        Ok(())
    }
}

/// Output encoding settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeSettings {
    /// ffmpeg video encoder name.
    pub video_codec: String,
    /// Output pixel format.
    pub pix_fmt: String,
    /// Constant rate factor, if the encoder supports it.
    pub crf: Option<u8>,
    /// ffmpeg audio encoder used when reattaching source audio.
    pub audio_codec: String,
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            pix_fmt: "yuv420p".to_string(),
            crf: None,
            audio_codec: "aac".to_string(),
            overwrite: true,
        }
    }
}

impl EncodeSettings {
    /// Chroma-subsampled formats need even frame dimensions.
    pub fn requires_even_dimensions(&self) -> bool {
        matches!(self.pix_fmt.as_str(), "yuv420p" | "yuvj420p" | "nv12" | "yuv422p")
    }
}

/// Locations of the `ffmpeg`/`ffprobe` executables.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    /// `ffmpeg` executable.
    pub ffmpeg: PathBuf,
    /// `ffprobe` executable.
    pub ffprobe: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g. `info`, `overlayer=debug,warn`).
    pub level: String,
    /// Emit structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/engine.rs"]
mod tests;
