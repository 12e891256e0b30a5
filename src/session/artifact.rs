use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::Fps;
use crate::foundation::error::OverlayerResult;
use crate::geometry::mapper::OverlayGeometry;

/// Per-request compositing counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct BlendStats {
    /// Frames that received the overlay.
    pub frames_blended: u64,
    /// Frames whose ROI had to be clipped to the frame bounds.
    pub frames_clipped: u64,
    /// Frames passed through unmodified after a recoverable blend error.
    pub frames_failed: u64,
}

/// Final result of a compositing request.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CompositeArtifact {
    /// Request-scoped identifier.
    pub request_id: String,
    /// Final video file.
    pub output_path: PathBuf,
    /// Output duration in seconds.
    pub duration_secs: f64,
    /// Number of video frames written.
    pub frame_count: u64,
    /// Output frame rate (same as the source).
    pub fps: Fps,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Whether the artifact carries an audio stream.
    pub audio_present: bool,
    /// Set when audio could not be reattached and the video-only stream was used instead.
    pub audio_degraded: Option<String>,
    /// Overlay rectangle used, in video pixels.
    pub geometry: OverlayGeometry,
    /// Opacity used, in `[0, 1]`.
    pub opacity: f32,
    /// Compositing counters.
    pub blend: BlendStats,
}

impl CompositeArtifact {
    /// Return `true` when the request succeeded with a recoverable degradation.
    pub fn is_degraded(&self) -> bool {
        self.audio_degraded.is_some()
    }

    /// `<output stem>_metadata.json` next to the output file.
    pub fn sidecar_path(&self) -> PathBuf {
        sidecar_path_for(&self.output_path)
    }

    /// Write the artifact description as pretty JSON next to the output file.
    pub fn write_sidecar(&self) -> OverlayerResult<PathBuf> {
        let path = self.sidecar_path();
        let json = serde_json::to_vec_pretty(self).context("serialize artifact metadata")?;
        std::fs::write(&path, json)
            .with_context(|| format!("write artifact metadata '{}'", path.display()))?;
        Ok(path)
    }
}

/// Sidecar metadata path for an output video.
pub fn sidecar_path_for(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output.with_file_name(format!("{stem}_metadata.json"))
}

#[cfg(test)]
#[path = "../../tests/unit/session/artifact.rs"]
mod tests;
