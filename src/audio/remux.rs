use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::engine::{EncodeSettings, ToolPaths};
use crate::foundation::error::{OverlayerError, OverlayerResult};

/// Inputs for reattaching source audio to a composited video-only stream.
#[derive(Clone, Debug)]
pub struct AudioJob {
    /// Composited video-only intermediate. Consumed on every path.
    pub video_only: PathBuf,
    /// Original source container.
    pub source: PathBuf,
    /// Whether the source carries an audio stream.
    pub source_has_audio: bool,
    /// Where the final artifact is written.
    pub out_path: PathBuf,
    /// Duration of the composited video in seconds; audio is padded or trimmed to it.
    pub video_duration_secs: f64,
}

/// How the final artifact was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AudioOutcome {
    /// Source audio was muxed onto the composited video.
    Muxed,
    /// The source had no audio; the composited video is the artifact unchanged.
    NoSourceAudio,
    /// Muxing failed; the composited video-only stream was substituted.
    VideoOnlyFallback {
        /// Human-readable mux failure.
        cause: String,
    },
}

impl AudioOutcome {
    /// Return `true` when the final artifact carries an audio stream.
    pub fn audio_present(&self) -> bool {
        matches!(self, Self::Muxed)
    }

    /// Mux failure cause for degraded artifacts.
    pub fn degraded_cause(&self) -> Option<&str> {
        match self {
            Self::VideoOnlyFallback { cause } => Some(cause),
            _ => None,
        }
    }
}

/// Produce the final artifact at `job.out_path`, muxing source audio when present.
///
/// Mux failures are absorbed into [`AudioOutcome::VideoOnlyFallback`]; only failing to place the
/// video-only stream at the output path is fatal.
#[tracing::instrument(skip_all, fields(out = %job.out_path.display(), has_audio = job.source_has_audio))]
pub fn reattach_audio(
    job: &AudioJob,
    encode: &EncodeSettings,
    tools: &ToolPaths,
) -> OverlayerResult<AudioOutcome> {
    if !job.source_has_audio {
        promote(&job.video_only, &job.out_path)?;
        tracing::debug!("source has no audio; using composited video as-is");
        return Ok(AudioOutcome::NoSourceAudio);
    }

    match mux_audio(job, encode, tools) {
        Ok(()) => {
            remove_intermediate(&job.video_only);
            tracing::debug!("muxed source audio");
            Ok(AudioOutcome::Muxed)
        }
        Err(err) => {
            let cause = err.to_string();
            tracing::warn!(error = %cause, "audio mux failed; falling back to video-only output");
            if job.out_path.exists() {
                remove_intermediate(&job.out_path);
            }
            promote(&job.video_only, &job.out_path)?;
            Ok(AudioOutcome::VideoOnlyFallback { cause })
        }
    }
}

fn mux_audio(job: &AudioJob, encode: &EncodeSettings, tools: &ToolPaths) -> OverlayerResult<()> {
    let out = build_mux_command(job, encode, tools)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| {
            OverlayerError::audio_mux(format!(
                "failed to run '{}': {e}",
                tools.ffmpeg.display()
            ))
        })?;
    if !out.status.success() {
        return Err(OverlayerError::audio_mux(format!(
            "ffmpeg mux exited with status {}: {}",
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let len = std::fs::metadata(&job.out_path).map(|m| m.len()).unwrap_or(0);
    if len == 0 {
        return Err(OverlayerError::audio_mux("ffmpeg mux produced an empty file"));
    }
    Ok(())
}

/// `ffmpeg` invocation copying the video stream and encoding the first source audio stream,
/// padded with silence and cut at the video duration.
pub fn build_mux_command(job: &AudioJob, encode: &EncodeSettings, tools: &ToolPaths) -> Command {
    let mut cmd = Command::new(&tools.ffmpeg);
    cmd.args(["-y", "-v", "error", "-nostdin", "-i"])
        .arg(&job.video_only)
        .arg("-i")
        .arg(&job.source)
        .args([
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-c:v",
            "copy",
            "-c:a",
            &encode.audio_codec,
            "-af",
            "apad",
            "-t",
            &format!("{:.6}", job.video_duration_secs.max(0.0)),
            "-movflags",
            "+faststart",
        ])
        .arg(&job.out_path);
    cmd
}

/// Move `from` to `to`, copying when a rename cannot cross filesystems.
fn promote(from: &Path, to: &Path) -> OverlayerResult<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to).map_err(|e| {
        OverlayerError::encode(format!(
            "move composited video '{}' to '{}': {e}",
            from.display(),
            to.display()
        ))
    })?;
    remove_intermediate(from);
    Ok(())
}

fn remove_intermediate(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove intermediate file");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/remux.rs"]
mod tests;
