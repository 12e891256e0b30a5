use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::engine::ToolPaths;
use crate::foundation::core::{Fps, Size};
use crate::foundation::error::{OverlayerError, OverlayerResult};

/// Immutable session metadata of a source video.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VideoInfo {
    /// Source path used for probing and decoding.
    pub source_path: PathBuf,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Frame rate.
    pub fps: Fps,
    /// Number of video frames.
    pub frame_count: u64,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Whether at least one audio stream is present.
    pub has_audio: bool,
    /// Duration of the first audio stream, when the container reports one per stream.
    pub audio_duration_secs: Option<f64>,
}

impl VideoInfo {
    /// Frame dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

/// Probe source video metadata through `ffprobe`.
#[tracing::instrument(skip(tools))]
pub fn probe_video(source_path: &Path, tools: &ToolPaths) -> OverlayerResult<VideoInfo> {
    if !source_path.is_file() {
        return Err(OverlayerError::input(format!(
            "source video '{}' does not exist",
            source_path.display()
        )));
    }

    let out = Command::new(&tools.ffprobe)
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| {
            OverlayerError::decode(format!(
                "failed to run '{}': {e}",
                tools.ffprobe.display()
            ))
        })?;
    if !out.status.success() {
        return Err(OverlayerError::decode(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    parse_probe_json(source_path, &out.stdout)
}

/// Interpret `ffprobe -print_format json` output.
pub fn parse_probe_json(source_path: &Path, json: &[u8]) -> OverlayerResult<VideoInfo> {
    let parsed: ProbeOut = serde_json::from_slice(json)
        .map_err(|e| OverlayerError::decode(format!("ffprobe json parse failed: {e}")))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| OverlayerError::decode("no video stream found"))?;
    let width = video
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| OverlayerError::decode("missing video width from ffprobe"))?;
    let height = video
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| OverlayerError::decode("missing video height from ffprobe"))?;

    let fps = [video.avg_frame_rate.as_deref(), video.r_frame_rate.as_deref()]
        .into_iter()
        .flatten()
        .find_map(|s| Fps::parse_rational(s).ok())
        .ok_or_else(|| OverlayerError::decode("missing or zero frame rate from ffprobe"))?;

    let duration_secs = video
        .duration
        .as_deref()
        .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(parse_secs);

    let frame_count = match video
        .nb_frames
        .as_deref()
        .and_then(|n| n.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
    {
        Some(n) => n,
        None => {
            let secs = duration_secs.ok_or_else(|| {
                OverlayerError::decode("ffprobe reported neither frame count nor duration")
            })?;
            fps.secs_to_frames_round(secs)
        }
    };

    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps,
        frame_count,
        duration_secs: duration_secs.unwrap_or_else(|| fps.frames_to_secs(frame_count)),
        has_audio: audio.is_some(),
        audio_duration_secs: audio.and_then(|a| a.duration.as_deref()).and_then(parse_secs),
    })
}

fn parse_secs(d: &str) -> Option<f64> {
    d.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
