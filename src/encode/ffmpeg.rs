use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::Context as _;

use crate::config::engine::{EncodeSettings, ToolPaths};
use crate::encode::sink::{FrameSink, SinkConfig, check_frame};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::media::frame::Frame;
use crate::media::tool::{StderrDrain, is_tool_available, join_stderr, spawn_stderr_drain};

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output file path (container inferred from extension by ffmpeg).
    pub out_path: PathBuf,
    /// Encoder settings.
    pub encode: EncodeSettings,
    /// Tool locations.
    pub tools: ToolPaths,
}

impl FfmpegSinkOpts {
    /// Create options for a video-only output at `out_path` with default encoding.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            encode: EncodeSettings::default(),
            tools: ToolPaths::default(),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to stdin.
///
/// Output is video-only; audio is reattached in a separate pass.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<StderrDrain>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    written: u64,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
            written: 0,
        }
    }

    /// Output path.
    pub fn out_path(&self) -> &Path {
        &self.opts.out_path
    }

    fn kill_child(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = join_stderr(self.stderr_drain.take());
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> OverlayerResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(OverlayerError::encode("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(OverlayerError::encode(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if self.opts.encode.requires_even_dimensions()
            && (!cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2))
        {
            return Err(OverlayerError::encode(format!(
                "{}x{} is incompatible with pix_fmt {} (width/height must be even)",
                cfg.width, cfg.height, self.opts.encode.pix_fmt
            )));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.encode.overwrite && self.opts.out_path.exists() {
            return Err(OverlayerError::encode(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }

        if !is_tool_available(&self.opts.tools.ffmpeg) {
            return Err(OverlayerError::encode(format!(
                "'{}' is required for encoding, but could not be run",
                self.opts.tools.ffmpeg.display()
            )));
        }

        let mut cmd = Command::new(&self.opts.tools.ffmpeg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        cmd.arg(if self.opts.encode.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            cfg.layout.ffmpeg_pix_fmt(),
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            // For rawvideo input, `-r` before `-i` sets the input frame rate.
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            &self.opts.encode.video_codec,
            "-pix_fmt",
            &self.opts.encode.pix_fmt,
        ]);
        if let Some(crf) = self.opts.encode.crf {
            cmd.args(["-crf", &crf.to_string()]);
        }
        cmd.args(["-movflags", "+faststart"]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            OverlayerError::encode(format!(
                "failed to spawn '{}': {e}",
                self.opts.tools.ffmpeg.display()
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| OverlayerError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| OverlayerError::encode("failed to open ffmpeg stderr (unexpected)"))?;

        tracing::debug!(
            out = %self.opts.out_path.display(),
            codec = %self.opts.encode.video_codec,
            fps = %cfg.fps,
            width = cfg.width,
            height = cfg.height,
            "ffmpeg encoder started"
        );

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(spawn_stderr_drain(stderr));
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, frame: &Frame) -> OverlayerResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| OverlayerError::encode("ffmpeg sink not started"))?;
        check_frame(cfg, self.last_idx, frame)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(OverlayerError::encode("ffmpeg sink is already finalized"));
        };
        if let Err(e) = stdin.write_all(&frame.data) {
            // A broken pipe means ffmpeg already exited; its stderr carries the real cause.
            drop(self.stdin.take());
            if let Some(mut child) = self.child.take() {
                let _ = child.wait();
            }
            let stderr = join_stderr(self.stderr_drain.take());
            return Err(OverlayerError::encode(format!(
                "failed to write frame {} to ffmpeg: {e}: {stderr}",
                frame.index.0
            )));
        }
        self.last_idx = Some(frame.index);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> OverlayerResult<u64> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| OverlayerError::encode("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| OverlayerError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = join_stderr(self.stderr_drain.take());
        if !status.success() {
            return Err(OverlayerError::encode(format!(
                "ffmpeg exited with status {status}: {stderr}"
            )));
        }

        self.cfg = None;
        Ok(self.written)
    }

    fn abort(&mut self) {
        self.kill_child();
        self.cfg = None;
        if self.opts.out_path.exists() {
            match std::fs::remove_file(&self.opts.out_path) {
                Ok(()) => tracing::debug!(
                    path = %self.opts.out_path.display(),
                    "removed partial output"
                ),
                Err(e) => tracing::warn!(
                    path = %self.opts.out_path.display(),
                    error = %e,
                    "failed to remove partial output"
                ),
            }
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.kill_child();
        }
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> OverlayerResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
