use std::collections::VecDeque;
use std::io::Read as _;
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::config::engine::ToolPaths;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::media::frame::{Frame, PixelLayout};
use crate::media::probe::VideoInfo;
use crate::media::tool::{StderrDrain, join_stderr, spawn_stderr_drain};

/// Producer of decoded frames in source order.
///
/// Ordering contract: `next_frame` yields frames with strictly increasing [`FrameIndex`] starting
/// at 0 and returns `Ok(None)` once the source is exhausted.
pub trait FrameSource {
    /// Immutable metadata of the source.
    fn info(&self) -> &VideoInfo;
    /// Channel layout of the frames this source yields.
    fn layout(&self) -> PixelLayout;
    /// Decode the next frame.
    fn next_frame(&mut self) -> OverlayerResult<Option<Frame>>;
}

/// Streams raw frames from a system `ffmpeg` child, one frame buffer at a time.
pub struct FfmpegSource {
    info: VideoInfo,
    layout: PixelLayout,
    frame_len: usize,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<StderrDrain>,
    next_idx: u64,
}

impl FfmpegSource {
    /// Spawn `ffmpeg` decoding `info.source_path` to raw `layout` frames.
    pub fn open(info: VideoInfo, layout: PixelLayout, tools: &ToolPaths) -> OverlayerResult<Self> {
        let frame_len = layout.frame_len(info.width, info.height)?;
        if frame_len == 0 {
            return Err(OverlayerError::decode(
                "decoded video frame size is zero (invalid source dimensions)",
            ));
        }

        let mut child = Command::new(&tools.ffmpeg)
            // Probed dimensions are pre-rotation; keep decoded frames in the same geometry.
            .args(["-v", "error", "-nostdin", "-noautorotate", "-i"])
            .arg(&info.source_path)
            .args([
                "-map",
                "0:v:0",
                "-vsync",
                "passthrough",
                "-f",
                "rawvideo",
                "-pix_fmt",
                layout.ffmpeg_pix_fmt(),
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                OverlayerError::decode(format!(
                    "failed to spawn '{}' for video decode: {e}",
                    tools.ffmpeg.display()
                ))
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| OverlayerError::decode("failed to open ffmpeg stdout (unexpected)"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| OverlayerError::decode("failed to open ffmpeg stderr (unexpected)"))?;

        tracing::debug!(
            path = %info.source_path.display(),
            width = info.width,
            height = info.height,
            fps = %info.fps,
            "ffmpeg decoder started"
        );

        Ok(Self {
            info,
            layout,
            frame_len,
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(spawn_stderr_drain(stderr)),
            next_idx: 0,
        })
    }

    fn finish(&mut self) -> OverlayerResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child
            .wait()
            .map_err(|e| OverlayerError::decode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = join_stderr(self.stderr_drain.take());
        if !status.success() {
            return Err(OverlayerError::decode(format!(
                "ffmpeg decode of '{}' exited with status {status}: {stderr}",
                self.info.source_path.display()
            )));
        }
        Ok(())
    }
}

impl FrameSource for FfmpegSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn layout(&self) -> PixelLayout {
        self.layout
    }

    fn next_frame(&mut self) -> OverlayerResult<Option<Frame>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0;
        while filled < buf.len() {
            let n = stdout
                .read(&mut buf[filled..])
                .map_err(|e| OverlayerError::decode(format!("failed to read ffmpeg stdout: {e}")))?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            self.finish()?;
            return Ok(None);
        }
        if filled < buf.len() {
            let _ = self.finish();
            return Err(OverlayerError::decode(format!(
                "truncated frame {} from ffmpeg: got {filled} of {} bytes",
                self.next_idx,
                buf.len()
            )));
        }

        let idx = FrameIndex(self.next_idx);
        self.next_idx += 1;
        Frame::new(idx, self.info.width, self.info.height, self.layout, buf).map(Some)
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        drop(self.stdout.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// In-memory source for tests and callers that already hold decoded frames.
#[derive(Debug)]
pub struct InMemorySource {
    info: VideoInfo,
    layout: PixelLayout,
    frames: VecDeque<Frame>,
}

impl InMemorySource {
    /// Create a source yielding `frames` in order. The layout is taken from the first frame.
    pub fn new(info: VideoInfo, frames: Vec<Frame>) -> Self {
        let layout = frames.first().map_or(PixelLayout::Rgb8, |f| f.layout);
        Self {
            info,
            layout,
            frames: frames.into(),
        }
    }
}

impl FrameSource for InMemorySource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn layout(&self) -> PixelLayout {
        self.layout
    }

    fn next_frame(&mut self) -> OverlayerResult<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}
