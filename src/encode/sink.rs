use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::media::frame::{Frame, PixelLayout};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second (same as the source).
    pub fps: Fps,
    /// Layout of the frames that will be pushed.
    pub layout: PixelLayout,
}

/// Sink contract for consuming composited frames in source order.
///
/// Ordering contract: `push_frame` is called in strictly increasing [`FrameIndex`] order.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> OverlayerResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, frame: &Frame) -> OverlayerResult<()>;
    /// Called once after the last frame is pushed. Returns the number of frames written.
    fn end(&mut self) -> OverlayerResult<u64>;
    /// Abandon the output, releasing resources and removing anything partially written.
    fn abort(&mut self);
}

/// Check a frame against the sink configuration and the previous index.
pub(crate) fn check_frame(
    cfg: &SinkConfig,
    last_idx: Option<FrameIndex>,
    frame: &Frame,
) -> OverlayerResult<()> {
    if let Some(last) = last_idx
        && frame.index <= last
    {
        return Err(OverlayerError::encode(format!(
            "sink received out-of-order frame {} after {}",
            frame.index.0, last.0
        )));
    }
    if frame.width != cfg.width || frame.height != cfg.height || frame.layout != cfg.layout {
        return Err(OverlayerError::encode(format!(
            "frame {} is {}x{} {:?}, sink expects {}x{} {:?}",
            frame.index.0,
            frame.width,
            frame.height,
            frame.layout,
            cfg.width,
            cfg.height,
            cfg.layout
        )));
    }
    if !frame.is_consistent() {
        return Err(OverlayerError::encode(format!(
            "frame {} buffer size does not match its dimensions",
            frame.index.0
        )));
    }
    Ok(())
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<Frame>,
    aborted: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Return `true` once `abort` has been called.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> OverlayerResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, frame: &Frame) -> OverlayerResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| OverlayerError::encode("sink not started"))?;
        check_frame(cfg, self.frames.last().map(|f| f.index), frame)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self) -> OverlayerResult<u64> {
        Ok(self.frames.len() as u64)
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.aborted = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
