//! Encoding sinks.
//!
//! Sinks consume composited frames in source order and produce the video-only intermediate.

/// `ffmpeg`-based sink (system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
