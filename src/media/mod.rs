//! Source video access: probing, frame buffers and streaming decode.
//!
//! Decoding shells out to the system `ffmpeg`/`ffprobe`; frames are streamed one buffer at a time
//! so peak memory stays at a single frame regardless of clip length.

/// Frame buffers and pixel layouts.
pub mod frame;
/// `ffprobe`-based metadata probing.
pub mod probe;
/// Frame source trait and implementations.
pub mod source;
/// External tool helpers.
pub mod tool;
