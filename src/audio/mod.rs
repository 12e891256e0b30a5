//! Reattaching the source audio track to the composited video.

/// Audio/video muxing with video-only fallback.
pub mod remux;
