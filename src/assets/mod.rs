//! Overlay asset decoding and resampling.

/// Overlay loader.
pub mod overlay;
