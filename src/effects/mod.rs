//! Per-frame overlay compositing.

/// Alpha blending of the overlay into frame ROIs.
pub mod composite;
