//! Coordinate mapping from preview-container space into video pixel space.

/// Placement mapping and overlay sizing.
pub mod mapper;
