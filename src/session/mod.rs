//! Request orchestration: workspace, frame loop, audio reattachment and the final artifact.

/// Final artifact description and audit sidecar.
pub mod artifact;
/// The compositing pipeline.
pub mod pipeline;
/// Per-request scratch directories.
pub mod workspace;
