//! Engine configuration and the validated placement record.

/// Engine-wide settings (sizing policy, encoding, tools, logging).
pub mod engine;
/// Caller placement input and its validated form.
pub mod placement;
