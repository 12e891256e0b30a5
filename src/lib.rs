//! Overlayer composites a raster overlay onto every frame of a video and reattaches the source
//! audio.
//!
//! The public API is session-oriented:
//!
//! - Build a [`CompositeSession`] from an [`EngineConfig`]
//! - Describe a request with a [`CompositeJob`] (source video, [`OverlayImage`], [`PlacementRequest`])
//! - Run it to get a [`CompositeArtifact`]
//!
//! The building blocks (probing, the coordinate mapper, the compositor, frame sources and sinks)
//! are public too, so callers can drive the frame loop themselves with [`composite_frames`].
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// Overlay asset decoding and resampling.
pub mod assets;
/// Audio reattachment.
pub mod audio;
/// Engine configuration and placement input.
pub mod config;
/// Per-frame compositing.
pub mod effects;
/// Encoding sinks.
pub mod encode;
/// Preview-space to video-space mapping.
pub mod geometry;
/// `tracing` subscriber setup.
pub mod logging;
/// Source probing and decoding.
pub mod media;
/// Request orchestration.
pub mod session;

pub use crate::foundation::core::{Fps, FrameIndex, Size};
pub use crate::foundation::error::{ErrorKind, OverlayerError, OverlayerResult};

pub use crate::assets::overlay::{OverlayAsset, OverlayImage, decode_overlay, load_overlay};
pub use crate::audio::remux::{AudioJob, AudioOutcome, reattach_audio};
pub use crate::config::engine::{Baseline, EngineConfig, SizingPolicy};
pub use crate::config::placement::{PlacementRequest, PlacementSpec};
pub use crate::effects::composite::{BlendReport, composite_frame};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::geometry::mapper::{OverlayGeometry, map_placement};
pub use crate::media::frame::{Frame, PixelLayout};
pub use crate::media::probe::{VideoInfo, probe_video};
pub use crate::media::source::{FfmpegSource, FrameSource, InMemorySource};
pub use crate::session::artifact::{BlendStats, CompositeArtifact};
pub use crate::session::pipeline::{CompositeJob, CompositeSession, Progress, composite_frames};
