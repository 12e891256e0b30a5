use std::path::PathBuf;

use crate::assets::overlay::{OverlayAsset, OverlayImage, decode_overlay};
use crate::audio::remux::{AudioJob, reattach_audio};
use crate::config::engine::EngineConfig;
use crate::config::placement::PlacementRequest;
use crate::effects::composite::composite_frame;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, ensure_parent_dir};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::error::{OverlayerError, OverlayerResult};
use crate::geometry::mapper::{OverlayGeometry, map_placement};
use crate::media::frame::PixelLayout;
use crate::media::probe::{VideoInfo, probe_video};
use crate::media::source::{FfmpegSource, FrameSource};
use crate::session::artifact::{BlendStats, CompositeArtifact};
use crate::session::workspace::RequestWorkspace;

/// One compositing request.
#[derive(Clone, Debug)]
pub struct CompositeJob {
    /// Source video file.
    pub source: PathBuf,
    /// Already-probed source metadata; probed with `ffprobe` when `None`.
    pub source_info: Option<VideoInfo>,
    /// Overlay image bytes.
    pub overlay: OverlayImage,
    /// Caller placement.
    pub placement: PlacementRequest,
    /// Final artifact path.
    pub output_path: PathBuf,
    /// Also write `<output stem>_metadata.json` next to the artifact.
    pub write_sidecar: bool,
}

/// Progress event emitted while frames are composited.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Frames processed so far.
    pub frame: u64,
    /// Expected total frames from the source metadata (may be an estimate).
    pub total: u64,
}

impl Progress {
    /// Completion percentage, capped at 100. `None` when the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some((self.frame as f64 / self.total as f64 * 100.0).min(100.0))
    }
}

/// Counters from one pass over the frame sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameLoopStats {
    /// Frames decoded from the source.
    pub frames_in: u64,
    /// Frames accepted by the sink.
    pub frames_out: u64,
    /// Compositing counters.
    pub blend: BlendStats,
}

/// Decode → blend → encode every frame strictly in order, one frame resident at a time.
///
/// Recoverable blend errors pass the frame through unmodified. Any source or sink failure aborts
/// the sink (removing partial output) and is returned.
pub fn composite_frames(
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    overlay: &OverlayAsset,
    geom: OverlayGeometry,
    opacity: f32,
    progress_every: u64,
    on_progress: &mut dyn FnMut(Progress),
) -> OverlayerResult<FrameLoopStats> {
    let info = source.info();
    let total = info.frame_count;
    let cfg = SinkConfig {
        width: info.width,
        height: info.height,
        fps: info.fps,
        layout: source.layout(),
    };

    if let Err(e) = sink.begin(cfg) {
        sink.abort();
        return Err(e);
    }

    let mut stats = FrameLoopStats::default();
    loop {
        let mut frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                sink.abort();
                return Err(e);
            }
        };
        stats.frames_in += 1;

        match composite_frame(&mut frame, overlay, geom, opacity) {
            Ok(report) => {
                if report.pixels > 0 {
                    stats.blend.frames_blended += 1;
                }
                if report.clipped {
                    stats.blend.frames_clipped += 1;
                }
            }
            Err(e) if e.kind().is_recoverable() => {
                tracing::warn!(frame = frame.index.0, error = %e, "blend failed; passing frame through");
                stats.blend.frames_failed += 1;
            }
            Err(e) => {
                sink.abort();
                return Err(e);
            }
        }

        if let Err(e) = sink.push_frame(&frame) {
            sink.abort();
            return Err(e);
        }
        stats.frames_out += 1;

        if progress_every > 0 && stats.frames_out.is_multiple_of(progress_every) {
            let p = Progress {
                frame: stats.frames_out,
                total,
            };
            tracing::debug!(frame = p.frame, total, percent = ?p.percent(), "compositing progress");
            on_progress(p);
        }
    }

    let written = match sink.end() {
        Ok(n) => n,
        Err(e) => {
            sink.abort();
            return Err(e);
        }
    };
    if written != stats.frames_in {
        sink.abort();
        return Err(OverlayerError::encode(format!(
            "sink wrote {written} frames but {} were decoded",
            stats.frames_in
        )));
    }
    if stats.frames_in != total {
        tracing::warn!(
            decoded = stats.frames_in,
            probed = total,
            "decoded frame count differs from probed metadata"
        );
    }

    on_progress(Progress {
        frame: stats.frames_out,
        total: stats.frames_out,
    });
    Ok(stats)
}

/// Entry point that runs compositing requests with one engine configuration.
///
/// A session holds no per-request state, so a shared reference can serve concurrent requests
/// from several threads; each request gets its own [`RequestWorkspace`].
#[derive(Clone, Debug)]
pub struct CompositeSession {
    config: EngineConfig,
}

impl CompositeSession {
    /// Validate `config` and build a session.
    pub fn new(config: EngineConfig) -> OverlayerResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Engine configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a request to completion.
    pub fn run(&self, job: CompositeJob) -> OverlayerResult<CompositeArtifact> {
        self.run_with_progress(job, &mut |_| {})
    }

    /// Run a request, reporting progress every `progress_every` frames.
    #[tracing::instrument(skip_all, fields(source = %job.source.display(), out = %job.output_path.display()))]
    pub fn run_with_progress(
        &self,
        job: CompositeJob,
        on_progress: &mut dyn FnMut(Progress),
    ) -> OverlayerResult<CompositeArtifact> {
        let cfg = &self.config;

        let spec = job.placement.validate()?;
        if job.output_path.as_os_str().is_empty() {
            return Err(OverlayerError::input("output path is empty"));
        }
        if !cfg.encode.overwrite && job.output_path.exists() {
            return Err(OverlayerError::input(format!(
                "output file '{}' already exists",
                job.output_path.display()
            )));
        }

        let decoded = decode_overlay(&job.overlay)?;
        let info = match job.source_info {
            Some(info) => info,
            None => probe_video(&job.source, &cfg.tools)?,
        };
        let geom = map_placement(&spec, decoded.natural_size(), info.size(), &cfg.sizing)?;
        let overlay = decoded.into_asset(geom.size());

        let workspace = RequestWorkspace::create(&cfg.workspace_root)?;
        let span = tracing::info_span!("request", request_id = %workspace.id());
        let _enter = span.enter();
        tracing::info!(
            video = %info.size(),
            fps = %info.fps,
            frames = info.frame_count,
            x = geom.x,
            y = geom.y,
            width = geom.width,
            height = geom.height,
            opacity = spec.opacity,
            opaque = overlay.is_opaque(),
            "compositing started"
        );

        let ext = job
            .output_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4");
        let video_only = workspace.path(&format!("composited.{ext}"));

        let mut encode = cfg.encode.clone();
        encode.overwrite = true;
        let mut sink = FfmpegSink::new(FfmpegSinkOpts {
            out_path: video_only.clone(),
            encode,
            tools: cfg.tools.clone(),
        });
        let mut source = FfmpegSource::open(info.clone(), PixelLayout::Rgb8, &cfg.tools)?;

        let stats = composite_frames(
            &mut source,
            &mut sink,
            &overlay,
            geom,
            spec.opacity,
            cfg.progress_every,
            on_progress,
        )?;
        drop(source);

        ensure_parent_dir(&job.output_path)?;
        let duration_secs = info.fps.frames_to_secs(stats.frames_out);
        let outcome = reattach_audio(
            &AudioJob {
                video_only,
                source: info.source_path.clone(),
                source_has_audio: info.has_audio,
                out_path: job.output_path.clone(),
                video_duration_secs: duration_secs,
            },
            &cfg.encode,
            &cfg.tools,
        )?;

        let artifact = CompositeArtifact {
            request_id: workspace.id().to_string(),
            output_path: job.output_path.clone(),
            duration_secs,
            frame_count: stats.frames_out,
            fps: info.fps,
            width: info.width,
            height: info.height,
            audio_present: outcome.audio_present(),
            audio_degraded: outcome.degraded_cause().map(str::to_string),
            geometry: geom,
            opacity: spec.opacity,
            blend: stats.blend,
        };

        if job.write_sidecar
            && let Err(e) = artifact.write_sidecar()
        {
            tracing::warn!(error = %e, "failed to write artifact metadata");
        }

        tracing::info!(
            frames = artifact.frame_count,
            duration_secs = artifact.duration_secs,
            audio = artifact.audio_present,
            degraded = artifact.is_degraded(),
            frames_failed = artifact.blend.frames_failed,
            "compositing finished"
        );
        drop(_enter);
        workspace.teardown();
        Ok(artifact)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/pipeline.rs"]
mod tests;
