use std::ffi::OsStr;

use super::*;

fn broken_tools(dir: &Path) -> ToolPaths {
    ToolPaths {
        ffmpeg: dir.join("no-such-ffmpeg"),
        ffprobe: dir.join("no-such-ffprobe"),
    }
}

fn job(dir: &Path, has_audio: bool) -> AudioJob {
    let video_only = dir.join("video_only.mp4");
    std::fs::write(&video_only, b"composited-video").unwrap();
    let source = dir.join("source.mp4");
    std::fs::write(&source, b"corrupted audio stream").unwrap();
    AudioJob {
        video_only,
        source,
        source_has_audio: has_audio,
        out_path: dir.join("final.mp4"),
        video_duration_secs: 3.0,
    }
}

#[test]
fn no_source_audio_promotes_video_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(dir.path(), false);
    let outcome =
        reattach_audio(&job, &EncodeSettings::default(), &broken_tools(dir.path())).unwrap();
    assert_eq!(outcome, AudioOutcome::NoSourceAudio);
    assert!(!outcome.audio_present());
    assert_eq!(std::fs::read(&job.out_path).unwrap(), b"composited-video");
    assert!(!job.video_only.exists());
}

#[test]
fn mux_failure_falls_back_to_video_only() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(dir.path(), true);
    let outcome =
        reattach_audio(&job, &EncodeSettings::default(), &broken_tools(dir.path())).unwrap();
    assert!(matches!(outcome, AudioOutcome::VideoOnlyFallback { .. }));
    assert!(!outcome.audio_present());
    assert!(outcome.degraded_cause().unwrap().contains("audio mux error"));
    assert_eq!(std::fs::read(&job.out_path).unwrap(), b"composited-video");
    assert!(!job.video_only.exists());
}

#[test]
fn missing_intermediate_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let job = job(dir.path(), false);
    std::fs::remove_file(&job.video_only).unwrap();
    let err = reattach_audio(&job, &EncodeSettings::default(), &broken_tools(dir.path()))
        .unwrap_err();
    assert!(!err.kind().is_recoverable());
}

#[test]
fn mux_command_copies_video_and_pads_audio_to_duration() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = job(dir.path(), true);
    job.video_duration_secs = 2.5;
    let cmd = build_mux_command(&job, &EncodeSettings::default(), &ToolPaths::default());
    let args: Vec<&OsStr> = cmd.get_args().collect();
    let pos = |needle: &str| args.iter().position(|a| *a == OsStr::new(needle)).unwrap();
    assert_eq!(args[pos("-c:v") + 1], OsStr::new("copy"));
    assert_eq!(args[pos("-c:a") + 1], OsStr::new("aac"));
    assert_eq!(args[pos("-af") + 1], OsStr::new("apad"));
    assert_eq!(args[pos("-t") + 1], OsStr::new("2.500000"));
    assert_eq!(*args.last().unwrap(), job.out_path.as_os_str());
}
