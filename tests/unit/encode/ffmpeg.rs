use super::*;
use crate::foundation::core::Fps;
use crate::media::frame::PixelLayout;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
        layout: PixelLayout::Rgb8,
    }
}

fn opts_with_missing_tool(dir: &Path) -> FfmpegSinkOpts {
    let mut opts = FfmpegSinkOpts::new(dir.join("out.mp4"));
    opts.tools.ffmpeg = dir.join("no-such-ffmpeg");
    opts
}

#[test]
fn odd_dimensions_are_rejected_for_yuv420p() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(dir.path().join("out.mp4")));
    let err = sink.begin(cfg(63, 64)).unwrap_err();
    assert!(matches!(err, OverlayerError::Encode(_)));
}

#[test]
fn missing_ffmpeg_is_encode_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(opts_with_missing_tool(dir.path()));
    let err = sink.begin(cfg(64, 64)).unwrap_err();
    assert!(matches!(err, OverlayerError::Encode(_)));
}

#[test]
fn refuses_existing_output_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = opts_with_missing_tool(dir.path());
    opts.encode.overwrite = false;
    std::fs::write(&opts.out_path, b"old").unwrap();
    let mut sink = FfmpegSink::new(opts);
    let err = sink.begin(cfg(64, 64)).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
fn push_before_begin_is_encode_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FfmpegSink::new(opts_with_missing_tool(dir.path()));
    let frame = Frame::filled(FrameIndex(0), 2, 2, &[0, 0, 0]).unwrap();
    assert!(matches!(
        sink.push_frame(&frame),
        Err(OverlayerError::Encode(_))
    ));
}

#[test]
fn abort_removes_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let opts = opts_with_missing_tool(dir.path());
    let out = opts.out_path.clone();
    std::fs::write(&out, b"partial").unwrap();
    let mut sink = FfmpegSink::new(opts);
    sink.abort();
    assert!(!out.exists());
}

#[test]
fn ensure_parent_dir_creates_nested_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("out.mp4");
    ensure_parent_dir(&path).unwrap();
    assert!(dir.path().join("a").join("b").is_dir());
    ensure_parent_dir(Path::new("bare.mp4")).unwrap();
}
