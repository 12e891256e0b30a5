use super::*;

const WITH_AUDIO: &str = r#"{
  "streams": [
    { "codec_type": "video", "width": 1920, "height": 1080,
      "r_frame_rate": "30/1", "avg_frame_rate": "30/1", "nb_frames": "90", "duration": "3.000000" },
    { "codec_type": "audio", "duration": "3.010000" }
  ],
  "format": { "duration": "3.010000" }
}"#;

#[test]
fn parses_dimensions_rate_count_and_audio() {
    let info = parse_probe_json(Path::new("in.mp4"), WITH_AUDIO.as_bytes()).unwrap();
    assert_eq!(info.size(), Size::new(1920, 1080));
    assert_eq!(info.fps, Fps { num: 30, den: 1 });
    assert_eq!(info.frame_count, 90);
    assert_eq!(info.duration_secs, 3.0);
    assert!(info.has_audio);
    assert_eq!(info.audio_duration_secs, Some(3.01));
    assert_eq!(info.source_path, PathBuf::from("in.mp4"));
}

#[test]
fn frame_count_falls_back_to_duration_times_fps() {
    let json = r#"{
      "streams": [
        { "codec_type": "video", "width": 64, "height": 64,
          "r_frame_rate": "25/1", "avg_frame_rate": "0/0" }
      ],
      "format": { "duration": "2.0" }
    }"#;
    let info = parse_probe_json(Path::new("clip.webm"), json.as_bytes()).unwrap();
    assert_eq!(info.fps, Fps { num: 25, den: 1 });
    assert_eq!(info.frame_count, 50);
    assert!(!info.has_audio);
    assert_eq!(info.audio_duration_secs, None);
}

#[test]
fn missing_video_stream_is_decode_error() {
    let json = r#"{ "streams": [ { "codec_type": "audio" } ] }"#;
    let err = parse_probe_json(Path::new("a.m4a"), json.as_bytes()).unwrap_err();
    assert!(matches!(err, OverlayerError::Decode(_)));
}

#[test]
fn garbage_json_is_decode_error() {
    let err = parse_probe_json(Path::new("x"), b"not json").unwrap_err();
    assert!(matches!(err, OverlayerError::Decode(_)));
}

#[test]
fn missing_file_is_input_error() {
    let err = probe_video(Path::new("/definitely/not/here.mp4"), &ToolPaths::default()).unwrap_err();
    assert!(matches!(err, OverlayerError::Input(_)));
}

#[test]
fn audio_stream_without_duration_is_present_but_unmeasured() {
    let json = r#"{
      "streams": [
        { "codec_type": "video", "width": 64, "height": 48, "avg_frame_rate": "30/1", "nb_frames": "30" },
        { "codec_type": "audio" }
      ]
    }"#;
    let info = parse_probe_json(Path::new("clip.mkv"), json.as_bytes()).unwrap();
    assert!(info.has_audio);
    assert_eq!(info.audio_duration_secs, None);
}
