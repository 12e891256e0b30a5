use super::*;

#[test]
fn defaults_use_thirty_percent_baseline() {
    let cfg = EngineConfig::default();
    assert_eq!(
        cfg.sizing.baseline,
        Baseline::VideoWidthFraction(DEFAULT_BASELINE_FRACTION)
    );
    assert_eq!(cfg.encode.video_codec, "libx264");
    assert_eq!(cfg.encode.audio_codec, "aac");
    cfg.validate().unwrap();
}

#[test]
fn partial_json_fills_defaults() {
    let cfg: EngineConfig = serde_json::from_str(
        r#"{ "sizing": { "baseline": "natural" }, "progress_every": 5 }"#,
    )
    .unwrap();
    assert_eq!(cfg.sizing.baseline, Baseline::Natural);
    assert_eq!(cfg.progress_every, 5);
    assert_eq!(cfg.encode, EncodeSettings::default());
    assert_eq!(cfg.tools.ffmpeg, PathBuf::from("ffmpeg"));
}

#[test]
fn fraction_baseline_parses_from_json() {
    let cfg: EngineConfig =
        serde_json::from_str(r#"{ "sizing": { "baseline": { "video_width_fraction": 0.5 } } }"#)
            .unwrap();
    assert_eq!(cfg.sizing.baseline, Baseline::VideoWidthFraction(0.5));
}

#[test]
fn out_of_range_fraction_is_rejected() {
    for f in [0.0, -0.1, 1.5, f64::NAN] {
        let policy = SizingPolicy {
            baseline: Baseline::VideoWidthFraction(f),
        };
        assert!(matches!(policy.validate(), Err(OverlayerError::Config(_))));
    }
    SizingPolicy::natural().validate().unwrap();
}

#[test]
fn crf_above_51_is_rejected() {
    let mut cfg = EngineConfig::default();
    cfg.encode.crf = Some(52);
    assert!(cfg.validate().is_err());
    cfg.encode.crf = Some(23);
    cfg.validate().unwrap();
}

#[test]
fn from_path_reads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    std::fs::write(&path, r#"{ "encode": { "crf": 18 } }"#).unwrap();
    let cfg = EngineConfig::from_path(&path).unwrap();
    assert_eq!(cfg.encode.crf, Some(18));

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        EngineConfig::from_path(&path),
        Err(OverlayerError::Config(_))
    ));
}

#[test]
fn even_dimension_requirement_follows_pix_fmt() {
    let mut enc = EncodeSettings::default();
    assert!(enc.requires_even_dimensions());
    enc.pix_fmt = "yuv444p".to_string();
    assert!(!enc.requires_even_dimensions());
}
