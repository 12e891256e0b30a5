use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(OverlayerError::input("x").to_string().contains("input error:"));
    assert!(OverlayerError::decode("x").to_string().contains("decode error:"));
    assert!(OverlayerError::blend("x").to_string().contains("blend error:"));
    assert!(OverlayerError::encode("x").to_string().contains("encode error:"));
    assert!(
        OverlayerError::audio_mux("x")
            .to_string()
            .contains("audio mux error:")
    );
    assert!(OverlayerError::config("x").to_string().contains("config error:"));
}

#[test]
fn only_blend_and_audio_mux_are_recoverable() {
    assert!(OverlayerError::blend("x").kind().is_recoverable());
    assert!(OverlayerError::audio_mux("x").kind().is_recoverable());
    assert!(!OverlayerError::input("x").kind().is_recoverable());
    assert!(!OverlayerError::decode("x").kind().is_recoverable());
    assert!(!OverlayerError::encode("x").kind().is_recoverable());
}

#[test]
fn kind_serializes_snake_case() {
    let s = serde_json::to_string(&ErrorKind::AudioMux).unwrap();
    assert_eq!(s, "\"audio_mux\"");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = OverlayerError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Internal);
}
