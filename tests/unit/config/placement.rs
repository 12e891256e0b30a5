use super::*;

#[test]
fn validate_converts_percentages() {
    let spec = PlacementRequest::new(800.0, 450.0)
        .at(100.0, 100.0)
        .scaled(150.0)
        .with_opacity(40.0)
        .validate()
        .unwrap();
    assert_eq!(spec.scale, 1.5);
    assert!((spec.opacity - 0.4).abs() < 1e-6);
    assert_eq!(spec.pos_x, 100.0);
}

#[test]
fn non_positive_container_is_input_error() {
    for (w, h) in [(0.0, 450.0), (800.0, 0.0), (-1.0, 450.0)] {
        let err = PlacementRequest::new(w, h).validate().unwrap_err();
        assert!(matches!(err, OverlayerError::Input(_)), "{w}x{h}");
    }
}

#[test]
fn out_of_range_values_are_input_errors() {
    let base = PlacementRequest::new(800.0, 450.0);
    assert!(base.scaled(-1.0).validate().is_err());
    assert!(base.with_opacity(101.0).validate().is_err());
    assert!(base.with_opacity(-0.5).validate().is_err());
    assert!(base.at(f64::NAN, 0.0).validate().is_err());
    assert!(base.at(0.0, f64::INFINITY).validate().is_err());
}

#[test]
fn boundary_values_are_accepted() {
    let base = PlacementRequest::new(800.0, 450.0);
    base.scaled(0.0).validate().unwrap();
    base.with_opacity(0.0).validate().unwrap();
    base.with_opacity(100.0).validate().unwrap();
    // Out-of-container positions are clamped later by the mapper, not rejected.
    base.at(-50.0, 9000.0).validate().unwrap();
}

#[test]
fn json_defaults_fill_optional_fields() {
    let req: PlacementRequest =
        serde_json::from_str(r#"{ "container_width": 640, "container_height": 360 }"#).unwrap();
    assert_eq!(req.pos_x, 0.0);
    assert_eq!(req.pos_y, 0.0);
    assert_eq!(req.scale_percent, 100.0);
    assert_eq!(req.opacity_percent, 100.0);
}

#[test]
fn missing_container_is_rejected_by_deserializer() {
    let res: Result<PlacementRequest, _> = serde_json::from_str(r#"{ "pos_x": 1 }"#);
    assert!(res.is_err());
}
