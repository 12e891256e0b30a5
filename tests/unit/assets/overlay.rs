use std::io::Cursor;

use super::*;

fn encode_png(img: image::DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn rgb_png(w: u32, h: u32, px: [u8; 3]) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb(px));
    encode_png(image::DynamicImage::ImageRgb8(img))
}

fn rgba_png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    encode_png(image::DynamicImage::ImageRgba8(img))
}

#[test]
fn rgb_overlay_gets_synthesized_opaque_alpha() {
    let overlay = OverlayImage::from_bytes(rgb_png(4, 2, [10, 20, 30]), Some(ImageFormat::Png));
    let decoded = decode_overlay(&overlay).unwrap();
    assert_eq!(decoded.natural_size(), Size::new(4, 2));
    assert!(decoded.is_opaque());

    let asset = decoded.into_asset(Size::new(4, 2));
    assert!(asset.is_opaque());
    for px in asset.buffer().rgba.chunks_exact(4) {
        assert_eq!(px, &[10, 20, 30, 255]);
    }
}

#[test]
fn translucent_overlay_keeps_alpha_variant() {
    let overlay = OverlayImage::from_bytes(rgba_png(3, 3, [200, 100, 50, 128]), None);
    let asset = load_overlay(&overlay, Size::new(3, 3)).unwrap();
    assert!(matches!(asset, OverlayAsset::Alpha(_)));
    assert_eq!(&asset.buffer().rgba[..4], &[200, 100, 50, 128]);
}

#[test]
fn rgba_overlay_with_uniform_full_alpha_is_opaque() {
    let overlay = OverlayImage::from_bytes(rgba_png(2, 2, [1, 2, 3, 255]), None);
    let asset = load_overlay(&overlay, Size::new(2, 2)).unwrap();
    assert!(asset.is_opaque());
}

#[test]
fn resize_hits_target_size_and_preserves_flat_color() {
    let overlay = OverlayImage::from_bytes(rgb_png(20, 10, [90, 160, 240]), None);
    let up = load_overlay(&overlay, Size::new(60, 30)).unwrap();
    assert_eq!(up.size(), Size::new(60, 30));
    assert_eq!(up.buffer().rgba.len(), 60 * 30 * 4);
    for px in up.buffer().rgba.chunks_exact(4) {
        assert!((i16::from(px[0]) - 90).abs() <= 1);
        assert!((i16::from(px[1]) - 160).abs() <= 1);
        assert!((i16::from(px[2]) - 240).abs() <= 1);
        assert_eq!(px[3], 255);
    }

    let down = load_overlay(&overlay, Size::new(5, 3)).unwrap();
    assert_eq!(down.size(), Size::new(5, 3));
}

#[test]
fn empty_target_produces_empty_asset() {
    let overlay = OverlayImage::from_bytes(rgb_png(4, 4, [0, 0, 0]), None);
    let asset = load_overlay(&overlay, Size::new(0, 0)).unwrap();
    assert!(asset.is_empty());
    assert!(asset.buffer().rgba.is_empty());
}

#[test]
fn malformed_bytes_are_decode_error() {
    let overlay = OverlayImage::from_bytes(b"definitely not an image".to_vec(), None);
    assert!(matches!(
        decode_overlay(&overlay),
        Err(OverlayerError::Decode(_))
    ));

    let mislabeled = OverlayImage::from_bytes(rgb_png(2, 2, [0, 0, 0]), Some(ImageFormat::Jpeg));
    assert!(matches!(
        decode_overlay(&mislabeled),
        Err(OverlayerError::Decode(_))
    ));
}

#[test]
fn empty_bytes_and_missing_path_are_input_errors() {
    let overlay = OverlayImage::from_bytes(Vec::new(), None);
    assert!(matches!(
        decode_overlay(&overlay),
        Err(OverlayerError::Input(_))
    ));
    assert!(matches!(
        OverlayImage::from_path(Path::new("/no/such/overlay.png")),
        Err(OverlayerError::Input(_))
    ));
}

#[test]
fn from_path_infers_format_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo.png");
    std::fs::write(&path, rgb_png(2, 2, [5, 5, 5])).unwrap();
    let overlay = OverlayImage::from_path(&path).unwrap();
    assert_eq!(overlay.format, Some(ImageFormat::Png));
}

fn white_next_to_transparent_black() -> OverlayImage {
    let mut img = image::RgbaImage::new(2, 1);
    img.put_pixel(0, 0, image::Rgba([255, 255, 255, 255]));
    img.put_pixel(1, 0, image::Rgba([0, 0, 0, 0]));
    OverlayImage::from_bytes(encode_png(image::DynamicImage::ImageRgba8(img)), None)
}

#[test]
fn upscaled_alpha_edge_keeps_visible_color() {
    let asset = load_overlay(&white_next_to_transparent_black(), Size::new(8, 1)).unwrap();
    assert!(!asset.is_opaque());

    let rgba = &asset.buffer().rgba;
    for px in rgba.chunks_exact(4) {
        if px[3] > 0 {
            assert_eq!(&px[..3], &[255, 255, 255], "edge pixel {px:?}");
        }
    }
    assert!(rgba.chunks_exact(4).any(|px| px[3] > 0 && px[3] < 255));
}

#[test]
fn upscaled_alpha_edge_over_white_frame_stays_white() {
    use crate::effects::composite::composite_frame;
    use crate::foundation::core::FrameIndex;
    use crate::geometry::mapper::OverlayGeometry;
    use crate::media::frame::Frame;

    let asset = load_overlay(&white_next_to_transparent_black(), Size::new(8, 1)).unwrap();
    let mut frame = Frame::filled(FrameIndex(0), 8, 1, &[255, 255, 255]).unwrap();
    let geom = OverlayGeometry {
        x: 0,
        y: 0,
        width: 8,
        height: 1,
    };
    composite_frame(&mut frame, &asset, geom, 1.0).unwrap();

    assert!(frame.data.iter().all(|&b| b == 255), "darkened: {:?}", frame.data);
}
