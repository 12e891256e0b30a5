use super::*;

#[test]
fn frame_len_accounts_for_channels() {
    assert_eq!(PixelLayout::Rgb8.frame_len(4, 2).unwrap(), 24);
    assert_eq!(PixelLayout::Rgba8.frame_len(4, 2).unwrap(), 32);
    assert_eq!(PixelLayout::Rgb8.ffmpeg_pix_fmt(), "rgb24");
    assert_eq!(PixelLayout::Rgba8.ffmpeg_pix_fmt(), "rgba");
}

#[test]
fn new_rejects_wrong_buffer_length() {
    let err = Frame::new(FrameIndex(0), 2, 2, PixelLayout::Rgb8, vec![0; 11]).unwrap_err();
    assert!(matches!(err, OverlayerError::Decode(_)));
}

#[test]
fn filled_picks_layout_from_pixel() {
    let f = Frame::filled(FrameIndex(3), 3, 2, &[1, 2, 3, 4]).unwrap();
    assert_eq!(f.layout, PixelLayout::Rgba8);
    assert_eq!(f.size(), Size::new(3, 2));
    assert_eq!(f.pixel(2, 1), &[1, 2, 3, 4]);
    assert!(f.is_consistent());

    assert!(Frame::filled(FrameIndex(0), 1, 1, &[1, 2]).is_err());
}

#[test]
fn mutated_buffer_is_inconsistent() {
    let mut f = Frame::filled(FrameIndex(0), 2, 2, &[0, 0, 0]).unwrap();
    f.data.pop();
    assert!(!f.is_consistent());
}
