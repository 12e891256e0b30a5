use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(25, 1).unwrap(),
        layout: PixelLayout::Rgb8,
    }
}

fn frame(idx: u64) -> Frame {
    Frame::filled(FrameIndex(idx), 2, 2, &[idx as u8, 0, 0]).unwrap()
}

#[test]
fn in_memory_sink_collects_in_order() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    for i in 0..3 {
        sink.push_frame(&frame(i)).unwrap();
    }
    assert_eq!(sink.end().unwrap(), 3);
    assert_eq!(sink.frames()[2].index, FrameIndex(2));
    assert_eq!(sink.config(), Some(&cfg()));
}

#[test]
fn out_of_order_frames_are_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(&frame(1)).unwrap();
    let err = sink.push_frame(&frame(1)).unwrap_err();
    assert!(matches!(err, OverlayerError::Encode(_)));
}

#[test]
fn mismatched_frame_size_is_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    let big = Frame::filled(FrameIndex(0), 4, 2, &[0, 0, 0]).unwrap();
    assert!(sink.push_frame(&big).is_err());
    let rgba = Frame::filled(FrameIndex(0), 2, 2, &[0, 0, 0, 0]).unwrap();
    assert!(sink.push_frame(&rgba).is_err());
}

#[test]
fn abort_discards_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(&frame(0)).unwrap();
    sink.abort();
    assert!(sink.is_aborted());
    assert!(sink.frames().is_empty());
}
