use super::*;

#[test]
fn size_contains_boundaries() {
    let s = Size::new(4, 3);
    assert!(s.contains(0, 0));
    assert!(s.contains(3, 2));
    assert!(!s.contains(4, 0));
    assert!(!s.contains(0, 3));
    assert!(!s.contains(-1, 1));
}

#[test]
fn pixel_rect_edges_and_area() {
    let r = PixelRect {
        x: 10,
        y: 20,
        width: 5,
        height: 2,
    };
    assert_eq!(r.right(), 15);
    assert_eq!(r.bottom(), 22);
    assert_eq!(r.area(), 10);
}

#[test]
fn frame_pixel_reads_row_major() {
    let frame = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: false,
    };
    assert_eq!(frame.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(frame.pixel(2, 0), None);
}
