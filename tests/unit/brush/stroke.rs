use super::*;

fn covered(tex: &Texture, x: i64, y: i64) -> bool {
    tex.premul_pixel(x, y).is_some_and(|px| px[3] > 200)
}

#[test]
fn dot_bounds_are_centered() {
    let mut log = StrokeLog::default();
    log.push(StrokeOp::Dot {
        center: Point::new(10.0, 20.0),
        diameter: 4.0,
    });
    assert_eq!(log.bounds(), Some(Rect::new(8.0, 18.0, 12.0, 22.0)));
}

#[test]
fn segment_bounds_include_caps() {
    let mut log = StrokeLog::default();
    log.push(StrokeOp::Segment {
        from: Point::new(0.0, 0.0),
        to: Point::new(10.0, 0.0),
        diameter: 2.0,
    });
    assert_eq!(log.bounds(), Some(Rect::new(-1.0, -1.0, 11.0, 1.0)));
}

#[test]
fn rasterized_dot_covers_its_center_only() {
    let mut log = StrokeLog::default();
    log.push(StrokeOp::Dot {
        center: Point::new(16.0, 16.0),
        diameter: 8.0,
    });
    let tex = log.rasterize(Size::new(32, 32)).unwrap();
    assert!(covered(&tex, 16, 16));
    assert!(!covered(&tex, 2, 2));
    assert!(!covered(&tex, 30, 16));
}

#[test]
fn capsule_fills_between_endpoints() {
    let mut log = StrokeLog::default();
    log.push(StrokeOp::Segment {
        from: Point::new(4.0, 16.0),
        to: Point::new(28.0, 16.0),
        diameter: 6.0,
    });
    let tex = log.rasterize(Size::new(32, 32)).unwrap();
    for x in [4, 10, 16, 22, 27] {
        assert!(covered(&tex, x, 16), "gap at x={x}");
    }
    assert!(!covered(&tex, 16, 4));
}

#[test]
fn zero_diameter_has_no_extent() {
    let mut layer = SelectionLayer::new(Size::new(8, 8));
    layer.push(StrokeOp::Dot {
        center: Point::new(4.0, 4.0),
        diameter: 0.0,
    });
    assert!(!layer.has_selection());
}

#[test]
fn clear_keeps_layer_but_drops_strokes() {
    let mut layer = SelectionLayer::new(Size::new(8, 8));
    layer.push(StrokeOp::Dot {
        center: Point::new(4.0, 4.0),
        diameter: 3.0,
    });
    assert!(layer.has_selection());
    assert!(layer.display_sprite().is_some());
    layer.clear();
    assert!(!layer.has_selection());
    assert!(layer.display_sprite().is_none());
    assert_eq!(layer.size(), Size::new(8, 8));
}

#[test]
fn raster_is_regenerated_deterministically_from_log() {
    let mut layer = SelectionLayer::new(Size::new(16, 16));
    layer.push(StrokeOp::Dot {
        center: Point::new(8.0, 8.0),
        diameter: 5.0,
    });
    let cached = layer.raster().unwrap();
    let fresh = layer.log().rasterize(layer.size()).unwrap();
    assert_eq!(cached.premul_bytes(), fresh.premul_bytes());
}

#[test]
fn display_sprite_caches_the_raster() {
    let mut layer = SelectionLayer::new(Size::new(8, 8));
    layer.push(StrokeOp::Dot {
        center: Point::new(4.0, 4.0),
        diameter: 3.0,
    });
    assert!(!layer.is_raster_cached());
    assert!(layer.display_sprite().is_some());
    assert!(layer.is_raster_cached());
    layer.push(StrokeOp::Dot {
        center: Point::new(2.0, 2.0),
        diameter: 3.0,
    });
    assert!(!layer.is_raster_cached());
}
