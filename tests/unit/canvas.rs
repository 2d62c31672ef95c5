use std::collections::BTreeMap;

use base64::Engine as _;

use super::*;
use crate::assets::decode::encode_texture_png;
use crate::masks::color_map::SegmentInfo;
use crate::render::texture::Texture;
use crate::service::model::WireSegment;

fn png(t: &Texture) -> Vec<u8> {
    encode_texture_png(t).unwrap()
}

fn b64(t: &Texture) -> String {
    base64::engine::general_purpose::STANDARD.encode(png(t))
}

fn loaded(w: u32, h: u32) -> SegmentationCanvas {
    let mut canvas = SegmentationCanvas::default();
    let image = png(&Texture::solid(w, h, [50, 60, 70, 255]).unwrap());
    canvas.load_image(image, f64::from(w), f64::from(h)).unwrap();
    canvas
}

fn response() -> SegmentationResponse {
    #[rustfmt::skip]
    let composite = Texture::from_straight_rgba(2, 2, &[
        255, 0, 0, 255,   0, 0, 0, 255,
        0, 0, 0, 255,     0, 0, 0, 255,
    ]).unwrap();
    let mut color_map = BTreeMap::new();
    color_map.insert(
        "(255, 0, 0)".to_owned(),
        SegmentInfo {
            segment_id: SegmentId(1),
            confidence: 0.9,
        },
    );
    let mask = Texture::from_straight_rgba(2, 2, &[
        255, 255, 255, 255, 0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255,
    ])
    .unwrap();
    SegmentationResponse {
        segments: vec![WireSegment {
            segment_id: SegmentId(1),
            confidence: 0.9,
            mask: b64(&mask),
            bbox: None,
            area: Some(1),
            stability_score: None,
            predicted_iou: None,
        }],
        semantic_mask: b64(&composite),
        color_map,
        processing_time: Some(0.1),
    }
}

#[test]
fn apply_before_load_is_not_ready() {
    let mut canvas = SegmentationCanvas::default();
    assert!(matches!(
        canvas.apply_segmentation(&response()),
        Err(SegmenterError::NotReady(_))
    ));
}

#[test]
fn apply_then_hover_and_select() {
    let mut canvas = loaded(2, 2);
    assert_eq!(canvas.apply_segmentation(&response()).unwrap(), 1);
    let hit = canvas.hover(0.0, 0.0).unwrap();
    assert_eq!(hit.segment_id, SegmentId(1));
    assert!(canvas.hover(1.0, 1.0).is_none());
    assert!(canvas.hovered().is_none());

    assert!(canvas.select_segment(SegmentId(1)).unwrap().is_some());
    assert!(matches!(
        canvas.select_segment(SegmentId(9)),
        Err(SegmenterError::Validation(_))
    ));
    assert_eq!(canvas.pool_stats().outstanding, 0);
}

#[test]
fn failed_apply_leaves_previous_result() {
    let mut canvas = loaded(2, 2);
    canvas.apply_segmentation(&response()).unwrap();
    let mut bad = response();
    bad.segments[0].mask = "%%%".to_owned();
    assert!(canvas.apply_segmentation(&bad).is_err());
    assert_eq!(canvas.segments().len(), 1);
    assert!(canvas.hover(0.0, 0.0).is_some());
}

#[test]
fn stale_hover_tickets_are_dropped() {
    let mut canvas = loaded(2, 2);
    canvas.apply_segmentation(&response()).unwrap();
    let old = canvas.begin_hover(0.0, 0.0);
    let new = canvas.begin_hover(1.0, 1.0);
    assert!(canvas.resolve_hover(new));
    assert!(!canvas.resolve_hover(old));
    assert!(canvas.hovered().is_none());
}

#[test]
fn mode_switch_clears_selection() {
    let mut canvas = loaded(40, 40);
    canvas.set_mode(InteractionMode::Draw);
    assert!(canvas.pointer(PointerEvent::Down { x: 10.0, y: 10.0 }));
    canvas.pointer(PointerEvent::Up);
    assert!(canvas.has_selection());

    canvas.set_mode(InteractionMode::Select);
    assert!(!canvas.has_selection());
    // Select mode does not paint.
    canvas.pointer(PointerEvent::Down { x: 10.0, y: 10.0 });
    assert!(!canvas.has_selection());
}

#[test]
fn loading_a_new_image_resets_derived_state() {
    let mut canvas = loaded(2, 2);
    canvas.apply_segmentation(&response()).unwrap();
    canvas
        .load_image(png(&Texture::solid(4, 4, [1, 2, 3, 255]).unwrap()), 4.0, 4.0)
        .unwrap();
    assert!(canvas.segments().is_empty());
    assert!(canvas.hover(0.0, 0.0).is_none());
    assert_eq!(
        canvas.scene().base_image().unwrap().size(),
        crate::foundation::core::Size::new(4, 4)
    );
}

#[test]
fn selection_export_inputs_are_decoded_mask() {
    let mut canvas = loaded(20, 20);
    assert!(matches!(
        canvas.export_inputs(ExportSource::Selection),
        Err(SegmenterError::NotReady(_))
    ));
    canvas.set_mode(InteractionMode::Draw);
    canvas.pointer(PointerEvent::Down { x: 10.0, y: 10.0 });
    canvas.pointer(PointerEvent::Up);
    let inputs = canvas.export_inputs(ExportSource::Selection).unwrap();
    assert_eq!(inputs.mask.premul_pixel(10, 10), Some([255, 255, 255, 255]));
    assert_eq!(inputs.mask.premul_pixel(0, 0), Some([0, 0, 0, 255]));
}

#[test]
fn selected_segment_leaves_other_pixels_untouched() {
    let mut canvas = loaded(2, 2);
    canvas.apply_segmentation(&response()).unwrap();
    canvas.set_composite_visible(false);
    let before = canvas.render_frame().unwrap().unwrap();

    canvas.select_segment(SegmentId(1)).unwrap().unwrap();
    let after = canvas.render_frame().unwrap().unwrap();

    assert_eq!(after.pixel(1, 1), before.pixel(1, 1));
    assert_eq!(after.pixel(1, 1), Some([50, 60, 70, 255]));
    assert_ne!(after.pixel(0, 0), before.pixel(0, 0));
}
