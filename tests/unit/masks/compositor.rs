use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::masks::color_map::{ColorKey, SegmentInfo};
use crate::render::surface_pool::SurfacePool;
use crate::scene::manager::BaseImage;

fn scene(w: u32, h: u32) -> SceneManager {
    let mut scene = SceneManager::new(1.0);
    let base = BaseImage::from_texture(Texture::solid(w, h, [90, 90, 90, 255]).unwrap()).unwrap();
    scene.init(base, f64::from(w), f64::from(h)).unwrap();
    scene
}

fn red_green_composite() -> Texture {
    #[rustfmt::skip]
    let px = [
        255, 0, 0, 255,   0, 0, 0, 255,
        0, 255, 0, 255,   128, 0, 0, 255,
    ];
    Texture::from_straight_rgba(2, 2, &px).unwrap()
}

fn color_map() -> ColorMap {
    let mut map = ColorMap::new();
    map.insert(
        ColorKey(Rgb::new(255, 0, 0)),
        SegmentInfo {
            segment_id: SegmentId(1),
            confidence: 0.9,
        },
    );
    map.insert(
        ColorKey(Rgb::new(0, 255, 0)),
        SegmentInfo {
            segment_id: SegmentId(2),
            confidence: 0.4,
        },
    );
    map
}

#[test]
fn composite_requires_initialized_scene() {
    let mut scene = SceneManager::default();
    let mut comp = MaskCompositor::new();
    assert!(!comp.set_composite(&mut scene, red_green_composite(), CompositeStyle::default()));
    comp.set_composite_opacity(&mut scene, 0.3);
    comp.clear_overlays(&mut scene);
}

#[test]
fn composite_style_is_adjustable_after_creation() {
    let mut scene = scene(2, 2);
    let mut comp = MaskCompositor::new();
    assert!(comp.set_composite(
        &mut scene,
        red_green_composite(),
        CompositeStyle {
            visible: false,
            opacity: 0.25
        }
    ));
    comp.set_composite_opacity(&mut scene, 0.75);
    comp.set_composite_visible(&mut scene, true);
    let sprite = scene.layers().unwrap().masks.composite.as_ref().unwrap();
    assert_eq!(sprite.opacity, 0.75);
    assert!(sprite.visible);
}

#[test]
fn hover_decodes_segment_ignoring_display_opacity() {
    let mut scene = scene(2, 2);
    let pool = SurfacePool::default();
    let sampler = PixelSampler::new(&pool);
    let mut comp = MaskCompositor::new();
    comp.set_composite(
        &mut scene,
        red_green_composite(),
        CompositeStyle {
            visible: true,
            opacity: 0.1,
        },
    );
    comp.set_color_map(color_map());

    let hit = comp.decode_hover(&scene, &sampler, 0.0, 0.0).unwrap();
    assert_eq!(hit.segment_id, SegmentId(1));
    assert_eq!(hit.confidence, 0.9);
    assert_eq!(hit.texel, (0, 0));
    assert_eq!(
        comp.decode_hover(&scene, &sampler, 0.0, 1.0).map(|h| h.segment_id),
        Some(SegmentId(2))
    );
    // Background and off-palette edge colors miss.
    assert!(comp.decode_hover(&scene, &sampler, 1.0, 0.0).is_none());
    assert!(comp.decode_hover(&scene, &sampler, 1.0, 1.0).is_none());
    // Out of bounds.
    assert!(comp.decode_hover(&scene, &sampler, 9.0, 9.0).is_none());
    assert_eq!(pool.stats().outstanding, 0);
}

#[test]
fn hover_without_composite_is_none() {
    let scene = scene(2, 2);
    let pool = SurfacePool::default();
    let comp = MaskCompositor::new();
    assert!(
        comp.decode_hover(&scene, &PixelSampler::new(&pool), 0.0, 0.0)
            .is_none()
    );
}

#[test]
fn adding_an_overlay_replaces_the_previous_one() {
    let mut scene = scene(2, 2);
    let mut comp = MaskCompositor::new();
    let a = comp
        .add_overlay(&mut scene, red_green_composite(), SegmentId(1))
        .unwrap();
    let b = comp
        .add_overlay(&mut scene, red_green_composite(), SegmentId(2))
        .unwrap();
    assert_ne!(a, b);
    let overlay = scene.layers().unwrap().masks.overlay.as_ref().unwrap();
    assert_eq!(overlay.handle, b);
    assert_eq!(overlay.segment_id, SegmentId(2));

    comp.clear_overlays(&mut scene);
    assert!(scene.layers().unwrap().masks.overlay.is_none());
}

#[test]
fn overlay_click_invokes_last_registered_listener() {
    let mut scene = scene(2, 2);
    let pool = SurfacePool::default();
    let sampler = PixelSampler::new(&pool);
    let mut comp = MaskCompositor::new();

    // Default listener is a no-op.
    let handle = comp
        .add_overlay(&mut scene, red_green_composite(), SegmentId(5))
        .unwrap();
    assert!(comp.pointer_down(&scene, &sampler, 0.0, 0.0));

    let first = Rc::new(RefCell::new(Vec::new()));
    let second = Rc::new(RefCell::new(Vec::new()));
    let sink = first.clone();
    comp.on_overlay_click(move |h, id| sink.borrow_mut().push((h, id)));
    let sink = second.clone();
    comp.on_overlay_click(move |h, id| sink.borrow_mut().push((h, id)));

    assert!(comp.pointer_down(&scene, &sampler, 0.0, 0.0));
    // Black overlay pixel is not part of the segment.
    assert!(!comp.pointer_down(&scene, &sampler, 1.0, 0.0));

    assert!(first.borrow().is_empty());
    assert_eq!(second.borrow().as_slice(), &[(handle, SegmentId(5))]);
}

#[test]
fn reset_drops_layers_and_table() {
    let mut scene = scene(2, 2);
    let mut comp = MaskCompositor::new();
    comp.set_composite(&mut scene, red_green_composite(), CompositeStyle::default());
    comp.add_overlay(&mut scene, red_green_composite(), SegmentId(1));
    comp.set_color_map(color_map());
    comp.reset(&mut scene);
    assert!(comp.color_map().is_empty());
    let masks = &scene.layers().unwrap().masks;
    assert!(masks.composite.is_none() && masks.overlay.is_none());
}

#[test]
fn overlay_background_is_transparent() {
    let mut scene = scene(2, 2);
    let mut comp = MaskCompositor::new();
    comp.add_overlay(&mut scene, red_green_composite(), SegmentId(1)).unwrap();
    let overlay = scene.layers().unwrap().masks.overlay.as_ref().unwrap();
    let tex = overlay.sprite.texture().unwrap();
    assert_eq!(tex.premul_pixel(1, 0), Some([0, 0, 0, 0]));
    assert_eq!(tex.premul_pixel(0, 0), Some([255, 0, 0, 255]));
}
