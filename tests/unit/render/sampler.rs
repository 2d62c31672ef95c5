use super::*;
use crate::render::texture::Texture;
use crate::scene::layer::BlendMode;

fn quad() -> Texture {
    #[rustfmt::skip]
    let px = [
        255, 0, 0, 255,   0, 255, 0, 255,
        0, 0, 255, 255,   10, 20, 30, 255,
    ];
    Texture::from_straight_rgba(2, 2, &px).unwrap()
}

#[test]
fn in_bounds_samples_return_exact_texel() {
    let pool = SurfacePool::default();
    let sampler = PixelSampler::new(&pool);
    let sprite = Sprite::new(quad());
    assert_eq!(sampler.sample(&sprite, 0, 0), Some(Rgb::new(255, 0, 0)));
    assert_eq!(sampler.sample(&sprite, 1, 0), Some(Rgb::new(0, 255, 0)));
    assert_eq!(sampler.sample(&sprite, 0, 1), Some(Rgb::new(0, 0, 255)));
    assert_eq!(sampler.sample(&sprite, 1, 1), Some(Rgb::new(10, 20, 30)));
}

#[test]
fn display_state_does_not_change_sampled_color() {
    let pool = SurfacePool::default();
    let sampler = PixelSampler::new(&pool);
    let sprite = Sprite::new(quad())
        .with_opacity(0.2)
        .with_blend(BlendMode::Multiply)
        .with_visible(false);
    assert_eq!(sampler.sample(&sprite, 1, 1), Some(Rgb::new(10, 20, 30)));
}

#[test]
fn out_of_bounds_and_unloaded_return_none() {
    let pool = SurfacePool::default();
    let sampler = PixelSampler::new(&pool);
    let sprite = Sprite::new(quad());
    for (x, y) in [(-1, 0), (0, -1), (2, 0), (0, 2), (1000, 1000)] {
        assert_eq!(sampler.sample(&sprite, x, y), None);
    }
    assert_eq!(sampler.sample(&Sprite::default(), 0, 0), None);
}

#[test]
fn every_sample_returns_its_surface() {
    let pool = SurfacePool::default();
    let sampler = PixelSampler::new(&pool);
    let sprite = Sprite::new(quad());
    for _ in 0..3 {
        let _ = sampler.sample(&sprite, 0, 0);
    }
    let st = pool.stats();
    assert_eq!(st.outstanding, 0);
    assert_eq!(st.alloc_surfaces, 1);
}
