use super::*;

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png).unwrap().to_rgba8()
}

fn base() -> Texture {
    let mut px = Vec::new();
    for y in 0..4u8 {
        for x in 0..4u8 {
            px.extend_from_slice(&[x * 60, y * 60, 100, 255]);
        }
    }
    Texture::from_straight_rgba(4, 4, &px).unwrap()
}

fn square_mask(size: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> Texture {
    let mut px = vec![0u8; Size::new(size, size).rgba_len()];
    for y in y0..y1 {
        for x in x0..x1 {
            let i = ((y * size + x) * 4) as usize;
            px[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
    }
    Texture::from_straight_rgba(size, size, &px).unwrap()
}

#[test]
fn full_extraction_keeps_size_and_masks_pixels() {
    let pool = SurfacePool::default();
    let out = extract(&base(), &square_mask(4, 1, 1, 3, 3), false, &pool).unwrap();
    assert_eq!(out.region.width, 4);
    let img = decode(&out.png);
    assert_eq!(img.dimensions(), (4, 4));
    assert_eq!(img.get_pixel(1, 2).0, [60, 120, 100, 255]);
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
    assert_eq!(pool.stats().outstanding, 0);
}

#[test]
fn cropped_extraction_is_bounding_box_sized() {
    let pool = SurfacePool::default();
    let out = extract(&base(), &square_mask(4, 1, 1, 3, 3), true, &pool).unwrap();
    assert_eq!(
        out.region,
        PixelRect {
            x: 1,
            y: 1,
            width: 2,
            height: 2
        }
    );
    let img = decode(&out.png);
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(0, 0).0, [60, 60, 100, 255]);
    assert_eq!(img.get_pixel(1, 1).0, [120, 120, 100, 255]);
}

#[test]
fn mask_is_resampled_to_base_size() {
    let pool = SurfacePool::default();
    // 8x8 mask covering the right half maps onto columns 2..4 of the 4x4 base.
    let mut px = vec![0u8; Size::new(8, 8).rgba_len()];
    for y in 0..8u32 {
        for x in 4..8u32 {
            let i = ((y * 8 + x) * 4) as usize;
            px[i..i + 4].copy_from_slice(&[255, 255, 255, 255]);
        }
    }
    let mask = Texture::from_straight_rgba(8, 8, &px).unwrap();
    let out = extract(&base(), &mask, true, &pool).unwrap();
    assert_eq!(
        out.region,
        PixelRect {
            x: 2,
            y: 0,
            width: 2,
            height: 4
        }
    );
}

#[test]
fn empty_mask_crop_is_reported_and_releases_surfaces() {
    let pool = SurfacePool::default();
    let err = extract(&base(), &square_mask(4, 0, 0, 0, 0), true, &pool).unwrap_err();
    assert!(err.is_empty_mask());
    let stats = pool.stats();
    assert_eq!(stats.outstanding, 0);
    assert_eq!(stats.alloc_surfaces, 2);
}
