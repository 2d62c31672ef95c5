use super::*;

fn mask_with(size: u32, on: &[(u32, u32)], color: [u8; 4]) -> Texture {
    let mut px = vec![0u8; Size::new(size, size).rgba_len()];
    for &(x, y) in on {
        let i = ((y * size + x) * 4) as usize;
        px[i..i + 4].copy_from_slice(&color);
    }
    Texture::from_straight_rgba(size, size, &px).unwrap()
}

#[test]
fn single_pixel_yields_unit_rect() {
    let mask = mask_with(100, &[(10, 10)], [255, 255, 255, 255]);
    assert_eq!(
        bounding_box(&mask),
        Some(PixelRect {
            x: 10,
            y: 10,
            width: 1,
            height: 1
        })
    );
}

#[test]
fn empty_mask_has_no_box() {
    assert_eq!(bounding_box(&mask_with(100, &[], [0; 4])), None);
}

#[test]
fn opaque_black_counts_as_background() {
    let mask = Texture::solid(8, 8, [0, 0, 0, 255]).unwrap();
    assert_eq!(bounding_box(&mask), None);
}

#[test]
fn spans_all_covered_pixels() {
    let mask = mask_with(20, &[(3, 15), (17, 2), (9, 9)], [0, 40, 0, 255]);
    assert_eq!(
        bounding_box(&mask),
        Some(PixelRect {
            x: 3,
            y: 2,
            width: 15,
            height: 14
        })
    );
}

#[test]
fn full_mask_covers_raster() {
    let mask = Texture::solid(7, 3, [255, 255, 255, 255]).unwrap();
    assert_eq!(
        bounding_box(&mask),
        Some(PixelRect {
            x: 0,
            y: 0,
            width: 7,
            height: 3
        })
    );
}

#[test]
fn mismatched_buffer_is_none() {
    assert_eq!(bounding_box_rgba(&[255; 8], Size::new(3, 3)), None);
}
