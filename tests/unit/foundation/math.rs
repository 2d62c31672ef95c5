use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn opaque_pixels_survive_premultiply_roundtrip() {
    let mut px = vec![12u8, 200, 77, 255];
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![12, 200, 77, 255]);
}

#[test]
fn transparent_pixels_unpremultiply_to_zero() {
    assert_eq!(unpremultiply_px([0, 0, 0, 0]), [0, 0, 0, 0]);
    assert_eq!(unpremultiply_px([128, 0, 0, 128]), [255, 0, 0, 128]);
}

#[test]
fn coverage_ignores_alpha_only_pixels() {
    assert_eq!(coverage_u8([0, 0, 0, 255]), 0);
    assert_eq!(coverage_u8([0, 0, 0, 0]), 0);
    assert_eq!(coverage_u8([10, 200, 30, 255]), 200);
}
