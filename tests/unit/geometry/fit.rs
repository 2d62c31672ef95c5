use super::*;

#[test]
fn wide_content_is_width_constrained() {
    assert_eq!(fit_dimensions(1920.0, 1080.0, 800.0, 600.0), (800.0, 450.0));
}

#[test]
fn tall_content_is_height_constrained() {
    assert_eq!(fit_dimensions(1080.0, 1920.0, 800.0, 600.0), (337.5, 600.0));
}

#[test]
fn degenerate_inputs_produce_zero_size() {
    assert_eq!(fit_dimensions(0.0, 0.0, 800.0, 600.0), (0.0, 0.0));
    assert_eq!(fit_dimensions(100.0, 100.0, 0.0, 600.0), (0.0, 0.0));
    assert_eq!(fit_dimensions(100.0, 0.0, 800.0, 600.0), (0.0, 0.0));
}

#[test]
fn texture_space_divides_and_rounds() {
    assert_eq!(to_texture_space(100.0, 50.0, 0.5), (200, 100));
    assert_eq!(to_texture_space(10.2, 10.7, 1.0), (10, 11));
    assert_eq!(to_texture_space(3.0, 4.0, 0.0), (3, 4));
}

#[test]
fn viewport_scale_tracks_fitted_width() {
    let vp = Viewport::fit(Size::new(1920, 1080), 800.0, 600.0, 2.0);
    assert!((vp.scale - 800.0 / 1920.0).abs() < 1e-12);
    assert_eq!(vp.surface_size(), Size::new(1600, 900));
    assert_eq!(vp.to_texture(400.0, 225.0), (960, 540));
}
