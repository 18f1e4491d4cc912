use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 1920).is_err());
    assert!(Canvas::new(1080, 0).is_err());
    assert_eq!(Canvas::new(1080, 1920).unwrap(), Canvas::VERTICAL_1080P);
}

#[test]
fn default_canvas_is_vertical_full_hd() {
    let c = Canvas::default();
    assert_eq!((c.width, c.height), (1080, 1920));
    assert_eq!(c.rgba8_len(), 1080 * 1920 * 4);
}

#[test]
fn opaque_color_has_full_alpha() {
    assert_eq!(Rgba8::opaque(30, 30, 30).to_array(), [30, 30, 30, 255]);
    assert_eq!(Rgba8::WHITE.a, 255);
}
