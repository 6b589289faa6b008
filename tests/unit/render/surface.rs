use super::*;

fn red_block(w: u32, h: u32) -> Surface {
    Surface::filled(w, h, Color::rgb(255, 0, 0)).unwrap()
}

#[test]
fn zero_and_oversized_surfaces_are_rejected() {
    assert!(Surface::new(0, 10).is_err());
    assert!(Surface::new(10, 70_000).is_err());
    assert!(Surface::new(65_535, 1).is_ok());
}

#[test]
fn filled_surface_round_trips_through_rgba_image() {
    let s = Surface::filled(3, 2, Color::rgba(10, 20, 30, 255)).unwrap();
    let img = s.to_rgba_image();
    assert_eq!(img.dimensions(), (3, 2));
    assert!(img.pixels().all(|p| p.0 == [10, 20, 30, 255]));

    let back = Surface::from_rgba_image(&img).unwrap();
    assert_eq!(back.pixel(2, 1), Some([10, 20, 30, 255]));
    assert_eq!(back.pixel(3, 0), None);
}

#[test]
fn draw_over_clips_to_bounds() {
    let mut dst = Surface::filled(4, 4, Color::WHITE).unwrap();
    dst.draw_over(&red_block(3, 3), -1, 2, 1.0);

    assert_eq!(dst.pixel(0, 2), Some([255, 0, 0, 255]));
    assert_eq!(dst.pixel(1, 3), Some([255, 0, 0, 255]));
    assert_eq!(dst.pixel(2, 2), Some([255, 255, 255, 255]));
    assert_eq!(dst.pixel(0, 1), Some([255, 255, 255, 255]));
}

#[test]
fn draw_over_far_outside_is_noop() {
    let mut dst = Surface::filled(4, 4, Color::WHITE).unwrap();
    dst.draw_over(&red_block(3, 3), 100, -100, 1.0);
    assert!(dst.to_rgba_image().pixels().all(|p| p.0 == [255; 4]));
}

#[test]
fn replace_copies_alpha() {
    let mut dst = Surface::filled(2, 2, Color::WHITE).unwrap();
    let clear = Surface::new(1, 1).unwrap();
    dst.replace(&clear, 1, 1);
    assert_eq!(dst.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(dst.pixel(0, 0), Some([255, 255, 255, 255]));
}

#[test]
fn rounded_mask_clears_corners_and_keeps_centre() {
    let mut s = red_block(40, 40);
    s.apply_rounded_mask(20.0).unwrap();
    assert_eq!(s.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(s.pixel(39, 39).unwrap()[3], 0);
    assert_eq!(s.pixel(20, 20), Some([255, 0, 0, 255]));
}

#[test]
fn blur_softens_an_edge() {
    let mut s = Surface::new(20, 1).unwrap();
    s.draw_over(&red_block(10, 1), 0, 0, 1.0);
    let b = s.blurred(4.0).unwrap();
    let a9 = b.premul_pixel(9, 0).unwrap()[3];
    let a10 = b.premul_pixel(10, 0).unwrap()[3];
    assert!(a9 < 255 && a10 > 0, "{a9} {a10}");
}

#[test]
fn rotation_by_quarter_turn_swaps_dimensions() {
    let s = red_block(30, 10);
    let r = s.rotated_expand(90.0).unwrap();
    assert_eq!((r.width(), r.height()), (10, 30));
    assert!(r.pixel(5, 15).unwrap()[3] >= 250);
}

#[test]
fn rotation_by_45_degrees_expands() {
    let s = red_block(20, 20);
    let r = s.rotated_expand(45.0).unwrap();
    // 20 * sqrt(2) = 28.28
    assert_eq!((r.width(), r.height()), (29, 29));
    assert_eq!(r.pixel(0, 0).unwrap()[3], 0);
    assert!(r.pixel(14, 14).unwrap()[3] >= 250);
}

#[test]
fn paint_blends_vector_content() {
    let mut s = Surface::filled(10, 10, Color::WHITE).unwrap();
    s.paint(|ctx| {
        ctx.set_paint(Color::rgb(0, 0, 255).to_cpu());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, 5.0, 10.0));
        Ok(())
    })
    .unwrap();
    assert_eq!(s.pixel(2, 5), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(7, 5), Some([255, 255, 255, 255]));
}
