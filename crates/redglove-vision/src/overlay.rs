use redglove_types::{
    frame::{Frame, Rgb},
    geometry::BoundingBox,
    tracking::ButtonState,
};

/// Outline width for the tracking box: `3 - 4 * state`.
///
/// Button up gives a 3px outline, button down gives `-1`, which `draw_box`
/// treats as a filled box.
pub fn overlay_thickness(state: ButtonState) -> i32 {
    3 - 4 * state.as_index()
}

/// Draw `bbox` into `frame`. Positive `thickness` draws an outline of that many
/// pixels centred on the box edge; zero or negative fills the box.
pub fn draw_box(frame: &mut Frame, bbox: BoundingBox, color: Rgb, thickness: i32) {
    let (left, right) = (i64::from(bbox.left), i64::from(bbox.right));
    let (top, bottom) = (i64::from(bbox.top), i64::from(bbox.bottom));

    if thickness <= 0 {
        fill(frame, (left, top), (right, bottom), color);
        return;
    }

    let thickness = i64::from(thickness);
    let inner = thickness / 2;
    let outer = thickness - inner - 1;

    fill(frame, (left - outer, top - outer), (right + outer, top + inner), color);
    fill(frame, (left - outer, bottom - inner), (right + outer, bottom + outer), color);
    fill(frame, (left - outer, top - outer), (left + inner, bottom + outer), color);
    fill(frame, (right - inner, top - outer), (right + outer, bottom + outer), color);
}

/// Paint the inclusive rectangle `from..=to`, clipped to the frame.
fn fill(frame: &mut Frame, from: (i64, i64), to: (i64, i64), color: Rgb) {
    if frame.width == 0 || frame.height == 0 {
        return;
    }
    let max_x = i64::from(frame.width) - 1;
    let max_y = i64::from(frame.height) - 1;
    if to.0 < 0 || to.1 < 0 || from.0 > max_x || from.1 > max_y {
        return;
    }
    let (x0, x1) = (from.0.clamp(0, max_x), to.0.clamp(0, max_x));
    let (y0, y1) = (from.1.clamp(0, max_y), to.1.clamp(0, max_y));
    for y in y0..=y1 {
        for x in x0..=x1 {
            frame.set_pixel(x as u32, y as u32, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redglove_types::frame::PixelLayout;

    fn bbox() -> BoundingBox {
        BoundingBox {
            top: 3,
            bottom: 6,
            left: 2,
            right: 7,
        }
    }

    #[test]
    fn thickness_encodes_button_state() {
        assert_eq!(overlay_thickness(ButtonState::Up), 3);
        assert_eq!(overlay_thickness(ButtonState::Down), -1);
    }

    #[test]
    fn outline_leaves_interior_untouched() {
        let mut frame = Frame::new(10, 10, PixelLayout::Rgb);
        draw_box(&mut frame, bbox(), Rgb::WHITE, 1);
        assert_eq!(frame.pixel(2, 3), Rgb::WHITE);
        assert_eq!(frame.pixel(7, 6), Rgb::WHITE);
        assert_eq!(frame.pixel(4, 4), Rgb::BLACK);
        assert_eq!(frame.pixel(1, 3), Rgb::BLACK);
    }

    #[test]
    fn thick_outline_grows_both_ways() {
        let mut frame = Frame::new(20, 20, PixelLayout::Rgb);
        let wide = BoundingBox {
            top: 3,
            bottom: 12,
            left: 2,
            right: 15,
        };
        draw_box(&mut frame, wide, Rgb::WHITE, 3);
        assert_eq!(frame.pixel(1, 6), Rgb::WHITE);
        assert_eq!(frame.pixel(3, 6), Rgb::WHITE);
        assert_eq!(frame.pixel(8, 13), Rgb::WHITE);
        assert_eq!(frame.pixel(8, 8), Rgb::BLACK);
        assert_eq!(frame.pixel(0, 6), Rgb::BLACK);
    }

    #[test]
    fn negative_thickness_fills() {
        let mut frame = Frame::new(10, 10, PixelLayout::Rgb);
        draw_box(&mut frame, bbox(), Rgb::WHITE, -1);
        assert_eq!(frame.pixel(4, 4), Rgb::WHITE);
        assert_eq!(frame.pixel(8, 4), Rgb::BLACK);
    }

    #[test]
    fn clips_at_frame_edges() {
        let mut frame = Frame::new(4, 4, PixelLayout::Rgb);
        let edge = BoundingBox {
            top: 0,
            bottom: 3,
            left: 0,
            right: 3,
        };
        draw_box(&mut frame, edge, Rgb::WHITE, 3);
        assert_eq!(frame.pixel(0, 0), Rgb::WHITE);
        assert_eq!(frame.pixel(3, 3), Rgb::WHITE);
    }
}
