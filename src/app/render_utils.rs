use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::layout::canvas_origin;

/// Parses `#rrggbb` or `#rgb`.
pub(super) fn parse_hex_color(text: &str) -> Option<Color32> {
    let hex = text.trim().strip_prefix('#')?;
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();

    match hex.len() {
        6 => Some(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => {
            let expand = |value: u8| value * 17;
            Some(Color32::from_rgb(
                expand(channel(0..1)?),
                expand(channel(1..2)?),
                expand(channel(2..3)?),
            ))
        }
        _ => None,
    }
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let alpha = (color.a() as f32 * opacity.clamp(0.0, 1.0)) as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Black or white, whichever reads better on `background`.
pub(super) fn contrast_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 150.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(250, 250, 248));

    let step = (40.0 * zoom.clamp(0.6, 1.8)).max(16.0);
    let origin = rect.left_top() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(180, 186, 194, 40));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Layout coordinates to screen. The canvas origin sits at the top-left of
/// `rect`, shifted by the margins and the current pan.
pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Pos2) -> Pos2 {
    rect.left_top() + pan + (canvas_origin() + world.to_vec2()) * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Pos2 {
    ((screen - rect.left_top() - pan) / zoom - canvas_origin()).to_pos2()
}

/// Pan that puts `world` at the centre of `rect`.
pub(super) fn pan_centering(rect: Rect, zoom: f32, world: Pos2) -> Vec2 {
    rect.size() / 2.0 - (canvas_origin() + world.to_vec2()) * zoom
}
