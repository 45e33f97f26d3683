use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::inventory::ProcessStatus;

use super::state::Transform;

const GROUP_PALETTE: [Color32; 8] = [
    Color32::from_rgb(94, 166, 224),
    Color32::from_rgb(120, 200, 150),
    Color32::from_rgb(186, 140, 226),
    Color32::from_rgb(232, 196, 104),
    Color32::from_rgb(104, 206, 206),
    Color32::from_rgb(226, 140, 176),
    Color32::from_rgb(168, 184, 120),
    Color32::from_rgb(150, 160, 240),
];

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

pub(super) fn group_color(group_index: usize) -> Color32 {
    GROUP_PALETTE[group_index % GROUP_PALETTE.len()]
}

pub(super) fn status_color(status: ProcessStatus) -> Color32 {
    match status {
        ProcessStatus::Ok => Color32::from_rgb(112, 190, 128),
        ProcessStatus::Warning => Color32::from_rgb(232, 182, 72),
        ProcessStatus::Error => Color32::from_rgb(230, 72, 72),
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: Transform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * transform.zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.min + transform.pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

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

pub(super) fn world_to_screen(rect: Rect, transform: Transform, world: Pos2) -> Pos2 {
    rect.min + transform.pan + world.to_vec2() * transform.zoom
}

pub(super) fn screen_to_world(rect: Rect, transform: Transform, screen: Pos2) -> Pos2 {
    ((screen - rect.min - transform.pan) / transform.zoom).to_pos2()
}

pub(super) fn centered_to_screen(rect: Rect, world: Vec2, scale: f32) -> Pos2 {
    rect.center() + world * scale
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn screen_world_round_trip_under_transform() {
        let rect = Rect::from_min_size(Pos2::new(300.0, 40.0), vec2(800.0, 600.0));
        let transform = Transform {
            pan: vec2(-35.0, 12.5),
            zoom: 2.5,
        };
        let world = Pos2::new(123.0, 456.0);
        let back = screen_to_world(rect, transform, world_to_screen(rect, transform, world));
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn blend_endpoints_are_exact() {
        let a = Color32::from_rgb(10, 20, 30);
        let b = Color32::from_rgb(200, 100, 50);
        assert_eq!(blend_color(a, b, 0.0), a);
        assert_eq!(blend_color(a, b, 1.0), b);
    }

    #[test]
    fn circles_outside_are_culled() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(100.0, 100.0));
        assert!(circle_visible(rect, Pos2::new(-3.0, 50.0), 5.0));
        assert!(!circle_visible(rect, Pos2::new(-30.0, 50.0), 5.0));
    }
}
