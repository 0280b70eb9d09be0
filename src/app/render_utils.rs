use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::lineage::{NodeType, TreeNode};
use crate::view::CrumbClass;

pub(super) const ASSET_COLOR: Color32 = Color32::from_rgb(246, 170, 84);
pub(super) const DELETED_COLOR: Color32 = Color32::from_rgb(214, 92, 92);
pub(super) const NORMAL_COLOR: Color32 = Color32::from_rgb(132, 182, 235);
pub(super) const PATH_COLOR: Color32 = Color32::from_rgb(246, 206, 104);
pub(super) const LINK_COLOR: Color32 = Color32::from_rgb(96, 104, 116);

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

pub(super) fn crumb_color(class: CrumbClass) -> Color32 {
    match class {
        CrumbClass::Asset => ASSET_COLOR,
        CrumbClass::Deleted => DELETED_COLOR,
        CrumbClass::Normal => NORMAL_COLOR,
    }
}

pub(super) fn node_stroke_color(node: &TreeNode) -> Color32 {
    if node.node_type == NodeType::Asset {
        ASSET_COLOR
    } else if node.deleted {
        DELETED_COLOR
    } else {
        NORMAL_COLOR
    }
}

pub(super) fn node_fill_color(node: &TreeNode, collapsed: bool) -> Color32 {
    if collapsed && !node.is_leaf() {
        blend_color(node_stroke_color(node), Color32::from_rgb(19, 23, 29), 0.35)
    } else {
        Color32::from_rgb(28, 33, 41)
    }
}

pub(super) fn node_radius(depth: usize) -> f32 {
    10.5 / (depth as f32 + 1.0).sqrt()
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment(
            [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 40)),
        );
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment(
            [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
            Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 40)),
        );
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Pos2) -> Pos2 {
    rect.center() + pan + world.to_vec2() * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

pub(super) fn fit_bounds(rect: Rect, bounds: Rect) -> (Vec2, f32) {
    if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return (-bounds.center().to_vec2(), 1.0);
    }

    let zoom = (rect.width() / bounds.width())
        .min(rect.height() / bounds.height())
        .clamp(0.05, 6.0);
    (-bounds.center().to_vec2() * zoom, zoom)
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn fitted_bounds_land_inside_canvas() {
        let canvas = Rect::from_min_size(pos2(100.0, 50.0), vec2(800.0, 600.0));
        let bounds = Rect::from_min_max(pos2(-30.0, -400.0), pos2(1200.0, 400.0));
        let (pan, zoom) = fit_bounds(canvas, bounds);

        let min = world_to_screen(canvas, pan, zoom, bounds.min);
        let max = world_to_screen(canvas, pan, zoom, bounds.max);
        assert!(canvas.expand(0.01).contains(min));
        assert!(canvas.expand(0.01).contains(max));
        assert!(((max.x - min.x) - canvas.width()).abs() < 0.01);
    }

    #[test]
    fn screen_round_trips_to_world() {
        let canvas = Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 300.0));
        let world = pos2(12.0, -7.5);
        let screen = world_to_screen(canvas, vec2(5.0, 9.0), 2.0, world);
        let back = screen_to_world(canvas, vec2(5.0, 9.0), 2.0, screen);
        assert!((back - world.to_vec2()).length() < 1e-4);
    }

    #[test]
    fn deeper_nodes_are_smaller() {
        assert_eq!(node_radius(0), 10.5);
        assert!(node_radius(3) < node_radius(1));
    }
}
