use std::collections::HashMap;

use eframe::egui::epaint::CubicBezierShape;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, vec2};

use crate::layout::{LayoutMode, link_curve, project};
use crate::lineage::{NodeIndex, NodeState};
use crate::util::short_name;

use super::super::ViewModel;
use super::super::render_utils::{
    LINK_COLOR, PATH_COLOR, blend_color, circle_visible, crumb_color, dim_color, draw_background,
    fit_bounds, node_fill_color, node_radius, node_stroke_color, world_to_screen,
};
use super::interaction::ScreenNode;

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);

        self.view.resize(rect.width(), now);
        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let animating = self.view.tick(now);
        let frame = self.view.frame(now);
        if self.auto_fit
            && let Some(bounds) = frame.bounds
        {
            (self.pan, self.zoom) = fit_bounds(rect.shrink(12.0), bounds);
        }

        let pan = self.pan;
        let zoom = self.zoom;
        let to_screen = |world: Pos2| world_to_screen(rect, pan, zoom, world);

        draw_background(&painter, rect, pan, zoom);

        let screen_nodes = {
            let tree = self.view.tree();
            frame
                .nodes
                .iter()
                .map(|sprite| ScreenNode {
                    node: sprite.node,
                    phase: sprite.phase,
                    position: to_screen(project(frame.mode, sprite.point)),
                    radius: (node_radius(tree.node(sprite.node).depth) * zoom.sqrt())
                        .clamp(2.5, 40.0),
                    opacity: sprite.opacity,
                })
                .collect::<Vec<_>>()
        };

        let hovered = Self::hovered_node(ui, &screen_nodes);
        self.view.hover(hovered);
        if hovered.is_some() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }

        let tree = self.view.tree();
        let hover = self.view.hover_path();
        let zoom_sqrt = zoom.sqrt();

        let opacity_by_node = frame
            .nodes
            .iter()
            .map(|sprite| (sprite.node, sprite.opacity))
            .collect::<HashMap<NodeIndex, f32>>();

        for link in &frame.links {
            let curve = link_curve(frame.mode, link.ends[0], link.ends[1]).map(to_screen);
            let opacity = opacity_by_node.get(&link.child).copied().unwrap_or(1.0);
            let on_path = hover.is_some_and(|path| path.contains_link(link.key));

            let (line_width, line_color) = if on_path {
                ((2.6 * zoom_sqrt).clamp(1.4, 5.0), PATH_COLOR)
            } else if hover.is_some() {
                ((1.2 * zoom_sqrt).clamp(0.6, 3.0), dim_color(LINK_COLOR, 0.6))
            } else {
                ((1.2 * zoom_sqrt).clamp(0.6, 3.0), LINK_COLOR)
            };

            painter.add(CubicBezierShape::from_points_stroke(
                curve,
                false,
                Color32::TRANSPARENT,
                Stroke::new(line_width, line_color.gamma_multiply(opacity)),
            ));
        }

        let origin = to_screen(Pos2::ZERO);
        for screen in &screen_nodes {
            if !circle_visible(rect, screen.position, screen.radius + 4.0) {
                continue;
            }

            let node = tree.node(screen.node);
            let collapsed = tree.state(screen.node) == NodeState::Collapsed;
            let on_path = hover.is_some_and(|path| path.contains_node(screen.node));
            let is_selected = self.selected == Some(screen.node);

            let base_stroke = node_stroke_color(node);
            let stroke_color = if on_path {
                blend_color(base_stroke, PATH_COLOR, 0.7)
            } else if hover.is_some() {
                dim_color(base_stroke, 0.55)
            } else {
                base_stroke
            };

            painter.circle_filled(
                screen.position,
                screen.radius,
                node_fill_color(node, collapsed).gamma_multiply(screen.opacity),
            );
            painter.circle_stroke(
                screen.position,
                screen.radius,
                Stroke::new(
                    if is_selected { 2.6 } else { 1.5 },
                    stroke_color.gamma_multiply(screen.opacity),
                ),
            );
            if is_selected {
                painter.circle_stroke(
                    screen.position,
                    screen.radius + 4.0,
                    Stroke::new(1.2, PATH_COLOR.gamma_multiply(0.6 * screen.opacity)),
                );
            }

            if zoom < 0.45 && !on_path && !is_selected {
                continue;
            }

            let gap = screen.radius + 6.0;
            let (anchor, align) = match frame.mode {
                LayoutMode::Linear if !node.is_leaf() && !collapsed => {
                    (screen.position - vec2(gap, 0.0), Align2::RIGHT_CENTER)
                }
                LayoutMode::Linear => (screen.position + vec2(gap, 0.0), Align2::LEFT_CENTER),
                LayoutMode::Radial => {
                    let outward = screen.position - origin;
                    let direction = if outward.length() < 1.0 {
                        vec2(1.0, 0.0)
                    } else {
                        outward.normalized()
                    };
                    let align = if direction.x >= 0.0 {
                        Align2::LEFT_CENTER
                    } else {
                        Align2::RIGHT_CENTER
                    };
                    (screen.position + direction * gap, align)
                }
            };

            let label_color = if on_path {
                Color32::from_gray(250)
            } else {
                Color32::from_gray(214)
            };
            painter.text(
                anchor,
                align,
                short_name(node.display_name()),
                FontId::proportional(12.0),
                label_color.gamma_multiply(screen.opacity),
            );
        }

        if let Some(path) = hover
            && !path.crumbs.is_empty()
        {
            let mut cursor = rect.left_top() + vec2(10.0, 10.0);
            for (index, crumb) in path.crumbs.iter().enumerate() {
                if index > 0 {
                    let separator = painter.text(
                        cursor,
                        Align2::LEFT_TOP,
                        " › ",
                        FontId::proportional(13.0),
                        Color32::from_gray(160),
                    );
                    cursor.x = separator.right();
                }
                let placed = painter.text(
                    cursor,
                    Align2::LEFT_TOP,
                    short_name(&crumb.name),
                    FontId::proportional(13.0),
                    crumb_color(crumb.class),
                );
                cursor.x = placed.right();
            }
        }

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(node) = hovered
        {
            let slow_motion = ui.input(|input| input.modifiers.alt);
            self.view.toggle(node, now, slow_motion);
            self.set_selected(Some(node));
            ui.ctx().request_repaint();
        }

        if animating || response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}
