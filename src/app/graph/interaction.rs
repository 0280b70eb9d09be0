use eframe::egui::{self, Pos2, Rect, Ui};

use crate::lineage::NodeIndex;
use crate::scene::Phase;

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

pub(super) struct ScreenNode {
    pub(super) node: NodeIndex,
    pub(super) phase: Phase,
    pub(super) position: Pos2,
    pub(super) radius: f32,
    pub(super) opacity: f32,
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.05, 6.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
        self.auto_fit = false;
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
            self.auto_fit = false;
        }
    }

    pub(super) fn hovered_node(ui: &Ui, nodes: &[ScreenNode]) -> Option<NodeIndex> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        nodes
            .iter()
            .filter(|node| node.phase != Phase::Exiting)
            .filter_map(|node| {
                let distance = node.position.distance(pointer);
                (distance <= node.radius + 3.0).then_some((node.node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node)
    }
}
