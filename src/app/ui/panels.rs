use eframe::egui::{self, Align, Context, Layout, RichText, Vec2};

use crate::lineage::{LineageTree, NodeIndex};
use crate::view::{TreeConfig, TreeView};

use super::super::ViewModel;
use super::super::render_utils::DELETED_COLOR;

impl ViewModel {
    const DEFAULT_VIEWPORT_WIDTH: f32 = 960.0;

    pub(in crate::app) fn new(tree: LineageTree, config: TreeConfig, now: f64) -> Self {
        Self {
            view: TreeView::new(tree, config, Self::DEFAULT_VIEWPORT_WIDTH, now),
            search: String::new(),
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            auto_fit: true,
            alert: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source_label: &str,
        reload_requested: &mut bool,
        can_reload: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("lineage-tree");
                    ui.separator();
                    ui.label(format!("source: {source_label}"));
                    ui.label(format!("nodes: {}", self.view.tree().lineage_len()));
                    ui.label(format!("depth: {}", self.view.tree().max_depth()));
                    let reload_button = ui.add_enabled(can_reload, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "{}  |  visible: {}",
                            self.view.config().layout_mode.label(),
                            self.view.layout().order.len()
                        ));
                    });
                });
            });

        if let Some(alert) = self.alert.clone() {
            egui::TopBottomPanel::top("alert_bar")
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(alert).color(DELETED_COLOR).strong());
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.alert = None;
                            }
                        });
                    });
                });
        }

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<NodeIndex>) {
        self.selected = selected.filter(|&node| self.view.tree().get(node).is_some());
    }

    pub(in crate::app) fn replace_tree(&mut self, tree: LineageTree, now: f64) {
        let selected_id = self
            .selected
            .map(|node| self.view.tree().node(node).id.clone());
        self.view.replace_tree(tree, now);
        self.selected = selected_id.and_then(|id| self.view.tree().index_of(&id));
        self.alert = None;
        self.auto_fit = true;
    }
}
