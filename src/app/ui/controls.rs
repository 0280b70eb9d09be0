use eframe::egui::{self, RichText, Ui};

use crate::layout::LayoutMode;
use crate::util::short_name;
use crate::view::search;

use super::super::ViewModel;

impl ViewModel {
    const SEARCH_LIMIT: usize = 60;
    const SEARCH_ROW_HEIGHT: f32 = 20.0;

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        let now = ui.input(|input| input.time);

        ui.heading("Layout");
        ui.add_space(4.0);

        let mut mode = self.view.config().layout_mode;
        ui.horizontal(|ui| {
            ui.selectable_value(&mut mode, LayoutMode::Linear, LayoutMode::Linear.label());
            ui.selectable_value(&mut mode, LayoutMode::Radial, LayoutMode::Radial.label());
        });
        if mode != self.view.config().layout_mode {
            self.view.set_layout_mode(mode, now);
            self.auto_fit = true;
        }

        let max_depth = self.view.tree().max_depth();
        let mut initial_depth = self.view.config().initial_depth.min(max_depth);
        let slider = ui.add(
            egui::Slider::new(&mut initial_depth, 0..=max_depth.max(1)).text("initial depth"),
        );
        if slider.changed() {
            self.view.set_initial_depth(initial_depth, now);
        }

        ui.horizontal(|ui| {
            let root = self.view.tree().root();
            if ui.button("Expand all").clicked() {
                self.view.expand_all(root, now);
            }
            if ui.button("Collapse all").clicked() {
                self.view.collapse_all(root, now);
            }
            if ui.button("Fit").clicked() {
                self.auto_fit = true;
            }
        });
        ui.small("Click a node to toggle it. Alt+click plays the transition in slow motion.");

        ui.separator();
        ui.heading("Search");
        ui.add_space(4.0);
        ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("name or id")
                .desired_width(f32::INFINITY),
        );

        if self.search.trim().is_empty() {
            return;
        }

        let hits = search(self.view.tree(), &self.search, Self::SEARCH_LIMIT);
        if hits.is_empty() {
            ui.label("No matching nodes.");
            return;
        }

        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("search_hits_scroll")
            .auto_shrink([false, false])
            .show_rows(ui, Self::SEARCH_ROW_HEIGHT, hits.len(), |ui, row_range| {
                for index in row_range {
                    let Some(hit) = hits.get(index) else {
                        continue;
                    };
                    let node = self.view.tree().node(hit.node);
                    let mut label = RichText::new(format!(
                        "{}  ({})",
                        short_name(node.display_name()),
                        node.node_type.label()
                    ));
                    if self.selected == Some(hit.node) {
                        label = label.strong();
                    }
                    if ui.link(label).on_hover_text(node.id.as_str()).clicked() {
                        picked = Some(hit.node);
                    }
                }
            });

        if let Some(node) = picked {
            self.view.reveal(node, now);
            self.set_selected(Some(node));
        }
    }
}
