use eframe::egui::{self, RichText, Ui};

use crate::lineage::NodeState;
use crate::util::{format_attribute, format_balance, short_name};
use crate::view::ancestry_chain;

use super::super::ViewModel;
use super::super::render_utils::crumb_color;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Node Details");
        ui.add_space(6.0);

        let Some(selected) = self.selected else {
            ui.label("Select a node from the tree or the search results.");
            return;
        };

        let Some(node) = self.view.tree().get(selected) else {
            ui.label("Selected node no longer exists in the tree.");
            return;
        };

        let now = ui.input(|input| input.time);
        let tree = self.view.tree();
        let total_children = tree.children(selected).len();
        let visible_children = tree.visible_children(selected).len();
        let state = tree.state(selected);
        let crumbs = ancestry_chain(tree, selected);

        ui.label(RichText::new(short_name(node.display_name())).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);

        egui::Grid::new("node_summary")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                ui.label("Type");
                ui.label(node.node_type.label());
                ui.end_row();
                ui.label("Deleted");
                ui.label(if node.deleted { "yes" } else { "no" });
                ui.end_row();
                ui.label("Weight");
                ui.label(format_balance(node.weight));
                ui.end_row();
                ui.label("Depth");
                ui.label(node.depth.to_string());
                ui.end_row();
                ui.label("Children");
                ui.label(format!("{visible_children} shown / {total_children} total"));
                ui.end_row();
            });

        let mut action = None;
        if total_children > 0 {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let toggle_label = match state {
                    NodeState::Expanded => "Collapse",
                    NodeState::Collapsed => "Expand",
                };
                if ui.button(toggle_label).clicked() {
                    action = Some(NodeAction::Toggle);
                }
                if ui.button("Expand subtree").clicked() {
                    action = Some(NodeAction::ExpandAll);
                }
                if ui.button("Collapse subtree").clicked() {
                    action = Some(NodeAction::CollapseAll);
                }
            });
        }

        ui.separator();
        ui.label(RichText::new("Ancestry").strong());
        let mut picked = None;
        if crumbs.is_empty() {
            ui.label("Top of the lineage.");
        } else {
            ui.horizontal_wrapped(|ui| {
                for (index, crumb) in crumbs.iter().enumerate() {
                    if index > 0 {
                        ui.label("›");
                    }
                    let text = RichText::new(short_name(&crumb.name)).color(crumb_color(crumb.class));
                    if ui.link(text).clicked() {
                        picked = Some(crumb.node);
                    }
                }
            });
        }

        ui.separator();
        ui.label(RichText::new("Attributes").strong());
        if node.attributes.is_empty() {
            ui.label("No extra attributes.");
        } else {
            egui::ScrollArea::vertical()
                .id_salt("attributes_scroll")
                .max_height(320.0)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    egui::Grid::new("node_attributes")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui| {
                            for (key, value) in &node.attributes {
                                ui.label(key.as_str());
                                ui.label(format_attribute(key, value));
                                ui.end_row();
                            }
                        });
                });
        }

        match action {
            Some(NodeAction::Toggle) => {
                self.view.toggle(selected, now, false);
            }
            Some(NodeAction::ExpandAll) => self.view.expand_all(selected, now),
            Some(NodeAction::CollapseAll) => self.view.collapse_all(selected, now),
            None => {}
        }

        if let Some(node) = picked {
            self.set_selected(Some(node));
        }
    }
}

#[derive(Clone, Copy)]
enum NodeAction {
    Toggle,
    ExpandAll,
    CollapseAll,
}
