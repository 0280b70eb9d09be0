use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};
use tracing::error;

use crate::lineage::{LineageSource, LineageTree, NodeIndex, load_lineage};
use crate::view::{TreeConfig, TreeView};

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<LineageTree, String>;

pub struct LineageApp {
    source: LineageSource,
    config: TreeConfig,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    view: TreeView,
    search: String,
    selected: Option<NodeIndex>,
    pan: Vec2,
    zoom: f32,
    auto_fit: bool,
    alert: Option<String>,
}

impl LineageApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: LineageSource,
        config: TreeConfig,
    ) -> Self {
        let state = Self::start_load(&source, config.initial_depth);
        Self {
            source,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: &LineageSource, initial_depth: usize) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        let source = source.clone();

        thread::spawn(move || {
            let result = load_lineage(&source, initial_depth).map_err(|error| {
                error!(source = %source.label(), "failed to load lineage: {error:#}");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: &LineageSource, initial_depth: usize) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source, initial_depth),
        }
    }
}

impl eframe::App for LineageApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let now = ctx.input(|input| input.time);

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(match result {
                            Ok(tree) => AppState::Ready(Box::new(ViewModel::new(
                                tree,
                                self.config.clone(),
                                now,
                            ))),
                            Err(error) => AppState::Error(error),
                        });
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading lineage...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load lineage");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(
                            &self.source,
                            self.config.initial_depth,
                        ));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let can_reload =
                    self.reload_rx.is_none() && matches!(self.source, LineageSource::File(_));
                model.show(ctx, &self.source.label(), &mut reload_requested, can_reload);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(
                        &self.source,
                        model.view.config().initial_depth,
                    ));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(tree)) => model.replace_tree(tree, now),
                        Ok(Err(error)) => model.alert = Some(error),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            error!("background reload worker disconnected");
                            model.alert = Some("Background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
