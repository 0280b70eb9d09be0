mod app;
mod layout;
mod lineage;
mod scene;
mod util;
mod view;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::layout::LayoutMode;
use crate::lineage::LineageSource;
use crate::view::TreeConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Lineage JSON payload, or `-` for stdin.
    #[arg(long, default_value = "lineage.json")]
    input: String,
    #[arg(long, value_enum, default_value_t = LayoutMode::Linear)]
    layout: LayoutMode,
    /// Nodes deeper than this start collapsed.
    #[arg(long, default_value_t = 0)]
    initial_depth: usize,
    /// Transition length in milliseconds (default: 250 linear, 350 radial).
    #[arg(long)]
    animation_ms: Option<u64>,
    #[arg(long, default_value_t = 20.0)]
    node_spacing: f32,
    /// Distance between depth levels (default: a sixth of the viewport width).
    #[arg(long)]
    level_spacing: Option<f32>,
    #[arg(long, default_value_t = 120.0)]
    radial_step: f32,
}

impl Args {
    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            layout_mode: self.layout,
            initial_depth: self.initial_depth,
            animation_duration: self.animation_ms.map(Duration::from_millis),
            node_spacing: self.node_spacing,
            level_spacing: self.level_spacing,
            radial_step: self.radial_step,
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let source = LineageSource::from_arg(&args.input);
    let config = args.tree_config();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "lineage-tree",
        options,
        Box::new(move |cc| Ok(Box::new(app::LineageApp::new(cc, source, config)))),
    )
}
