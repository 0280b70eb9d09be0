use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use eframe::egui::{Pos2, Rect, pos2, vec2};
use tracing::debug;

use crate::lineage::{LineageTree, NodeIndex};

mod linear;
mod radial;
mod tidy;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LayoutMode {
    #[default]
    Linear,
    Radial,
}

impl LayoutMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Linear => "Tidy tree",
            Self::Radial => "Radial tree",
        }
    }
}

pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

pub const MARGIN: Margin = Margin {
    top: 30.0,
    right: 60.0,
    bottom: 30.0,
    left: 30.0,
};

/// A node position in layout space. In linear mode `x` runs across siblings
/// and `y` along depth; in radial mode `x` is the angle in radians and `y`
/// the radius.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayoutPoint {
    pub x: f32,
    pub y: f32,
}

impl LayoutPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, target: Self, t: f32) -> Self {
        Self {
            x: (1.0 - t) * self.x + t * target.x,
            y: (1.0 - t) * self.y + t * target.y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub node_spacing: f32,
    pub level_spacing: f32,
    pub radial_step: f32,
    pub viewport_width: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreeLayout {
    pub mode: LayoutMode,
    pub points: HashMap<NodeIndex, LayoutPoint>,
    pub order: Vec<NodeIndex>,
    pub links: Vec<(NodeIndex, NodeIndex)>,
    pub bounds: Rect,
}

impl TreeLayout {
    pub fn compute(tree: &LineageTree, mode: LayoutMode, config: &LayoutConfig) -> Self {
        let placed = match mode {
            LayoutMode::Linear => linear::place(tree, config),
            LayoutMode::Radial => radial::place(tree, config),
        };

        let order = placed.iter().map(|(node, _)| *node).collect::<Vec<_>>();
        let points = placed.into_iter().collect::<HashMap<_, _>>();
        let links = order
            .iter()
            .filter_map(|&node| tree.node(node).parent.map(|parent| (parent, node)))
            .collect::<Vec<_>>();

        let bounds = match mode {
            LayoutMode::Linear => linear::bounds(&order, &points, config),
            LayoutMode::Radial => radial::bounds(&order, &points),
        };

        debug!(
            ?mode,
            visible = order.len(),
            links = links.len(),
            width = bounds.width(),
            height = bounds.height(),
            "computed tree layout"
        );

        Self {
            mode,
            points,
            order,
            links,
            bounds,
        }
    }

    pub fn point(&self, node: NodeIndex) -> Option<LayoutPoint> {
        self.points.get(&node).copied()
    }

    pub fn position(&self, node: NodeIndex) -> Option<Pos2> {
        self.point(node).map(|point| project(self.mode, point))
    }

    pub fn point_or_ancestor(&self, tree: &LineageTree, node: NodeIndex) -> Option<LayoutPoint> {
        tree.path_to_root(node)
            .into_iter()
            .find_map(|candidate| self.point(candidate))
    }
}

pub fn project(mode: LayoutMode, point: LayoutPoint) -> Pos2 {
    match mode {
        LayoutMode::Linear => pos2(point.y, point.x),
        LayoutMode::Radial => {
            let angle = point.x - FRAC_PI_2;
            pos2(point.y * angle.cos(), point.y * angle.sin())
        }
    }
}

pub fn link_curve(mode: LayoutMode, parent: LayoutPoint, child: LayoutPoint) -> [Pos2; 4] {
    let mid_depth = (parent.y + child.y) / 2.0;
    [
        project(mode, parent),
        project(mode, LayoutPoint::new(parent.x, mid_depth)),
        project(mode, LayoutPoint::new(child.x, mid_depth)),
        project(mode, child),
    ]
}

pub(crate) fn padded(min: Pos2, max: Pos2) -> Rect {
    Rect::from_min_max(
        min - vec2(MARGIN.left, MARGIN.top),
        max + vec2(MARGIN.right, MARGIN.bottom),
    )
}

pub(crate) fn lerp_rect(from: Rect, to: Rect, t: f32) -> Rect {
    Rect::from_min_max(from.min.lerp(to.min, t), from.max.lerp(to.max, t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::{EdgeRecord, build_from_edges};

    fn edge(child_id: &str, parent: &str) -> EdgeRecord {
        EdgeRecord {
            child_id: child_id.to_owned(),
            parent: Some(parent.to_owned()),
            ..EdgeRecord::default()
        }
    }

    fn config() -> LayoutConfig {
        LayoutConfig {
            node_spacing: 20.0,
            level_spacing: 200.0,
            radial_step: 120.0,
            viewport_width: 1200.0,
        }
    }

    fn sample_tree() -> LineageTree {
        let edges = vec![
            edge("1", "0"),
            edge("2", "0"),
            edge("11", "1"),
            edge("12", "1"),
            edge("21", "2"),
        ];
        build_from_edges(&edges, 5).unwrap()
    }

    #[test]
    fn layout_is_idempotent() {
        let tree = sample_tree();
        for mode in [LayoutMode::Linear, LayoutMode::Radial] {
            let first = TreeLayout::compute(&tree, mode, &config());
            let second = TreeLayout::compute(&tree, mode, &config());
            assert_eq!(first, second);
        }
    }

    #[test]
    fn links_cover_every_visible_non_root_node() {
        let tree = sample_tree();
        let layout = TreeLayout::compute(&tree, LayoutMode::Linear, &config());
        assert_eq!(layout.links.len(), layout.order.len() - 1);
        for (parent, child) in &layout.links {
            assert_eq!(tree.node(*child).parent, Some(*parent));
        }
    }

    #[test]
    fn linear_projection_swaps_axes() {
        assert_eq!(
            project(LayoutMode::Linear, LayoutPoint::new(10.0, 200.0)),
            pos2(200.0, 10.0)
        );
    }

    #[test]
    fn radial_projection_starts_at_twelve_o_clock() {
        let top = project(LayoutMode::Radial, LayoutPoint::new(0.0, 100.0));
        assert!(top.x.abs() < 1e-4);
        assert!((top.y + 100.0).abs() < 1e-4);

        let right = project(LayoutMode::Radial, LayoutPoint::new(FRAC_PI_2, 100.0));
        assert!((right.x - 100.0).abs() < 1e-4);
        assert!(right.y.abs() < 1e-4);
    }

    #[test]
    fn link_curve_endpoints_match_nodes() {
        let parent = LayoutPoint::new(0.0, 0.0);
        let child = LayoutPoint::new(40.0, 200.0);
        let curve = link_curve(LayoutMode::Linear, parent, child);
        assert_eq!(curve[0], pos2(0.0, 0.0));
        assert_eq!(curve[1], pos2(100.0, 0.0));
        assert_eq!(curve[2], pos2(100.0, 40.0));
        assert_eq!(curve[3], pos2(200.0, 40.0));
    }

    #[test]
    fn hidden_nodes_fall_back_to_visible_ancestor() {
        let mut tree = sample_tree();
        let one = tree.index_of("1").unwrap();
        tree.toggle(one);
        let layout = TreeLayout::compute(&tree, LayoutMode::Linear, &config());
        let hidden = tree.index_of("11").unwrap();
        assert_eq!(layout.point(hidden), None);
        assert_eq!(layout.point_or_ancestor(&tree, hidden), layout.point(one));
    }
}
