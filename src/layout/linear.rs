use std::collections::HashMap;

use eframe::egui::{Rect, pos2, vec2};

use super::tidy::tidy_walk;
use super::{LayoutConfig, LayoutPoint, MARGIN};
use crate::lineage::{LineageTree, NodeIndex};

fn separation(tree: &LineageTree, a: NodeIndex, b: NodeIndex) -> f32 {
    if tree.node(a).parent == tree.node(b).parent {
        1.0
    } else {
        2.0
    }
}

pub(super) fn place(tree: &LineageTree, config: &LayoutConfig) -> Vec<(NodeIndex, LayoutPoint)> {
    tidy_walk(tree, separation)
        .into_iter()
        .map(|placement| {
            let depth = tree.node(placement.node).depth as f32;
            (
                placement.node,
                LayoutPoint::new(
                    placement.breadth * config.node_spacing,
                    depth * config.level_spacing,
                ),
            )
        })
        .collect()
}

pub(super) fn bounds(
    order: &[NodeIndex],
    points: &HashMap<NodeIndex, LayoutPoint>,
    config: &LayoutConfig,
) -> Rect {
    let mut left = f32::INFINITY;
    let mut right = f32::NEG_INFINITY;
    let mut deepest = 0.0f32;

    for point in order.iter().filter_map(|node| points.get(node)) {
        left = left.min(point.x);
        right = right.max(point.x);
        deepest = deepest.max(point.y);
    }

    if !left.is_finite() || !right.is_finite() {
        left = 0.0;
        right = 0.0;
    }

    let height = right - left + MARGIN.top + MARGIN.bottom;
    let content_width = deepest + MARGIN.left + MARGIN.right;
    let width = content_width.max(config.viewport_width);

    Rect::from_min_size(pos2(-MARGIN.left, left - MARGIN.top), vec2(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutMode, TreeLayout};
    use crate::lineage::{EdgeRecord, build_from_edges};

    fn edge(child_id: &str, parent: &str) -> EdgeRecord {
        EdgeRecord {
            child_id: child_id.to_owned(),
            parent: Some(parent.to_owned()),
            ..EdgeRecord::default()
        }
    }

    fn config(viewport_width: f32) -> LayoutConfig {
        LayoutConfig {
            node_spacing: 20.0,
            level_spacing: viewport_width / 6.0,
            radial_step: 120.0,
            viewport_width,
        }
    }

    #[test]
    fn depth_maps_to_level_spacing() {
        let edges = vec![edge("1", "0"), edge("2", "1")];
        let mut tree = build_from_edges(&edges, 0).unwrap();
        let a = tree.index_of("1").unwrap();
        tree.toggle(a);

        let layout = TreeLayout::compute(&tree, LayoutMode::Linear, &config(1200.0));
        let b = tree.index_of("2").unwrap();
        assert_eq!(layout.point(tree.root()), Some(LayoutPoint::new(0.0, 0.0)));
        assert_eq!(layout.point(a), Some(LayoutPoint::new(0.0, 200.0)));
        assert_eq!(layout.point(b), Some(LayoutPoint::new(0.0, 400.0)));
    }

    #[test]
    fn siblings_are_spaced_by_node_spacing() {
        let edges = vec![edge("1", "0"), edge("2", "0")];
        let tree = build_from_edges(&edges, 0).unwrap();
        let layout = TreeLayout::compute(&tree, LayoutMode::Linear, &config(1200.0));

        let first = layout.point(tree.index_of("1").unwrap()).unwrap();
        let second = layout.point(tree.index_of("2").unwrap()).unwrap();
        assert_eq!(second.x - first.x, 20.0);
        assert_eq!(first.y, second.y);
    }

    #[test]
    fn bounds_fall_back_to_viewport_width() {
        let edges = vec![edge("1", "0"), edge("2", "0")];
        let tree = build_from_edges(&edges, 0).unwrap();
        let layout = TreeLayout::compute(&tree, LayoutMode::Linear, &config(1200.0));

        assert_eq!(layout.bounds.width(), 1200.0);
        assert_eq!(layout.bounds.min, pos2(-MARGIN.left, -10.0 - MARGIN.top));
        assert_eq!(layout.bounds.height(), 20.0 + MARGIN.top + MARGIN.bottom);
    }

    #[test]
    fn bounds_grow_with_deep_content() {
        let mut edges = Vec::new();
        let mut parent = "0".to_owned();
        for depth in 1..=10 {
            let id = depth.to_string();
            edges.push(edge(&id, &parent));
            parent = id;
        }
        let tree = build_from_edges(&edges, 20).unwrap();
        let layout = TreeLayout::compute(&tree, LayoutMode::Linear, &config(600.0));

        assert_eq!(layout.bounds.width(), 10.0 * 100.0 + MARGIN.left + MARGIN.right);
    }
}
