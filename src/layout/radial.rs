use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Rect, pos2};

use super::tidy::{TidyPlacement, tidy_walk};
use super::{LayoutConfig, LayoutMode, LayoutPoint, padded, project};
use crate::lineage::{LineageTree, NodeIndex};

pub(crate) fn separation(tree: &LineageTree, a: NodeIndex, b: NodeIndex) -> f32 {
    let base = if tree.node(a).parent == tree.node(b).parent {
        1.0
    } else {
        1.5
    };
    base / tree.node(a).depth.max(1) as f32
}

pub(super) fn place(tree: &LineageTree, config: &LayoutConfig) -> Vec<(NodeIndex, LayoutPoint)> {
    let placements = tidy_walk(tree, separation);

    let (Some(left), Some(right)) = (
        extreme(&placements, |candidate, best| candidate < best),
        extreme(&placements, |candidate, best| candidate > best),
    ) else {
        return Vec::new();
    };

    let half_gap = if left == right {
        1.0
    } else {
        separation(tree, placements[left].node, placements[right].node) / 2.0
    };
    let offset = half_gap - placements[left].breadth;
    let scale = TAU / (placements[right].breadth + half_gap + offset);

    placements
        .iter()
        .map(|placement| {
            let depth = tree.node(placement.node).depth as f32;
            (
                placement.node,
                LayoutPoint::new(
                    (placement.breadth + offset) * scale,
                    depth * config.radial_step,
                ),
            )
        })
        .collect()
}

fn extreme(placements: &[TidyPlacement], better: impl Fn(f32, f32) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, placement) in placements.iter().enumerate() {
        match best {
            Some(current) if !better(placement.breadth, placements[current].breadth) => {}
            _ => best = Some(index),
        }
    }
    best
}

pub(super) fn bounds(order: &[NodeIndex], points: &HashMap<NodeIndex, LayoutPoint>) -> Rect {
    let mut min = pos2(f32::INFINITY, f32::INFINITY);
    let mut max = pos2(f32::NEG_INFINITY, f32::NEG_INFINITY);

    for point in order.iter().filter_map(|node| points.get(node)) {
        let projected = project(LayoutMode::Radial, *point);
        min = min.min(projected);
        max = max.max(projected);
    }

    if !min.x.is_finite() || !max.x.is_finite() {
        return padded(pos2(0.0, 0.0), pos2(0.0, 0.0));
    }

    padded(min, max)
}
