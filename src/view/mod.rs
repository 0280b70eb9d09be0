use std::time::Duration;

use tracing::debug;

use crate::layout::{LayoutConfig, LayoutMode, TreeLayout};
use crate::lineage::{LineageTree, NodeIndex, NodeState};
use crate::scene::{RenderDelta, Scene, SceneFrame};

mod interaction;

pub use interaction::{Crumb, CrumbClass, HoverPath, SearchHit, ancestry_chain, search};

const LINEAR_DURATION: Duration = Duration::from_millis(250);
const RADIAL_DURATION: Duration = Duration::from_millis(350);
const SLOW_MOTION_FACTOR: u32 = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig {
    pub layout_mode: LayoutMode,
    pub initial_depth: usize,
    pub animation_duration: Option<Duration>,
    pub node_spacing: f32,
    /// Distance between depth levels in linear mode. Tracks the viewport
    /// width when unset.
    pub level_spacing: Option<f32>,
    pub radial_step: f32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::Linear,
            initial_depth: 0,
            animation_duration: None,
            node_spacing: 20.0,
            level_spacing: None,
            radial_step: 120.0,
        }
    }
}

impl TreeConfig {
    pub fn duration(&self, slow_motion: bool) -> Duration {
        let base = self
            .animation_duration
            .unwrap_or(match self.layout_mode {
                LayoutMode::Linear => LINEAR_DURATION,
                LayoutMode::Radial => RADIAL_DURATION,
            });
        if slow_motion {
            base * SLOW_MOTION_FACTOR
        } else {
            base
        }
    }

    pub fn layout_config(&self, viewport_width: f32) -> LayoutConfig {
        LayoutConfig {
            node_spacing: self.node_spacing,
            level_spacing: self.level_spacing.unwrap_or(viewport_width / 6.0),
            radial_step: self.radial_step,
            viewport_width,
        }
    }
}

pub struct TreeView {
    tree: LineageTree,
    config: TreeConfig,
    viewport_width: f32,
    layout: TreeLayout,
    scene: Scene,
    hover: Option<HoverPath>,
}

impl TreeView {
    pub fn new(tree: LineageTree, config: TreeConfig, viewport_width: f32, now: f64) -> Self {
        let layout = TreeLayout::compute(
            &tree,
            config.layout_mode,
            &config.layout_config(viewport_width),
        );
        let mut scene = Scene::default();
        scene.reconcile(&tree, &layout, tree.root(), now, config.duration(false));

        Self {
            tree,
            config,
            viewport_width,
            layout,
            scene,
            hover: None,
        }
    }

    pub fn tree(&self) -> &LineageTree {
        &self.tree
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn hover_path(&self) -> Option<&HoverPath> {
        self.hover.as_ref()
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    pub fn relayout(&mut self, source: NodeIndex, now: f64, slow_motion: bool) -> RenderDelta {
        self.layout = TreeLayout::compute(
            &self.tree,
            self.config.layout_mode,
            &self.config.layout_config(self.viewport_width),
        );
        if let Some(hover) = &self.hover
            && !self.tree.is_visible(hover.node)
        {
            self.hover = None;
        }

        self.scene.reconcile(
            &self.tree,
            &self.layout,
            source,
            now,
            self.config.duration(slow_motion),
        )
    }

    pub fn toggle(&mut self, node: NodeIndex, now: f64, slow_motion: bool) -> NodeState {
        let state = self.tree.toggle(node);
        debug!(id = %self.tree.node(node).id, ?state, slow_motion, "toggled node");
        self.relayout(node, now, slow_motion);
        state
    }

    pub fn collapse_all(&mut self, node: NodeIndex, now: f64) {
        self.tree.collapse_all(node);
        self.relayout(node, now, false);
    }

    pub fn expand_all(&mut self, node: NodeIndex, now: f64) {
        self.tree.expand_all(node);
        self.relayout(node, now, false);
    }

    pub fn reveal(&mut self, node: NodeIndex, now: f64) -> bool {
        let source = self
            .tree
            .path_to_root(node)
            .into_iter()
            .find(|&candidate| self.tree.is_visible(candidate))
            .unwrap_or(self.tree.root());
        let changed = self.tree.reveal(node);
        if changed {
            self.relayout(source, now, false);
        }
        changed
    }

    pub fn resize(&mut self, viewport_width: f32, now: f64) -> Option<RenderDelta> {
        if (viewport_width - self.viewport_width).abs() < 0.5 {
            return None;
        }

        self.viewport_width = viewport_width;
        let root = self.tree.root();
        Some(self.relayout(root, now, false))
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode, now: f64) {
        if self.config.layout_mode == mode {
            return;
        }

        self.config.layout_mode = mode;
        let root = self.tree.root();
        self.relayout(root, now, false);
    }

    pub fn set_initial_depth(&mut self, initial_depth: usize, now: f64) {
        self.config.initial_depth = initial_depth;
        self.tree.apply_initial_depth(initial_depth);
        let root = self.tree.root();
        self.relayout(root, now, false);
    }

    pub fn replace_tree(&mut self, mut tree: LineageTree, now: f64) {
        tree.inherit_states(&self.tree);
        self.tree = tree;
        self.scene = Scene::default();
        self.hover = None;
        let root = self.tree.root();
        self.relayout(root, now, false);
    }

    pub fn hover(&mut self, node: Option<NodeIndex>) {
        if self.hover.as_ref().map(|hover| hover.node) == node {
            return;
        }

        self.hover = node
            .filter(|&node| self.tree.get(node).is_some())
            .map(|node| HoverPath::new(&self.tree, node));
    }

    pub fn tick(&mut self, now: f64) -> bool {
        self.scene.tick(now)
    }

    pub fn frame(&self, now: f64) -> SceneFrame {
        self.scene.frame(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineage::{EdgeRecord, build_from_edges};
    use crate::scene::Phase;

    fn edge(child_id: &str, parent: &str, child: &str) -> EdgeRecord {
        EdgeRecord {
            child_id: child_id.to_owned(),
            child: child.to_owned(),
            parent: Some(parent.to_owned()),
            ..EdgeRecord::default()
        }
    }

    fn sample_view() -> TreeView {
        let edges = vec![
            edge("1", "0", "A"),
            edge("2", "1", "B"),
            edge("3", "2", "C"),
            edge("4", "0", "D"),
        ];
        let tree = build_from_edges(&edges, 0).unwrap();
        TreeView::new(tree, TreeConfig::default(), 1200.0, 0.0)
    }

    #[test]
    fn durations_follow_layout_mode_and_slow_motion() {
        let mut config = TreeConfig::default();
        assert_eq!(config.duration(false), Duration::from_millis(250));
        assert_eq!(config.duration(true), Duration::from_millis(2500));

        config.layout_mode = LayoutMode::Radial;
        assert_eq!(config.duration(false), Duration::from_millis(350));

        config.animation_duration = Some(Duration::from_millis(100));
        assert_eq!(config.duration(true), Duration::from_secs(1));
    }

    #[test]
    fn level_spacing_tracks_viewport_unless_pinned() {
        let mut config = TreeConfig::default();
        assert_eq!(config.layout_config(1200.0).level_spacing, 200.0);
        config.level_spacing = Some(90.0);
        assert_eq!(config.layout_config(1200.0).level_spacing, 90.0);
    }

    #[test]
    fn new_view_enters_every_visible_node() {
        let view = sample_view();
        let visible = view.tree().visible_nodes();
        assert_eq!(view.layout().order, visible);
        assert_eq!(view.scene().node_count(), visible.len());
        for node in visible {
            let key = view.tree().node(node).render_key;
            assert_eq!(view.scene().rendered(key).unwrap().phase, Phase::Entering);
        }
    }

    #[test]
    fn toggle_shows_child_directly_below() {
        let mut view = sample_view();
        let a = view.tree().index_of("1").unwrap();
        let b = view.tree().index_of("2").unwrap();
        assert_eq!(view.layout().point(b), None);

        assert_eq!(view.toggle(a, 1.0, false), NodeState::Expanded);
        let a_point = view.layout().point(a).unwrap();
        let b_point = view.layout().point(b).unwrap();
        assert_eq!(view.tree().node(b).depth, 2);
        assert_eq!(b_point.x, a_point.x);
        assert_eq!(b_point.y, a_point.y + 200.0);

        let key = view.tree().node(b).render_key;
        assert_eq!(view.scene().rendered(key).unwrap().phase, Phase::Entering);
    }

    #[test]
    fn resize_without_visibility_change_is_pure_update() {
        let mut view = sample_view();
        assert!(view.resize(1200.2, 1.0).is_none());

        let delta = view.resize(900.0, 1.0).unwrap();
        assert!(delta.entering.is_empty() && delta.exiting.is_empty());
        assert_eq!(delta.updating.len(), view.layout().order.len());
        assert_eq!(view.config().layout_config(900.0).level_spacing, 150.0);
    }

    #[test]
    fn reveal_grows_from_deepest_visible_ancestor() {
        let mut view = sample_view();
        let a = view.tree().index_of("1").unwrap();
        let c = view.tree().index_of("3").unwrap();
        let a_anchor = view.scene().anchor(a).unwrap();

        assert!(view.reveal(c, 1.0));
        assert!(view.tree().is_visible(c));
        let key = view.tree().node(c).render_key;
        assert_eq!(view.scene().rendered(key).unwrap().from, a_anchor);
        assert!(!view.reveal(c, 2.0));
    }

    #[test]
    fn hover_clears_when_node_is_hidden() {
        let mut view = sample_view();
        let a = view.tree().index_of("1").unwrap();
        let b = view.tree().index_of("2").unwrap();
        view.toggle(a, 1.0, false);
        view.hover(Some(b));
        assert_eq!(view.hover_path().map(|hover| hover.node), Some(b));

        view.toggle(a, 2.0, false);
        assert!(view.hover_path().is_none());
    }

    #[test]
    fn replace_tree_keeps_expanded_ids() {
        let mut view = sample_view();
        let a = view.tree().index_of("1").unwrap();
        view.toggle(a, 1.0, false);

        let edges = vec![
            edge("1", "0", "A"),
            edge("2", "1", "B"),
            edge("5", "0", "E"),
        ];
        let fresh = build_from_edges(&edges, 0).unwrap();
        view.replace_tree(fresh, 2.0);

        let b = view.tree().index_of("2").unwrap();
        assert!(view.tree().is_visible(b));
        assert_eq!(view.scene().node_count(), 4);
    }

    #[test]
    fn initial_depth_change_reapplies_policy() {
        let mut view = sample_view();
        view.set_initial_depth(2, 1.0);
        let c = view.tree().index_of("3").unwrap();
        assert!(view.tree().is_visible(c));

        view.set_initial_depth(0, 2.0);
        assert!(!view.tree().is_visible(c));
        assert_eq!(view.layout().order.len(), 3);
    }

    #[test]
    fn layout_switch_restarts_scene_in_new_space() {
        let mut view = sample_view();
        view.set_layout_mode(LayoutMode::Radial, 1.0);
        assert_eq!(view.layout().mode, LayoutMode::Radial);
        assert_eq!(view.frame(1.0).mode, LayoutMode::Radial);
        assert_eq!(view.config().duration(false), Duration::from_millis(350));
    }
}
