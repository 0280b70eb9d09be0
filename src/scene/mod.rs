use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use eframe::egui::Rect;
use tracing::debug;

use crate::layout::{LayoutMode, LayoutPoint, TreeLayout, lerp_rect};
use crate::lineage::{LineageTree, NodeIndex, RenderKey};

mod transition;

pub use transition::{Transition, ease_cubic_in_out};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Updating,
    Exiting,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderedNode {
    pub node: NodeIndex,
    pub phase: Phase,
    pub from: LayoutPoint,
    pub to: LayoutPoint,
    pub from_opacity: f32,
    pub to_opacity: f32,
}

impl RenderedNode {
    pub fn sample(&self, t: f32) -> (LayoutPoint, f32) {
        (
            self.from.lerp(self.to, t),
            (1.0 - t) * self.from_opacity + t * self.to_opacity,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderedLink {
    pub parent: NodeIndex,
    pub child: NodeIndex,
    pub phase: Phase,
    pub from: [LayoutPoint; 2],
    pub to: [LayoutPoint; 2],
}

impl RenderedLink {
    pub fn sample(&self, t: f32) -> [LayoutPoint; 2] {
        [
            self.from[0].lerp(self.to[0], t),
            self.from[1].lerp(self.to[1], t),
        ]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderDelta {
    pub entering: Vec<RenderKey>,
    pub updating: Vec<RenderKey>,
    pub exiting: Vec<RenderKey>,
    pub links_entering: Vec<RenderKey>,
    pub links_updating: Vec<RenderKey>,
    pub links_exiting: Vec<RenderKey>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeSprite {
    pub key: RenderKey,
    pub node: NodeIndex,
    pub phase: Phase,
    pub point: LayoutPoint,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkSprite {
    pub key: RenderKey,
    pub parent: NodeIndex,
    pub child: NodeIndex,
    pub phase: Phase,
    pub ends: [LayoutPoint; 2],
}

#[derive(Clone, Debug, Default)]
pub struct SceneFrame {
    pub mode: LayoutMode,
    pub nodes: Vec<NodeSprite>,
    pub links: Vec<LinkSprite>,
    pub bounds: Option<Rect>,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    mode: LayoutMode,
    nodes: BTreeMap<RenderKey, RenderedNode>,
    links: BTreeMap<RenderKey, RenderedLink>,
    anchors: HashMap<NodeIndex, LayoutPoint>,
    transition: Option<Transition>,
    bounds_from: Option<Rect>,
    bounds_to: Option<Rect>,
}

impl Scene {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn rendered(&self, key: RenderKey) -> Option<&RenderedNode> {
        self.nodes.get(&key)
    }

    pub fn rendered_link(&self, key: RenderKey) -> Option<&RenderedLink> {
        self.links.get(&key)
    }

    /// Position of `node` at the end of the last pass (`x0`/`y0`).
    pub fn anchor(&self, node: NodeIndex) -> Option<LayoutPoint> {
        self.anchors.get(&node).copied()
    }

    pub fn is_animating(&self, now: f64) -> bool {
        self.transition
            .is_some_and(|transition| !transition.is_finished(now))
    }

    fn progress(&self, now: f64) -> f32 {
        self.transition
            .map_or(1.0, |transition| transition.eased(now))
    }

    fn current_bounds(&self, t: f32) -> Option<Rect> {
        match (self.bounds_from, self.bounds_to) {
            (Some(from), Some(to)) => Some(lerp_rect(from, to, t)),
            (None, to) => to,
            (from, None) => from,
        }
    }

    /// Diffs `layout` against the shapes on screen at `now` and starts a new
    /// transition anchored at `source`.
    pub fn reconcile(
        &mut self,
        tree: &LineageTree,
        layout: &TreeLayout,
        source: NodeIndex,
        now: f64,
        duration: Duration,
    ) -> RenderDelta {
        if layout.mode != self.mode {
            *self = Self {
                mode: layout.mode,
                ..Self::default()
            };
        }
        self.prune_exited(now);

        let t = self.progress(now);
        let source_next = layout.point_or_ancestor(tree, source);
        let source_prev = self
            .anchor(source)
            .or(source_next)
            .unwrap_or_default();
        let source_next = source_next.unwrap_or(source_prev);

        let mut delta = RenderDelta::default();

        let mut previous = std::mem::take(&mut self.nodes);
        for &node in &layout.order {
            let Some(target) = layout.point(node) else {
                continue;
            };
            let key = tree.node(node).render_key;
            let rendered = match previous.remove(&key) {
                Some(old) => {
                    let (point, opacity) = old.sample(t);
                    delta.updating.push(key);
                    RenderedNode {
                        node,
                        phase: Phase::Updating,
                        from: point,
                        to: target,
                        from_opacity: opacity,
                        to_opacity: 1.0,
                    }
                }
                None => {
                    delta.entering.push(key);
                    RenderedNode {
                        node,
                        phase: Phase::Entering,
                        from: source_prev,
                        to: target,
                        from_opacity: 0.0,
                        to_opacity: 1.0,
                    }
                }
            };
            self.nodes.insert(key, rendered);
        }

        for (key, old) in previous {
            let (point, opacity) = old.sample(t);
            delta.exiting.push(key);
            self.nodes.insert(
                key,
                RenderedNode {
                    node: old.node,
                    phase: Phase::Exiting,
                    from: point,
                    to: source_next,
                    from_opacity: opacity,
                    to_opacity: 0.0,
                },
            );
        }

        let mut previous_links = std::mem::take(&mut self.links);
        for &(parent, child) in &layout.links {
            let (Some(parent_point), Some(child_point)) = (layout.point(parent), layout.point(child))
            else {
                continue;
            };
            let key = tree.node(child).render_key;
            let (phase, from) = match previous_links.remove(&key) {
                Some(old) => {
                    delta.links_updating.push(key);
                    (Phase::Updating, old.sample(t))
                }
                None => {
                    delta.links_entering.push(key);
                    (Phase::Entering, [source_prev, source_prev])
                }
            };
            self.links.insert(
                key,
                RenderedLink {
                    parent,
                    child,
                    phase,
                    from,
                    to: [parent_point, child_point],
                },
            );
        }

        for (key, old) in previous_links {
            delta.links_exiting.push(key);
            self.links.insert(
                key,
                RenderedLink {
                    phase: Phase::Exiting,
                    from: old.sample(t),
                    to: [source_next, source_next],
                    ..old
                },
            );
        }

        self.bounds_from = self.current_bounds(t).or(Some(layout.bounds));
        self.bounds_to = Some(layout.bounds);

        for &node in &layout.order {
            if let Some(point) = layout.point(node) {
                self.anchors.insert(node, point);
            }
        }

        self.transition = Some(Transition::new(now, duration));

        debug!(
            entering = delta.entering.len(),
            updating = delta.updating.len(),
            exiting = delta.exiting.len(),
            duration_ms = duration.as_millis() as u64,
            "reconciled scene"
        );

        delta
    }

    pub fn tick(&mut self, now: f64) -> bool {
        self.prune_exited(now);
        self.is_animating(now)
    }

    fn prune_exited(&mut self, now: f64) {
        let Some(transition) = self.transition else {
            return;
        };
        if !transition.is_finished(now) {
            return;
        }

        self.nodes.retain(|_, node| node.phase != Phase::Exiting);
        self.links.retain(|_, link| link.phase != Phase::Exiting);
    }

    pub fn frame(&self, now: f64) -> SceneFrame {
        let t = self.progress(now);

        SceneFrame {
            mode: self.mode,
            nodes: self
                .nodes
                .iter()
                .map(|(&key, rendered)| {
                    let (point, opacity) = rendered.sample(t);
                    NodeSprite {
                        key,
                        node: rendered.node,
                        phase: rendered.phase,
                        point,
                        opacity,
                    }
                })
                .collect(),
            links: self
                .links
                .iter()
                .map(|(&key, link)| LinkSprite {
                    key,
                    parent: link.parent,
                    child: link.child,
                    phase: link.phase,
                    ends: link.sample(t),
                })
                .collect(),
            bounds: self.current_bounds(t),
        }
    }
}
