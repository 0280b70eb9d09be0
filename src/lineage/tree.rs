use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::build::ROOT_ID;

pub type NodeIndex = usize;

/// Traversal-order key used to match rendered shapes between passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderKey(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    #[default]
    Issuer,
    Asset,
    Account,
    #[serde(other)]
    Other,
}

impl NodeType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Issuer => "ISSUER",
            Self::Asset => "ASSET",
            Self::Account => "ACCOUNT",
            Self::Other => "OTHER",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Expanded,
    Collapsed,
}

#[derive(Clone, Debug)]
pub struct TreeNode {
    pub id: String,
    pub parent: Option<NodeIndex>,
    pub name: String,
    pub weight: f64,
    pub node_type: NodeType,
    pub deleted: bool,
    pub attributes: Map<String, Value>,
    pub depth: usize,
    pub render_key: RenderKey,
    pub(super) children: Vec<NodeIndex>,
    pub(super) expanded: bool,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[derive(Clone, Debug)]
pub struct LineageTree {
    nodes: Vec<TreeNode>,
    root: NodeIndex,
    index_by_id: HashMap<String, NodeIndex>,
}

impl LineageTree {
    pub(super) fn from_parts(
        nodes: Vec<TreeNode>,
        root: NodeIndex,
        index_by_id: HashMap<String, NodeIndex>,
    ) -> Self {
        Self {
            nodes,
            root,
            index_by_id,
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node(&self, index: NodeIndex) -> &TreeNode {
        &self.nodes[index]
    }

    pub fn get(&self, index: NodeIndex) -> Option<&TreeNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &TreeNode)> {
        self.nodes.iter().enumerate()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node count without the synthetic root injected for edge payloads.
    pub fn lineage_len(&self) -> usize {
        if self.nodes[self.root].id == ROOT_ID {
            self.nodes.len() - 1
        } else {
            self.nodes.len()
        }
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index_by_id.get(id).copied()
    }

    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        &self.nodes[index].children
    }

    /// Children shown under `index`: the full child list when expanded, empty otherwise.
    pub fn visible_children(&self, index: NodeIndex) -> &[NodeIndex] {
        let node = &self.nodes[index];
        if node.expanded { &node.children } else { &[] }
    }

    pub fn state(&self, index: NodeIndex) -> NodeState {
        if self.nodes[index].expanded {
            NodeState::Expanded
        } else {
            NodeState::Collapsed
        }
    }

    pub fn is_visible(&self, index: NodeIndex) -> bool {
        let mut cursor = self.nodes[index].parent;
        while let Some(parent) = cursor {
            if !self.nodes[parent].expanded {
                return false;
            }
            cursor = self.nodes[parent].parent;
        }
        true
    }

    pub fn visible_nodes(&self) -> Vec<NodeIndex> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            order.push(index);
            stack.extend(self.visible_children(index).iter().rev().copied());
        }
        order
    }

    pub fn visible_subtree_len(&self, index: NodeIndex) -> usize {
        let mut count = 0;
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            count += 1;
            stack.extend_from_slice(self.visible_children(current));
        }
        count
    }

    pub fn toggle(&mut self, index: NodeIndex) -> NodeState {
        let node = &mut self.nodes[index];
        node.expanded = !node.expanded;
        self.state(index)
    }

    pub fn set_state(&mut self, index: NodeIndex, state: NodeState) {
        self.nodes[index].expanded = state == NodeState::Expanded;
    }

    pub fn collapse_all(&mut self, index: NodeIndex) {
        self.set_subtree(index, false);
    }

    pub fn expand_all(&mut self, index: NodeIndex) {
        self.set_subtree(index, true);
    }

    fn set_subtree(&mut self, index: NodeIndex, expanded: bool) {
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            self.nodes[current].expanded = expanded;
            stack.extend_from_slice(&self.nodes[current].children);
        }
    }

    pub fn reveal(&mut self, index: NodeIndex) -> bool {
        let mut changed = false;
        let mut cursor = self.nodes[index].parent;
        while let Some(parent) = cursor {
            if !self.nodes[parent].expanded {
                self.nodes[parent].expanded = true;
                changed = true;
            }
            cursor = self.nodes[parent].parent;
        }
        changed
    }

    pub fn apply_initial_depth(&mut self, initial_depth: usize) {
        for node in &mut self.nodes {
            node.expanded = node.depth <= initial_depth;
        }
    }

    /// Walks from `index` up to the root, both ends included.
    pub fn path_to_root(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![index];
        let mut cursor = self.nodes[index].parent;
        while let Some(parent) = cursor {
            path.push(parent);
            cursor = self.nodes[parent].parent;
        }
        path
    }

    pub fn inherit_states(&mut self, previous: &LineageTree) {
        for node in &mut self.nodes {
            if let Some(index) = previous.index_of(&node.id) {
                node.expanded = previous.nodes[index].expanded;
            }
        }
    }
}
