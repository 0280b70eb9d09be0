use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use tracing::debug;

use super::error::HierarchyError;
use super::parse::{EdgeRecord, NestedNode};
use super::tree::{LineageTree, NodeIndex, NodeType, RenderKey, TreeNode};

/// Id of the synthetic root injected above flat edge lists.
pub const ROOT_ID: &str = "0";

/// Edges whose child id is this sentinel refer to the root itself.
const SENTINEL_CHILD_ID: &str = "0";

struct NodeSeed {
    id: String,
    parent_id: Option<String>,
    name: String,
    weight: f64,
    node_type: NodeType,
    deleted: bool,
    attributes: Map<String, Value>,
}

pub fn build_from_edges(
    edges: &[EdgeRecord],
    initial_depth: usize,
) -> Result<LineageTree, HierarchyError> {
    let mut seeds = Vec::with_capacity(edges.len() + 1);
    seeds.push(NodeSeed {
        id: ROOT_ID.to_owned(),
        parent_id: None,
        name: String::new(),
        weight: 1.0,
        node_type: NodeType::default(),
        deleted: false,
        attributes: Map::new(),
    });

    for edge in edges {
        if edge.child_id == SENTINEL_CHILD_ID {
            continue;
        }

        let mut attributes = edge.attributes.clone();
        if let Some(parent_weight) = edge.parent_weight {
            attributes.insert("parent_weight".to_owned(), Value::from(parent_weight));
        }
        if let Some(parent_level) = edge.parent_level {
            attributes.insert("parent_level".to_owned(), Value::from(parent_level));
        }

        seeds.push(NodeSeed {
            id: edge.child_id.clone(),
            parent_id: Some(edge.parent.clone().unwrap_or_else(|| ROOT_ID.to_owned())),
            name: edge.child.clone(),
            weight: edge
                .child_weight
                .filter(|weight| *weight != 0.0 && weight.is_finite())
                .unwrap_or(1.0),
            node_type: edge.node_type,
            deleted: edge.deleted,
            attributes,
        });
    }

    stratify(seeds, initial_depth)
}

pub fn build_from_nested(
    root: &NestedNode,
    initial_depth: usize,
) -> Result<LineageTree, HierarchyError> {
    let mut seeds = Vec::new();
    let mut stack = vec![(root, None::<String>, "root".to_owned())];

    while let Some((node, parent_id, fallback_id)) = stack.pop() {
        let id = node.id.clone().unwrap_or(fallback_id);
        for (position, child) in node.children.iter().enumerate().rev() {
            stack.push((child, Some(id.clone()), format!("{id}.{position}")));
        }

        seeds.push(NodeSeed {
            id,
            parent_id,
            name: node.name.clone(),
            weight: 1.0,
            node_type: node.node_type,
            deleted: node.deleted,
            attributes: node.attributes.clone(),
        });
    }

    stratify(seeds, initial_depth)
}

fn stratify(seeds: Vec<NodeSeed>, initial_depth: usize) -> Result<LineageTree, HierarchyError> {
    if seeds.is_empty() {
        return Err(HierarchyError::EmptyTree);
    }

    let mut index_by_id = HashMap::with_capacity(seeds.len());
    for (index, seed) in seeds.iter().enumerate() {
        if index_by_id.insert(seed.id.clone(), index).is_some() {
            return Err(HierarchyError::DuplicateId {
                id: seed.id.clone(),
            });
        }
    }

    let root: NodeIndex = 0;
    let mut parents = vec![None; seeds.len()];
    let mut children = vec![Vec::new(); seeds.len()];

    for (index, seed) in seeds.iter().enumerate().skip(1) {
        let parent = match &seed.parent_id {
            None => root,
            Some(parent_id) => {
                *index_by_id
                    .get(parent_id)
                    .ok_or_else(|| HierarchyError::DanglingParent {
                        id: seed.id.clone(),
                        parent_id: parent_id.clone(),
                    })?
            }
        };
        if parent == index {
            return Err(HierarchyError::Cycle {
                id: seed.id.clone(),
            });
        }
        parents[index] = Some(parent);
        children[parent].push(index);
    }

    let mut depths = vec![0usize; seeds.len()];
    let mut render_keys = vec![None; seeds.len()];
    let mut next_key = 0u32;
    let mut stack = vec![root];
    while let Some(index) = stack.pop() {
        render_keys[index] = Some(RenderKey(next_key));
        next_key += 1;
        for &child in children[index].iter().rev() {
            depths[child] = depths[index] + 1;
            stack.push(child);
        }
    }

    if let Some(unreached) = render_keys.iter().position(Option::is_none) {
        return Err(HierarchyError::Cycle {
            id: seeds[cycle_member(&parents, unreached)].id.clone(),
        });
    }

    let nodes = seeds
        .into_iter()
        .zip(parents)
        .zip(children)
        .zip(depths.iter().zip(render_keys))
        .map(|(((seed, parent), children), (&depth, render_key))| TreeNode {
            id: seed.id,
            parent,
            name: seed.name,
            weight: seed.weight,
            node_type: seed.node_type,
            deleted: seed.deleted,
            attributes: seed.attributes,
            depth,
            render_key: render_key.unwrap_or(RenderKey(u32::MAX)),
            children,
            expanded: depth <= initial_depth,
        })
        .collect::<Vec<_>>();

    debug!(
        nodes = nodes.len(),
        max_depth = depths.iter().max().copied().unwrap_or(0),
        "stratified lineage tree"
    );

    Ok(LineageTree::from_parts(nodes, root, index_by_id))
}

fn cycle_member(parents: &[Option<NodeIndex>], start: NodeIndex) -> NodeIndex {
    let mut seen = HashSet::new();
    let mut cursor = start;
    while seen.insert(cursor) {
        match parents[cursor] {
            Some(parent) => cursor = parent,
            None => break,
        }
    }
    cursor
}
