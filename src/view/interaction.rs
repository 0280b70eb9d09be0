use std::collections::HashSet;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::lineage::{LineageTree, NodeIndex, NodeType, RenderKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrumbClass {
    Asset,
    Deleted,
    Normal,
}

impl CrumbClass {
    fn of(tree: &LineageTree, node: NodeIndex) -> Self {
        let node = tree.node(node);
        if node.node_type == NodeType::Asset {
            Self::Asset
        } else if node.deleted {
            Self::Deleted
        } else {
            Self::Normal
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Crumb {
    pub node: NodeIndex,
    pub name: String,
    pub class: CrumbClass,
}

/// Breadcrumb trail for `node` in root-to-node order. The synthetic root is
/// left out, so the trail is exactly `depth` entries long.
pub fn ancestry_chain(tree: &LineageTree, node: NodeIndex) -> Vec<Crumb> {
    let mut chain = Vec::with_capacity(tree.node(node).depth);
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        let Some(parent) = tree.node(current).parent else {
            break;
        };
        chain.push(Crumb {
            node: current,
            name: tree.node(current).display_name().to_owned(),
            class: CrumbClass::of(tree, current),
        });
        cursor = Some(parent);
    }
    chain.reverse();
    chain
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverPath {
    pub node: NodeIndex,
    pub nodes: HashSet<NodeIndex>,
    pub links: HashSet<RenderKey>,
    pub crumbs: Vec<Crumb>,
}

impl HoverPath {
    pub fn new(tree: &LineageTree, node: NodeIndex) -> Self {
        let path = tree.path_to_root(node);
        let links = path
            .iter()
            .filter(|&&step| tree.node(step).parent.is_some())
            .map(|&step| tree.node(step).render_key)
            .collect();

        Self {
            node,
            nodes: path.into_iter().collect(),
            links,
            crumbs: ancestry_chain(tree, node),
        }
    }

    pub fn contains_node(&self, node: NodeIndex) -> bool {
        self.nodes.contains(&node)
    }

    pub fn contains_link(&self, key: RenderKey) -> bool {
        self.links.contains(&key)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub node: NodeIndex,
    pub score: i64,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

pub fn search(tree: &LineageTree, query: &str, limit: usize) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut hits = tree
        .nodes()
        .filter(|(_, node)| node.parent.is_some())
        .filter_map(|(index, node)| {
            let by_name = fuzzy_match_score(&matcher, &node.name, query);
            let by_id = fuzzy_match_score(&matcher, &node.id, query);
            by_name
                .max(by_id)
                .map(|score| (node.render_key, SearchHit { node: index, score }))
        })
        .collect::<Vec<_>>();

    hits.sort_by(|(a_key, a), (b_key, b)| b.score.cmp(&a.score).then(a_key.cmp(b_key)));
    hits.into_iter().take(limit).map(|(_, hit)| hit).collect()
}
