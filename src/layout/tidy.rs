use crate::lineage::{LineageTree, NodeIndex};

/// Per-node bookkeeping for the Buchheim/Walker tidy-tree walk.
struct WalkNode {
    node: NodeIndex,
    parent: Option<usize>,
    children: Vec<usize>,
    number: usize,
    prelim: f32,
    modifier: f32,
    change: f32,
    shift: f32,
    thread: Option<usize>,
    ancestor: usize,
    default_ancestor: Option<usize>,
}

pub(super) struct TidyPlacement {
    pub(super) node: NodeIndex,
    pub(super) breadth: f32,
}

struct TidyWalk<'a, F> {
    tree: &'a LineageTree,
    walk: Vec<WalkNode>,
    separation: F,
}

pub(super) fn tidy_walk<F>(tree: &LineageTree, separation: F) -> Vec<TidyPlacement>
where
    F: Fn(&LineageTree, NodeIndex, NodeIndex) -> f32,
{
    let mut state = TidyWalk {
        tree,
        walk: Vec::new(),
        separation,
    };
    state.build();

    for v in state.post_order() {
        state.first_walk(v);
    }

    let root_offset = -state.walk[0].prelim;
    let mut breadth = vec![0.0f32; state.walk.len()];
    for v in 0..state.walk.len() {
        let parent_modifier = match state.walk[v].parent {
            Some(parent) => state.walk[parent].modifier,
            None => root_offset,
        };
        breadth[v] = state.walk[v].prelim + parent_modifier;
        state.walk[v].modifier += parent_modifier;
    }

    state
        .walk
        .iter()
        .zip(breadth)
        .map(|(walk_node, breadth)| TidyPlacement {
            node: walk_node.node,
            breadth,
        })
        .collect()
}

impl<F> TidyWalk<'_, F>
where
    F: Fn(&LineageTree, NodeIndex, NodeIndex) -> f32,
{
    fn build(&mut self) {
        let mut stack = vec![(self.tree.root(), None::<usize>, 0usize)];
        while let Some((node, parent, number)) = stack.pop() {
            let index = self.walk.len();
            self.walk.push(WalkNode {
                node,
                parent,
                children: Vec::new(),
                number,
                prelim: 0.0,
                modifier: 0.0,
                change: 0.0,
                shift: 0.0,
                thread: None,
                ancestor: index,
                default_ancestor: None,
            });
            if let Some(parent) = parent {
                self.walk[parent].children.push(index);
            }
            for (number, &child) in self.tree.visible_children(node).iter().enumerate().rev() {
                stack.push((child, Some(index), number));
            }
        }
    }

    fn post_order(&self) -> Vec<usize> {
        let mut pending = vec![0usize];
        let mut visited = Vec::with_capacity(self.walk.len());
        while let Some(v) = pending.pop() {
            visited.push(v);
            pending.extend_from_slice(&self.walk[v].children);
        }
        visited.reverse();
        visited
    }

    fn separation(&self, a: usize, b: usize) -> f32 {
        (self.separation)(self.tree, self.walk[a].node, self.walk[b].node)
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.walk[v].children.first().copied().or(self.walk[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.walk[v].children.last().copied().or(self.walk[v].thread)
    }

    fn first_walk(&mut self, v: usize) {
        let Some(parent) = self.walk[v].parent else {
            if !self.walk[v].children.is_empty() {
                self.execute_shifts(v);
                self.walk[v].prelim = self.children_midpoint(v);
            }
            return;
        };

        let number = self.walk[v].number;
        let left_sibling = (number > 0).then(|| self.walk[parent].children[number - 1]);

        if !self.walk[v].children.is_empty() {
            self.execute_shifts(v);
            let midpoint = self.children_midpoint(v);
            if let Some(w) = left_sibling {
                self.walk[v].prelim = self.walk[w].prelim + self.separation(v, w);
                self.walk[v].modifier = self.walk[v].prelim - midpoint;
            } else {
                self.walk[v].prelim = midpoint;
            }
        } else if let Some(w) = left_sibling {
            self.walk[v].prelim = self.walk[w].prelim + self.separation(v, w);
        }

        let default_ancestor = self.walk[parent]
            .default_ancestor
            .unwrap_or(self.walk[parent].children[0]);
        let next = self.apportion(v, left_sibling, default_ancestor);
        self.walk[parent].default_ancestor = Some(next);
    }

    fn children_midpoint(&self, v: usize) -> f32 {
        let children = &self.walk[v].children;
        match (children.first(), children.last()) {
            (Some(&first), Some(&last)) => (self.walk[first].prelim + self.walk[last].prelim) / 2.0,
            _ => 0.0,
        }
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for index in (0..self.walk[v].children.len()).rev() {
            let w = self.walk[v].children[index];
            let node = &mut self.walk[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }

    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, ancestor: usize) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };
        let mut ancestor = ancestor;
        let Some(parent) = self.walk[v].parent else {
            return ancestor;
        };

        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.walk[parent].children[0];
        let mut sip = self.walk[vip].modifier;
        let mut sop = self.walk[vop].modifier;
        let mut sim = self.walk[vim].modifier;
        let mut som = self.walk[vom].modifier;

        let mut next_vim = self.next_right(vim);
        let mut next_vip = self.next_left(vip);
        while let (Some(inner_left), Some(inner_right)) = (next_vim, next_vip) {
            vim = inner_left;
            vip = inner_right;
            let (Some(outer_left), Some(outer_right)) = (self.next_left(vom), self.next_right(vop))
            else {
                next_vim = None;
                next_vip = None;
                break;
            };
            vom = outer_left;
            vop = outer_right;
            self.walk[vop].ancestor = v;

            let shift = self.walk[vim].prelim + sim - self.walk[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let wm = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(wm, v, shift);
                sip += shift;
                sop += shift;
            }

            sim += self.walk[vim].modifier;
            sip += self.walk[vip].modifier;
            som += self.walk[vom].modifier;
            sop += self.walk[vop].modifier;

            next_vim = self.next_right(vim);
            next_vip = self.next_left(vip);
        }

        if let Some(inner_left) = next_vim
            && self.next_right(vop).is_none()
        {
            self.walk[vop].thread = Some(inner_left);
            self.walk[vop].modifier += sim - sop;
        }

        if let Some(inner_right) = next_vip
            && self.next_left(vom).is_none()
        {
            self.walk[vom].thread = Some(inner_right);
            self.walk[vom].modifier += sip - som;
            ancestor = v;
        }

        ancestor
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.walk[vim].ancestor;
        if self.walk[candidate].parent == self.walk[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f32) {
        let span = self.walk[wp].number as f32 - self.walk[wm].number as f32;
        let change = if span.abs() > f32::EPSILON {
            shift / span
        } else {
            0.0
        };
        self.walk[wp].change -= change;
        self.walk[wp].shift += shift;
        self.walk[wm].change += change;
        self.walk[wp].prelim += shift;
        self.walk[wp].modifier += shift;
    }
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

    fn unit_separation(tree: &LineageTree, a: NodeIndex, b: NodeIndex) -> f32 {
        if tree.node(a).parent == tree.node(b).parent {
            1.0
        } else {
            2.0
        }
    }

    fn breadth_of(tree: &LineageTree, placements: &[TidyPlacement], id: &str) -> f32 {
        let index = tree.index_of(id).unwrap();
        placements
            .iter()
            .find(|placement| placement.node == index)
            .map(|placement| placement.breadth)
            .unwrap()
    }

    #[test]
    fn parent_centred_over_children() {
        let edges = vec![edge("1", "0"), edge("2", "0"), edge("3", "0")];
        let tree = build_from_edges(&edges, 0).unwrap();
        let placements = tidy_walk(&tree, unit_separation);

        assert_eq!(placements.len(), 4);
        assert_eq!(breadth_of(&tree, &placements, "0"), 0.0);
        assert_eq!(breadth_of(&tree, &placements, "1"), -1.0);
        assert_eq!(breadth_of(&tree, &placements, "2"), 0.0);
        assert_eq!(breadth_of(&tree, &placements, "3"), 1.0);
    }

    #[test]
    fn cousins_keep_wider_separation() {
        let edges = vec![
            edge("1", "0"),
            edge("2", "0"),
            edge("11", "1"),
            edge("12", "1"),
            edge("21", "2"),
            edge("22", "2"),
        ];
        let tree = build_from_edges(&edges, 5).unwrap();
        let placements = tidy_walk(&tree, unit_separation);

        let inner_left = breadth_of(&tree, &placements, "12");
        let inner_right = breadth_of(&tree, &placements, "21");
        assert!((inner_right - inner_left - 2.0).abs() < 1e-5);
        assert!(
            (breadth_of(&tree, &placements, "12") - breadth_of(&tree, &placements, "11") - 1.0)
                .abs()
                < 1e-5
        );
        assert_eq!(breadth_of(&tree, &placements, "0"), 0.0);
    }

    #[test]
    fn collapsed_subtrees_take_no_room() {
        let edges = vec![edge("1", "0"), edge("2", "0"), edge("11", "1"), edge("12", "1")];
        let tree = build_from_edges(&edges, 0).unwrap();
        let placements = tidy_walk(&tree, unit_separation);
        assert_eq!(placements.len(), 3);
    }

    #[test]
    fn deep_uneven_tree_has_no_overlaps_per_level() {
        let mut edges = vec![edge("1", "0"), edge("2", "0"), edge("3", "0")];
        for child in 0..4 {
            edges.push(edge(&format!("1{child}"), "1"));
            edges.push(edge(&format!("3{child}"), "3"));
        }
        edges.push(edge("100", "10"));
        edges.push(edge("330", "33"));
        let tree = build_from_edges(&edges, 10).unwrap();
        let placements = tidy_walk(&tree, unit_separation);
        assert_eq!(placements.len(), tree.node_count());

        for depth in 0..=tree.max_depth() {
            let mut row = placements
                .iter()
                .filter(|placement| tree.node(placement.node).depth == depth)
                .map(|placement| placement.breadth)
                .collect::<Vec<_>>();
            row.sort_by(f32::total_cmp);
            for pair in row.windows(2) {
                assert!(pair[1] - pair[0] >= 1.0 - 1e-4, "overlap at depth {depth}: {row:?}");
            }
        }
    }
}
