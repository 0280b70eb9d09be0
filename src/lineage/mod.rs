mod build;
mod error;
mod load;
mod parse;
mod tree;

pub use build::{ROOT_ID, build_from_edges, build_from_nested};
pub use error::HierarchyError;
pub use load::{LineageSource, load_lineage, tree_from_json};
pub use parse::{EdgeRecord, LineagePayload, NestedNode, parse_payload};
pub use tree::{LineageTree, NodeIndex, NodeState, NodeType, RenderKey, TreeNode};
