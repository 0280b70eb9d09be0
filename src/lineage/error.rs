#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("duplicate node id `{id}`")]
    DuplicateId { id: String },

    #[error("node `{id}` references missing parent `{parent_id}`")]
    DanglingParent { id: String, parent_id: String },

    #[error("parent chain of node `{id}` forms a cycle")]
    Cycle { id: String },

    #[error("lineage payload contains no nodes")]
    EmptyTree,
}
