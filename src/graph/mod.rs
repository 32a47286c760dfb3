//! Shared read-only indices built once per analysis pass.

pub mod entity_graph;
pub mod transaction_index;
