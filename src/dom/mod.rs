//! The widget tree: arena-backed DOM, node data, dirty tracking.

pub mod dirty;
pub mod node;
pub mod tree;
