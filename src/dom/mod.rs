//! Element arena: nodes, windows, attributes, properties and class lists.

pub mod document;
pub mod node;
pub mod query;
pub mod tree;

pub use document::{Document, Mutation, Window};
pub use node::{ElementData, NodeData, NodeId, WindowId};
pub use tree::Dom;
