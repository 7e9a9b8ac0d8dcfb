//! DOM queries: by id, class, tag; generic predicate matching.
//!
//! Every query is scoped to a subtree and returns matches in document order.

use super::document::Document;
use super::node::{ElementData, NodeId};

impl Document {
    /// All element descendants of `root` (excluding `root`) matching `predicate`,
    /// in document order.
    pub fn query_all(
        &self,
        root: NodeId,
        predicate: impl Fn(&ElementData) -> bool,
    ) -> Vec<NodeId> {
        self.tree()
            .walk_depth_first(root)
            .into_iter()
            .skip(1)
            .filter(|&id| self.element(id).is_some_and(&predicate))
            .collect()
    }

    /// First element under `root` (excluding `root`) whose `id` attribute matches.
    pub fn query_by_id(&self, root: NodeId, id: &str) -> Option<NodeId> {
        self.query_all(root, |el| el.attribute("id") == Some(id))
            .into_iter()
            .next()
    }

    /// Search the main window for an element with the given `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let body = self.body();
        if self.attribute(body, "id") == Some(id) {
            return Some(body);
        }
        self.query_by_id(body, id)
    }

    /// Elements under `root` carrying the given CSS class.
    pub fn query_by_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.query_all(root, |el| el.has_class(class))
    }

    /// Elements under `root` with the given tag.
    pub fn query_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_lowercase();
        self.query_all(root, |el| el.tag == tag)
    }
}
