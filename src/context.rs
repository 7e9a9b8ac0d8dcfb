//! The context threaded through widget code: the document being mutated plus
//! the registry that knows the custom element definitions.

use crate::config::Config;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::register::Registry;
use crate::value::Value;

/// Mutable access to a document together with the registry.
///
/// Event dispatch lives in `event::dispatch`, widget lifecycle in
/// `widget::lifecycle` and registry operations in `register`; all are
/// methods on this type.
pub struct Context<'a> {
    pub doc: &'a mut Document,
    pub registry: &'a Registry,
}

impl<'a> Context<'a> {
    pub fn new(doc: &'a mut Document, registry: &'a Registry) -> Self {
        Self { doc, registry }
    }

    /// A shorter-lived context over the same document.
    pub fn reborrow(&mut self) -> Context<'_> {
        Context {
            doc: &mut *self.doc,
            registry: self.registry,
        }
    }

    pub fn config(&self) -> &Config {
        self.registry.config()
    }

    /// Read a property of `node`.
    pub fn get(&self, node: NodeId, name: &str) -> Value {
        self.doc.property(node, name)
    }

    /// Write a property of `node`. Declared widget properties are queued for
    /// delivery; see [`Context::flush`].
    pub fn set(&mut self, node: NodeId, name: &str, value: impl Into<Value>) -> bool {
        self.doc.set_property(node, name, value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_properties() {
        let registry = Registry::new(Config::default());
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let mut ctx = Context::new(&mut doc, &registry);
        assert!(ctx.set(div, "title", "x"));
        assert_eq!(ctx.get(div, "title"), Value::from("x"));
        assert_eq!(ctx.reborrow().get(div, "title"), Value::from("x"));
        assert_eq!(ctx.config().user_class_token, "user");
    }
}
