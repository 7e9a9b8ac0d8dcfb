//! Factories and the registry operations that need a document:
//! `create_element` and `parse`.

use std::rc::Rc;

use tracing::debug;

use crate::context::Context;
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::value::Value;
use crate::widget::definition::Definition;

/// Creates instances of one registered widget.
#[derive(Debug, Clone)]
pub struct Factory {
    definition: Rc<Definition>,
}

impl Factory {
    pub(crate) fn new(definition: Rc<Definition>) -> Self {
        Self { definition }
    }

    pub fn tag(&self) -> &str {
        &self.definition.tag
    }

    pub fn definition(&self) -> &Rc<Definition> {
        &self.definition
    }

    /// Create a new instance, or upgrade `existing`, then apply `props`.
    ///
    /// `style` goes through the style setter and `class`/`className` are
    /// merged as the user's class contribution; everything else is a
    /// property write.
    pub fn create(&self, ctx: &mut Context<'_>, props: &[(&str, Value)], existing: Option<NodeId>) -> Result<NodeId> {
        let node = match existing {
            Some(node) => {
                if !ctx.doc.element(node).is_some_and(|el| el.upgraded) {
                    ctx.created_callback(node, Rc::clone(&self.definition))?;
                    if ctx.doc.is_connected(node) {
                        ctx.attach(node)?;
                    }
                }
                node
            }
            None => {
                let node = ctx.doc.create_element(self.definition.element_tag());
                if self.definition.extends().is_some() {
                    ctx.doc.set_attribute(node, "is", &self.definition.tag);
                }
                ctx.created_callback(node, Rc::clone(&self.definition))?;
                node
            }
        };

        for (name, value) in props {
            match *name {
                "style" => ctx.doc.set_style(node, &value.to_string()),
                "class" | "className" => {
                    let token = ctx.config().user_class_token.clone();
                    ctx.doc.set_class_component(node, &token, &value.to_string());
                }
                _ => {
                    ctx.set(node, name, value.clone());
                }
            }
        }
        Ok(node)
    }
}

impl Context<'_> {
    /// Create an element; registered tags come back upgraded.
    pub fn create_element(&mut self, tag: &str) -> Result<NodeId> {
        match self.registry.factory(&tag.to_lowercase()) {
            Some(factory) => factory.create(self, &[], None),
            None => Ok(self.doc.create_element(tag)),
        }
    }

    /// Upgrade every registered element under `root` in document order, then
    /// start each of them. Widgets already upgraded or started are left as
    /// they are.
    pub fn parse(&mut self, root: NodeId) -> Result<Vec<NodeId>> {
        let targets: Vec<NodeId> = self
            .doc
            .tree()
            .walk_depth_first(root)
            .into_iter()
            .skip(1)
            .filter(|&node| self.registry.matches(&*self.doc, node).is_some())
            .collect();
        debug!(count = targets.len(), "parse");
        for &node in &targets {
            self.upgrade(node)?;
        }
        for &node in &targets {
            self.startup(node)?;
        }
        Ok(targets)
    }

    /// [`parse`](Self::parse) with the main window's body as root.
    pub fn parse_document(&mut self) -> Result<Vec<NodeId>> {
        let body = self.doc.body();
        self.parse(body)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
