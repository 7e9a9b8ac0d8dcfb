//! Template syntax tree produced by the parser.

use std::rc::Rc;

use super::expr::{Expr, Stmt};

/// An expression with the instance properties it depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub expression: Expr,
    /// Top-level property names, first-seen order, no duplicates.
    pub dependencies: Vec<String>,
}

/// Text children are bindings too: a literal or a concatenation.
pub type TextFragment = Binding;

impl Binding {
    /// A binding with no dependencies.
    pub fn literal(expression: Expr) -> Self {
        Self {
            expression,
            dependencies: Vec::new(),
        }
    }

    pub fn is_static(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// What an `on-<event>` attribute connects to.
#[derive(Debug, Clone, PartialEq)]
pub enum EventHandler {
    /// A method of the widget, resolved when the event fires.
    Method(String),
    /// Inline statements run with `this` bound to the widget.
    Inline { source: String, body: Rc<[Stmt]> },
}

/// One element of a template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateNode {
    pub tag: String,
    pub namespace: Option<String>,
    /// Data attributes in source order; names are unique.
    pub attributes: Vec<(String, Binding)>,
    pub connects: Vec<(String, EventHandler)>,
    pub children: Vec<TemplateChild>,
    pub attach_points: Vec<String>,
}

/// A child of a [`TemplateNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateChild {
    Element(TemplateNode),
    Text(TextFragment),
}

impl TemplateNode {
    /// Look up a data attribute.
    pub fn attribute(&self, name: &str) -> Option<&Binding> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, b)| b)
    }

    /// Look up the handler connected to an event type.
    pub fn connect(&self, event: &str) -> Option<&EventHandler> {
        self.connects
            .iter()
            .find(|(e, _)| e == event)
            .map(|(_, h)| h)
    }

    /// Insert or replace a data attribute, keeping the first position.
    pub(crate) fn set_attribute(&mut self, name: String, binding: Binding) {
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = binding,
            None => self.attributes.push((name, binding)),
        }
    }

    /// Whether the tag names a custom element.
    pub fn is_custom(&self) -> bool {
        self.tag.contains('-')
    }
}
