//! Node types: NodeId, NodeData, ElementData.

use std::collections::HashMap;

use slotmap::new_key_type;

use crate::event::handler::Listener;
use crate::value::Value;
use crate::widget::state::WidgetState;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;

    /// Identifier for a window: the main window or a frame's content window.
    pub struct WindowId;
}

/// Data associated with a single DOM node.
#[derive(Debug)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

impl NodeData {
    /// The element data, if this is an element node.
    pub fn as_element(&self) -> Option<&ElementData> {
        match self {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    /// Mutable element data, if this is an element node.
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    /// The text, if this is a text node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }
}

/// An element: tag, attributes, properties, class list, listeners and, once
/// upgraded, widget state.
#[derive(Debug)]
pub struct ElementData {
    /// Lower-case tag name (e.g. "button", "d-star-rating").
    pub tag: String,
    /// Namespace for foreign elements such as SVG.
    pub namespace: Option<String>,
    /// Attributes in insertion order.
    pub attributes: Vec<(String, String)>,
    /// DOM properties, and widget properties once upgraded.
    pub properties: HashMap<String, Value>,
    /// Effective class list.
    pub classes: Vec<String>,
    /// Classes contributed per source token ("template", "user", ...).
    class_components: Vec<(String, Vec<String>)>,
    /// Logical parent for popups, followed by the activation tracker.
    pub popup_parent: Option<NodeId>,
    /// Registered event listeners.
    pub listeners: Vec<Listener>,
    /// Set once the element has been upgraded to a widget.
    pub upgraded: bool,
    /// Widget state for upgraded elements.
    pub widget: Option<Box<WidgetState>>,
}

impl ElementData {
    /// Create a new element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_lowercase(),
            namespace: None,
            attributes: Vec::new(),
            properties: HashMap::new(),
            classes: Vec::new(),
            class_components: Vec::new(),
            popup_parent: None,
            listeners: Vec::new(),
            upgraded: false,
            widget: None,
        }
    }

    /// Set the namespace (builder).
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set an attribute (builder).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(&name.into(), &value.into());
        self
    }

    /// Add a single CSS class (builder).
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        self.add_class(&class);
        self
    }

    /// Read an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.attributes.iter_mut().find(|(n, _)| n == name) {
            slot.1 = value.to_owned();
        } else {
            self.attributes.push((name.to_owned(), value.to_owned()));
        }
    }

    /// Remove an attribute. Returns `true` if it was present.
    pub fn remove_attribute(&mut self, name: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|(n, _)| n != name);
        before != self.attributes.len()
    }

    /// Read a property, `Undefined` if unset.
    pub fn property(&self, name: &str) -> Value {
        self.properties.get(name).cloned().unwrap_or_default()
    }

    /// Check whether this element has a given CSS class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a CSS class. No-op if already present.
    pub fn add_class(&mut self, class: &str) {
        if !class.is_empty() && !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    /// Remove a CSS class. No-op if not present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Toggle a CSS class: add if absent, remove if present.
    pub fn toggle_class(&mut self, class: &str) {
        if self.has_class(class) {
            self.remove_class(class);
        } else {
            self.add_class(class);
        }
    }

    /// Replace the classes contributed under `token` with the
    /// whitespace-separated `classes`, leaving other contributors alone.
    ///
    /// A class still claimed by another contributor is kept.
    pub fn set_class_component(&mut self, token: &str, classes: &str) {
        let new: Vec<String> = classes.split_whitespace().map(str::to_owned).collect();
        let old = match self.class_components.iter_mut().find(|(t, _)| t == token) {
            Some(entry) => std::mem::replace(&mut entry.1, new.clone()),
            None => {
                self.class_components.push((token.to_owned(), new.clone()));
                Vec::new()
            }
        };
        for class in old.iter().filter(|c| !new.contains(c)) {
            let claimed_elsewhere = self
                .class_components
                .iter()
                .any(|(t, list)| t != token && list.contains(class));
            if !claimed_elsewhere {
                self.remove_class(class);
            }
        }
        for class in &new {
            self.add_class(class);
        }
    }

    /// The classes currently contributed under `token`.
    pub fn class_component(&self, token: &str) -> &[String] {
        self.class_components
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, list)| list.as_slice())
            .unwrap_or(&[])
    }

    /// Whether this element is an upgraded widget.
    pub fn is_widget(&self) -> bool {
        self.widget.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_lowercases_tag() {
        let el = ElementData::new("BUTTON");
        assert_eq!(el.tag, "button");
        assert!(el.attributes.is_empty());
        assert!(!el.upgraded);
        assert!(!el.is_widget());
    }

    #[test]
    fn attributes_keep_order_and_replace_in_place() {
        let mut el = ElementData::new("div")
            .with_attribute("role", "list")
            .with_attribute("id", "main");
        el.set_attribute("role", "listbox");
        assert_eq!(
            el.attributes,
            vec![
                ("role".to_owned(), "listbox".to_owned()),
                ("id".to_owned(), "main".to_owned())
            ]
        );
        assert!(el.remove_attribute("role"));
        assert!(!el.remove_attribute("role"));
        assert_eq!(el.attribute("id"), Some("main"));
    }

    #[test]
    fn add_class_idempotent() {
        let mut el = ElementData::new("div");
        el.add_class("foo");
        el.add_class("foo");
        el.add_class("");
        assert_eq!(el.classes, vec!["foo"]);
    }

    #[test]
    fn toggle_class() {
        let mut el = ElementData::new("div");
        el.toggle_class("active");
        assert!(el.has_class("active"));
        el.toggle_class("active");
        assert!(!el.has_class("active"));
    }

    #[test]
    fn class_component_replaces_only_its_own_classes() {
        let mut el = ElementData::new("div").with_class("app");
        el.set_class_component("template", "d-reset x");
        assert_eq!(el.classes, vec!["app", "d-reset", "x"]);

        el.set_class_component("template", "d-reset y");
        assert_eq!(el.classes, vec!["app", "d-reset", "y"]);
        assert_eq!(el.class_component("template"), ["d-reset", "y"]);
    }

    #[test]
    fn class_component_keeps_classes_claimed_by_another_token() {
        let mut el = ElementData::new("div");
        el.set_class_component("user", "shared");
        el.set_class_component("template", "shared extra");
        el.set_class_component("template", "");
        assert_eq!(el.classes, vec!["shared"]);
    }

    #[test]
    fn node_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<NodeId>();
        assert_copy::<WindowId>();
    }
}
