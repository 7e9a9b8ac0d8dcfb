//! The document: node arena, windows, mutation records and pending widget
//! property changes.
//!
//! Every write that a template or a widget performs goes through a
//! [`Document`] method so that it can be observed with
//! [`Document::record_mutations`].

use std::collections::VecDeque;

use slotmap::SlotMap;
use tracing::{debug, trace};

use super::node::{ElementData, NodeData, NodeId, WindowId};
use super::tree::Dom;
use crate::event::handler::{Handler, Listener, ListenerHandle, ListenerId};
use crate::template::runtime::ChangeSet;
use crate::value::Value;
use crate::widget::state::{LifecycleTracker, WidgetState};

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// A window: the main window or the content window of a frame.
#[derive(Debug, Clone)]
pub struct Window {
    /// The window's `<body>` element; the top of its node tree.
    pub body: NodeId,
    /// The `<iframe>` element hosting this window, in the parent window.
    pub frame_element: Option<NodeId>,
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

/// A recorded DOM write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    ChildAppended { parent: NodeId, child: NodeId },
    ChildRemoved { parent: NodeId, child: NodeId },
    Attribute { node: NodeId, name: String },
    Property { node: NodeId, name: String },
    Class { node: NodeId },
    Text { node: NodeId },
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// Element arena plus the windows that own it.
#[derive(Debug)]
pub struct Document {
    tree: Dom,
    windows: SlotMap<WindowId, Window>,
    main: WindowId,
    recording: bool,
    mutations: Vec<Mutation>,
    dirty: VecDeque<NodeId>,
    next_listener: u64,
    /// Widget lifecycle transitions, drained by tests and hosts.
    pub lifecycle: LifecycleTracker,
}

impl Document {
    /// Create a document with a main window and an empty `<body>`.
    pub fn new() -> Self {
        let mut tree = Dom::new();
        let body = tree.insert(NodeData::Element(ElementData::new("body")));
        let mut windows = SlotMap::with_key();
        let main = windows.insert(Window {
            body,
            frame_element: None,
        });
        Self {
            tree,
            windows,
            main,
            recording: false,
            mutations: Vec::new(),
            dirty: VecDeque::new(),
            next_listener: 0,
            lifecycle: LifecycleTracker::new(),
        }
    }

    // ── Windows ──────────────────────────────────────────────────────

    /// The main window.
    pub fn main_window(&self) -> WindowId {
        self.main
    }

    /// The main window's `<body>`.
    pub fn body(&self) -> NodeId {
        self.windows[self.main].body
    }

    /// Create a frame's content window hosted by `frame_element`.
    pub fn create_window(&mut self, frame_element: Option<NodeId>) -> WindowId {
        let body = self
            .tree
            .insert(NodeData::Element(ElementData::new("body")));
        self.windows.insert(Window {
            body,
            frame_element,
        })
    }

    /// Look up a window.
    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id)
    }

    /// The window whose `<body>` is `node`, if any.
    pub fn window_of_body(&self, node: NodeId) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, w)| w.body == node)
            .map(|(id, _)| id)
    }

    /// The window hosted by the given `<iframe>` element, if any.
    pub fn window_for_frame(&self, frame_element: NodeId) -> Option<WindowId> {
        self.windows
            .iter()
            .find(|(_, w)| w.frame_element == Some(frame_element))
            .map(|(id, _)| id)
    }

    /// The `<iframe>` element hosting `window`.
    pub fn frame_element(&self, window: WindowId) -> Option<NodeId> {
        self.windows.get(window).and_then(|w| w.frame_element)
    }

    /// Whether `node` is inside some window's body.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.contains(node) && self.window_of_body(self.tree.top(node)).is_some()
    }

    // ── Structure ────────────────────────────────────────────────────

    /// The underlying arena, for structural reads.
    pub fn tree(&self) -> &Dom {
        &self.tree
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.insert(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a detached element in a namespace (SVG and friends).
    pub fn create_element_ns(&mut self, namespace: &str, tag: &str) -> NodeId {
        self.tree
            .insert(NodeData::Element(ElementData::new(tag).with_namespace(namespace)))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.insert(NodeData::Text(text.to_owned()))
    }

    /// Append `child` to `parent`.
    ///
    /// Returns `false` and records nothing when `child` is `parent` or one
    /// of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.tree.is_inclusive_ancestor(child, parent) {
            debug!(?parent, ?child, "append refused: would create a cycle");
            return false;
        }
        if let Some(old) = self.tree.parent(child) {
            self.record(Mutation::ChildRemoved { parent: old, child });
        }
        self.tree.append_child(parent, child);
        self.record(Mutation::ChildAppended { parent, child });
        true
    }

    /// Detach `node` from its parent.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.tree.parent(node) {
            self.tree.detach(node);
            self.record(Mutation::ChildRemoved { parent, child: node });
        }
    }

    /// Remove `node` and its subtree from the arena.
    pub fn remove(&mut self, node: NodeId) -> Option<NodeData> {
        self.detach(node);
        self.tree.remove(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.parent(node)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.tree.children(node)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.tree.contains(node)
    }

    /// Number of nodes in the document, across all windows.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Always `false`: a document owns at least the main body.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    // ── Node access ──────────────────────────────────────────────────

    pub fn node(&self, node: NodeId) -> Option<&NodeData> {
        self.tree.get(node)
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        self.tree.get(node).and_then(NodeData::as_element)
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        self.tree.get_mut(node).and_then(NodeData::as_element_mut)
    }

    /// The tag of an element node.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    // ── Text ─────────────────────────────────────────────────────────

    /// The text of a text node.
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.tree.get(node).and_then(NodeData::as_text)
    }

    /// Replace the text of a text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(NodeData::Text(current)) = self.tree.get_mut(node) {
            *current = text.to_owned();
            self.record(Mutation::Text { node });
        }
    }

    /// Concatenated text of `node` and its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        self.tree
            .walk_depth_first(node)
            .into_iter()
            .filter_map(|id| self.text(id))
            .collect()
    }

    // ── Attributes, properties, classes ──────────────────────────────

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|el| el.attribute(name))
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.set_attribute(name, value);
            self.record(Mutation::Attribute {
                node,
                name: name.to_owned(),
            });
        }
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let removed = self
            .element_mut(node)
            .is_some_and(|el| el.remove_attribute(name));
        if removed {
            self.record(Mutation::Attribute {
                node,
                name: name.to_owned(),
            });
        }
    }

    /// Set the inline style text (`style.cssText`).
    pub fn set_style(&mut self, node: NodeId, css: &str) {
        if css.is_empty() {
            self.remove_attribute(node, "style");
        } else {
            self.set_attribute(node, "style", css);
        }
    }

    /// Read a property, `Undefined` when unset or not an element.
    pub fn property(&self, node: NodeId, name: &str) -> Value {
        self.element(node)
            .map(|el| el.property(name))
            .unwrap_or_default()
    }

    /// Set a property.
    ///
    /// Values are compared with SameValue semantics (NaN equals NaN). An
    /// unchanged value is not stored, recorded or queued. On an upgraded
    /// widget, a changed value of a declared property is added to the
    /// widget's pending change set and the widget is queued for delivery.
    /// Returns `true` if the value changed.
    pub fn set_property(&mut self, node: NodeId, name: &str, value: Value) -> bool {
        let Some(el) = self.element_mut(node) else {
            return false;
        };
        if el.properties.get(name).is_some_and(|old| old.same_value(&value)) {
            return false;
        }
        el.properties.insert(name.to_owned(), value);

        let mut queue = false;
        if let Some(widget) = el.widget.as_mut() {
            if widget.definition.observes(name) {
                queue = widget.pending.is_empty();
                widget.pending.insert(name);
            }
        }
        if queue {
            trace!(property = name, "widget queued for delivery");
            self.dirty.push_back(node);
        }
        self.record(Mutation::Property {
            node,
            name: name.to_owned(),
        });
        true
    }

    /// Set a property without change notification or mutation record.
    ///
    /// Used for instance fields such as attach points.
    pub fn define_field(&mut self, node: NodeId, name: &str, value: Value) {
        if let Some(el) = self.element_mut(node) {
            el.properties.insert(name.to_owned(), value);
        }
    }

    /// Merge classes contributed under `token` into the node's class list.
    pub fn set_class_component(&mut self, node: NodeId, token: &str, classes: &str) {
        if let Some(el) = self.element_mut(node) {
            el.set_class_component(token, classes);
            self.record(Mutation::Class { node });
        }
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            el.add_class(class);
            self.record(Mutation::Class { node });
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(el) = self.element_mut(node) {
            el.remove_class(class);
            self.record(Mutation::Class { node });
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|el| el.has_class(class))
    }

    /// Declare `parent` as the logical parent of a popup rooted at `node`.
    pub fn set_popup_parent(&mut self, node: NodeId, parent: Option<NodeId>) {
        if let Some(el) = self.element_mut(node) {
            el.popup_parent = parent;
        }
    }

    pub fn popup_parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).and_then(|el| el.popup_parent)
    }

    // ── Widgets ──────────────────────────────────────────────────────

    /// Whether `node` is an upgraded widget.
    pub fn is_widget(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(ElementData::is_widget)
    }

    pub fn widget(&self, node: NodeId) -> Option<&WidgetState> {
        self.element(node).and_then(|el| el.widget.as_deref())
    }

    pub fn widget_mut(&mut self, node: NodeId) -> Option<&mut WidgetState> {
        self.element_mut(node).and_then(|el| el.widget.as_deref_mut())
    }

    /// Take the pending change set of a widget, leaving it empty.
    pub fn take_pending(&mut self, node: NodeId) -> ChangeSet {
        self.widget_mut(node)
            .map(|w| std::mem::take(&mut w.pending))
            .unwrap_or_default()
    }

    /// Pop the next widget with undelivered property changes.
    pub fn next_dirty(&mut self) -> Option<NodeId> {
        while let Some(node) = self.dirty.pop_front() {
            if self.widget(node).is_some_and(|w| !w.pending.is_empty()) {
                return Some(node);
            }
        }
        None
    }

    // ── Listeners ────────────────────────────────────────────────────

    /// Register a listener on `node`.
    pub fn add_listener(
        &mut self,
        node: NodeId,
        event_type: &str,
        capture: bool,
        handler: Handler,
    ) -> ListenerHandle {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        if let Some(el) = self.element_mut(node) {
            el.listeners.push(Listener {
                id,
                event_type: event_type.to_owned(),
                capture,
                handler,
            });
        }
        ListenerHandle { node, id }
    }

    /// Remove a listener. Returns `true` if it was registered.
    pub fn remove_listener(&mut self, handle: &ListenerHandle) -> bool {
        self.element_mut(handle.node).is_some_and(|el| {
            let before = el.listeners.len();
            el.listeners.retain(|l| l.id != handle.id);
            before != el.listeners.len()
        })
    }

    /// Snapshot of the listeners registered on `node`.
    pub fn listeners(&self, node: NodeId) -> Vec<Listener> {
        self.element(node)
            .map(|el| el.listeners.clone())
            .unwrap_or_default()
    }

    // ── Mutation records ─────────────────────────────────────────────

    /// Start or stop recording mutations.
    pub fn record_mutations(&mut self, enabled: bool) {
        self.recording = enabled;
    }

    /// Drain recorded mutations.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    fn record(&mut self, mutation: Mutation) {
        if self.recording {
            self.mutations.push(mutation);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
