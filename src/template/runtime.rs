//! Interpreter for compiled templates.
//!
//! [`Rendering::build`] runs the build instructions once against a
//! [`TemplateHost`]; [`Rendering::refresh`] runs the refresh instructions whose
//! guard intersects the changed property names, in document order.

use std::collections::BTreeSet;
use std::rc::Rc;

use super::ast::EventHandler;
use super::compiler::{Apply, BuildOp, CompiledTemplate, Slot};
use super::expr::Scope;
use super::props::{PropInfo, PropTarget};
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::value::Value;

// ---------------------------------------------------------------------------
// ChangeSet
// ---------------------------------------------------------------------------

/// Names of properties changed since the last delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet(BTreeSet<String>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str) {
        if !self.0.contains(name) {
            self.0.insert(name.to_owned());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Whether a refresh guard fires for this change set.
    ///
    /// An empty guard always fires.
    pub fn triggers(&self, guard: &[String]) -> bool {
        guard.is_empty() || guard.iter().any(|name| self.contains(name))
    }
}

impl<S: Into<String>> FromIterator<S> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ---------------------------------------------------------------------------
// TemplateHost
// ---------------------------------------------------------------------------

/// The capabilities a template needs from its environment.
///
/// The host is also the evaluation [`Scope`]: `this` is the widget instance.
pub trait TemplateHost: Scope {
    /// Create an element; custom tags come back upgraded.
    fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Result<NodeId>;
    fn create_text(&mut self, text: &str) -> NodeId;
    fn append_child(&mut self, parent: NodeId, child: NodeId);
    fn set_text(&mut self, node: NodeId, text: &str);
    /// Replace the template's contribution to the class list of `node`.
    fn set_class_component(&mut self, node: NodeId, classes: &str);
    fn set_property(&mut self, node: NodeId, property: &PropInfo, value: Value);
    fn set_style(&mut self, node: NodeId, css: &str);
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&mut self, node: NodeId, name: &str);
    /// Connect `handler`, bound to the widget instance, to events on `node`.
    fn listen(&mut self, node: NodeId, event: &str, handler: &EventHandler);
    /// Deliver pending property changes of a nested widget.
    fn deliver(&mut self, node: NodeId) -> Result<()>;
    /// Expose `node` as the instance field `name`.
    fn bind_attach_point(&mut self, name: &str, node: NodeId);
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// A built template: the compiled instructions plus the nodes they created.
#[derive(Debug, Clone)]
pub struct Rendering {
    template: Rc<CompiledTemplate>,
    nodes: Vec<NodeId>,
}

impl Rendering {
    /// Run the build instructions.
    ///
    /// When `root` is given it stands for the template root instead of a
    /// freshly created element.
    pub fn build<H: TemplateHost + ?Sized>(
        template: &Rc<CompiledTemplate>,
        host: &mut H,
        root: Option<NodeId>,
    ) -> Result<Self> {
        let mut rendering = Rendering {
            template: Rc::clone(template),
            nodes: Vec::with_capacity(template.slot_count),
        };
        for op in &template.build {
            match op {
                BuildOp::CreateElement {
                    slot,
                    tag,
                    namespace,
                } => {
                    let node = match root {
                        Some(root) if *slot == 0 => root,
                        _ => host.create_element(tag, namespace.as_deref())?,
                    };
                    rendering.nodes.push(node);
                }
                BuildOp::CreateText { text, .. } => {
                    let node = host.create_text(text);
                    rendering.nodes.push(node);
                }
                BuildOp::AttachPoints { slot, names } => {
                    let node = rendering.nodes[*slot];
                    for name in names {
                        host.bind_attach_point(name, node);
                    }
                }
                BuildOp::Apply(action) => rendering.apply(action, host)?,
                BuildOp::Listen {
                    slot,
                    event,
                    handler,
                } => host.listen(rendering.nodes[*slot], event, handler),
                BuildOp::Append { parent, child } => {
                    host.append_child(rendering.nodes[*parent], rendering.nodes[*child]);
                }
            }
        }
        Ok(rendering)
    }

    /// Run every refresh instruction triggered by `changed`.
    pub fn refresh<H: TemplateHost + ?Sized>(&self, host: &mut H, changed: &ChangeSet) -> Result<()> {
        for op in &self.template.refresh {
            if changed.triggers(&op.guard) {
                self.apply(&op.action, host)?;
            }
        }
        Ok(())
    }

    /// The template root node.
    pub fn root(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// The node created for `slot`.
    pub fn node(&self, slot: Slot) -> Option<NodeId> {
        self.nodes.get(slot).copied()
    }

    /// Every node created or reused by the build, in slot order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn template(&self) -> &Rc<CompiledTemplate> {
        &self.template
    }

    fn apply<H: TemplateHost + ?Sized>(&self, action: &Apply, host: &mut H) -> Result<()> {
        match action {
            Apply::SetText { slot, text } => {
                let value = text.evaluate(&*host).to_string();
                host.set_text(self.nodes[*slot], &value);
            }
            Apply::SetClass { slot, value } => {
                let classes = value.evaluate(&*host).to_string();
                host.set_class_component(self.nodes[*slot], &classes);
            }
            Apply::SetProperty {
                slot,
                property,
                value,
            } => {
                let value = value.evaluate(&*host);
                let node = self.nodes[*slot];
                match property.target {
                    PropTarget::Style => host.set_style(node, &css_text(&value)),
                    PropTarget::Property => host.set_property(node, property, value),
                }
            }
            Apply::SetAttribute { slot, name, value } => {
                let value = value.evaluate(&*host).to_string();
                host.set_attribute(self.nodes[*slot], name, &value);
            }
            Apply::SetOrRemoveAttribute { slot, name, value } => {
                let value = value.evaluate(&*host);
                let node = self.nodes[*slot];
                if value.is_nullish() || value.as_str() == Some("") {
                    host.remove_attribute(node, name);
                } else {
                    host.set_attribute(node, name, &value.to_string());
                }
            }
            Apply::Deliver { slot } => host.deliver(self.nodes[*slot])?,
        }
        Ok(())
    }
}

fn css_text(value: &Value) -> String {
    if value.is_nullish() {
        String::new()
    } else {
        value.to_string()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::dom::document::{Document, Mutation};
    use crate::template::props::AttributeMap;

    /// Minimal host over a bare document: `this` is a plain element whose
    /// properties act as the instance state.
    struct DocHost {
        doc: Document,
        this: NodeId,
        listened: Vec<(NodeId, String)>,
        delivered: Vec<NodeId>,
    }

    impl DocHost {
        fn new(props: &[(&str, Value)]) -> Self {
            let mut doc = Document::new();
            let this = doc.create_element("d-test");
            for (name, value) in props {
                doc.set_property(this, name, value.clone());
            }
            Self {
                doc,
                this,
                listened: Vec::new(),
                delivered: Vec::new(),
            }
        }
    }

    impl Scope for DocHost {
        fn this_value(&self) -> Value {
            Value::Node(self.this)
        }

        fn node_property(&self, node: NodeId, name: &str) -> Value {
            self.doc.property(node, name)
        }
    }

    impl TemplateHost for DocHost {
        fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Result<NodeId> {
            Ok(match namespace {
                Some(ns) => self.doc.create_element_ns(ns, tag),
                None => self.doc.create_element(tag),
            })
        }

        fn create_text(&mut self, text: &str) -> NodeId {
            self.doc.create_text(text)
        }

        fn append_child(&mut self, parent: NodeId, child: NodeId) {
            self.doc.append_child(parent, child);
        }

        fn set_text(&mut self, node: NodeId, text: &str) {
            self.doc.set_text(node, text);
        }

        fn set_class_component(&mut self, node: NodeId, classes: &str) {
            self.doc.set_class_component(node, "template", classes);
        }

        fn set_property(&mut self, node: NodeId, property: &PropInfo, value: Value) {
            self.doc.set_property(node, &property.name, value);
        }

        fn set_style(&mut self, node: NodeId, css: &str) {
            self.doc.set_style(node, css);
        }

        fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
            self.doc.set_attribute(node, name, value);
        }

        fn remove_attribute(&mut self, node: NodeId, name: &str) {
            self.doc.remove_attribute(node, name);
        }

        fn listen(&mut self, node: NodeId, event: &str, _handler: &EventHandler) {
            self.listened.push((node, event.to_owned()));
        }

        fn deliver(&mut self, node: NodeId) -> Result<()> {
            self.delivered.push(node);
            Ok(())
        }

        fn bind_attach_point(&mut self, name: &str, node: NodeId) {
            self.doc.define_field(self.this, name, Value::Node(node));
        }
    }

    fn compiled(text: &str) -> Rc<CompiledTemplate> {
        Rc::new(CompiledTemplate::from_markup(text, &AttributeMap::new()).unwrap())
    }

    fn build_and_init(tpl: &Rc<CompiledTemplate>, host: &mut DocHost) -> Rendering {
        let this = host.this;
        let rendering = Rendering::build(tpl, host, Some(this)).unwrap();
        let all: ChangeSet = tpl.dependencies.iter().cloned().collect();
        rendering.refresh(host, &all).unwrap();
        rendering
    }

    // ── ChangeSet ────────────────────────────────────────────────────

    #[test]
    fn change_set_triggers() {
        let changed: ChangeSet = ["label"].into_iter().collect();
        assert!(changed.triggers(&["label".to_owned()]));
        assert!(!changed.triggers(&["iconClass".to_owned()]));
        assert!(changed.triggers(&[]));
        assert_eq!(changed.len(), 1);
    }

    // ── Build and refresh ────────────────────────────────────────────

    #[test]
    fn build_then_refresh_updates_text_only() {
        let tpl = compiled(r#"<button class="d-reset {{iconClass}}">{{label}}</button>"#);
        let mut host = DocHost::new(&[
            ("iconClass", Value::from("x")),
            ("label", Value::from("Go")),
        ]);
        let rendering = build_and_init(&tpl, &mut host);
        let root = rendering.root().unwrap();
        assert_eq!(host.doc.text_content(root), "Go");
        assert_eq!(host.doc.element(root).unwrap().classes, vec!["d-reset", "x"]);

        host.doc.set_property(host.this, "label", Value::from("Stop"));
        host.doc.record_mutations(true);
        rendering
            .refresh(&mut host, &["label"].into_iter().collect())
            .unwrap();
        let text = rendering.node(1).unwrap();
        assert_eq!(host.doc.take_mutations(), vec![Mutation::Text { node: text }]);
        assert_eq!(host.doc.text_content(root), "Stop");
        assert_eq!(host.doc.element(root).unwrap().classes, vec!["d-reset", "x"]);
    }

    #[test]
    fn unrelated_change_touches_nothing() {
        let tpl = compiled(r#"<div title="{{a}}"><span>{{b}}</span></div>"#);
        let mut host = DocHost::new(&[("a", Value::from("1")), ("b", Value::from("2"))]);
        let rendering = build_and_init(&tpl, &mut host);

        host.doc.record_mutations(true);
        rendering
            .refresh(&mut host, &["unrelated"].into_iter().collect())
            .unwrap();
        assert!(host.doc.take_mutations().is_empty());
    }

    #[test]
    fn root_can_be_created_fresh() {
        let tpl = compiled("<section><p>static</p></section>");
        let mut host = DocHost::new(&[]);
        let rendering = Rendering::build(&tpl, &mut host, None).unwrap();
        let root = rendering.root().unwrap();
        assert_ne!(root, host.this);
        assert_eq!(host.doc.tag(root), Some("section"));
        assert_eq!(host.doc.text_content(root), "static");
        assert_eq!(rendering.nodes().len(), 3);
    }

    #[test]
    fn set_or_remove_attribute() {
        let tpl = compiled(r#"<div aria-label="{{label}}"></div>"#);
        let mut host = DocHost::new(&[("label", Value::from("Close"))]);
        let rendering = build_and_init(&tpl, &mut host);
        let root = rendering.root().unwrap();
        assert_eq!(host.doc.attribute(root, "aria-label"), Some("Close"));

        host.doc.set_property(host.this, "label", Value::Null);
        rendering
            .refresh(&mut host, &["label"].into_iter().collect())
            .unwrap();
        assert_eq!(host.doc.attribute(root, "aria-label"), None);
    }

    #[test]
    fn style_and_typed_properties() {
        let tpl = compiled(r#"<div><input style="{{css}}" disabled="{{this.locked}}" maxlength="5"></div>"#);
        let mut host = DocHost::new(&[
            ("css", Value::from("color: red")),
            ("locked", Value::from(true)),
        ]);
        let rendering = build_and_init(&tpl, &mut host);
        let input = rendering.node(1).unwrap();
        assert_eq!(host.doc.attribute(input, "style"), Some("color: red"));
        assert_eq!(host.doc.property(input, "disabled"), Value::from(true));
        assert_eq!(host.doc.property(input, "maxLength"), Value::from(5));
    }

    #[test]
    fn attach_points_listeners_and_deliver() {
        let tpl = compiled(
            r#"<div><d-icon attach-point="iconNode" on-click="onIcon" icon="{{icon}}"></d-icon></div>"#,
        );
        let mut host = DocHost::new(&[("icon", Value::from("star"))]);
        let rendering = build_and_init(&tpl, &mut host);
        let icon = rendering.node(1).unwrap();

        assert_eq!(host.doc.property(host.this, "iconNode"), Value::Node(icon));
        assert_eq!(host.listened, vec![(icon, "click".to_owned())]);
        // Once at build, once in the initial refresh.
        assert_eq!(host.delivered, vec![icon, icon]);
    }
}
