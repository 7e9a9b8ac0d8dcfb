//! Harness: a headless document, registry and activation tracker driven
//! together.

use crate::activation::ActivationTracker;
use crate::config::Config;
use crate::context::Context;
use crate::dom::document::{Document, Mutation};
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::register::{Factory, RegisterError, Registry};
use crate::template::markup::{parse_markup, MarkupElement, MarkupNode};
use crate::template::TemplateError;
use crate::value::Value;
use crate::widget::capability::Capability;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Owns everything a widget needs and simulates user interaction.
///
/// ```ignore
/// use delite::testing::Harness;
/// use delite::widget::Capability;
///
/// let mut h = Harness::new();
/// h.register("d-label", &[Capability::html_element()],
///     Capability::new("Label").property("text", "").template("<d-label>{{text}}</d-label>"))?;
/// let label = h.mount(r#"<d-label text="hi"></d-label>"#)?;
/// assert_eq!(h.html(label), "<d-label>hi</d-label>");
/// ```
#[derive(Debug)]
pub struct Harness {
    pub doc: Document,
    pub registry: Registry,
    pub tracker: ActivationTracker,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let doc = Document::new();
        let tracker = ActivationTracker::for_document(&doc, &config);
        Self {
            doc,
            registry: Registry::new(config),
            tracker,
        }
    }

    pub fn register(&self, tag: &str, bases: &[Capability], own: Capability) -> Result<Factory, RegisterError> {
        self.registry.register(tag, bases, own)
    }

    /// A context over the harness document.
    pub fn ctx(&mut self) -> Context<'_> {
        Context::new(&mut self.doc, &self.registry)
    }

    pub fn body(&self) -> NodeId {
        self.doc.body()
    }

    // ── Building ─────────────────────────────────────────────────────

    /// Read `markup`, append it to the body and parse the body, upgrading
    /// and starting every registered element. Returns the new root.
    pub fn mount(&mut self, markup: &str) -> Result<NodeId> {
        let tree = parse_markup(markup).map_err(TemplateError::from)?;
        let root = self.build(&tree, None);
        let body = self.body();
        self.doc.append_child(body, root);
        self.ctx().parse_document()?;
        self.ctx().flush()?;
        Ok(root)
    }

    /// Create an element (upgraded if registered) and insert it in the body.
    pub fn create(&mut self, tag: &str) -> Result<NodeId> {
        let body = self.body();
        let mut ctx = self.ctx();
        let node = ctx.create_element(tag)?;
        ctx.insert(body, node)?;
        Ok(node)
    }

    fn build(&mut self, element: &MarkupElement, namespace: Option<&str>) -> NodeId {
        let namespace = namespace.or((element.name == "svg").then_some(SVG_NAMESPACE));
        let node = match namespace {
            Some(ns) => self.doc.create_element_ns(ns, &element.name),
            None => self.doc.create_element(&element.name),
        };
        for (name, value) in &element.attributes {
            if name == "class" {
                self.doc.set_class_component(node, "markup", value);
            } else {
                self.doc.set_attribute(node, name, value);
            }
        }
        for child in &element.children {
            let child = match child {
                MarkupNode::Element(el) => self.build(el, namespace),
                MarkupNode::Text(text) => self.doc.create_text(text),
            };
            self.doc.append_child(node, child);
        }
        node
    }

    // ── Interaction ──────────────────────────────────────────────────

    /// Pointer-down on `node`, then a `click` event.
    pub fn click(&mut self, node: NodeId) -> bool {
        let mut ctx = Context::new(&mut self.doc, &self.registry);
        self.tracker.pointer_down(&mut ctx, node);
        ctx.emit(node, "click", Value::Undefined)
    }

    /// Focus `node`, with the `focus` event delivered to capture listeners.
    pub fn focus(&mut self, node: NodeId) {
        let mut ctx = Context::new(&mut self.doc, &self.registry);
        self.tracker.focus(&mut ctx, node);
        ctx.emit(node, "focus", Value::Undefined);
    }

    pub fn blur(&mut self, node: NodeId) {
        let mut ctx = Context::new(&mut self.doc, &self.registry);
        ctx.emit(node, "blur", Value::Undefined);
        self.tracker.blur(&mut ctx, node);
    }

    /// Write a property; delivered on the next [`tick`](Self::tick).
    pub fn set(&mut self, node: NodeId, name: &str, value: impl Into<Value>) -> bool {
        self.ctx().set(node, name, value)
    }

    pub fn get(&self, node: NodeId, name: &str) -> Value {
        self.doc.property(node, name)
    }

    /// Deliver pending property changes and run a due deferred clear.
    /// Returns the number of widgets refreshed.
    pub fn tick(&mut self) -> Result<usize> {
        let mut ctx = Context::new(&mut self.doc, &self.registry);
        let delivered = ctx.flush()?;
        self.tracker.run_deferred(&mut ctx);
        Ok(delivered)
    }

    /// Wait for the deferred clear, if any, then tick.
    pub async fn settle(&mut self) -> Result<usize> {
        let mut ctx = Context::new(&mut self.doc, &self.registry);
        self.tracker.settle(&mut ctx).await;
        self.tick()
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn html(&self, node: NodeId) -> String {
        super::serialize::outer_html(&self.doc, node)
    }

    /// Start recording DOM writes, dropping anything recorded before.
    pub fn record(&mut self) {
        self.doc.record_mutations(true);
        self.doc.take_mutations();
    }

    /// Stop recording and return the recorded writes.
    pub fn mutations(&mut self) -> Vec<Mutation> {
        let recorded = self.doc.take_mutations();
        self.doc.record_mutations(false);
        recorded
    }
}

// ===========================================================================
// Tests
// ===========================================================================
