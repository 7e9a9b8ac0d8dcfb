//! Tag → definition table, attribute maps and the compiled template cache.
//!
//! The registry is shared by reference through [`Context`](crate::Context),
//! so registration and the caches use `RefCell`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{info, trace};

use super::factory::Factory;
use super::RegisterError;
use crate::config::Config;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::template::compiler::CompiledTemplate;
use crate::template::props::{AttributeMap, PropInfo, PropertyLookup};
use crate::template::TemplateError;
use crate::widget::capability::{Capability, ElementBase};
use crate::widget::definition::Definition;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Registered custom elements.
#[derive(Debug)]
pub struct Registry {
    config: Config,
    entries: RefCell<HashMap<String, Rc<Definition>>>,
    /// Tags in registration order.
    order: RefCell<Vec<String>>,
    attributes: AttributeMap,
    templates: RefCell<HashMap<String, Rc<CompiledTemplate>>>,
}

impl Registry {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            entries: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
            attributes: AttributeMap::new(),
            templates: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register `tag`, composed from `bases` and then `own`.
    ///
    /// The first base must be an element base (see
    /// [`Capability::html_element`]) or a registered widget's
    /// [`Definition::to_capability`].
    pub fn register(&self, tag: &str, bases: &[Capability], own: Capability) -> Result<Factory, RegisterError> {
        let tag = tag.to_lowercase();
        if self.is_registered(&tag) {
            return Err(RegisterError::DuplicateRegistration { tag });
        }
        let definition = Rc::new(Definition::compose(&tag, bases, &own)?);
        info!(
            tag = %tag,
            properties = definition.properties().len(),
            extends = definition.extends().unwrap_or("-"),
            "registered custom element"
        );
        // A table cached while the tag was unknown lacks the declared properties.
        self.attributes.invalidate(&tag);
        self.entries
            .borrow_mut()
            .insert(tag.clone(), Rc::clone(&definition));
        self.order.borrow_mut().push(tag);
        Ok(Factory::new(definition))
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.entries.borrow().contains_key(tag)
    }

    pub fn definition(&self, tag: &str) -> Option<Rc<Definition>> {
        self.entries.borrow().get(tag).cloned()
    }

    /// A factory for a registered tag.
    pub fn factory(&self, tag: &str) -> Option<Factory> {
        self.definition(tag).map(Factory::new)
    }

    /// Registered tags in registration order.
    pub fn tags(&self) -> Vec<String> {
        self.order.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.order.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.borrow().is_empty()
    }

    /// The definition an upgrade of `node` would install: its `is`
    /// attribute if registered, else its tag.
    pub fn definition_for(&self, doc: &Document, node: NodeId) -> Option<Rc<Definition>> {
        let el = doc.element(node)?;
        el.attribute("is")
            .and_then(|is| self.definition(&is.to_lowercase()))
            .or_else(|| self.definition(&el.tag))
    }

    /// Whether `node` is a parse target: `<tag>` for widgets on a plain
    /// element, `<base is="tag">` for widgets extending a native element.
    pub fn matches(&self, doc: &Document, node: NodeId) -> Option<Rc<Definition>> {
        let el = doc.element(node)?;
        let entries = self.entries.borrow();
        if let Some(def) = el.attribute("is").and_then(|is| entries.get(&is.to_lowercase())) {
            if def.extends() == Some(el.tag.as_str()) {
                return Some(Rc::clone(def));
            }
        }
        entries
            .get(&el.tag)
            .filter(|def| def.base == ElementBase::Html)
            .cloned()
    }

    // ── Templates ────────────────────────────────────────────────────

    /// Compile template text, sharing the result with every widget that
    /// uses the same text.
    pub fn compile(&self, text: &str) -> Result<Rc<CompiledTemplate>, TemplateError> {
        if let Some(hit) = self.templates.borrow().get(text) {
            trace!(len = text.len(), "template cache hit");
            return Ok(Rc::clone(hit));
        }
        trace!(len = text.len(), "template cache miss");
        let compiled = Rc::new(CompiledTemplate::from_markup(text, self)?);
        self.templates
            .borrow_mut()
            .insert(text.to_owned(), Rc::clone(&compiled));
        Ok(compiled)
    }

    /// The compiled template of a definition, if it has one.
    pub fn template(&self, definition: &Definition) -> Result<Option<Rc<CompiledTemplate>>, TemplateError> {
        definition.template().map(|text| self.compile(text)).transpose()
    }

    /// Number of cached compiled templates.
    pub fn cached_templates(&self) -> usize {
        self.templates.borrow().len()
    }
}

/// Native tags use the built-in tables; registered tags add their declared
/// properties on top of their base element.
impl PropertyLookup for Registry {
    fn property_for(&self, tag: &str, attribute: &str) -> Option<PropInfo> {
        let map = match self.definition(tag) {
            Some(def) => self
                .attributes
                .for_tag(tag, def.element_tag(), || def.declared()),
            None => self.attributes.for_tag(tag, tag, Vec::new),
        };
        AttributeMap::resolve(&map, attribute)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::template::props::PropTarget;
    use crate::value::ValueKind;

    fn button() -> Capability {
        Capability::new("Button")
            .property("label", "")
            .property("iconClass", "")
            .template(r#"<button class="d-reset {{iconClass}}">{{label}}</button>"#)
    }

    #[test]
    fn register_and_look_up() {
        let registry = Registry::new(Config::default());
        let factory = registry
            .register("D-Button", &[Capability::html_element()], button())
            .unwrap();
        assert_eq!(factory.tag(), "d-button");
        assert!(registry.is_registered("d-button"));
        assert_eq!(registry.tags(), vec!["d-button"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_keeps_first() {
        let registry = Registry::new(Config::default());
        registry
            .register("d-button", &[Capability::html_element()], button())
            .unwrap();
        let err = registry
            .register(
                "d-button",
                &[Capability::html_element()],
                Capability::new("Other").property("other", 1),
            )
            .unwrap_err();
        assert_eq!(
            err,
            RegisterError::DuplicateRegistration {
                tag: "d-button".into()
            }
        );
        let def = registry.definition("d-button").unwrap();
        assert!(def.observes("label"));
        assert!(!def.observes("other"));
    }

    #[test]
    fn invalid_base_is_rejected() {
        let registry = Registry::new(Config::default());
        let err = registry
            .register("d-x", &[Capability::new("Mixin")], Capability::new("X"))
            .unwrap_err();
        assert!(matches!(err, RegisterError::InvalidBaseCapability { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn templates_are_cached_by_text() {
        let registry = Registry::new(Config::default());
        registry
            .register("d-a", &[Capability::html_element()], button())
            .unwrap();
        registry
            .register("d-b", &[Capability::html_element()], button())
            .unwrap();
        let a = registry.template(&registry.definition("d-a").unwrap()).unwrap().unwrap();
        let b = registry.template(&registry.definition("d-b").unwrap()).unwrap().unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(registry.cached_templates(), 1);
    }

    #[test]
    fn declared_properties_resolve_for_custom_tags() {
        let registry = Registry::new(Config::default());
        // Cached before registration: no declared properties yet.
        assert_eq!(registry.property_for("d-rating", "max"), None);
        registry
            .register(
                "d-rating",
                &[Capability::html_element()],
                Capability::new("Rating").property("max", 5),
            )
            .unwrap();
        let info = registry.property_for("d-rating", "MAX").unwrap();
        assert_eq!(info.name, "max");
        assert_eq!(info.kind, ValueKind::Number);
        assert_eq!(registry.property_for("d-rating", "style").unwrap().target, PropTarget::Style);
        assert_eq!(registry.property_for("d-rating", "title").unwrap().kind, ValueKind::String);
    }

    #[test]
    fn parse_targets() {
        let registry = Registry::new(Config::default());
        registry
            .register("d-plain", &[Capability::html_element()], Capability::new("P"))
            .unwrap();
        registry
            .register("d-fancy", &[Capability::native_element("button")], Capability::new("F"))
            .unwrap();
        let mut doc = Document::new();
        let plain = doc.create_element("d-plain");
        let fancy = doc.create_element("button");
        doc.set_attribute(fancy, "is", "d-fancy");
        let wrong_base = doc.create_element("div");
        doc.set_attribute(wrong_base, "is", "d-fancy");
        let bare = doc.create_element("d-fancy");

        assert_eq!(registry.matches(&doc, plain).unwrap().tag, "d-plain");
        assert_eq!(registry.matches(&doc, fancy).unwrap().tag, "d-fancy");
        assert!(registry.matches(&doc, wrong_base).is_none());
        assert!(registry.matches(&doc, bare).is_none());
        // Upgrading goes by `is` alone.
        assert_eq!(registry.definition_for(&doc, wrong_base).unwrap().tag, "d-fancy");
        assert_eq!(registry.len(), 2);
    }
}
