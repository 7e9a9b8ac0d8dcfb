//! Flat composition of capabilities into a widget definition.

use std::collections::HashMap;
use std::fmt;

use super::capability::{Capability, ElementBase, Hook, Method, PropertySpec, RefreshHook};
use crate::register::RegisterError;
use crate::template::props::is_native_tag;
use crate::value::ValueKind;

/// Everything the registry knows about a widget tag.
///
/// Later capabilities override earlier methods, templates and property
/// defaults; hooks of every capability run in declaration order.
pub struct Definition {
    pub tag: String,
    pub base: ElementBase,
    properties: Vec<PropertySpec>,
    /// Lower-case attribute name to property name.
    case_map: HashMap<String, String>,
    methods: HashMap<String, Method>,
    template: Option<String>,
    pub(crate) created: Vec<Hook>,
    pub(crate) attached: Vec<Hook>,
    pub(crate) startup: Vec<Hook>,
    pub(crate) destroyed: Vec<Hook>,
    pub(crate) refresh: Vec<RefreshHook>,
}

impl Definition {
    /// Compose `bases` followed by `own` into a definition for `tag`.
    ///
    /// The first base must name the element the widget is built on.
    pub fn compose(tag: &str, bases: &[Capability], own: &Capability) -> Result<Self, RegisterError> {
        let invalid = |reason: String| RegisterError::InvalidBaseCapability {
            tag: tag.to_owned(),
            reason,
        };
        let first = bases
            .first()
            .ok_or_else(|| invalid("no base capabilities given".into()))?;
        let base = first
            .base
            .clone()
            .ok_or_else(|| invalid(format!("`{}` is not an element base", first.name)))?;
        if let ElementBase::Native(native) = &base {
            if !is_native_tag(native) {
                return Err(invalid(format!("`{native}` is not a native element")));
            }
        }

        let mut def = Definition {
            tag: tag.to_owned(),
            base,
            properties: Vec::new(),
            case_map: HashMap::new(),
            methods: HashMap::new(),
            template: None,
            created: Vec::new(),
            attached: Vec::new(),
            startup: Vec::new(),
            destroyed: Vec::new(),
            refresh: Vec::new(),
        };
        for cap in bases.iter().chain(std::iter::once(own)) {
            def.merge(cap)?;
        }
        Ok(def)
    }

    fn merge(&mut self, cap: &Capability) -> Result<(), RegisterError> {
        for spec in &cap.properties {
            match self.properties.iter_mut().find(|p| p.name == spec.name) {
                Some(existing) => {
                    if !untyped(existing.kind) && !untyped(spec.kind) && existing.kind != spec.kind {
                        return Err(RegisterError::ConflictingProperty {
                            tag: self.tag.clone(),
                            property: spec.name.clone(),
                        });
                    }
                    if !untyped(spec.kind) {
                        existing.kind = spec.kind;
                    }
                    existing.default = spec.default.clone();
                }
                None => {
                    self.case_map
                        .insert(spec.name.to_lowercase(), spec.name.clone());
                    self.properties.push(spec.clone());
                }
            }
        }
        for (name, method) in &cap.methods {
            self.methods.insert(name.clone(), method.clone());
        }
        if cap.template.is_some() {
            self.template.clone_from(&cap.template);
        }
        self.created.extend(cap.created.iter().cloned());
        self.attached.extend(cap.attached.iter().cloned());
        self.startup.extend(cap.startup.iter().cloned());
        self.destroyed.extend(cap.destroyed.iter().cloned());
        self.refresh.extend(cap.refresh.iter().cloned());
        Ok(())
    }

    /// Whether writes to `name` are tracked for delivery.
    pub fn observes(&self, name: &str) -> bool {
        self.property(name).is_some()
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn properties(&self) -> &[PropertySpec] {
        &self.properties
    }

    /// The property an attribute maps to, matched case-insensitively.
    pub fn property_for_attribute(&self, attribute: &str) -> Option<&PropertySpec> {
        self.case_map
            .get(&attribute.to_lowercase())
            .and_then(|name| self.property(name))
    }

    /// Declared properties with their kinds, for attribute resolution.
    pub fn declared(&self) -> Vec<(String, ValueKind)> {
        self.properties
            .iter()
            .map(|p| (p.name.clone(), p.kind))
            .collect()
    }

    pub fn method(&self, name: &str) -> Option<Method> {
        self.methods.get(name).cloned()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// The native tag the widget extends, if any.
    pub fn extends(&self) -> Option<&str> {
        match &self.base {
            ElementBase::Native(tag) => Some(tag),
            ElementBase::Html => None,
        }
    }

    /// The tag of the element created for a new instance.
    pub fn element_tag(&self) -> &str {
        self.extends().unwrap_or(&self.tag)
    }

    /// This definition as a single capability, so a registered widget can
    /// be the first base of another registration.
    pub fn to_capability(&self) -> Capability {
        Capability {
            name: self.tag.clone(),
            base: Some(self.base.clone()),
            properties: self.properties.clone(),
            methods: self
                .methods
                .iter()
                .map(|(name, m)| (name.clone(), m.clone()))
                .collect(),
            template: self.template.clone(),
            created: self.created.clone(),
            attached: self.attached.clone(),
            startup: self.startup.clone(),
            destroyed: self.destroyed.clone(),
            refresh: self.refresh.clone(),
        }
    }
}

fn untyped(kind: ValueKind) -> bool {
    matches!(kind, ValueKind::Undefined | ValueKind::Null)
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("Definition")
            .field("tag", &self.tag)
            .field("base", &self.base)
            .field("properties", &self.properties)
            .field("methods", &methods)
            .field("template", &self.template.is_some())
            .finish_non_exhaustive()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::value::Value;

    fn widget_base() -> Capability {
        Capability::new("Widget")
            .property("dir", "")
            .property("tabIndex", 0)
            .on_created(|_, _| Ok(()))
    }

    #[test]
    fn later_capabilities_override_defaults() {
        let own = Capability::new("Button")
            .property("label", "")
            .property("tabIndex", 1);
        let def =
            Definition::compose("d-button", &[Capability::html_element(), widget_base()], &own).unwrap();

        let names: Vec<_> = def.properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["dir", "tabIndex", "label"]);
        assert_eq!(def.property("tabIndex").unwrap().default, Value::from(1));
        assert_eq!(def.created.len(), 1);
        assert!(def.observes("label"));
        assert!(!def.observes("title"));
    }

    #[test]
    fn attribute_lookup_ignores_case() {
        let own = Capability::new("Rating").property("maxValue", 5);
        let def = Definition::compose("d-rating", &[Capability::html_element()], &own).unwrap();
        assert_eq!(def.property_for_attribute("maxvalue").unwrap().name, "maxValue");
        assert!(def.property_for_attribute("max").is_none());
    }

    #[test]
    fn first_base_must_be_an_element() {
        let err = Definition::compose("d-x", &[widget_base()], &Capability::new("X")).unwrap_err();
        assert!(matches!(err, RegisterError::InvalidBaseCapability { .. }));

        let err = Definition::compose("d-x", &[], &Capability::new("X")).unwrap_err();
        assert!(matches!(err, RegisterError::InvalidBaseCapability { .. }));

        let err = Definition::compose("d-x", &[Capability::native_element("blink")], &Capability::new("X"))
            .unwrap_err();
        assert!(matches!(err, RegisterError::InvalidBaseCapability { .. }));
    }

    #[test]
    fn conflicting_kinds_are_rejected() {
        let a = Capability::new("A").property("value", "");
        let b = Capability::new("B").property("value", 0);
        let err = Definition::compose("d-x", &[Capability::html_element(), a], &b).unwrap_err();
        assert_eq!(
            err,
            RegisterError::ConflictingProperty {
                tag: "d-x".into(),
                property: "value".into()
            }
        );
    }

    #[test]
    fn null_defaults_adopt_a_later_kind() {
        let a = Capability::new("A").property("store", Value::Null);
        let b = Capability::new("B").property("store", Value::Object(Default::default()));
        let def = Definition::compose("d-x", &[Capability::html_element(), a], &b).unwrap();
        assert_eq!(def.property("store").unwrap().kind, ValueKind::Object);
    }

    #[test]
    fn registered_widgets_can_be_extended() {
        let button = Definition::compose(
            "d-button",
            &[Capability::native_element("button")],
            &Capability::new("Button").property("label", "").template("<button>{{label}}</button>"),
        )
        .unwrap();
        let toggle = Definition::compose(
            "d-toggle",
            &[button.to_capability()],
            &Capability::new("Toggle").property("checked", false),
        )
        .unwrap();
        assert_eq!(toggle.extends(), Some("button"));
        assert!(toggle.observes("label"));
        assert!(toggle.observes("checked"));
        assert_eq!(toggle.template(), Some("<button>{{label}}</button>"));
    }

    #[test]
    fn native_base_sets_element_tag() {
        let def = Definition::compose(
            "d-fancy-button",
            &[Capability::native_element("button")],
            &Capability::new("Fancy").method("go", |_, _, _| Ok(())),
        )
        .unwrap();
        assert_eq!(def.extends(), Some("button"));
        assert_eq!(def.element_tag(), "button");
        assert!(def.has_method("go"));
    }
}
