//! Capabilities: the building blocks composed into a widget definition.
//!
//! A capability bundles declared properties, methods, a template and
//! lifecycle hooks. Registration composes an ordered list of capabilities
//! into one flat [`Definition`](super::definition::Definition).

use std::fmt;
use std::rc::Rc;

use crate::context::Context;
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::event::message::Event;
use crate::template::runtime::ChangeSet;
use crate::value::{Value, ValueKind};

/// Lifecycle hook, called with the widget node.
pub type Hook = Rc<dyn Fn(&mut Context<'_>, NodeId) -> Result<()>>;

/// Called after the template refresh with the delivered change set.
pub type RefreshHook = Rc<dyn Fn(&mut Context<'_>, NodeId, &ChangeSet) -> Result<()>>;

/// A widget method, callable from template handlers and `Context::invoke`.
pub type Method = Rc<dyn Fn(&mut Context<'_>, NodeId, &mut Event) -> Result<()>>;

/// The element a widget is built on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementBase {
    /// A plain element; the widget is created with its own tag.
    Html,
    /// A native element such as `button`; the widget is created as that tag
    /// with `is="<widget tag>"`.
    Native(String),
}

/// A declared widget property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub name: String,
    pub kind: ValueKind,
    pub default: Value,
}

/// One building block of a widget definition.
#[derive(Clone, Default)]
pub struct Capability {
    pub name: String,
    /// Only meaningful on the first capability of a registration.
    pub base: Option<ElementBase>,
    pub properties: Vec<PropertySpec>,
    pub methods: Vec<(String, Method)>,
    pub template: Option<String>,
    pub created: Vec<Hook>,
    pub attached: Vec<Hook>,
    pub startup: Vec<Hook>,
    pub destroyed: Vec<Hook>,
    pub refresh: Vec<RefreshHook>,
}

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A base capability for widgets built on a plain element.
    pub fn html_element() -> Self {
        Self::new("HTMLElement").with_base(ElementBase::Html)
    }

    /// A base capability for widgets extending a native element.
    pub fn native_element(tag: &str) -> Self {
        Self::new(format!("HTMLElement<{tag}>")).with_base(ElementBase::Native(tag.to_lowercase()))
    }

    pub fn with_base(mut self, base: ElementBase) -> Self {
        self.base = Some(base);
        self
    }

    /// Declare a property; its kind is the kind of `default`.
    pub fn property(self, name: &str, default: impl Into<Value>) -> Self {
        let default = default.into();
        let kind = default.kind();
        self.typed_property(name, kind, default)
    }

    /// Declare a property with an explicit kind, for defaults such as `null`
    /// that do not tell the kind.
    pub fn typed_property(mut self, name: &str, kind: ValueKind, default: impl Into<Value>) -> Self {
        self.properties.push(PropertySpec {
            name: name.to_owned(),
            kind,
            default: default.into(),
        });
        self
    }

    pub fn method<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, NodeId, &mut Event) -> Result<()> + 'static,
    {
        self.methods.push((name.to_owned(), Rc::new(f)));
        self
    }

    pub fn template(mut self, text: impl Into<String>) -> Self {
        self.template = Some(text.into());
        self
    }

    pub fn on_created<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, NodeId) -> Result<()> + 'static,
    {
        self.created.push(Rc::new(f));
        self
    }

    pub fn on_attached<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, NodeId) -> Result<()> + 'static,
    {
        self.attached.push(Rc::new(f));
        self
    }

    pub fn on_startup<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, NodeId) -> Result<()> + 'static,
    {
        self.startup.push(Rc::new(f));
        self
    }

    pub fn on_destroyed<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, NodeId) -> Result<()> + 'static,
    {
        self.destroyed.push(Rc::new(f));
        self
    }

    /// Run after every template refresh.
    pub fn on_refresh<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut Context<'_>, NodeId, &ChangeSet) -> Result<()> + 'static,
    {
        self.refresh.push(Rc::new(f));
        self
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("base", &self.base)
            .field("properties", &self.properties)
            .field(
                "methods",
                &self.methods.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            )
            .field("template", &self.template.is_some())
            .finish_non_exhaustive()
    }
}
