//! Widgets: capabilities, composed definitions, instance state and the
//! lifecycle that upgrades plain elements.

pub mod attributes;
pub mod capability;
pub mod definition;
pub mod host;
pub mod lifecycle;
pub mod state;

pub use attributes::{map_attributes, ParsedAttribute};
pub use capability::{Capability, ElementBase, Hook, Method, PropertySpec, RefreshHook};
pub use definition::Definition;
pub use host::WidgetHost;
pub use state::{LifecycleEvent, LifecycleTracker, WidgetState};

/// Errors raised while creating or driving a widget instance.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WidgetError {
    #[error("cannot convert attribute `{attribute}` value `{value}`: {message}")]
    AttributeConversion {
        attribute: String,
        value: String,
        message: String,
    },
    #[error("`{tag}` has no method `{method}`")]
    UnknownMethod { tag: String, method: String },
}
