//! Custom element registry: registration, factories, upgrade and parse.

pub mod factory;
pub mod registry;

pub use factory::Factory;
pub use registry::Registry;

/// Errors from registering a custom element.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegisterError {
    #[error("tag `{tag}` is already registered")]
    DuplicateRegistration { tag: String },
    #[error("invalid base for `{tag}`: {reason}")]
    InvalidBaseCapability { tag: String, reason: String },
    #[error("property `{property}` of `{tag}` is declared with conflicting kinds")]
    ConflictingProperty { tag: String, property: String },
}
