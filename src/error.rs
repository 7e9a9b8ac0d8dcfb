//! Crate-level error type.
//!
//! Each subsystem owns its error enum; [`Error`] aggregates them so that
//! widget hooks and event handlers can use `?` on anything the crate returns.

use crate::dom::node::NodeId;
use crate::register::RegisterError;
use crate::template::TemplateError;
use crate::widget::WidgetError;

/// Any error produced by the crate or by user hooks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Register(#[from] RegisterError),
    #[error(transparent)]
    Widget(#[from] WidgetError),
    /// An insertion that would make a node its own ancestor.
    #[error("cannot insert node {child:?} under {parent:?}: it is the parent or one of its ancestors")]
    HierarchyRequest { parent: NodeId, child: NodeId },
    /// Free-form failure raised by application hooks and handlers.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Build an [`Error::Custom`] from any displayable message.
    pub fn msg(message: impl std::fmt::Display) -> Self {
        Error::Custom(message.to_string())
    }
}

/// Shorthand result type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsystem_errors_convert() {
        let err: Error = RegisterError::DuplicateRegistration {
            tag: "d-button".into(),
        }
        .into();
        assert!(matches!(err, Error::Register(_)));
        assert_eq!(err.to_string(), "tag `d-button` is already registered");
    }

    #[test]
    fn custom_message() {
        assert_eq!(Error::msg("boom").to_string(), "boom");
    }
}
