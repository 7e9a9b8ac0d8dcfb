//! Template engine: markup reader, expression language, parser, compiler
//! and the build/refresh interpreter.
//!
//! ```text
//! text ──markup──▶ MarkupElement ──parser──▶ TemplateNode ──compiler──▶ CompiledTemplate
//!                                                                         │
//!                                   Rendering::build / Rendering::refresh ◀┘
//! ```

pub mod ast;
pub mod compiler;
pub mod expr;
pub mod lexer;
pub mod markup;
pub mod parser;
pub mod props;
pub mod runtime;
pub mod text;

pub use ast::{Binding, EventHandler, TemplateChild, TemplateNode, TextFragment};
pub use compiler::{Apply, BuildOp, CompiledTemplate, RefreshOp, Slot};
pub use expr::{parse_expression, parse_statements, Expr, ExprError, Scope, Stmt};
pub use markup::{parse_markup, MarkupElement, MarkupError, MarkupNode};
pub use parser::{parse_template, TemplateParser};
pub use props::{AttributeMap, PropInfo, PropTarget, PropertyLookup};
pub use runtime::{ChangeSet, Rendering, TemplateHost};
pub use text::compile_text;

/// Errors from reading, parsing or compiling a template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error(transparent)]
    Markup(#[from] MarkupError),
    #[error("invalid placeholder `{{{{{placeholder}}}}}`: {reason}")]
    InvalidPlaceholder { placeholder: String, reason: String },
    #[error("invalid value `{value}` for attribute `{attribute}`: {reason}")]
    InvalidLiteral {
        attribute: String,
        value: String,
        reason: String,
    },
    #[error("invalid handler for `on-{event}`")]
    InvalidHandler {
        event: String,
        #[source]
        error: ExprError,
    },
}
