//! Placeholder text compiler.
//!
//! Turns `"d-reset {{iconClass}}"` into an expression tree plus the ordered
//! list of instance properties it depends on.

use super::ast::Binding;
use super::expr::{parse_expression, BinaryOp, Expr};
use super::TemplateError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Compile text containing `{{...}}` placeholders.
///
/// Placeholders mentioning `this.` are full expressions and every
/// `this.<name>` they reference is a dependency. Anything else is a property
/// path such as `label` or `item.name`, rooted at the instance; only its
/// top-level name is a dependency. With `escape_undefined`, a path that
/// evaluates to `undefined` or `null` renders as the empty string.
pub fn compile_text(text: &str, escape_undefined: bool) -> Result<Binding, TemplateError> {
    let mut parts = Vec::new();
    let mut dependencies: Vec<String> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(OPEN) {
        if open > 0 {
            parts.push(Expr::string(&rest[..open]));
        }
        let after = &rest[open + OPEN.len()..];
        let close = after.find(CLOSE).ok_or_else(|| TemplateError::InvalidPlaceholder {
            placeholder: after.to_owned(),
            reason: "missing closing `}}`".into(),
        })?;
        let (expr, deps) = compile_placeholder(after[..close].trim(), escape_undefined)?;
        for dep in deps {
            if !dependencies.contains(&dep) {
                dependencies.push(dep);
            }
        }
        parts.push(expr);
        rest = &after[close + CLOSE.len()..];
    }
    if !rest.is_empty() {
        parts.push(Expr::string(rest));
    }

    let expression = match parts.len() {
        0 => Expr::string(""),
        1 => parts.remove(0),
        _ => Expr::Concat(parts),
    };
    Ok(Binding {
        expression,
        dependencies,
    })
}

/// Whether `text` contains a placeholder.
pub fn has_placeholder(text: &str) -> bool {
    text.contains(OPEN)
}

fn compile_placeholder(
    content: &str,
    escape_undefined: bool,
) -> Result<(Expr, Vec<String>), TemplateError> {
    let invalid = |reason: String| TemplateError::InvalidPlaceholder {
        placeholder: content.to_owned(),
        reason,
    };
    if content.is_empty() {
        return Err(invalid("empty placeholder".into()));
    }

    let parsed = parse_expression(content).map_err(|e| invalid(e.to_string()))?;
    if content.contains("this.") {
        let deps = parsed.this_dependencies();
        return Ok((parsed, deps));
    }

    let path = parsed.rooted_at_this();
    let root = path
        .root_property()
        .ok_or_else(|| invalid("expected a property path".into()))?
        .to_owned();
    let expr = if escape_undefined {
        Expr::Binary(BinaryOp::Nullish, Box::new(path), Box::new(Expr::string("")))
    } else {
        path
    };
    Ok((expr, vec![root]))
}
