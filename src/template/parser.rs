//! Template parser: markup tree to [`TemplateNode`].

use std::rc::Rc;

use super::ast::{Binding, EventHandler, TemplateChild, TemplateNode};
use super::expr::{parse_expression, parse_statements, EmptyScope, Expr};
use super::markup::{parse_markup, MarkupElement, MarkupNode};
use super::props::{PropTarget, PropertyLookup};
use super::text::{compile_text, has_placeholder};
use super::TemplateError;
use crate::value::{Value, ValueKind};

/// Parse template text into its syntax tree.
pub fn parse_template(text: &str, props: &dyn PropertyLookup) -> Result<TemplateNode, TemplateError> {
    let markup = parse_markup(text)?;
    TemplateParser::new(props).parse(&markup)
}

/// Walks a markup tree, consuming control attributes and compiling the rest.
pub struct TemplateParser<'a> {
    props: &'a dyn PropertyLookup,
}

impl<'a> TemplateParser<'a> {
    pub fn new(props: &'a dyn PropertyLookup) -> Self {
        Self { props }
    }

    /// Parse `root` and its subtree.
    pub fn parse(&self, root: &MarkupElement) -> Result<TemplateNode, TemplateError> {
        self.parse_node(root, None)
    }

    fn parse_node(
        &self,
        element: &MarkupElement,
        inherited_namespace: Option<&str>,
    ) -> Result<TemplateNode, TemplateError> {
        let namespace = element
            .attribute("xmlns")
            .or(inherited_namespace)
            .map(str::to_owned);
        let tag = element
            .attribute("is")
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| element.name.clone());

        let mut node = TemplateNode {
            tag,
            namespace,
            ..TemplateNode::default()
        };

        for (name, value) in &element.attributes {
            if value.is_empty() {
                continue;
            }
            match name.as_str() {
                "xmlns" | "is" => {}
                "attach-point" | "data-attach-point" => {
                    node.attach_points.extend(
                        value
                            .split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(str::to_owned),
                    );
                }
                _ => {
                    if let Some(event) = name.strip_prefix("on-") {
                        let handler = parse_handler(event, value)?;
                        node.connects.push((event.to_owned(), handler));
                    } else {
                        let binding = self.parse_attribute(&node, name, value)?;
                        node.set_attribute(name.clone(), binding);
                    }
                }
            }
        }

        let children = &element.children;
        let is_blank =
            |child: &MarkupNode| matches!(child, MarkupNode::Text(t) if t.chars().all(|c| matches!(c, ' ' | '\t' | '\n')));
        let first = children.iter().position(|c| !is_blank(c));
        let last = children.iter().rposition(|c| !is_blank(c));
        if let (Some(first), Some(last)) = (first, last) {
            for child in &children[first..=last] {
                node.children.push(match child {
                    MarkupNode::Element(el) => {
                        TemplateChild::Element(self.parse_node(el, node.namespace.as_deref())?)
                    }
                    MarkupNode::Text(text) => TemplateChild::Text(compile_text(text, true)?),
                });
            }
        }

        Ok(node)
    }

    fn parse_attribute(
        &self,
        node: &TemplateNode,
        name: &str,
        value: &str,
    ) -> Result<Binding, TemplateError> {
        let prop = if node.namespace.is_none() {
            self.props.property_for(&node.tag, name)
        } else {
            None
        };
        match prop {
            Some(prop)
                if prop.target == PropTarget::Property
                    && prop.kind != ValueKind::String
                    && !has_placeholder(value) =>
            {
                let literal = coerce_literal(name, prop.kind, value)?;
                Ok(Binding::literal(Expr::Literal(literal)))
            }
            _ => compile_text(value, name == "class"),
        }
    }
}

/// Convert a literal attribute value to the type of its property.
pub fn coerce_literal(attribute: &str, kind: ValueKind, value: &str) -> Result<Value, TemplateError> {
    let invalid = |reason: String| TemplateError::InvalidLiteral {
        attribute: attribute.to_owned(),
        value: value.to_owned(),
        reason,
    };
    match kind {
        ValueKind::Bool => Ok(Value::Bool(!matches!(value, "off" | "false"))),
        ValueKind::Number => value
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|e| invalid(e.to_string())),
        ValueKind::Object | ValueKind::Array => parse_expression(value)
            .map(|e| e.evaluate(&EmptyScope))
            .map_err(|e| invalid(e.to_string())),
        ValueKind::Function | ValueKind::String => Ok(Value::String(value.to_owned())),
        ValueKind::Undefined | ValueKind::Null | ValueKind::Node => Ok(parse_expression(value)
            .map(|e| e.evaluate(&EmptyScope))
            .unwrap_or_else(|_| Value::String(value.to_owned()))),
    }
}

/// Build the handler of an `on-<event>` attribute.
///
/// `{{ }}` delimiters are optional. A bare identifier names a widget method;
/// anything else is a list of inline statements.
fn parse_handler(event: &str, value: &str) -> Result<EventHandler, TemplateError> {
    let mut source = value.trim();
    if let Some(inner) = source.strip_prefix("{{").and_then(|s| s.strip_suffix("}}")) {
        source = inner.trim();
    }
    if !source.is_empty() && source.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Ok(EventHandler::Method(source.to_owned()));
    }
    let body = parse_statements(source).map_err(|error| TemplateError::InvalidHandler {
        event: event.to_owned(),
        error,
    })?;
    Ok(EventHandler::Inline {
        source: source.to_owned(),
        body: Rc::from(body),
    })
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::template::expr::Stmt;
    use crate::template::props::AttributeMap;

    fn parse(text: &str) -> TemplateNode {
        parse_template(text, &AttributeMap::new()).unwrap()
    }

    // ── Control attributes ───────────────────────────────────────────

    #[test]
    fn is_attribute_overrides_tag() {
        let node = parse(r#"<button is="d-button" label="Go"></button>"#);
        assert_eq!(node.tag, "d-button");
        assert!(node.attribute("is").is_none());
    }

    #[test]
    fn attach_points_are_split() {
        let node = parse(r#"<div attach-point="focusNode, containerNode"><span data-attach-point="labelNode"></span></div>"#);
        assert_eq!(node.attach_points, vec!["focusNode", "containerNode"]);
        let TemplateChild::Element(span) = &node.children[0] else {
            panic!("expected span");
        };
        assert_eq!(span.attach_points, vec!["labelNode"]);
    }

    #[test]
    fn namespace_is_inherited_and_overridable() {
        let node = parse(
            r#"<div><svg xmlns="http://www.w3.org/2000/svg"><g><foreignObject xmlns="urn:x"></foreignObject></g></svg></div>"#,
        );
        assert_eq!(node.namespace, None);
        let TemplateChild::Element(svg) = &node.children[0] else {
            panic!("expected svg");
        };
        assert_eq!(svg.namespace.as_deref(), Some("http://www.w3.org/2000/svg"));
        let TemplateChild::Element(g) = &svg.children[0] else {
            panic!("expected g");
        };
        assert_eq!(g.namespace, svg.namespace);
        let TemplateChild::Element(fo) = &g.children[0] else {
            panic!("expected foreignObject");
        };
        assert_eq!(fo.namespace.as_deref(), Some("urn:x"));
    }

    // ── Connects ─────────────────────────────────────────────────────

    #[test]
    fn method_connects() {
        let node = parse(r#"<button on-click="{{ clickHandler }}" on-keydown="keyHandler"></button>"#);
        assert_eq!(
            node.connect("click"),
            Some(&EventHandler::Method("clickHandler".into()))
        );
        assert_eq!(
            node.connect("keydown"),
            Some(&EventHandler::Method("keyHandler".into()))
        );
        assert!(node.attributes.is_empty());
    }

    #[test]
    fn inline_connects() {
        let node = parse(r#"<button on-click="{{this.open = !this.open}}"></button>"#);
        let Some(EventHandler::Inline { source, body }) = node.connect("click") else {
            panic!("expected inline handler");
        };
        assert_eq!(source, "this.open = !this.open");
        assert!(matches!(&body[0], Stmt::Assign { property, .. } if property == "open"));
    }

    #[test]
    fn invalid_inline_handler() {
        let err = parse_template(r#"<a on-click="1 +"></a>"#, &AttributeMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidHandler { event, .. } if event == "click"));
    }

    // ── Attributes ───────────────────────────────────────────────────

    #[test]
    fn typed_literals_are_coerced() {
        let node = parse(r#"<input disabled="off" checked="on" maxlength="12" value="abc">"#);
        assert_eq!(
            node.attribute("disabled").unwrap().expression,
            Expr::Literal(Value::Bool(false))
        );
        assert_eq!(
            node.attribute("checked").unwrap().expression,
            Expr::Literal(Value::Bool(true))
        );
        assert_eq!(
            node.attribute("maxlength").unwrap().expression,
            Expr::Literal(Value::Number(12.0))
        );
        assert_eq!(node.attribute("value").unwrap().expression, Expr::string("abc"));
    }

    #[test]
    fn bad_number_literal() {
        let err = parse_template(r#"<input maxlength="lots">"#, &AttributeMap::new()).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidLiteral { attribute, .. } if attribute == "maxlength"));
    }

    #[test]
    fn placeholders_are_not_coerced() {
        let node = parse(r#"<input disabled="{{this.readOnly}}">"#);
        let binding = node.attribute("disabled").unwrap();
        assert_eq!(binding.dependencies, vec!["readOnly"]);
    }

    #[test]
    fn class_blanks_undefined() {
        let node = parse(r#"<span class="{{iconClass}}" title="{{label}}"></span>"#);
        assert_eq!(
            node.attribute("class").unwrap().expression.to_string(),
            "this.iconClass ?? ''"
        );
        assert_eq!(node.attribute("title").unwrap().expression.to_string(), "this.label");
    }

    #[test]
    fn empty_attributes_are_skipped() {
        let node = parse(r#"<div role="" hidden></div>"#);
        assert!(node.attributes.is_empty());
    }

    // ── Children ─────────────────────────────────────────────────────

    #[test]
    fn outer_whitespace_is_trimmed_inner_kept() {
        let node = parse("<div>\n  <b>a</b> <i>b</i>\n</div>");
        assert_eq!(node.children.len(), 3);
        assert!(matches!(
            &node.children[1],
            TemplateChild::Text(t) if t.expression == Expr::string(" ")
        ));
    }

    #[test]
    fn text_children_compile_with_blanking() {
        let node = parse("<span>{{label}}</span>");
        let TemplateChild::Text(text) = &node.children[0] else {
            panic!("expected text");
        };
        assert_eq!(text.dependencies, vec!["label"]);
        assert_eq!(text.expression.to_string(), "this.label ?? ''");
    }
}
