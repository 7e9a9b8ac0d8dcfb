//! Declarative attribute mapping.
//!
//! When an element found in markup is upgraded, attributes naming a declared
//! property (case-insensitively) are converted according to the property's
//! kind, and `on-<event>` attributes become listeners. Processed attributes
//! are removed from the element.

use std::rc::Rc;

use super::capability::PropertySpec;
use super::definition::Definition;
use super::WidgetError;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::event::handler::Handler;
use crate::template::expr::{parse_expression, parse_statements, EmptyScope};
use crate::value::{Value, ValueKind};

/// An attribute interpreted against a widget definition.
#[derive(Debug, Clone)]
pub enum ParsedAttribute {
    /// Assign `value` to the property `name`.
    Property { name: String, value: Value },
    /// Listen for `event`.
    Listener { event: String, handler: Handler },
}

/// Interpret and remove the declarative attributes of `node`.
pub fn map_attributes(
    doc: &mut Document,
    node: NodeId,
    definition: &Definition,
) -> Result<Vec<ParsedAttribute>, WidgetError> {
    let attributes = doc
        .element(node)
        .map(|el| el.attributes.clone())
        .unwrap_or_default();

    let mut parsed = Vec::new();
    let mut processed = Vec::new();
    for (name, value) in attributes {
        let name = name.to_lowercase();
        if let Some(attr) = parse_attribute(node, definition, &name, &value)? {
            parsed.push(attr);
            processed.push(name);
        }
    }
    for name in processed {
        doc.remove_attribute(node, &name);
    }
    Ok(parsed)
}

/// Interpret one attribute. `None` means the attribute is not declarative.
pub fn parse_attribute(
    node: NodeId,
    definition: &Definition,
    name: &str,
    value: &str,
) -> Result<Option<ParsedAttribute>, WidgetError> {
    if let Some(spec) = definition.property_for_attribute(name) {
        return Ok(Some(ParsedAttribute::Property {
            name: spec.name.clone(),
            value: convert(spec, name, value)?,
        }));
    }
    if let Some(event) = name.strip_prefix("on-") {
        return Ok(Some(ParsedAttribute::Listener {
            event: event.to_owned(),
            handler: function_attribute(node, definition, name, value)?,
        }));
    }
    Ok(None)
}

/// Convert an attribute value according to the declared property.
pub fn convert(spec: &PropertySpec, attribute: &str, value: &str) -> Result<Value, WidgetError> {
    let converted = match spec.kind {
        ValueKind::Number => Value::Number(to_number(value)),
        ValueKind::Bool => Value::Bool(value != "false"),
        ValueKind::Array => Value::Array(
            value
                .split_whitespace()
                .map(|s| Value::String(s.to_owned()))
                .collect(),
        ),
        ValueKind::Object => string_to_object(attribute, value)?,
        // Strings, method names, and properties of unknown kind.
        _ => Value::String(value.to_owned()),
    };
    Ok(converted)
}

fn to_number(value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        0.0
    } else {
        trimmed.parse().unwrap_or(f64::NAN)
    }
}

/// `min: 2, max: 3` or `{min: 2, max: 3}`.
fn string_to_object(attribute: &str, value: &str) -> Result<Value, WidgetError> {
    let source = if value.starts_with('{') {
        value.to_owned()
    } else {
        format!("{{{value}}}")
    };
    let expr = parse_expression(&source).map_err(|e| WidgetError::AttributeConversion {
        attribute: attribute.to_owned(),
        value: value.to_owned(),
        message: e.to_string(),
    })?;
    Ok(expr.evaluate(&EmptyScope))
}

/// A handler given in markup: a method name of the widget, or inline
/// statements with `this` bound to the element.
fn function_attribute(
    node: NodeId,
    definition: &Definition,
    attribute: &str,
    value: &str,
) -> Result<Handler, WidgetError> {
    let value = value.trim();
    if definition.has_method(value) {
        return Ok(Handler::Method {
            owner: node,
            name: value.to_owned(),
        });
    }
    let body = parse_statements(value).map_err(|e| WidgetError::AttributeConversion {
        attribute: attribute.to_owned(),
        value: value.to_owned(),
        message: e.to_string(),
    })?;
    Ok(Handler::Inline {
        owner: node,
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
    use crate::widget::capability::Capability;

    fn definition() -> Definition {
        let own = Capability::new("Slider")
            .property("label", "")
            .property("maxValue", 10)
            .property("disabled", false)
            .property("tags", Value::Array(Vec::new()))
            .typed_property("constraints", ValueKind::Object, Value::Null)
            .typed_property("formatter", ValueKind::Function, Value::Null)
            .method("onChange", |_, _, _| Ok(()));
        Definition::compose("d-slider", &[Capability::html_element()], &own).unwrap()
    }

    fn spec(def: &Definition, name: &str) -> PropertySpec {
        def.property(name).unwrap().clone()
    }

    // ── Conversion ───────────────────────────────────────────────────

    #[test]
    fn converts_by_kind() {
        let def = definition();
        assert_eq!(convert(&spec(&def, "label"), "label", "Volume").unwrap(), Value::from("Volume"));
        assert_eq!(convert(&spec(&def, "maxValue"), "maxvalue", " 42 ").unwrap(), Value::from(42));
        assert_eq!(convert(&spec(&def, "disabled"), "disabled", "").unwrap(), Value::from(true));
        assert_eq!(convert(&spec(&def, "disabled"), "disabled", "false").unwrap(), Value::from(false));
        assert_eq!(
            convert(&spec(&def, "tags"), "tags", "a  b c").unwrap(),
            Value::Array(vec!["a".into(), "b".into(), "c".into()])
        );
        assert_eq!(
            convert(&spec(&def, "formatter"), "formatter", "fmt").unwrap(),
            Value::from("fmt")
        );
    }

    #[test]
    fn invalid_numbers_become_nan() {
        let def = definition();
        let v = convert(&spec(&def, "maxValue"), "maxvalue", "lots").unwrap();
        assert!(v.as_number().unwrap().is_nan());
    }

    #[test]
    fn objects_accept_bare_members() {
        let def = definition();
        let v = convert(&spec(&def, "constraints"), "constraints", "min: 2, max: 3").unwrap();
        assert_eq!(v.member("min"), Value::from(2));
        assert_eq!(v.member("max"), Value::from(3));

        let v = convert(&spec(&def, "constraints"), "constraints", "{min: 1}").unwrap();
        assert_eq!(v.member("min"), Value::from(1));
    }

    #[test]
    fn malformed_objects_fail() {
        let def = definition();
        let err = convert(&spec(&def, "constraints"), "constraints", "min: ").unwrap_err();
        assert!(matches!(
            err,
            WidgetError::AttributeConversion { ref attribute, .. } if attribute == "constraints"
        ));
    }

    // ── Mapping ──────────────────────────────────────────────────────

    #[test]
    fn maps_and_removes_declarative_attributes() {
        let def = definition();
        let mut doc = Document::new();
        let node = doc.create_element("d-slider");
        doc.set_attribute(node, "maxvalue", "5");
        doc.set_attribute(node, "id", "s1");
        doc.set_attribute(node, "on-change", "onChange");
        doc.set_attribute(node, "on-input", "this.label = event.detail");

        let parsed = map_attributes(&mut doc, node, &def).unwrap();
        assert_eq!(parsed.len(), 3);
        assert!(matches!(
            &parsed[0],
            ParsedAttribute::Property { name, value } if name == "maxValue" && *value == Value::from(5)
        ));
        assert!(matches!(
            &parsed[1],
            ParsedAttribute::Listener { event, handler: Handler::Method { name, .. } }
                if event == "change" && name == "onChange"
        ));
        assert!(matches!(
            &parsed[2],
            ParsedAttribute::Listener { event, handler: Handler::Inline { .. } } if event == "input"
        ));

        let remaining: Vec<_> = doc
            .element(node)
            .unwrap()
            .attributes
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(remaining, vec!["id"]);
    }

    #[test]
    fn bad_inline_handler_fails() {
        let def = definition();
        let mut doc = Document::new();
        let node = doc.create_element("d-slider");
        doc.set_attribute(node, "on-click", "this.label = ");
        let err = map_attributes(&mut doc, node, &def).unwrap_err();
        assert!(err.to_string().starts_with("cannot convert attribute `on-click`"));
    }
}
