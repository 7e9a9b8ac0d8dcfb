//! Markup serialization for assertions and snapshots.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::dom::document::Document;
use crate::dom::node::{NodeData, NodeId};
use crate::template::markup::is_void;

/// Serialize `node` and its subtree.
///
/// Attributes come out in insertion order. The effective class list is
/// written as a trailing `class` attribute, so the output reflects class
/// merging rather than any raw `class` attribute.
pub fn outer_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, node, &mut out);
    out
}

/// Serialize the children of `node`.
pub fn inner_html(doc: &Document, node: NodeId) -> String {
    let mut out = String::new();
    for &child in doc.children(node) {
        write_node(doc, child, &mut out);
    }
    out
}

fn write_node(doc: &Document, node: NodeId, out: &mut String) {
    match doc.node(node) {
        Some(NodeData::Text(text)) => out.push_str(&encode_text(text)),
        Some(NodeData::Element(el)) => {
            out.push('<');
            out.push_str(&el.tag);
            for (name, value) in el.attributes.iter().filter(|(n, _)| n != "class") {
                push_attribute(out, name, value);
            }
            if !el.classes.is_empty() {
                push_attribute(out, "class", &el.classes.join(" "));
            }
            out.push('>');
            if is_void(&el.tag) {
                return;
            }
            for &child in doc.children(node) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(&el.tag);
            out.push('>');
        }
        None => {}
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&encode_double_quoted_attribute(value));
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_text_and_void_tags() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_attribute(p, "title", "say \"hi\"");
        doc.set_class_component(p, "template", "a b");
        let text = doc.create_text("x < y & z");
        let br = doc.create_element("br");
        doc.append_child(p, text);
        doc.append_child(p, br);

        insta::assert_snapshot!(
            outer_html(&doc, p),
            @r#"<p title="say &quot;hi&quot;" class="a b">x &lt; y &amp; z<br></p>"#
        );
        assert_eq!(inner_html(&doc, p), "x &lt; y &amp; z<br>");
    }

    #[test]
    fn missing_nodes_serialize_to_nothing() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.remove(p);
        assert_eq!(outer_html(&doc, p), "");
    }
}
