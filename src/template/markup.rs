//! Markup reader: template text to an element tree.
//!
//! Template text is parsed by html5ever into an `RcDom` and the content of
//! the resulting document is converted to [`MarkupElement`]s, so templates
//! read exactly as a browser would read them: comments dropped, character
//! references decoded, implied end tags inserted, tag and attribute names
//! lower-cased outside SVG and adjusted to their camel-case forms inside it.
//!
//! Before parsing, `<tag/>` on a non-void element is expanded to
//! `<tag></tag>`; HTML would otherwise ignore the slash and swallow the
//! following siblings.

use std::borrow::Cow;

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Errors from reading template markup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkupError {
    #[error("text `{text}` outside the root element")]
    TextOutsideRoot { text: String },
    #[error("more than one root element: <{first}> and <{second}>")]
    MultipleRoots { first: String, second: String },
    #[error("template has no root element")]
    NoRootElement,
}

/// Elements that never have content or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Whether `tag` is a void element.
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// An element read from markup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkupElement {
    pub name: String,
    /// Attributes in source order, values decoded.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

/// A child of a [`MarkupElement`].
#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element(MarkupElement),
    Text(String),
}

impl MarkupElement {
    /// Create an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add an attribute (builder).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Add a child element (builder).
    pub fn with_child(mut self, child: MarkupElement) -> Self {
        self.children.push(MarkupNode::Element(child));
        self
    }

    /// Add a text child (builder).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(MarkupNode::Text(text.into()));
        self
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Read template markup into its single root element.
pub fn parse_markup(input: &str) -> Result<MarkupElement, MarkupError> {
    let input = expand_self_closing(input);
    let dom = parse_document(RcDom::default(), Default::default()).one(&*input);

    // The parser wraps everything in <html><head>…</head><body>…</body>;
    // the template is whatever ended up in head and body.
    let mut top = Vec::new();
    for html in dom.document.children.borrow().iter() {
        if element_name(html).as_deref() != Some("html") {
            continue;
        }
        for section in html.children.borrow().iter() {
            top.extend(section.children.borrow().iter().filter_map(convert));
        }
    }

    let mut root: Option<MarkupElement> = None;
    for node in top {
        match node {
            MarkupNode::Text(text) if text.trim().is_empty() => {}
            MarkupNode::Text(text) => return Err(MarkupError::TextOutsideRoot { text }),
            MarkupNode::Element(el) => match &root {
                Some(first) => {
                    return Err(MarkupError::MultipleRoots {
                        first: first.name.clone(),
                        second: el.name,
                    })
                }
                None => root = Some(el),
            },
        }
    }
    root.ok_or(MarkupError::NoRootElement)
}

fn element_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

/// Convert an element or text node; everything else is dropped.
fn convert(handle: &Handle) -> Option<MarkupNode> {
    match &handle.data {
        NodeData::Text { contents } => Some(MarkupNode::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let attributes = attrs
                .borrow()
                .iter()
                .map(|attr| {
                    let local = &*attr.name.local;
                    let name = match &attr.name.prefix {
                        Some(prefix) => format!("{}:{local}", &**prefix),
                        None => local.to_owned(),
                    };
                    (name, attr.value.to_string())
                })
                .collect();
            let children = handle.children.borrow().iter().filter_map(convert).collect();
            Some(MarkupNode::Element(MarkupElement {
                name: name.local.to_string(),
                attributes,
                children,
            }))
        }
        _ => None,
    }
}

/// Rewrite `<tag …/>` as `<tag …></tag>` for non-void tags.
fn expand_self_closing(input: &str) -> Cow<'_, str> {
    if !input.contains("/>") {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 16);
    let mut rest = input;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];
        if !rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            out.push('<');
            rest = &rest[1..];
            continue;
        }
        let name_len = rest[1..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')))
            .unwrap_or(rest.len() - 1);
        let name = &rest[1..1 + name_len];
        let Some(end) = tag_end(rest) else {
            break;
        };
        let tag = &rest[..=end];
        match tag.strip_suffix("/>") {
            Some(open_tag) if !is_void(&name.to_ascii_lowercase()) => {
                out.push_str(open_tag.trim_end());
                out.push_str("></");
                out.push_str(name);
                out.push('>');
            }
            _ => out.push_str(tag),
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Byte index of the `>` closing the tag at the start of `tag`, skipping
/// quoted attribute values.
fn tag_end(tag: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in tag.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

// ===========================================================================
// Tests
// ===========================================================================
