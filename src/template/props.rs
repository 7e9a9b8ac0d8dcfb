//! Per-tag attribute to property resolution.
//!
//! An attribute of a native element either corresponds to a typed DOM
//! property (`disabled`, `tabindex`, `value`, ...) or stays a plain string
//! attribute. Custom elements add the properties their definition declares.
//! Lookups are keyed by lower-cased attribute name and cached per tag.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::value::ValueKind;
use crate::value::ValueKind::{Bool, Number, String as Str};

/// Where a resolved attribute is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropTarget {
    /// A property of the element or widget.
    Property,
    /// The inline style text.
    Style,
}

/// A typed property an attribute maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropInfo {
    /// Property name with its real case (`tabIndex`, `htmlFor`, `iconClass`).
    pub name: String,
    pub kind: ValueKind,
    pub target: PropTarget,
}

impl PropInfo {
    pub fn property(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            target: PropTarget::Property,
        }
    }

    pub fn style() -> Self {
        Self {
            name: "style".into(),
            kind: ValueKind::String,
            target: PropTarget::Style,
        }
    }
}

/// Resolves attributes to properties for a tag.
pub trait PropertyLookup {
    /// The property `attribute` of `tag` maps to, or `None` for a plain
    /// attribute.
    fn property_for(&self, tag: &str, attribute: &str) -> Option<PropInfo>;
}

// ---------------------------------------------------------------------------
// Native tables
// ---------------------------------------------------------------------------

/// Tags a widget may use as its native base element.
pub const NATIVE_TAGS: &[&str] = &[
    "a", "abbr", "address", "area", "article", "aside", "audio", "b", "base", "bdi", "bdo",
    "blockquote", "body", "br", "button", "canvas", "caption", "cite", "code", "col",
    "colgroup", "data", "datalist", "dd", "del", "details", "dfn", "dialog", "div", "dl", "dt",
    "em", "embed", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "head", "header", "hr", "html", "i", "iframe", "img", "input", "ins", "kbd",
    "label", "legend", "li", "link", "main", "map", "mark", "menu", "meta", "meter", "nav",
    "noscript", "object", "ol", "optgroup", "option", "output", "p", "param", "picture", "pre",
    "progress", "q", "rp", "rt", "ruby", "s", "samp", "script", "section", "select", "small",
    "source", "span", "strong", "style", "sub", "summary", "sup", "table", "tbody", "td",
    "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr", "track", "u", "ul",
    "var", "video", "wbr",
];

/// Whether `tag` is a known native element.
pub fn is_native_tag(tag: &str) -> bool {
    NATIVE_TAGS.contains(&tag)
}

const GLOBAL_PROPERTIES: &[(&str, ValueKind)] = &[
    ("id", Str),
    ("title", Str),
    ("lang", Str),
    ("dir", Str),
    ("hidden", Bool),
    ("tabIndex", Number),
    ("accessKey", Str),
    ("draggable", Bool),
    ("spellcheck", Bool),
];

fn tag_properties(tag: &str) -> &'static [(&'static str, ValueKind)] {
    match tag {
        "a" => &[
            ("href", Str),
            ("target", Str),
            ("rel", Str),
            ("download", Str),
            ("hreflang", Str),
            ("type", Str),
        ],
        "button" => &[
            ("disabled", Bool),
            ("type", Str),
            ("name", Str),
            ("value", Str),
            ("autofocus", Bool),
        ],
        "input" => &[
            ("disabled", Bool),
            ("checked", Bool),
            ("indeterminate", Bool),
            ("value", Str),
            ("type", Str),
            ("name", Str),
            ("placeholder", Str),
            ("readOnly", Bool),
            ("required", Bool),
            ("multiple", Bool),
            ("autofocus", Bool),
            ("maxLength", Number),
            ("size", Number),
            ("min", Str),
            ("max", Str),
            ("step", Str),
        ],
        "select" => &[
            ("disabled", Bool),
            ("multiple", Bool),
            ("required", Bool),
            ("name", Str),
            ("size", Number),
            ("selectedIndex", Number),
            ("value", Str),
        ],
        "option" => &[
            ("disabled", Bool),
            ("selected", Bool),
            ("value", Str),
            ("label", Str),
        ],
        "textarea" => &[
            ("disabled", Bool),
            ("readOnly", Bool),
            ("required", Bool),
            ("value", Str),
            ("name", Str),
            ("placeholder", Str),
            ("rows", Number),
            ("cols", Number),
            ("maxLength", Number),
        ],
        "img" => &[("src", Str), ("alt", Str), ("width", Number), ("height", Number)],
        "label" => &[("htmlFor", Str)],
        "form" => &[
            ("action", Str),
            ("method", Str),
            ("target", Str),
            ("name", Str),
            ("noValidate", Bool),
        ],
        "iframe" => &[("src", Str), ("name", Str), ("width", Str), ("height", Str)],
        "ol" => &[("start", Number), ("reversed", Bool), ("type", Str)],
        "li" => &[("value", Number)],
        "td" | "th" => &[("colSpan", Number), ("rowSpan", Number)],
        "fieldset" => &[("disabled", Bool), ("name", Str)],
        "optgroup" => &[("disabled", Bool), ("label", Str)],
        "progress" => &[("value", Number), ("max", Number)],
        _ => &[],
    }
}

/// Attribute names that differ from their property name beyond case.
fn alias(attribute: &str) -> Option<&'static str> {
    match attribute {
        "for" => Some("htmlfor"),
        _ => None,
    }
}

fn native_map(tag: &str) -> HashMap<String, PropInfo> {
    let mut map = HashMap::new();
    map.insert("style".to_owned(), PropInfo::style());
    if !is_native_tag(tag) && !tag.contains('-') {
        return map;
    }
    for &(name, kind) in GLOBAL_PROPERTIES.iter().chain(tag_properties(tag)) {
        map.insert(name.to_ascii_lowercase(), PropInfo::property(name, kind));
    }
    map
}

// ---------------------------------------------------------------------------
// AttributeMap
// ---------------------------------------------------------------------------

type TagMap = Rc<HashMap<String, PropInfo>>;

/// Cached attribute → property tables, one per tag.
#[derive(Debug, Default)]
pub struct AttributeMap {
    cache: RefCell<HashMap<String, TagMap>>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for `tag`, building it on first use.
    ///
    /// `base` is the native tag whose properties the element has, and
    /// `declared` lists extra properties (a widget's own), which win over
    /// native ones.
    pub fn for_tag(
        &self,
        tag: &str,
        base: &str,
        declared: impl FnOnce() -> Vec<(String, ValueKind)>,
    ) -> TagMap {
        if let Some(map) = self.cache.borrow().get(tag) {
            return Rc::clone(map);
        }
        trace!(tag, "building attribute map");
        let mut map = native_map(base);
        for (name, kind) in declared() {
            map.insert(name.to_ascii_lowercase(), PropInfo::property(name, kind));
        }
        let map = Rc::new(map);
        self.cache
            .borrow_mut()
            .insert(tag.to_owned(), Rc::clone(&map));
        map
    }

    /// Resolve `attribute` against a table.
    pub fn resolve(map: &HashMap<String, PropInfo>, attribute: &str) -> Option<PropInfo> {
        let key = attribute.to_ascii_lowercase();
        map.get(&key)
            .or_else(|| alias(&key).and_then(|a| map.get(a)))
            .cloned()
    }

    /// Drop the cached table of `tag`.
    pub fn invalidate(&self, tag: &str) {
        self.cache.borrow_mut().remove(tag);
    }

    /// Number of cached tag tables.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

/// Native elements only.
impl PropertyLookup for AttributeMap {
    fn property_for(&self, tag: &str, attribute: &str) -> Option<PropInfo> {
        let map = self.for_tag(tag, tag, Vec::new);
        Self::resolve(&map, attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_properties_are_typed() {
        let map = AttributeMap::new();
        assert_eq!(
            map.property_for("button", "disabled"),
            Some(PropInfo::property("disabled", Bool))
        );
        assert_eq!(
            map.property_for("div", "tabindex"),
            Some(PropInfo::property("tabIndex", Number))
        );
        assert_eq!(map.property_for("div", "role"), None);
        assert_eq!(map.property_for("div", "aria-label"), None);
    }

    #[test]
    fn style_and_aliases() {
        let map = AttributeMap::new();
        assert_eq!(map.property_for("span", "style"), Some(PropInfo::style()));
        assert_eq!(
            map.property_for("label", "for"),
            Some(PropInfo::property("htmlFor", Str))
        );
    }

    #[test]
    fn declared_properties_win_and_are_cached() {
        let map = AttributeMap::new();
        let table = map.for_tag("d-star-rating", "div", || {
            vec![
                ("max".to_owned(), Number),
                ("title".to_owned(), Bool),
            ]
        });
        assert_eq!(
            AttributeMap::resolve(&table, "MAX"),
            Some(PropInfo::property("max", Number))
        );
        assert_eq!(AttributeMap::resolve(&table, "title").unwrap().kind, Bool);

        // Second lookup does not rebuild.
        let again = map.for_tag("d-star-rating", "div", || panic!("rebuilt"));
        assert!(Rc::ptr_eq(&table, &again));
        assert_eq!(map.cached(), 1);

        map.invalidate("d-star-rating");
        assert_eq!(map.cached(), 0);
    }

    #[test]
    fn unknown_tags_have_only_style() {
        let map = AttributeMap::new();
        assert_eq!(map.property_for("blink", "id"), None);
        assert_eq!(map.property_for("blink", "style"), Some(PropInfo::style()));
    }
}
