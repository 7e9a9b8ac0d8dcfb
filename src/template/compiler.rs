//! Template compiler: syntax tree to build and refresh instruction lists.
//!
//! Instructions refer to nodes by slot, the pre-order index of the node in
//! the template. Slot 0 is the template root, which is the widget itself when
//! a template is built for an instance.

use super::ast::{Binding, EventHandler, TemplateChild, TemplateNode};
use super::expr::Expr;
use super::parser::parse_template;
use super::props::{PropInfo, PropertyLookup};
use super::TemplateError;

/// Index of a node created by the build instructions.
pub type Slot = usize;

/// A write performed at build time and possibly again on refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum Apply {
    /// Replace the content of a text node.
    SetText { slot: Slot, text: Expr },
    /// Merge the template's class contribution into the class list.
    SetClass { slot: Slot, value: Expr },
    /// Assign a typed property (or the inline style).
    SetProperty {
        slot: Slot,
        property: PropInfo,
        value: Expr,
    },
    /// Set a plain attribute.
    SetAttribute { slot: Slot, name: String, value: Expr },
    /// Set a plain attribute, removing it when the value is empty, `null`
    /// or `undefined`.
    SetOrRemoveAttribute { slot: Slot, name: String, value: Expr },
    /// Synchronously deliver pending property changes of a nested widget.
    Deliver { slot: Slot },
}

/// A build-time instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOp {
    CreateElement {
        slot: Slot,
        tag: String,
        namespace: Option<String>,
    },
    CreateText { slot: Slot, text: String },
    AttachPoints { slot: Slot, names: Vec<String> },
    Apply(Apply),
    Listen {
        slot: Slot,
        event: String,
        handler: EventHandler,
    },
    Append { parent: Slot, child: Slot },
}

/// A refresh instruction, run when any guard name is in the changed set.
///
/// An empty guard runs on every refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOp {
    pub guard: Vec<String>,
    pub action: Apply,
}

/// The compiled form of a template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledTemplate {
    pub build: Vec<BuildOp>,
    pub refresh: Vec<RefreshOp>,
    /// Union of every refresh guard, first-seen order.
    pub dependencies: Vec<String>,
    pub slot_count: usize,
}

impl CompiledTemplate {
    /// Compile a parsed template.
    pub fn compile(root: &TemplateNode, props: &dyn PropertyLookup) -> Self {
        let mut compiler = Compiler {
            props,
            out: CompiledTemplate::default(),
        };
        compiler.element(root, true);
        compiler.out
    }

    /// Parse and compile template text.
    pub fn from_markup(text: &str, props: &dyn PropertyLookup) -> Result<Self, TemplateError> {
        let root = parse_template(text, props)?;
        Ok(Self::compile(&root, props))
    }

    /// Whether refreshing for `property` can touch anything.
    pub fn depends_on(&self, property: &str) -> bool {
        self.dependencies.iter().any(|d| d == property)
    }
}

struct Compiler<'a> {
    props: &'a dyn PropertyLookup,
    out: CompiledTemplate,
}

impl Compiler<'_> {
    fn next_slot(&mut self) -> Slot {
        let slot = self.out.slot_count;
        self.out.slot_count += 1;
        slot
    }

    fn refresh(&mut self, guard: &[String], action: Apply) {
        for name in guard {
            if !self.out.dependencies.contains(name) {
                self.out.dependencies.push(name.clone());
            }
        }
        self.out.refresh.push(RefreshOp {
            guard: guard.to_vec(),
            action,
        });
    }

    fn element(&mut self, node: &TemplateNode, is_root: bool) -> Slot {
        let slot = self.next_slot();
        self.out.build.push(BuildOp::CreateElement {
            slot,
            tag: node.tag.clone(),
            namespace: node.namespace.clone(),
        });
        if !node.attach_points.is_empty() {
            self.out.build.push(BuildOp::AttachPoints {
                slot,
                names: node.attach_points.clone(),
            });
        }

        for (name, binding) in &node.attributes {
            self.attribute(node, slot, name, binding);
        }

        if node.is_custom() && !is_root {
            self.out
                .build
                .push(BuildOp::Apply(Apply::Deliver { slot }));
            self.refresh(&[], Apply::Deliver { slot });
        }

        for (event, handler) in &node.connects {
            self.out.build.push(BuildOp::Listen {
                slot,
                event: event.clone(),
                handler: handler.clone(),
            });
        }

        for child in &node.children {
            let child_slot = match child {
                TemplateChild::Element(el) => self.element(el, false),
                TemplateChild::Text(text) => self.text(text),
            };
            self.out.build.push(BuildOp::Append {
                parent: slot,
                child: child_slot,
            });
        }
        slot
    }

    fn attribute(&mut self, node: &TemplateNode, slot: Slot, name: &str, binding: &Binding) {
        let value = binding.expression.clone();
        let dynamic = !binding.is_static();
        let property = if node.namespace.is_none() {
            self.props.property_for(&node.tag, name)
        } else {
            None
        };

        let action = if name == "class" && node.namespace.is_none() {
            Apply::SetClass { slot, value }
        } else if let Some(property) = property {
            Apply::SetProperty {
                slot,
                property,
                value,
            }
        } else if dynamic {
            Apply::SetOrRemoveAttribute {
                slot,
                name: name.to_owned(),
                value,
            }
        } else {
            Apply::SetAttribute {
                slot,
                name: name.to_owned(),
                value,
            }
        };

        self.out.build.push(BuildOp::Apply(action.clone()));
        if dynamic {
            self.refresh(&binding.dependencies, action);
        }
    }

    fn text(&mut self, text: &Binding) -> Slot {
        let slot = self.next_slot();
        match text.expression.as_literal() {
            Some(literal) if text.is_static() => {
                self.out.build.push(BuildOp::CreateText {
                    slot,
                    text: literal.to_string(),
                });
            }
            _ => {
                self.out.build.push(BuildOp::CreateText {
                    slot,
                    text: String::new(),
                });
                self.refresh(
                    &text.dependencies,
                    Apply::SetText {
                        slot,
                        text: text.expression.clone(),
                    },
                );
            }
        }
        slot
    }
}

// ===========================================================================
// Tests
// ===========================================================================
