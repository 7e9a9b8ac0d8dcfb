//! The template host of a widget instance.

use crate::context::Context;
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::event::handler::Handler;
use crate::template::ast::EventHandler;
use crate::template::expr::Scope;
use crate::template::props::PropInfo;
use crate::template::runtime::TemplateHost;
use crate::value::Value;

/// Builds and refreshes the template of `instance` against the document.
pub struct WidgetHost<'c, 'a> {
    ctx: &'c mut Context<'a>,
    instance: NodeId,
}

impl<'c, 'a> WidgetHost<'c, 'a> {
    pub fn new(ctx: &'c mut Context<'a>, instance: NodeId) -> Self {
        Self { ctx, instance }
    }
}

impl Scope for WidgetHost<'_, '_> {
    fn this_value(&self) -> Value {
        Value::Node(self.instance)
    }

    fn node_property(&self, node: NodeId, name: &str) -> Value {
        self.ctx.doc.property(node, name)
    }
}

impl TemplateHost for WidgetHost<'_, '_> {
    fn create_element(&mut self, tag: &str, namespace: Option<&str>) -> Result<NodeId> {
        match namespace {
            Some(ns) => Ok(self.ctx.doc.create_element_ns(ns, tag)),
            None => self.ctx.create_element(tag),
        }
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.ctx.doc.create_text(text)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.ctx.doc.append_child(parent, child);
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.ctx.doc.set_text(node, text);
    }

    fn set_class_component(&mut self, node: NodeId, classes: &str) {
        let registry = self.ctx.registry;
        self.ctx
            .doc
            .set_class_component(node, &registry.config().template_class_token, classes);
    }

    fn set_property(&mut self, node: NodeId, property: &PropInfo, value: Value) {
        self.ctx.doc.set_property(node, &property.name, value);
    }

    fn set_style(&mut self, node: NodeId, css: &str) {
        self.ctx.doc.set_style(node, css);
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.ctx.doc.set_attribute(node, name, value);
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) {
        self.ctx.doc.remove_attribute(node, name);
    }

    fn listen(&mut self, node: NodeId, event: &str, handler: &EventHandler) {
        let handler = match handler {
            EventHandler::Method(name) => Handler::Method {
                owner: self.instance,
                name: name.clone(),
            },
            EventHandler::Inline { body, .. } => Handler::Inline {
                owner: self.instance,
                body: body.clone(),
            },
        };
        self.ctx.on_handler(node, event, handler);
    }

    fn deliver(&mut self, node: NodeId) -> Result<()> {
        self.ctx.deliver(node)
    }

    fn bind_attach_point(&mut self, name: &str, node: NodeId) {
        self.ctx.doc.define_field(self.instance, name, Value::Node(node));
    }
}
