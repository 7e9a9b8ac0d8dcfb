//! Capture/target/bubble dispatch and the widget-facing `emit`/`on` API.

use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{trace, warn};

use super::handler::{capture_mapping, propagation_path, Handler, ListenerHandle};
use super::message::{Event, Phase};
use crate::context::Context;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::{Error, Result};
use crate::template::expr::{Scope, Stmt};
use crate::value::Value;
use crate::widget::WidgetError;

/// Evaluation scope of inline template handlers: `this` is the owning widget
/// and `event` the event being handled.
struct HandlerScope<'d> {
    doc: &'d Document,
    owner: NodeId,
    event: Value,
}

impl Scope for HandlerScope<'_> {
    fn this_value(&self) -> Value {
        Value::Node(self.owner)
    }

    fn node_property(&self, node: NodeId, name: &str) -> Value {
        self.doc.property(node, name)
    }

    fn variable(&self, name: &str) -> Value {
        match name {
            "event" => self.event.clone(),
            _ => Value::Undefined,
        }
    }
}

impl Context<'_> {
    // ── Registration ─────────────────────────────────────────────────

    /// Listen for `event_type` on `node` with a Rust closure.
    ///
    /// `focusin`/`focusout` (and `focus`/`blur`) are registered as capturing
    /// `focus`/`blur` listeners.
    pub fn on<F>(&mut self, node: NodeId, event_type: &str, f: F) -> ListenerHandle
    where
        F: Fn(&mut Context<'_>, &mut Event) -> Result<()> + 'static,
    {
        self.on_handler(node, event_type, Handler::Callback(Rc::new(f)))
    }

    /// Listen for `event_type` on `node` with any handler.
    pub fn on_handler(&mut self, node: NodeId, event_type: &str, handler: Handler) -> ListenerHandle {
        let (event_type, capture) = capture_mapping(event_type);
        self.doc.add_listener(node, event_type, capture, handler)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Emit a bubbling, cancelable custom event on `node`.
    ///
    /// Returns `false` if a listener called `prevent_default`.
    pub fn emit(&mut self, node: NodeId, event_type: &str, detail: impl Into<Value>) -> bool {
        let mut event = Event::custom(event_type).with_detail(detail);
        self.dispatch(node, &mut event)
    }

    /// Dispatch `event` at `target`: capture listeners from the top down,
    /// then every listener on the target, then bubble listeners upwards when
    /// the event bubbles.
    ///
    /// Handler errors do not abort dispatch; they are logged and re-emitted as
    /// a bubbling `error` event on the target. Returns `false` if the default
    /// action was prevented.
    pub fn dispatch(&mut self, target: NodeId, event: &mut Event) -> bool {
        let path = propagation_path(self.doc, target);
        if path.is_empty() {
            return true;
        }
        event.target = Some(target);
        trace!(event = %event.event_type, path = path.len(), "dispatch");

        event.phase = Phase::Capturing;
        for &node in path[1..].iter().rev() {
            self.run_listeners(node, event, Some(true));
            if event.propagation_stopped() {
                return self.finish(event);
            }
        }

        event.phase = Phase::AtTarget;
        self.run_listeners(target, event, None);

        if event.bubbles && !event.propagation_stopped() {
            event.phase = Phase::Bubbling;
            for &node in &path[1..] {
                self.run_listeners(node, event, Some(false));
                if event.propagation_stopped() {
                    break;
                }
            }
        }
        self.finish(event)
    }

    fn finish(&mut self, event: &mut Event) -> bool {
        event.phase = Phase::None;
        event.current_target = None;
        !event.default_prevented()
    }

    /// Run the listeners of `node` for this event. `capture` filters by
    /// phase; `None` runs all of them.
    fn run_listeners(&mut self, node: NodeId, event: &mut Event, capture: Option<bool>) {
        let listeners = self.doc.listeners(node);
        for listener in listeners {
            if listener.event_type != event.event_type {
                continue;
            }
            if capture.is_some_and(|c| c != listener.capture) {
                continue;
            }
            // Removed by an earlier listener of this dispatch.
            if !self
                .doc
                .element(node)
                .is_some_and(|el| el.listeners.iter().any(|l| l.id == listener.id))
            {
                continue;
            }
            event.current_target = Some(node);
            if let Err(err) = self.invoke_handler(&listener.handler, event) {
                self.report(event, err);
            }
        }
    }

    fn report(&mut self, event: &Event, err: Error) {
        warn!(event = %event.event_type, error = %err, "event handler failed");
        let Some(target) = event.target else {
            return;
        };
        if event.event_type == "error" {
            return;
        }
        let mut detail = BTreeMap::new();
        detail.insert("message".to_owned(), Value::from(err.to_string()));
        detail.insert("event".to_owned(), Value::from(event.event_type.as_str()));
        let mut error = Event::new("error").with_bubbles(true).with_detail(Value::Object(detail));
        self.dispatch(target, &mut error);
    }

    fn invoke_handler(&mut self, handler: &Handler, event: &mut Event) -> Result<()> {
        match handler {
            Handler::Method { owner, name } => self.invoke(*owner, name, event),
            Handler::Inline { owner, body } => self.run_inline(*owner, body, event),
            Handler::Callback(callback) => callback(self, event),
        }
    }

    /// Call the widget method `method` of `node`.
    pub fn invoke(&mut self, node: NodeId, method: &str, event: &mut Event) -> Result<()> {
        let found = self
            .doc
            .widget(node)
            .and_then(|w| w.definition.method(method));
        match found {
            Some(m) => m(self, node, event),
            None => Err(WidgetError::UnknownMethod {
                tag: self.doc.tag(node).unwrap_or_default().to_owned(),
                method: method.to_owned(),
            }
            .into()),
        }
    }

    fn run_inline(&mut self, owner: NodeId, body: &[Stmt], event: &mut Event) -> Result<()> {
        for stmt in body {
            match stmt {
                Stmt::Assign { property, value } => {
                    let value = value.evaluate(&HandlerScope {
                        doc: &*self.doc,
                        owner,
                        event: event.to_value(),
                    });
                    self.set(owner, property, value);
                }
                Stmt::Call { method } => self.invoke(owner, method, event)?,
                Stmt::Expr(expr) => {
                    expr.evaluate(&HandlerScope {
                        doc: &*self.doc,
                        owner,
                        event: event.to_value(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
