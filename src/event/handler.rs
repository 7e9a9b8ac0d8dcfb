//! Listeners, handlers and propagation paths.

use std::fmt;
use std::rc::Rc;

use super::message::Event;
use crate::context::Context;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::Result;
use crate::template::expr::Stmt;

/// A Rust closure listening for events.
pub type Callback = Rc<dyn Fn(&mut Context<'_>, &mut Event) -> Result<()>>;

/// Identifies a listener within the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// What runs when a listener fires.
#[derive(Clone)]
pub enum Handler {
    /// A method of the widget `owner`, looked up when the event fires.
    Method { owner: NodeId, name: String },
    /// Inline template statements with `this` bound to `owner`.
    Inline { owner: NodeId, body: Rc<[Stmt]> },
    Callback(Callback),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Method { owner, name } => f
                .debug_struct("Method")
                .field("owner", owner)
                .field("name", name)
                .finish(),
            Handler::Inline { owner, body } => f
                .debug_struct("Inline")
                .field("owner", owner)
                .field("statements", &body.len())
                .finish(),
            Handler::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// A registered listener.
#[derive(Debug, Clone)]
pub struct Listener {
    pub id: ListenerId,
    pub event_type: String,
    /// Runs during the capture phase rather than the bubble phase.
    pub capture: bool,
    pub handler: Handler,
}

/// Returned by listener registration; removes the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerHandle {
    pub node: NodeId,
    pub id: ListenerId,
}

impl ListenerHandle {
    /// Unregister the listener. Returns `true` if it was still registered.
    pub fn remove(&self, doc: &mut Document) -> bool {
        doc.remove_listener(self)
    }
}

/// Compute the propagation path from `target` up to the top (inclusive).
///
/// Returns `[target, parent, grandparent, ...]`, or an empty vec if `target`
/// does not exist.
pub fn propagation_path(doc: &Document, target: NodeId) -> Vec<NodeId> {
    if !doc.contains(target) {
        return Vec::new();
    }
    let mut path = vec![target];
    path.extend(doc.tree().ancestors(target));
    path
}

/// Map an event type to the type and phase actually listened for.
///
/// `focusin`/`focusout` do not bubble here; listening for them means
/// capturing `focus`/`blur` instead.
pub fn capture_mapping(event_type: &str) -> (&str, bool) {
    match event_type {
        "focusin" | "focus" => ("focus", true),
        "focusout" | "blur" => ("blur", true),
        other => (other, false),
    }
}
