//! Activation tracking: which widgets are active (focused or touched),
//! across frame boundaries.

pub mod tracker;

pub use tracker::ActivationTracker;

use crate::dom::node::NodeId;
use crate::value::Value;

/// What caused a change of the active stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A pointer went down.
    Pointer,
    /// An element received focus.
    Focus,
}

impl Trigger {
    /// The `by` value carried by activation events: `"mouse"` for pointer
    /// triggers, `undefined` for focus.
    pub fn by(self) -> Value {
        match self {
            Trigger::Pointer => Value::from("mouse"),
            Trigger::Focus => Value::Undefined,
        }
    }
}

/// Notifications sent to tracker subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    Activated {
        widget: NodeId,
        trigger: Option<Trigger>,
    },
    Deactivated {
        widget: NodeId,
        trigger: Option<Trigger>,
    },
    /// The new active stack, outermost widget first.
    StackChanged { stack: Vec<NodeId> },
}

/// Returned by window registration; pass to
/// [`ActivationTracker::unregister`] or call [`FrameRegistration::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRegistration(pub(crate) u64);

impl FrameRegistration {
    /// Stop tracking events from the registered window.
    pub fn remove(&self, tracker: &mut ActivationTracker) -> bool {
        tracker.unregister(self)
    }
}
