//! Events dispatched through the document.

use std::collections::BTreeMap;

use crate::dom::node::NodeId;
use crate::value::Value;

/// Dispatch phase an event is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// A DOM-style event.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub event_type: String,
    pub bubbles: bool,
    pub cancelable: bool,
    /// Payload for custom events.
    pub detail: Value,
    /// Node the event was dispatched on; set by dispatch.
    pub target: Option<NodeId>,
    /// Node whose listener is running; set by dispatch.
    pub current_target: Option<NodeId>,
    pub phase: Phase,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// A non-bubbling, non-cancelable event.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            bubbles: false,
            cancelable: false,
            detail: Value::Undefined,
            target: None,
            current_target: None,
            phase: Phase::None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// A bubbling, cancelable event, the default for widget `emit`.
    pub fn custom(event_type: impl Into<String>) -> Self {
        Self::new(event_type).with_bubbles(true).with_cancelable(true)
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Cancel the default action. Ignored for non-cancelable events.
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Stop propagation to further nodes.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    /// The event as seen by inline handler expressions (`event.type`,
    /// `event.detail`, `event.target`).
    pub fn to_value(&self) -> Value {
        let mut map = BTreeMap::new();
        map.insert("type".to_owned(), Value::from(self.event_type.as_str()));
        map.insert("detail".to_owned(), self.detail.clone());
        map.insert("bubbles".to_owned(), Value::Bool(self.bubbles));
        map.insert(
            "target".to_owned(),
            self.target.map(Value::Node).unwrap_or(Value::Null),
        );
        map.insert(
            "currentTarget".to_owned(),
            self.current_target.map(Value::Node).unwrap_or(Value::Null),
        );
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_events_bubble_and_cancel() {
        let mut ev = Event::custom("change").with_detail("x");
        assert!(ev.bubbles);
        ev.prevent_default();
        assert!(ev.default_prevented());
        assert_eq!(ev.detail, Value::from("x"));
    }

    #[test]
    fn plain_events_ignore_prevent_default() {
        let mut ev = Event::new("focus");
        assert!(!ev.bubbles);
        ev.prevent_default();
        assert!(!ev.default_prevented());
        ev.stop_propagation();
        assert!(ev.propagation_stopped());
    }

    #[test]
    fn value_view() {
        let ev = Event::new("click").with_detail(3);
        assert_eq!(ev.to_value().member("type"), Value::from("click"));
        assert_eq!(ev.to_value().member("detail"), Value::from(3));
        assert_eq!(ev.to_value().member("target"), Value::Null);
    }
}
