//! Per-instance widget state and the lifecycle event log.
//!
//! `WidgetState` hangs off an upgraded element. The `LifecycleTracker` keeps
//! the set of live widgets (created and not yet destroyed) and accumulates
//! lifecycle events that can be drained by hosts and tests.

use std::collections::HashSet;
use std::rc::Rc;

use super::definition::Definition;
use crate::dom::node::NodeId;
use crate::template::runtime::{ChangeSet, Rendering};

// ---------------------------------------------------------------------------
// WidgetState
// ---------------------------------------------------------------------------

/// State of an upgraded element.
#[derive(Debug)]
pub struct WidgetState {
    pub definition: Rc<Definition>,
    /// Declared properties written since the last delivery.
    pub pending: ChangeSet,
    /// Set once the created hooks have run and the template is built.
    pub created: bool,
    pub attached: bool,
    pub started: bool,
    pub destroyed: bool,
    /// The built template, if the definition has one.
    pub rendering: Option<Rc<Rendering>>,
}

impl WidgetState {
    pub fn new(definition: Rc<Definition>) -> Self {
        Self {
            definition,
            pending: ChangeSet::new(),
            created: false,
            attached: false,
            started: false,
            destroyed: false,
            rendering: None,
        }
    }
}

// ---------------------------------------------------------------------------
// LifecycleEvent
// ---------------------------------------------------------------------------

/// Events that occur during the widget lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Created hooks ran and the template was built.
    Created { node_id: NodeId },
    /// The widget was attached to a window.
    Attached { node_id: NodeId },
    /// Startup ran.
    Started { node_id: NodeId },
    /// The widget was destroyed.
    Destroyed { node_id: NodeId },
}

// ---------------------------------------------------------------------------
// LifecycleTracker
// ---------------------------------------------------------------------------

/// Tracks which widgets are live and accumulates lifecycle events.
#[derive(Debug)]
pub struct LifecycleTracker {
    live: HashSet<NodeId>,
    pending: Vec<LifecycleEvent>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self {
            live: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Record that a widget was created. No duplicate event for a live node.
    pub fn on_created(&mut self, id: NodeId) {
        if self.live.insert(id) {
            self.pending.push(LifecycleEvent::Created { node_id: id });
        }
    }

    /// Record an attach. Ignored for nodes that are not live.
    pub fn on_attached(&mut self, id: NodeId) {
        if self.live.contains(&id) {
            self.pending.push(LifecycleEvent::Attached { node_id: id });
        }
    }

    /// Record a startup. Ignored for nodes that are not live.
    pub fn on_started(&mut self, id: NodeId) {
        if self.live.contains(&id) {
            self.pending.push(LifecycleEvent::Started { node_id: id });
        }
    }

    /// Record that a widget was destroyed.
    ///
    /// If the node was not live, this is a no-op (no spurious event).
    pub fn on_destroyed(&mut self, id: NodeId) {
        if self.live.remove(&id) {
            self.pending.push(LifecycleEvent::Destroyed { node_id: id });
        }
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.live.contains(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Drain and return all pending lifecycle events.
    pub fn pending_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Clear all state (live nodes and pending events).
    pub fn clear(&mut self) {
        self.live.clear();
        self.pending.clear();
    }
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
