//! The activation tracker state machine.
//!
//! Pointer-down and focus compute a new active stack from the target's
//! ancestors; blur arms a deferred clear of the stack unless it arrives
//! right after a pointer-down or focus. Stack changes deactivate the old
//! entries innermost first, then activate the new ones outermost first.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use super::{FrameRegistration, TrackerEvent, Trigger};
use crate::config::Config;
use crate::context::Context;
use crate::dom::document::Document;
use crate::dom::node::{NodeId, WindowId};
use crate::event::message::Event;
use crate::value::Value;

/// Upper bound on ancestor-walk steps; popup parents can form cycles.
const MAX_WALK_STEPS: usize = 4096;

#[derive(Debug, Clone)]
struct WindowEntry {
    registration: FrameRegistration,
    window: WindowId,
    /// Stands in for every event target inside the window.
    effective_node: Option<NodeId>,
}

/// Tracks the stack of active widgets.
#[derive(Debug)]
pub struct ActivationTracker {
    blur_debounce: Duration,
    active_stack: Vec<NodeId>,
    /// Due time of the deferred stack clear armed by a blur.
    pending_clear: Option<Instant>,
    last_focus: Option<Instant>,
    last_pointer_or_focus: Option<Instant>,
    windows: Vec<WindowEntry>,
    next_registration: u64,
    subscribers: Vec<UnboundedSender<TrackerEvent>>,
}

impl ActivationTracker {
    /// A tracker with no windows registered.
    pub fn new(config: &Config) -> Self {
        Self {
            blur_debounce: config.blur_debounce,
            active_stack: Vec::new(),
            pending_clear: None,
            last_focus: None,
            last_pointer_or_focus: None,
            windows: Vec::new(),
            next_registration: 0,
            subscribers: Vec::new(),
        }
    }

    /// A tracker listening to the document's main window.
    pub fn for_document(doc: &Document, config: &Config) -> Self {
        let mut tracker = Self::new(config);
        tracker.register_window(doc.main_window(), None);
        tracker
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Track events in `window`. With an `effective_node`, every event in the
    /// window is treated as if it targeted that node.
    pub fn register_window(&mut self, window: WindowId, effective_node: Option<NodeId>) -> FrameRegistration {
        let registration = FrameRegistration(self.next_registration);
        self.next_registration += 1;
        self.windows.push(WindowEntry {
            registration,
            window,
            effective_node,
        });
        registration
    }

    /// Track events in the content window of `iframe`, attributing them to
    /// the `<iframe>` element.
    pub fn register_frame(&mut self, doc: &Document, iframe: NodeId) -> Option<FrameRegistration> {
        let window = doc.window_for_frame(iframe)?;
        Some(self.register_window(window, Some(iframe)))
    }

    pub fn unregister(&mut self, registration: &FrameRegistration) -> bool {
        let before = self.windows.len();
        self.windows.retain(|w| w.registration != *registration);
        before != self.windows.len()
    }

    /// Receive every subsequent activation, deactivation and stack change.
    pub fn subscribe(&mut self) -> UnboundedReceiver<TrackerEvent> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Active widgets, outermost first.
    pub fn active_stack(&self) -> &[NodeId] {
        &self.active_stack
    }

    pub fn has_pending_clear(&self) -> bool {
        self.pending_clear.is_some()
    }

    // ── Input ────────────────────────────────────────────────────────

    /// A pointer went down on `target`.
    pub fn pointer_down(&mut self, ctx: &mut Context<'_>, target: NodeId) {
        let Some(node) = self.resolve(ctx.doc, target) else {
            return;
        };
        if ctx.doc.parent(node).is_none() && ctx.doc.window_of_body(node).is_none() {
            debug!("pointer down on orphan node ignored");
            return;
        }
        self.pointer_or_focus(ctx, node, Trigger::Pointer);
    }

    /// `target` received focus.
    pub fn focus(&mut self, ctx: &mut Context<'_>, target: NodeId) {
        let Some(node) = self.resolve(ctx.doc, target) else {
            return;
        };
        if node == target && (ctx.doc.window_of_body(node).is_some() || ctx.doc.tag(node).is_none()) {
            return;
        }
        self.last_focus = Some(Instant::now());
        self.pointer_or_focus(ctx, node, Trigger::Focus);
    }

    /// `target` lost focus.
    pub fn blur(&mut self, ctx: &mut Context<'_>, target: NodeId) {
        if self.resolve(ctx.doc, target).is_none() {
            return;
        }
        let now = Instant::now();
        if within(self.last_focus, now, self.blur_debounce) {
            return;
        }
        self.pending_clear = None;
        if within(self.last_pointer_or_focus, now, self.blur_debounce) {
            return;
        }
        debug!("blur: clearing active stack on next tick");
        self.pending_clear = Some(now);
    }

    /// Run the deferred clear if one is due. Returns `true` if it ran.
    pub fn run_deferred(&mut self, ctx: &mut Context<'_>) -> bool {
        match self.pending_clear {
            Some(due) if due <= Instant::now() => {
                self.pending_clear = None;
                self.set_stack(ctx, Vec::new(), None);
                true
            }
            _ => false,
        }
    }

    /// Wait until the deferred clear is due, then run it.
    pub async fn settle(&mut self, ctx: &mut Context<'_>) -> bool {
        if let Some(due) = self.pending_clear {
            sleep_until(due).await;
        }
        self.run_deferred(ctx)
    }

    /// The node an event on `target` is attributed to, or `None` if the
    /// target's window is not tracked.
    fn resolve(&self, doc: &Document, target: NodeId) -> Option<NodeId> {
        if !doc.contains(target) {
            debug!("event on a removed node ignored");
            return None;
        }
        let window = doc.window_of_body(doc.tree().top(target))?;
        let entry = self.windows.iter().find(|w| w.window == window)?;
        Some(entry.effective_node.unwrap_or(target))
    }

    fn pointer_or_focus(&mut self, ctx: &mut Context<'_>, node: NodeId, trigger: Trigger) {
        self.last_pointer_or_focus = Some(Instant::now());
        self.pending_clear = None;
        let stack = self.widget_ancestors(ctx.doc, node, trigger);
        self.set_stack(ctx, stack, Some(trigger));
    }

    /// Widgets from the outermost down to `node`, following popup parents
    /// and crossing from frame bodies to their host elements.
    ///
    /// Never fails: a removed node or a runaway walk ends it early.
    fn widget_ancestors(&self, doc: &Document, node: NodeId, trigger: Trigger) -> Vec<NodeId> {
        let mut stack = Vec::new();
        let mut current = Some(node);
        let mut steps = 0;
        while let Some(node) = current {
            steps += 1;
            if steps > MAX_WALK_STEPS {
                debug!("ancestor walk exceeded step limit");
                break;
            }
            if !doc.contains(node) {
                debug!("ancestor walk reached a removed node");
                break;
            }
            if let Some(popup_parent) = doc.popup_parent(node) {
                current = Some(popup_parent);
                continue;
            }
            if let Some(window) = doc.window_of_body(node) {
                if window == doc.main_window() {
                    break;
                }
                current = self.frame_host(doc, window);
                continue;
            }
            let disabled = trigger == Trigger::Pointer && doc.property(node, "disabled").truthy();
            if doc.is_widget(node) && !disabled {
                stack.push(node);
            }
            current = doc.parent(node);
        }
        stack.reverse();
        stack
    }

    fn frame_host(&self, doc: &Document, window: WindowId) -> Option<NodeId> {
        self.windows
            .iter()
            .find(|w| w.window == window)
            .and_then(|w| w.effective_node)
            .or_else(|| doc.frame_element(window))
    }

    // ── Stack changes ────────────────────────────────────────────────

    /// Replace the active stack.
    ///
    /// Nothing happens if the innermost entry is unchanged. Otherwise old
    /// entries are deactivated from the innermost down to where the stacks
    /// diverge, new entries activated from there outwards, and subscribers
    /// get the new stack last.
    pub fn set_stack(&mut self, ctx: &mut Context<'_>, stack: Vec<NodeId>, trigger: Option<Trigger>) {
        if stack.last() == self.active_stack.last() {
            return;
        }
        let old = std::mem::replace(&mut self.active_stack, stack.clone());
        debug!(old = old.len(), new = stack.len(), "active stack changed");

        let mut common = old.len();
        while common > 0 && old.get(common - 1) != stack.get(common - 1) {
            common -= 1;
            let widget = old[common];
            self.notify(ctx, "delite-deactivated", widget, trigger);
            self.send(TrackerEvent::Deactivated { widget, trigger });
        }
        for &widget in &stack[common.min(stack.len())..] {
            self.notify(ctx, "delite-activated", widget, trigger);
            self.send(TrackerEvent::Activated { widget, trigger });
        }
        self.send(TrackerEvent::StackChanged { stack });
    }

    fn notify(&self, ctx: &mut Context<'_>, event_type: &str, widget: NodeId, trigger: Option<Trigger>) {
        let mut detail = BTreeMap::new();
        detail.insert(
            "by".to_owned(),
            trigger.map(Trigger::by).unwrap_or_default(),
        );
        let mut event = Event::new(event_type).with_detail(Value::Object(detail));
        ctx.dispatch(widget, &mut event);
    }

    fn send(&mut self, event: TrackerEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

fn within(last: Option<Instant>, now: Instant, window: Duration) -> bool {
    last.is_some_and(|t| now < t + window)
}

// ===========================================================================
// Tests
// ===========================================================================
