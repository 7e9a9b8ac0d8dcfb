//! Widget lifecycle: upgrade, created, attached, startup, delivery and destroy.
//!
//! ```text
//! plain element ──upgrade──▶ created ──(connected)──▶ attached ──parse──▶ started
//!                                │
//!                 property writes queue a delivery; flush() refreshes
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use super::attributes::{map_attributes, ParsedAttribute};
use super::definition::Definition;
use super::host::WidgetHost;
use super::state::WidgetState;
use crate::context::Context;
use crate::dom::node::NodeId;
use crate::error::{Error, Result};
use crate::event::message::Event;
use crate::template::runtime::{ChangeSet, Rendering};
use crate::value::Value;

/// What an element looked like before a creation attempt.
struct PlainState {
    attributes: Vec<(String, String)>,
    properties: HashMap<String, Value>,
    children: Vec<NodeId>,
}

impl Context<'_> {
    // ── Upgrade ──────────────────────────────────────────────────────

    /// Upgrade `node` if its tag (or `is` attribute) is registered.
    ///
    /// Returns `false` when the node is already upgraded or not registered.
    /// Connected nodes are attached right away.
    pub fn upgrade(&mut self, node: NodeId) -> Result<bool> {
        if self.doc.element(node).is_none_or(|el| el.upgraded) {
            return Ok(false);
        }
        let Some(definition) = self.registry.definition_for(self.doc, node) else {
            return Ok(false);
        };
        self.created_callback(node, definition)?;
        if self.doc.is_connected(node) {
            self.attach(node)?;
        }
        Ok(true)
    }

    /// Install `definition` on `node` and run its creation sequence: map
    /// declarative attributes, run created hooks, build the template, then
    /// apply the mapped attribute values.
    ///
    /// If mapping, a hook or the build fails, the node is returned to its
    /// plain state so a later upgrade can try again.
    pub(crate) fn created_callback(&mut self, node: NodeId, definition: Rc<Definition>) -> Result<()> {
        debug!(tag = %definition.tag, "creating widget");
        let Some(el) = self.doc.element(node) else {
            return Ok(());
        };
        let saved = PlainState {
            attributes: el.attributes.clone(),
            properties: el.properties.clone(),
            children: self.doc.children(node).to_vec(),
        };
        let Some(el) = self.doc.element_mut(node) else {
            return Ok(());
        };
        el.upgraded = true;
        for spec in definition.properties() {
            el.properties
                .entry(spec.name.clone())
                .or_insert_with(|| spec.default.clone());
        }
        el.widget = Some(Box::new(WidgetState::new(Rc::clone(&definition))));

        let parsed = match self.create_widget(node, &definition) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(tag = %definition.tag, error = %err, "creation failed, widget rolled back");
                self.restore_plain(node, saved);
                return Err(err);
            }
        };
        // Anything written so far is covered by the initial refresh.
        self.doc.take_pending(node);
        if let Some(widget) = self.doc.widget_mut(node) {
            widget.created = true;
        }
        self.doc.lifecycle.on_created(node);

        for attr in parsed {
            match attr {
                ParsedAttribute::Property { name, value } => {
                    self.set(node, &name, value);
                }
                ParsedAttribute::Listener { event, handler } => {
                    self.on_handler(node, &event, handler);
                }
            }
        }
        Ok(())
    }

    /// The fallible part of creation.
    fn create_widget(&mut self, node: NodeId, definition: &Definition) -> Result<Vec<ParsedAttribute>> {
        let parsed = map_attributes(self.doc, node, definition)?;
        for hook in &definition.created {
            hook(self, node)?;
        }
        self.render(node, definition)?;
        Ok(parsed)
    }

    /// Undo a failed creation: drop the widget state, detach anything the
    /// build appended and restore attributes and properties.
    fn restore_plain(&mut self, node: NodeId, saved: PlainState) {
        let built: Vec<NodeId> = self
            .doc
            .children(node)
            .iter()
            .copied()
            .filter(|child| !saved.children.contains(child))
            .collect();
        for child in built {
            self.doc.remove(child);
        }
        let token = self.registry.config().template_class_token.clone();
        self.doc.set_class_component(node, &token, "");
        if let Some(el) = self.doc.element_mut(node) {
            el.upgraded = false;
            el.widget = None;
            el.attributes = saved.attributes;
            el.properties = saved.properties;
        }
    }

    /// Build the template with the widget as root, then refresh every
    /// dependency once so bound content starts populated.
    fn render(&mut self, node: NodeId, definition: &Definition) -> Result<()> {
        let Some(template) = self.registry.template(definition)? else {
            return Ok(());
        };
        let all: ChangeSet = template.dependencies.iter().cloned().collect();
        let mut host = WidgetHost::new(self, node);
        let rendering = Rendering::build(&template, &mut host, Some(node))?;
        rendering.refresh(&mut host, &all)?;
        if let Some(widget) = self.doc.widget_mut(node) {
            widget.rendering = Some(Rc::new(rendering));
        }
        Ok(())
    }

    // ── Attach ───────────────────────────────────────────────────────

    /// Run the attached hooks of `node` once, then emit the non-bubbling
    /// `customelement-attached` event.
    pub fn attach(&mut self, node: NodeId) -> Result<()> {
        let definition = match self.doc.widget_mut(node) {
            Some(widget) if !widget.attached => {
                widget.attached = true;
                Rc::clone(&widget.definition)
            }
            _ => return Ok(()),
        };
        debug!(tag = %definition.tag, "attached");
        for hook in &definition.attached {
            hook(self, node)?;
        }
        self.doc.lifecycle.on_attached(node);
        self.dispatch(node, &mut Event::new("customelement-attached"));
        Ok(())
    }

    /// Append `child` to `parent`; when that connects the subtree, upgrade
    /// and attach the widgets inside it in document order.
    ///
    /// Fails with [`Error::HierarchyRequest`] when `child` is `parent` or
    /// one of its ancestors.
    pub fn insert(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.doc.append_child(parent, child) {
            return Err(Error::HierarchyRequest { parent, child });
        }
        if !self.doc.is_connected(child) {
            return Ok(());
        }
        for node in self.doc.tree().walk_depth_first(child) {
            if self.doc.is_widget(node) {
                self.attach(node)?;
            } else {
                self.upgrade(node)?;
            }
        }
        Ok(())
    }

    // ── Startup ──────────────────────────────────────────────────────

    /// Run startup on `node` and then on the custom elements it contains.
    /// Widgets already started are skipped.
    pub fn startup(&mut self, node: NodeId) -> Result<()> {
        let definition = match self.doc.widget_mut(node) {
            Some(widget) if !widget.started => {
                widget.started = true;
                Rc::clone(&widget.definition)
            }
            _ => return Ok(()),
        };
        for hook in &definition.startup {
            hook(self, node)?;
        }
        self.doc.lifecycle.on_started(node);
        for child in self.find_custom_elements(node) {
            self.startup(child)?;
        }
        Ok(())
    }

    // ── Delivery ─────────────────────────────────────────────────────

    /// Synchronously refresh `node` for its pending property changes, then
    /// run its refresh hooks.
    pub fn deliver(&mut self, node: NodeId) -> Result<()> {
        let changed = self.doc.take_pending(node);
        if changed.is_empty() {
            return Ok(());
        }
        let Some((definition, rendering)) = self
            .doc
            .widget(node)
            .map(|w| (Rc::clone(&w.definition), w.rendering.clone()))
        else {
            return Ok(());
        };
        if let Some(rendering) = rendering {
            rendering.refresh(&mut WidgetHost::new(self, node), &changed)?;
        }
        for hook in &definition.refresh {
            hook(self, node, &changed)?;
        }
        Ok(())
    }

    /// Deliver every widget with pending changes, including widgets dirtied
    /// by the deliveries themselves. Returns the number of deliveries.
    pub fn flush(&mut self) -> Result<usize> {
        let mut delivered = 0;
        while let Some(node) = self.doc.next_dirty() {
            self.deliver(node)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    // ── Destroy ──────────────────────────────────────────────────────

    /// Destroy the custom elements inside `node`, then `node` itself, and
    /// detach it from its parent.
    pub fn destroy(&mut self, node: NodeId) -> Result<()> {
        for child in self.find_custom_elements(node) {
            self.destroy(child)?;
        }
        let definition = match self.doc.widget_mut(node) {
            Some(widget) if !widget.destroyed => {
                widget.destroyed = true;
                Some(Rc::clone(&widget.definition))
            }
            _ => None,
        };
        if let Some(definition) = definition {
            debug!(tag = %definition.tag, "destroying widget");
            for hook in &definition.destroyed {
                hook(self, node)?;
            }
            self.doc.lifecycle.on_destroyed(node);
        }
        self.doc.detach(node);
        Ok(())
    }

    /// The outermost widgets under `root`: descendants are searched, but not
    /// below a widget.
    pub fn find_custom_elements(&self, root: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.doc.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.doc.is_widget(node) {
                found.push(node);
            } else {
                stack.extend(self.doc.children(node).iter().rev().copied());
            }
        }
        found
    }
}

// ===========================================================================
// Tests
// ===========================================================================
