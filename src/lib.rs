//! # delite
//!
//! Core of a custom-element widget library: templates with reactive
//! bindings, a registry that upgrades plain elements into widgets, and an
//! activation tracker that follows which widgets the user is working in.
//!
//! Everything runs against an in-memory document. Widgets declare
//! properties; writes to them are coalesced and delivered to the widget's
//! compiled template, which updates only the nodes that depend on the
//! changed properties.
//!
//! ## Core Systems
//!
//! - **[`template`]**: Markup reader, expression language, template parser and compiler
//! - **[`dom`]**: Slotmap-backed element arena with windows, classes and properties
//! - **[`widget`]**: Capabilities, composed definitions, lifecycle and attribute mapping
//! - **[`register`]**: Custom element registry, factories, upgrade and parse
//! - **[`event`]**: Event objects, listeners, capture/target/bubble dispatch
//! - **[`activation`]**: Active widget stack driven by pointer, focus and blur
//! - **[`context`]**: The document and registry handed to widget code
//! - **[`config`]** / **[`telemetry`]**: Tunables and log output
//! - **[`testing`]**: Headless harness and markup serialization

// Foundation
pub mod config;
pub mod error;
pub mod telemetry;
pub mod value;

// Core systems
pub mod dom;
pub mod template;

// Widget system
pub mod context;
pub mod register;
pub mod widget;

// Events and activation
pub mod activation;
pub mod event;

pub mod testing;

pub use activation::{ActivationTracker, FrameRegistration, TrackerEvent, Trigger};
pub use config::Config;
pub use context::Context;
pub use dom::{Document, NodeId, WindowId};
pub use error::{Error, Result};
pub use event::{Event, Handler, ListenerHandle};
pub use register::{Factory, RegisterError, Registry};
pub use template::{CompiledTemplate, Rendering, TemplateError};
pub use value::{Value, ValueKind};
pub use widget::{Capability, Definition, WidgetError};
