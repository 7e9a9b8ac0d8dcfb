//! Events: the event type, listeners and capture/bubble dispatch.

pub mod dispatch;
pub mod handler;
pub mod message;

pub use handler::{capture_mapping, propagation_path, Callback, Handler, Listener, ListenerHandle, ListenerId};
pub use message::{Event, Phase};
