//! Headless testing support: a [`Harness`] that drives a document, registry
//! and activation tracker together, and markup serialization for snapshot
//! assertions.

pub mod harness;
pub mod serialize;

pub use harness::Harness;
pub use serialize::{inner_html, outer_html};
