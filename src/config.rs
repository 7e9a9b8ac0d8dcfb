//! Tunables shared by the registry, widgets and the activation tracker.

use std::time::Duration;

/// Configuration for a widget runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// A blur this soon after a focus (or pointer-down) does not clear the
    /// active stack.
    pub blur_debounce: Duration,
    /// Class-merge token used for classes a widget's template puts on its
    /// root element.
    pub template_class_token: String,
    /// Class-merge token used for classes passed to a factory.
    pub user_class_token: String,
    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blur_debounce: Duration::from_millis(100),
            template_class_token: "template".into(),
            user_class_token: "user".into(),
            log_filter: "info".into(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blur_debounce(mut self, window: Duration) -> Self {
        self.blur_debounce = window;
        self
    }

    pub fn with_template_class_token(mut self, token: impl Into<String>) -> Self {
        self.template_class_token = token.into();
        self
    }

    pub fn with_user_class_token(mut self, token: impl Into<String>) -> Self {
        self.user_class_token = token.into();
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}

// ===========================================================================
// Tests
// ===========================================================================
