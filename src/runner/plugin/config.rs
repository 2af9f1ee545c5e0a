//! Engine configuration.

/// Knobs a host sets once when creating an engine.
///
/// ```
/// use walkjs::runner::plugin::config::EngineConfig;
///
/// let config = EngineConfig::default()
///     .with_strict(true)
///     .with_max_call_depth(64);
/// assert!(config.strict);
/// assert_eq!(config.max_call_depth, 64);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Evaluate every program as strict code, as if it began with `"use strict"`. Applies to
    /// pre-parsed trees too, except for strict-only early errors.
    pub strict: bool,
    /// Nested calls allowed before a `RangeError` is raised.
    pub max_call_depth: usize,
    /// Statement dispatches between two polls of the host interrupt handler.
    pub interrupt_check_interval: u32,
}

impl EngineConfig {
    pub fn new() -> Self {
        EngineConfig {
            strict: false,
            max_call_depth: 512,
            interrupt_check_interval: 1024,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// A value of 0 is treated as 1 (poll on every statement).
    pub fn with_interrupt_check_interval(mut self, interval: u32) -> Self {
        self.interrupt_check_interval = interval.max(1);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
