//! Configuration for a layout session

use crate::config::{positive, ConfigError};

/// Default element length, matching the drawing library's unit
pub const DEFAULT_UNIT: f64 = 3.0;

/// Configuration options for a layout session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Length of two-terminal elements when none is given
    pub unit: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { unit: DEFAULT_UNIT }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting unit length
    pub fn with_unit(mut self, unit: f64) -> Self {
        self.unit = unit;
        self
    }

    /// The unit must be finite and positive, like a `unit` statement
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("drawing.unit", self.unit)
    }
}
