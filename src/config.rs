//! TOML configuration for drawing, export and style settings
//!
//! Every section and field is optional; anything left out keeps its default.

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::export::ExportOptions;
use crate::layout::SessionConfig;
use crate::renderer::SvgConfig;

/// Errors that can occur when loading or parsing a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value {value} for '{key}' (must be {expected})")]
    Invalid {
        key: &'static str,
        value: f64,
        expected: &'static str,
    },
}

/// Check that `value` is finite and strictly positive
pub(crate) fn positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            value,
            expected: "finite and positive",
        })
    }
}

fn non_negative(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            value,
            expected: "finite and non-negative",
        })
    }
}

/// Settings read from a configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub drawing: DrawingSection,
    pub export: ExportSection,
    pub style: StyleSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DrawingSection {
    /// Default length of two-terminal elements
    pub unit: f64,
}

impl Default for DrawingSection {
    fn default() -> Self {
        Self {
            unit: SessionConfig::default().unit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSection {
    pub transparent: bool,
    pub dpi: f64,
}

impl Default for ExportSection {
    fn default() -> Self {
        let options = ExportOptions::default();
        Self {
            transparent: options.transparent,
            dpi: options.dpi,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleSection {
    pub stroke: String,
    pub stroke_width: f64,
    pub font_size: f64,
    pub font_family: String,
    pub background: String,
    pub padding: f64,
    pub inches_per_unit: f64,
    /// Empty string disables the prefix
    pub class_prefix: String,
}

impl Default for StyleSection {
    fn default() -> Self {
        let svg = SvgConfig::default();
        Self {
            stroke: svg.stroke,
            stroke_width: svg.stroke_width,
            font_size: svg.font_size,
            font_family: svg.font_family,
            background: svg.background,
            padding: svg.padding,
            inches_per_unit: svg.inches_per_unit,
            class_prefix: svg.class_prefix.unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Reject numeric settings that would produce degenerate geometry
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("drawing.unit", self.drawing.unit)?;
        positive("export.dpi", self.export.dpi)?;
        positive("style.inches_per_unit", self.style.inches_per_unit)?;
        positive("style.font_size", self.style.font_size)?;
        non_negative("style.stroke_width", self.style.stroke_width)?;
        non_negative("style.padding", self.style.padding)
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig::new().with_unit(self.drawing.unit)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::new()
            .with_transparent(self.export.transparent)
            .with_dpi(self.export.dpi)
    }

    pub fn svg(&self) -> SvgConfig {
        let style = &self.style;
        let config = SvgConfig::new()
            .with_stroke(style.stroke.clone())
            .with_stroke_width(style.stroke_width)
            .with_font_size(style.font_size)
            .with_font_family(style.font_family.clone())
            .with_background(style.background.clone())
            .with_padding(style.padding)
            .with_inches_per_unit(style.inches_per_unit);
        if style.class_prefix.is_empty() {
            config.without_class_prefix()
        } else {
            config.with_class_prefix(style.class_prefix.clone())
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    /// Load configuration from a TOML string
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
