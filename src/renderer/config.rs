//! Configuration for SVG rendering

/// Configuration options for SVG output
#[derive(Debug, Clone, PartialEq)]
pub struct SvgConfig {
    /// Stroke and fill color for symbols, wires and dots
    pub stroke: String,

    /// Line width in drawing units
    pub stroke_width: f64,

    /// Label font size in drawing units
    pub font_size: f64,

    pub font_family: String,

    /// Fill behind the drawing when not exporting transparent
    pub background: String,

    /// Padding around the drawing extent, in drawing units
    pub padding: f64,

    /// Physical size of one drawing unit; with the dpi this sets pixel size
    pub inches_per_unit: f64,

    /// Whether to include the XML declaration
    pub standalone: bool,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Prefix for CSS class names (e.g., "sch-" for "sch-wire")
    pub class_prefix: Option<String>,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            stroke: "#000000".to_string(),
            stroke_width: 0.04,
            font_size: 0.35,
            font_family: "sans-serif".to_string(),
            background: "#ffffff".to_string(),
            padding: 0.5,
            inches_per_unit: 0.5,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("sch-".to_string()),
        }
    }
}

impl SvgConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stroke(mut self, stroke: impl Into<String>) -> Self {
        self.stroke = stroke.into();
        self
    }

    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    /// Set the padding around the drawing
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_inches_per_unit(mut self, inches: f64) -> Self {
        self.inches_per_unit = inches;
        self
    }

    /// Set whether output is standalone
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    /// Set the CSS class prefix
    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    /// Remove the CSS class prefix
    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }
}
