//! SVG generation from resolved drawings

use crate::export::ExportOptions;
use crate::layout::{BoundingBox, Drawing, Element, Point, Stroke, TextAnchor};

use super::SvgConfig;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    styles: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            styles: vec![],
            elements: vec![],
            indent: 1,
        }
    }

    fn prefix(&self) -> String {
        self.config.class_prefix.clone().unwrap_or_default()
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Add the class rules shared by every element
    pub fn add_default_styles(&mut self) {
        let p = self.prefix();
        let c = &self.config;
        self.styles.push(format!(
            ".{p}stroke {{ fill: none; stroke: {}; stroke-width: {}; stroke-linecap: round; stroke-linejoin: round; }}",
            c.stroke,
            num(c.stroke_width)
        ));
        self.styles.push(format!(
            ".{p}fill {{ fill: {}; stroke: none; }}",
            c.stroke
        ));
        self.styles.push(format!(
            ".{p}hollow {{ fill: {}; stroke: {}; stroke-width: {}; }}",
            c.background,
            c.stroke,
            num(c.stroke_width)
        ));
        self.styles.push(format!(
            ".{p}label {{ font-family: {}; font-size: {}px; fill: {}; }}",
            c.font_family,
            num(c.font_size),
            c.stroke
        ));
    }

    /// Add a background rectangle covering the viewBox
    pub fn add_background(&mut self, viewbox: &BoundingBox) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<rect class="{}background" x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            self.indent_str(),
            prefix,
            num(viewbox.x),
            num(-viewbox.top()),
            num(viewbox.width),
            num(viewbox.height),
            self.config.background
        ));
    }

    /// Add an open polyline
    pub fn add_polyline(&mut self, points: &[Point], styles: &str) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<polyline class="{}stroke" points="{}"{}/>"#,
            self.indent_str(),
            prefix,
            points_attr(points),
            styles
        ));
    }

    /// Add a filled polygon
    pub fn add_polygon(&mut self, points: &[Point], styles: &str) {
        let prefix = self.prefix();
        self.elements.push(format!(
            r#"{}<polygon class="{}fill" points="{}"{}/>"#,
            self.indent_str(),
            prefix,
            points_attr(points),
            styles
        ));
    }

    /// Add a circle, filled or hollow
    pub fn add_circle(&mut self, center: Point, r: f64, filled: bool, styles: &str) {
        let prefix = self.prefix();
        let class = if filled { "fill" } else { "hollow" };
        self.elements.push(format!(
            r#"{}<circle class="{}{}" cx="{}" cy="{}" r="{}"{}/>"#,
            self.indent_str(),
            prefix,
            class,
            num(center.x),
            num(-center.y),
            num(r),
            styles
        ));
    }

    /// Add a text label centered vertically on `position`
    pub fn add_text(&mut self, text: &str, position: Point, anchor: &TextAnchor) {
        let prefix = self.prefix();
        let anchor_str = match anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };

        self.elements.push(format!(
            r#"{}<text class="{}label" x="{}" y="{}" text-anchor="{}" dominant-baseline="middle">{}</text>"#,
            self.indent_str(),
            prefix,
            num(position.x),
            num(-position.y),
            anchor_str,
            escape_xml(&label_text(text))
        ));
    }

    /// Start a group element
    pub fn start_group(&mut self, id: Option<&str>, classes: &[String]) {
        let prefix = self.prefix();
        let id_attr = id
            .map(|i| format!(r#" id="{}""#, escape_xml(i)))
            .unwrap_or_default();
        let class_list = std::iter::once(format!("{}element", prefix))
            .chain(classes.iter().map(|c| format!("{}{}", prefix, c)))
            .collect::<Vec<_>>()
            .join(" ");
        self.elements.push(format!(
            r#"{}<g{} class="{}">"#,
            self.indent_str(),
            id_attr,
            class_list
        ));
        self.indent += 1;
    }

    /// End a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1).max(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Assemble the document; `viewbox` is in drawing units, y up
    pub fn build(self, viewbox: BoundingBox, width: f64, height: f64) -> String {
        let nl = self.newline();

        let mut svg = String::new();

        // XML declaration for standalone
        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        // The y axis is flipped: drawing y up becomes SVG y down
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
            num(width),
            num(height),
            num(viewbox.x),
            num(-viewbox.top()),
            num(viewbox.width),
            num(viewbox.height)
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");
        svg.push_str(nl);
        svg
    }
}

/// Render a drawing to an SVG string
pub fn render_svg(drawing: &Drawing, config: &SvgConfig, options: &ExportOptions) -> String {
    let viewbox = drawing.bounds().inflate(config.padding);
    let scale = config.inches_per_unit * options.dpi;
    let (width, height) = (viewbox.width * scale, viewbox.height * scale);

    let mut builder = SvgBuilder::new(config.clone());
    builder.add_default_styles();
    if !options.transparent {
        builder.add_background(&viewbox);
    }

    for element in &drawing.elements {
        // A rebound name only identifies its newest element
        let id = element
            .name
            .as_deref()
            .filter(|name| drawing.get(name).map(|e| e.id) == Some(element.id));
        render_element(element, id, &mut builder);
    }

    builder.build(viewbox, width, height)
}

fn render_element(element: &Element, id: Option<&str>, builder: &mut SvgBuilder) {
    builder.start_group(id, &[element.kind.keyword().to_string()]);

    let stroke_style = stroke_styles(element);
    let fill_style = fill_styles(element);

    for stroke in &element.strokes {
        match stroke {
            Stroke::Polyline(points) => builder.add_polyline(points, &stroke_style),
            Stroke::Polygon(points) => builder.add_polygon(points, &fill_style),
            Stroke::Circle {
                center,
                radius,
                filled,
            } => {
                let style = if *filled { &fill_style } else { &stroke_style };
                builder.add_circle(*center, *radius, *filled, style);
            }
        }
    }

    for dot in &element.dots {
        let style = if dot.open { &stroke_style } else { &fill_style };
        builder.add_circle(dot.position, crate::layout::DOT_RADIUS, !dot.open, style);
    }

    for label in &element.labels {
        builder.add_text(&label.text, label.position, &label.anchor);
    }

    builder.end_group();
}

/// Inline overrides for stroked primitives
fn stroke_styles(element: &Element) -> String {
    let mut parts = vec![];
    if let Some(color) = &element.options.color {
        parts.push(format!("stroke: {}", color));
    }
    if let Some(width) = element.options.line_width {
        parts.push(format!("stroke-width: {}", num(width)));
    }
    style_attr(&parts)
}

/// Inline overrides for filled primitives
fn fill_styles(element: &Element) -> String {
    match &element.options.color {
        Some(color) => style_attr(&[format!("fill: {}", color)]),
        None => String::new(),
    }
}

fn style_attr(parts: &[String]) -> String {
    if parts.is_empty() {
        String::new()
    } else {
        format!(r#" style="{}""#, escape_xml(&parts.join("; ")))
    }
}

/// Points attribute with the y axis flipped
fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", num(p.x), num(-p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a coordinate with bounded precision and no negative zero
fn num(v: f64) -> String {
    let rounded = (v * 10_000.0).round() / 10_000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

/// Turn math-mode label source into plain text
fn label_text(s: &str) -> String {
    s.replace('$', "")
        .replace("\\Omega", "\u{03A9}")
        .replace("\\mu", "\u{03BC}")
        .replace(['{', '}'], "")
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
