//! Core types for the layout engine

use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use crate::parser::ast::ElementKind;

use super::transform::Transform;

/// A 2D point in drawing units, y pointing up
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn mid(a: Point, b: Point) -> Point {
        Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Direction of this vector in degrees, normalized to [0, 360)
    pub fn angle(&self) -> f64 {
        match (self.x, self.y) {
            (x, y) if y == 0.0 && x >= 0.0 => 0.0,
            (x, y) if y == 0.0 && x < 0.0 => 180.0,
            (x, y) if x == 0.0 && y > 0.0 => 90.0,
            (x, y) if x == 0.0 && y < 0.0 => 270.0,
            (x, y) => normalize_angle(y.atan2(x).to_degrees()),
        }
    }

    /// Rotate about the origin, counter-clockwise in degrees.
    ///
    /// Quarter turns are exact so axis-aligned layouts stay bit-identical.
    pub fn rotated(self, theta: f64) -> Point {
        let theta = normalize_angle(theta);
        if theta == 0.0 {
            self
        } else if theta == 90.0 {
            Point::new(-self.y, self.x)
        } else if theta == 180.0 {
            Point::new(-self.x, -self.y)
        } else if theta == 270.0 {
            Point::new(self.y, -self.x)
        } else {
            let (sin, cos) = theta.to_radians().sin_cos();
            Point::new(
                self.x * cos - self.y * sin,
                self.x * sin + self.y * cos,
            )
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, k: f64) -> Point {
        Point::new(self.x / k, self.y / k)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Map any angle in degrees to [0, 360)
pub fn normalize_angle(theta: f64) -> f64 {
    let t = theta.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if t >= 360.0 {
        0.0
    } else {
        t
    }
}

/// An axis-aligned box: (x, y) is the lower-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized bounding box at a point
    pub fn at(point: Point) -> Self {
        Self::new(point.x, point.y, 0.0, 0.0)
    }

    /// Smallest box containing every point, `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(BoundingBox::at(first), |bb, p| bb.expand_to_include(p)))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The four corners, counter-clockwise from lower-left
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.right(), self.y),
            Point::new(self.right(), self.top()),
            Point::new(self.x, self.top()),
        ]
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let top = self.top().max(other.top());
        BoundingBox::new(x, y, right - x, top - y)
    }

    pub fn expand_to_include(&self, point: Point) -> BoundingBox {
        let x = self.x.min(point.x);
        let y = self.y.min(point.y);
        let right = self.right().max(point.x);
        let top = self.top().max(point.y);
        BoundingBox::new(x, y, right - x, top - y)
    }

    /// Grow by `margin` on every side
    pub fn inflate(&self, margin: f64) -> BoundingBox {
        BoundingBox::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }
}

/// Named connection point on an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Terminal {
    Start,
    End,
    Center,
    Plus,
    Minus,
    Drain,
    Gate,
    Source,
    Bulk,
}

impl Terminal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Terminal::Start => "start",
            Terminal::End => "end",
            Terminal::Center => "center",
            Terminal::Plus => "plus",
            Terminal::Minus => "minus",
            Terminal::Drain => "drain",
            Terminal::Gate => "gate",
            Terminal::Source => "source",
            Terminal::Bulk => "bulk",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a terminal name that is not part of the vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTerminal(pub String);

impl FromStr for Terminal {
    type Err = UnknownTerminal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Terminal::Start),
            "end" => Ok(Terminal::End),
            "center" => Ok(Terminal::Center),
            "plus" => Ok(Terminal::Plus),
            "minus" => Ok(Terminal::Minus),
            "drain" => Ok(Terminal::Drain),
            "gate" => Ok(Terminal::Gate),
            "source" => Ok(Terminal::Source),
            "bulk" => Ok(Terminal::Bulk),
            other => Err(UnknownTerminal(other.to_string())),
        }
    }
}

/// Per-element drawing options
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementOptions {
    /// Transistors: draw and expose the bulk terminal
    pub bulk: bool,
    /// Dots: hollow instead of filled
    pub open: bool,
    pub color: Option<String>,
    pub line_width: Option<f64>,
}

/// Where a label sits relative to its element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelLoc {
    Top,
    Bot,
    Lft,
    Rgt,
    Center,
}

impl FromStr for LabelLoc {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(LabelLoc::Top),
            "bot" | "bottom" => Ok(LabelLoc::Bot),
            "lft" | "left" => Ok(LabelLoc::Lft),
            "rgt" | "right" => Ok(LabelLoc::Rgt),
            "center" => Ok(LabelLoc::Center),
            other => Err(format!(
                "unknown label location '{}' (expected top, bot, lft, rgt or center)",
                other
            )),
        }
    }
}

/// Text anchor position for labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// A label resolved to drawing coordinates; `position` is the text center line
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub text: String,
    pub position: Point,
    pub anchor: TextAnchor,
}

/// Net marker drawn at a connection point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotMarker {
    pub position: Point,
    pub open: bool,
}

/// Radius of net markers and dot elements
pub const DOT_RADIUS: f64 = 0.075;

/// Primitive drawing operation, in whatever frame its owner lives in
#[derive(Debug, Clone, PartialEq)]
pub enum Stroke {
    Polyline(Vec<Point>),
    /// Closed and filled with the stroke color
    Polygon(Vec<Point>),
    Circle {
        center: Point,
        radius: f64,
        filled: bool,
    },
}

impl Stroke {
    /// Apply a point mapping to every vertex
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Stroke {
        match self {
            Stroke::Polyline(points) => Stroke::Polyline(points.iter().map(|p| f(*p)).collect()),
            Stroke::Polygon(points) => Stroke::Polygon(points.iter().map(|p| f(*p)).collect()),
            Stroke::Circle {
                center,
                radius,
                filled,
            } => Stroke::Circle {
                center: f(*center),
                radius: *radius,
                filled: *filled,
            },
        }
    }

    /// Points that bound this stroke
    pub fn extent_points(&self) -> Vec<Point> {
        match self {
            Stroke::Polyline(points) | Stroke::Polygon(points) => points.clone(),
            Stroke::Circle { center, radius, .. } => vec![
                *center - Point::new(*radius, *radius),
                *center + Point::new(*radius, *radius),
            ],
        }
    }
}

/// A placed element. Immutable once appended to the log.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Position in the element log
    pub id: usize,
    pub name: Option<String>,
    pub kind: ElementKind,
    pub options: ElementOptions,
    pub transform: Transform,
    /// Body length for two-terminal kinds, zero otherwise
    pub length: f64,
    /// Point the element was anchored to
    pub start: Point,
    /// Drop point, where the next implicit command continues
    pub end: Point,
    pub reversed: bool,
    pub flipped: bool,
    pub terminals: BTreeMap<Terminal, Point>,
    /// Symbol strokes in drawing coordinates
    pub strokes: Vec<Stroke>,
    pub labels: Vec<PlacedLabel>,
    pub dots: Vec<DotMarker>,
    pub bounds: BoundingBox,
}

impl Element {
    pub fn terminal(&self, terminal: Terminal) -> Option<Point> {
        self.terminals.get(&terminal).copied()
    }

    /// Terminal names defined for this element, in table order
    pub fn terminal_names(&self) -> Vec<&'static str> {
        self.terminals.keys().map(|t| t.as_str()).collect()
    }

    /// Name for diagnostics: the bound name, or `#id`
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{}", self.id))
    }
}

/// Approximate character width for label extents, in drawing units
const LABEL_CHAR_WIDTH: f64 = 0.2;
const LABEL_HEIGHT: f64 = 0.35;

/// Rough footprint of a text label
pub fn label_bounds(label: &PlacedLabel) -> BoundingBox {
    let width = label.text.chars().count() as f64 * LABEL_CHAR_WIDTH;
    let left = match label.anchor {
        TextAnchor::Start => label.position.x,
        TextAnchor::Middle => label.position.x - width / 2.0,
        TextAnchor::End => label.position.x - width,
    };
    BoundingBox::new(
        left,
        label.position.y - LABEL_HEIGHT / 2.0,
        width,
        LABEL_HEIGHT,
    )
}

/// The resolved element log handed to a backend
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Drawing {
    pub elements: Vec<Element>,
}

impl Drawing {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Most recent element bound to `name`
    pub fn get(&self, name: &str) -> Option<&Element> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.name.as_deref() == Some(name))
    }

    /// Extent of every symbol, marker and label
    pub fn bounds(&self) -> BoundingBox {
        let mut boxes = self.elements.iter().flat_map(|element| {
            std::iter::once(element.bounds)
                .chain(element.labels.iter().map(label_bounds))
                .chain(element.dots.iter().map(|d| {
                    BoundingBox::at(d.position).inflate(DOT_RADIUS)
                }))
        });
        match boxes.next() {
            Some(first) => boxes.fold(first, |acc, bb| acc.union(&bb)),
            None => BoundingBox::at(Point::origin()),
        }
    }
}
