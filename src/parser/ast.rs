//! Abstract Syntax Tree types for schematic scripts

use std::fmt;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Valid identifier (alphanumeric + underscore, starts with letter/_)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Root AST node - a complete schematic script
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub statements: Vec<Spanned<Statement>>,
}

/// Top-level statement in a script
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `unit 2.5` - default length for later elements
    Unit(Spanned<f64>),
    /// `push` - save the current point and direction
    Push,
    /// `pop` - restore the last saved point and direction
    Pop,
    /// `[name =] kind [settings] placement*`
    Element(ElementDecl),
}

/// Element declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDecl {
    pub name: Option<Spanned<Identifier>>,
    pub kind: Spanned<ElementKind>,
    pub settings: Vec<Spanned<Setting>>,
    pub placements: Vec<Spanned<Placement>>,
}

/// Built-in schematic element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Line,
    Resistor,
    Capacitor,
    Inductor,
    SourceV,
    SourceI,
    SourceSin,
    SourceSquare,
    NFet,
    PFet,
    Dot,
    Ground,
    Label,
}

impl ElementKind {
    /// Script keyword for this kind
    pub fn keyword(&self) -> &'static str {
        match self {
            ElementKind::Line => "line",
            ElementKind::Resistor => "resistor",
            ElementKind::Capacitor => "capacitor",
            ElementKind::Inductor => "inductor",
            ElementKind::SourceV => "source_v",
            ElementKind::SourceI => "source_i",
            ElementKind::SourceSin => "source_sin",
            ElementKind::SourceSquare => "source_square",
            ElementKind::NFet => "nfet",
            ElementKind::PFet => "pfet",
            ElementKind::Dot => "dot",
            ElementKind::Ground => "ground",
            ElementKind::Label => "label",
        }
    }

    /// Elements that span from a start point to an end point
    pub fn is_two_terminal(&self) -> bool {
        matches!(
            self,
            ElementKind::Line
                | ElementKind::Resistor
                | ElementKind::Capacitor
                | ElementKind::Inductor
                | ElementKind::SourceV
                | ElementKind::SourceI
                | ElementKind::SourceSin
                | ElementKind::SourceSquare
        )
    }

    /// Polarized two-terminal elements with plus/minus terminals
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            ElementKind::SourceV
                | ElementKind::SourceI
                | ElementKind::SourceSin
                | ElementKind::SourceSquare
        )
    }

    pub fn is_transistor(&self) -> bool {
        matches!(self, ElementKind::NFet | ElementKind::PFet)
    }

    /// Point-like annotations: always drawn upright, never move the drawing direction
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            ElementKind::Dot | ElementKind::Ground | ElementKind::Label
        )
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Cardinal drawing direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Angle in degrees, counter-clockwise from +x
    pub fn theta(&self) -> f64 {
        match self {
            Direction::Right => 0.0,
            Direction::Up => 90.0,
            Direction::Left => 180.0,
            Direction::Down => 270.0,
        }
    }
}

/// One link of a placement chain
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Direction(Direction),
    Length(f64),
    Theta(f64),
    At(PointExpr),
    To(PointExpr),
    ToX(PointExpr),
    ToY(PointExpr),
    /// Continue from the previous element's end, failing if there is none
    Chain,
    /// Terminal of this element pinned to the start point
    Anchor(Spanned<Identifier>),
    Reverse,
    Flip,
    /// Net marker at the end point
    Dot(Vec<Spanned<Setting>>),
    /// Net marker at the start point
    IDot(Vec<Spanned<Setting>>),
    Label {
        text: LabelText,
        settings: Vec<Spanned<Setting>>,
    },
}

/// Label content: one string, or several spread along the element
#[derive(Debug, Clone, PartialEq)]
pub enum LabelText {
    Single(String),
    Spread(Vec<String>),
}

/// Which element a terminal reference points at
#[derive(Debug, Clone, PartialEq)]
pub enum ElementRef {
    /// Most recently bound element with this name
    Name(Identifier),
    /// Position in the element log
    Index(usize),
    /// The previously placed element
    Last,
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Name(id) => write!(f, "{}", id),
            ElementRef::Index(i) => write!(f, "#{}", i),
            ElementRef::Last => f.write_str("last"),
        }
    }
}

/// Expression producing a coordinate
#[derive(Debug, Clone, PartialEq)]
pub enum PointExpr {
    Literal { x: f64, y: f64 },
    /// The session's current point
    Here,
    Terminal {
        element: ElementRef,
        terminal: String,
    },
    Mid(Box<PointExpr>, Box<PointExpr>),
    Add(Box<PointExpr>, Box<PointExpr>),
    Sub(Box<PointExpr>, Box<PointExpr>),
    Scale(Box<PointExpr>, f64),
    Div(Box<PointExpr>, f64),
}

impl PointExpr {
    pub fn literal(x: f64, y: f64) -> Self {
        PointExpr::Literal { x, y }
    }

    /// Reference a terminal of a named element
    pub fn terminal(name: impl Into<String>, terminal: impl Into<String>) -> Self {
        PointExpr::Terminal {
            element: ElementRef::Name(Identifier::new(name)),
            terminal: terminal.into(),
        }
    }

    /// Reference a terminal of the element at `index` in the log
    pub fn nth(index: usize, terminal: impl Into<String>) -> Self {
        PointExpr::Terminal {
            element: ElementRef::Index(index),
            terminal: terminal.into(),
        }
    }

    /// Reference a terminal of the previously placed element
    pub fn last(terminal: impl Into<String>) -> Self {
        PointExpr::Terminal {
            element: ElementRef::Last,
            terminal: terminal.into(),
        }
    }

    pub fn mid(a: PointExpr, b: PointExpr) -> Self {
        PointExpr::Mid(Box::new(a), Box::new(b))
    }
}

/// Key-value setting: `[bulk: true]`, `[loc: top, ofst: -0.15]`
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub key: Spanned<Identifier>,
    pub value: Spanned<SettingValue>,
}

/// Setting values
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Number(f64),
    String(String),
    Keyword(String),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Number(n) => write!(f, "{}", n),
            SettingValue::String(s) => write!(f, "\"{}\"", s),
            SettingValue::Keyword(k) => f.write_str(k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_angles() {
        assert_eq!(Direction::Right.theta(), 0.0);
        assert_eq!(Direction::Up.theta(), 90.0);
        assert_eq!(Direction::Left.theta(), 180.0);
        assert_eq!(Direction::Down.theta(), 270.0);
    }

    #[test]
    fn test_kind_classification() {
        assert!(ElementKind::Line.is_two_terminal());
        assert!(ElementKind::SourceSin.is_two_terminal());
        assert!(ElementKind::SourceSin.is_source());
        assert!(!ElementKind::Resistor.is_source());
        assert!(ElementKind::PFet.is_transistor());
        assert!(!ElementKind::PFet.is_two_terminal());
        assert!(ElementKind::Ground.is_marker());
    }

    #[test]
    fn test_element_ref_display() {
        assert_eq!(ElementRef::Name(Identifier::new("M1")).to_string(), "M1");
        assert_eq!(ElementRef::Index(3).to_string(), "#3");
        assert_eq!(ElementRef::Last.to_string(), "last");
    }
}
