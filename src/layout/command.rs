//! Placement commands consumed by the layout session

use crate::parser::ast::{Direction, ElementKind, LabelText, PointExpr};

use super::types::{ElementOptions, LabelLoc};

/// One step of a build
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Place(PlaceCommand),
    /// Default length for subsequent two-terminal elements
    SetUnit(f64),
    Push,
    Pop,
}

/// Where an element starts
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Start {
    /// The session's current point
    #[default]
    Implicit,
    /// The previous element's drop point; fails on an empty log
    Chain,
    At(PointExpr),
}

/// Explicit target for a two-terminal element's end
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    To(PointExpr),
    /// Keep the start's y, take the target's x
    ToX(PointExpr),
    /// Keep the start's x, take the target's y
    ToY(PointExpr),
}

impl Endpoint {
    pub fn point(&self) -> &PointExpr {
        match self {
            Endpoint::To(p) | Endpoint::ToX(p) | Endpoint::ToY(p) => p,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelSpec {
    pub text: LabelText,
    /// Kind default when absent
    pub loc: Option<LabelLoc>,
    pub offset: f64,
}

impl LabelSpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: LabelText::Single(text.into()),
            loc: None,
            offset: 0.0,
        }
    }

    /// Several parts spread along the element body
    pub fn spread<S: Into<String>>(parts: impl IntoIterator<Item = S>) -> Self {
        Self {
            text: LabelText::Spread(parts.into_iter().map(Into::into).collect()),
            loc: None,
            offset: 0.0,
        }
    }

    pub fn with_loc(mut self, loc: LabelLoc) -> Self {
        self.loc = Some(loc);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }
}

/// Which end of an element a net marker goes on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEnd {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotSpec {
    pub end: MarkerEnd,
    pub open: bool,
}

/// Everything needed to place one element.
///
/// Built fluently, mirroring how placement chains read in scripts:
///
/// ```
/// use schemline::layout::PlaceCommand;
/// use schemline::parser::ast::{ElementKind, PointExpr};
///
/// let cmd = PlaceCommand::new(ElementKind::Line)
///     .at(PointExpr::terminal("M3", "gate"))
///     .down()
///     .toy(PointExpr::terminal("M3", "drain"));
/// assert!(cmd.endpoint.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceCommand {
    pub kind: ElementKind,
    pub name: Option<String>,
    pub start: Start,
    pub direction: Option<Direction>,
    pub length: Option<f64>,
    pub endpoint: Option<Endpoint>,
    /// Own terminal pinned to the start point
    pub anchor: Option<String>,
    pub theta: Option<f64>,
    pub reverse: bool,
    pub flip: bool,
    pub options: ElementOptions,
    pub labels: Vec<LabelSpec>,
    pub dots: Vec<DotSpec>,
}

impl PlaceCommand {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            name: None,
            start: Start::Implicit,
            direction: None,
            length: None,
            endpoint: None,
            anchor: None,
            theta: None,
            reverse: false,
            flip: false,
            options: ElementOptions::default(),
            labels: vec![],
            dots: vec![],
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, point: PointExpr) -> Self {
        self.start = Start::At(point);
        self
    }

    pub fn chain(mut self) -> Self {
        self.start = Start::Chain;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn up(self) -> Self {
        self.direction(Direction::Up)
    }

    pub fn down(self) -> Self {
        self.direction(Direction::Down)
    }

    pub fn left(self) -> Self {
        self.direction(Direction::Left)
    }

    pub fn right(self) -> Self {
        self.direction(Direction::Right)
    }

    pub fn length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn to(mut self, point: PointExpr) -> Self {
        self.endpoint = Some(Endpoint::To(point));
        self
    }

    pub fn tox(mut self, point: PointExpr) -> Self {
        self.endpoint = Some(Endpoint::ToX(point));
        self
    }

    pub fn toy(mut self, point: PointExpr) -> Self {
        self.endpoint = Some(Endpoint::ToY(point));
        self
    }

    pub fn anchor(mut self, terminal: impl Into<String>) -> Self {
        self.anchor = Some(terminal.into());
        self
    }

    pub fn theta(mut self, theta: f64) -> Self {
        self.theta = Some(theta);
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    pub fn flip(mut self) -> Self {
        self.flip = true;
        self
    }

    pub fn with_options(mut self, options: ElementOptions) -> Self {
        self.options = options;
        self
    }

    pub fn bulk(mut self) -> Self {
        self.options.bulk = true;
        self
    }

    pub fn label(mut self, label: LabelSpec) -> Self {
        self.labels.push(label);
        self
    }

    /// Net marker at the end point
    pub fn dot(mut self, open: bool) -> Self {
        self.dots.push(DotSpec {
            end: MarkerEnd::End,
            open,
        });
        self
    }

    /// Net marker at the start point
    pub fn idot(mut self, open: bool) -> Self {
        self.dots.push(DotSpec {
            end: MarkerEnd::Start,
            open,
        });
        self
    }
}

impl From<PlaceCommand> for Command {
    fn from(cmd: PlaceCommand) -> Self {
        Command::Place(cmd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates() {
        let cmd = PlaceCommand::new(ElementKind::PFet)
            .named("M3")
            .bulk()
            .anchor("drain")
            .theta(0.0)
            .label(LabelSpec::new("M3").with_loc(LabelLoc::Top).with_offset(-0.15));

        assert_eq!(cmd.name.as_deref(), Some("M3"));
        assert!(cmd.options.bulk);
        assert_eq!(cmd.anchor.as_deref(), Some("drain"));
        assert_eq!(cmd.theta, Some(0.0));
        assert_eq!(cmd.labels[0].offset, -0.15);
        assert_eq!(cmd.start, Start::Implicit);
    }

    #[test]
    fn test_later_endpoint_replaces_earlier() {
        let cmd = PlaceCommand::new(ElementKind::Line)
            .to(PointExpr::literal(1.0, 1.0))
            .tox(PointExpr::literal(2.0, 2.0));
        assert_eq!(
            cmd.endpoint,
            Some(Endpoint::ToX(PointExpr::literal(2.0, 2.0)))
        );
    }

    #[test]
    fn test_dot_markers() {
        let cmd = PlaceCommand::new(ElementKind::Line).dot(true).idot(false);
        assert_eq!(
            cmd.dots,
            vec![
                DotSpec {
                    end: MarkerEnd::End,
                    open: true
                },
                DotSpec {
                    end: MarkerEnd::Start,
                    open: false
                }
            ]
        );
    }
}
