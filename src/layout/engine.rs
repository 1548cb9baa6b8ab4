//! Sequential layout session: resolves commands against the element log

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use log::debug;

use crate::config::ConfigError;
use crate::parser::ast::{ElementRef, PointExpr};

use super::command::{Command, Endpoint, MarkerEnd, PlaceCommand, Start};
use super::config::SessionConfig;
use super::error::LayoutError;
use super::labels;
use super::shapes::Footprint;
use super::transform::Transform;
use super::types::{normalize_angle, DotMarker, Drawing, Element, Point, Terminal};
use super::find_similar;

/// Saved current point and angle
#[derive(Debug, Clone, Copy, PartialEq)]
struct SavedState {
    here: Point,
    theta: f64,
}

/// One build's worth of layout state.
///
/// Holds the append-only element log plus the moving parts that scripts rely
/// on implicitly: the current point, the current angle and the unit length.
#[derive(Debug, Clone)]
pub struct Session {
    unit: f64,
    elements: Vec<Element>,
    names: HashMap<String, usize>,
    here: Point,
    theta: f64,
    saved: Vec<SavedState>,
    /// Commands applied so far; the next command's index
    commands: usize,
}

impl Session {
    /// Start an empty session, rejecting a unit `set_unit` would refuse
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_unit(config.unit))
    }

    fn with_unit(unit: f64) -> Self {
        Self {
            unit,
            elements: vec![],
            names: HashMap::new(),
            here: Point::origin(),
            theta: 0.0,
            saved: vec![],
            commands: 0,
        }
    }

    pub fn unit(&self) -> f64 {
        self.unit
    }

    /// The point the next implicit command starts from
    pub fn here(&self) -> Point {
        self.here
    }

    /// The angle inherited by the next command without a direction
    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Element currently bound to `name`
    pub fn get(&self, name: &str) -> Option<&Element> {
        self.names.get(name).and_then(|&id| self.elements.get(id))
    }

    pub fn last(&self) -> Option<&Element> {
        self.elements.last()
    }

    /// Consume the session, yielding the log for a backend
    pub fn into_drawing(self) -> Drawing {
        Drawing::new(self.elements)
    }

    fn next_index(&mut self) -> usize {
        let index = self.commands;
        self.commands += 1;
        index
    }

    /// Apply any command
    pub fn apply(&mut self, command: &Command) -> Result<(), LayoutError> {
        match command {
            Command::Place(cmd) => self.place(cmd).map(|_| ()),
            Command::SetUnit(unit) => self.set_unit(*unit),
            Command::Push => {
                self.push();
                Ok(())
            }
            Command::Pop => self.pop(),
        }
    }

    /// Change the default length for subsequent elements
    pub fn set_unit(&mut self, unit: f64) -> Result<(), LayoutError> {
        let index = self.next_index();
        if !unit.is_finite() || unit <= 0.0 {
            return Err(LayoutError::InvalidUnit { index, unit });
        }
        debug!(index, unit; "Unit changed");
        self.unit = unit;
        Ok(())
    }

    /// Save the current point and angle
    pub fn push(&mut self) {
        let index = self.next_index();
        self.saved.push(SavedState {
            here: self.here,
            theta: self.theta,
        });
        debug!(index, depth = self.saved.len(); "State pushed");
    }

    /// Restore the most recently saved point and angle
    pub fn pop(&mut self) -> Result<(), LayoutError> {
        let index = self.next_index();
        let state = self
            .saved
            .pop()
            .ok_or(LayoutError::EmptyStateStack { index })?;
        self.here = state.here;
        self.theta = state.theta;
        debug!(index, depth = self.saved.len(); "State popped");
        Ok(())
    }

    /// Resolve one placement and append it to the log
    pub fn place(&mut self, cmd: &PlaceCommand) -> Result<&Element, LayoutError> {
        let index = self.next_index();
        let element = self.resolve(cmd, index)?;

        debug!(
            index,
            id = element.id,
            kind = element.kind.keyword(),
            x = element.start.x,
            y = element.start.y;
            "Element placed"
        );

        if !element.kind.is_marker() {
            self.theta = element.transform.theta;
        }
        self.here = element.end;
        let id = element.id;
        // References inside this command resolved against the old binding
        if let Some(name) = &element.name {
            self.names.insert(name.clone(), id);
        }
        self.elements.push(element);
        Ok(&self.elements[id])
    }

    fn resolve(&self, cmd: &PlaceCommand, index: usize) -> Result<Element, LayoutError> {
        let kind = cmd.kind;
        let id = self.elements.len();

        // 1. Start point
        let start = match &cmd.start {
            Start::Implicit => self.here,
            Start::Chain => self
                .elements
                .last()
                .map(|e| e.end)
                .ok_or(LayoutError::DanglingChain { index })?,
            Start::At(expr) => self.eval(expr, index)?,
        };

        // 2. Orientation
        let mut theta = if kind.is_marker() {
            0.0
        } else {
            normalize_angle(
                cmd.theta
                    .or(cmd.direction.map(|d| d.theta()))
                    .unwrap_or(self.theta),
            )
        };

        if let Some(length) = cmd.length {
            if !length.is_finite() || length < 0.0 {
                return Err(LayoutError::InvalidLength { index, length });
            }
        }

        // 3. Length, or the exact end for an explicit target
        let mut target = None;
        let length = if kind.is_two_terminal() {
            match &cmd.endpoint {
                Some(endpoint) => {
                    let p = self.eval(endpoint.point(), index)?;
                    let end = match endpoint {
                        Endpoint::To(_) => p,
                        Endpoint::ToX(_) => Point::new(p.x, start.y),
                        Endpoint::ToY(_) => Point::new(start.x, p.y),
                    };
                    let vector = end - start;
                    if vector.length() > 0.0 {
                        theta = vector.angle();
                    }
                    target = Some(end);
                    vector.length()
                }
                None => cmd.length.unwrap_or(self.unit),
            }
        } else {
            0.0
        };

        // 4. Footprint, anchored and placed
        let footprint = Footprint::new(kind, length, &cmd.options, cmd.reverse, cmd.flip);
        let anchor = match &cmd.anchor {
            Some(name) => Terminal::from_str(name)
                .ok()
                .filter(|t| footprint.terminal(*t).is_some())
                .ok_or_else(|| {
                    let element = cmd.name.clone().unwrap_or_else(|| format!("#{}", id));
                    LayoutError::unresolved(index, element, name, &footprint.terminal_names())
                })?,
            None => footprint.default_anchor,
        };
        let anchor_local = footprint
            .terminal(anchor)
            .unwrap_or_else(Point::origin);
        let transform = Transform::pinning(anchor_local, start, theta);

        let mut terminals: BTreeMap<Terminal, Point> = footprint
            .terminals
            .iter()
            .map(|(t, p)| (*t, transform.transform_point(*p)))
            .collect();
        terminals.insert(anchor, start);
        if let (Some(target), Terminal::Start) = (target, anchor) {
            terminals.insert(Terminal::End, target);
            terminals.insert(Terminal::Center, Point::mid(start, target));
        }

        // Prefer the resolved terminal sitting on the drop point so the next
        // element chains from exactly the same coordinate
        let end = footprint
            .terminals
            .iter()
            .find(|(_, p)| *p == footprint.drop)
            .and_then(|(t, _)| terminals.get(t).copied())
            .unwrap_or_else(|| transform.transform_point(footprint.drop));

        let strokes = footprint
            .strokes
            .iter()
            .map(|s| s.map(|p| transform.transform_point(p)))
            .collect();
        let bounds = transform.transform_bounds(&footprint.bounds());

        // 5. Labels
        let labels = cmd
            .labels
            .iter()
            .flat_map(|spec| {
                if kind.is_two_terminal() {
                    labels::along_axis(spec, &footprint, &transform, cmd.reverse)
                } else {
                    labels::around_bounds(spec, kind, &bounds, cmd.reverse)
                }
            })
            .collect();

        // 6. Net markers
        let dots = cmd
            .dots
            .iter()
            .map(|dot| DotMarker {
                position: match dot.end {
                    MarkerEnd::Start => start,
                    MarkerEnd::End => end,
                },
                open: dot.open,
            })
            .collect();

        Ok(Element {
            id,
            name: cmd.name.clone(),
            kind,
            options: cmd.options.clone(),
            transform,
            length,
            start,
            end,
            reversed: cmd.reverse,
            flipped: cmd.flip,
            terminals,
            strokes,
            labels,
            dots,
            bounds,
        })
    }

    /// Evaluate a point expression against the current log
    pub fn eval(&self, expr: &PointExpr, index: usize) -> Result<Point, LayoutError> {
        let point = self.eval_expr(expr, index)?;
        if point.is_finite() {
            Ok(point)
        } else {
            Err(LayoutError::NonFinitePoint { index, point })
        }
    }

    fn eval_expr(&self, expr: &PointExpr, index: usize) -> Result<Point, LayoutError> {
        Ok(match expr {
            PointExpr::Literal { x, y } => Point::new(*x, *y),
            PointExpr::Here => self.here,
            PointExpr::Terminal { element, terminal } => {
                let element = self.lookup(element, index)?;
                Terminal::from_str(terminal)
                    .ok()
                    .and_then(|t| element.terminal(t))
                    .ok_or_else(|| {
                        LayoutError::unresolved(
                            index,
                            element.display_name(),
                            terminal,
                            &element.terminal_names(),
                        )
                    })?
            }
            PointExpr::Mid(a, b) => Point::mid(self.eval_expr(a, index)?, self.eval_expr(b, index)?),
            PointExpr::Add(a, b) => self.eval_expr(a, index)? + self.eval_expr(b, index)?,
            PointExpr::Sub(a, b) => self.eval_expr(a, index)? - self.eval_expr(b, index)?,
            PointExpr::Scale(a, k) => self.eval_expr(a, index)? * *k,
            PointExpr::Div(a, k) => self.eval_expr(a, index)? / *k,
        })
    }

    fn lookup(&self, element: &ElementRef, index: usize) -> Result<&Element, LayoutError> {
        match element {
            ElementRef::Name(name) => self.get(name.as_str()).ok_or_else(|| {
                LayoutError::undefined(
                    index,
                    name.as_str(),
                    find_similar(self.names.keys().map(String::as_str), name.as_str(), 2),
                )
            }),
            ElementRef::Index(i) => self
                .elements
                .get(*i)
                .ok_or_else(|| LayoutError::undefined(index, format!("#{}", i), vec![])),
            ElementRef::Last => self
                .elements
                .last()
                .ok_or(LayoutError::DanglingChain { index }),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_unit(SessionConfig::default().unit)
    }
}
