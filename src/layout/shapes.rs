//! Per-kind symbol footprints in the local frame
//!
//! The local frame has the element axis along +x. Two-terminal kinds run from
//! `(0, 0)` to `(length, 0)`; transistors hang below the origin with the
//! drain/source axis on x = 0 and the gate on +x. Mirroring for `reverse` and
//! `flip` is applied here because its meaning depends on the kind.

use std::f64::consts::PI;

use crate::parser::ast::ElementKind;

use super::types::{BoundingBox, ElementOptions, Point, Stroke, Terminal, DOT_RADIUS};

const RESISTOR_LENGTH: f64 = 1.0;
const RESISTOR_AMPLITUDE: f64 = 0.25;
const CAPACITOR_GAP: f64 = 0.25;
const CAPACITOR_HALF_HEIGHT: f64 = 0.35;
const INDUCTOR_LENGTH: f64 = 1.0;
const INDUCTOR_LOOPS: usize = 4;
const SOURCE_RADIUS: f64 = 0.5;
const GLYPH_SIZE: f64 = 0.3;

/// Drain-to-source distance of a transistor
pub const FET_HEIGHT: f64 = 2.0;
const FET_CHANNEL_X: f64 = 0.6;
const FET_GATE_BAR_X: f64 = 0.8;
const FET_GATE_X: f64 = 1.4;
const FET_BUBBLE_RADIUS: f64 = 0.1;

const GROUND_LEAD: f64 = 0.25;
const GROUND_BARS: [f64; 3] = [0.6, 0.4, 0.2];
const GROUND_BAR_SPACING: f64 = 0.1;

/// Terminals, strokes and anchoring facts for one element, before rotation
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    pub terminals: Vec<(Terminal, Point)>,
    pub strokes: Vec<Stroke>,
    /// Terminal pinned to the start point when no anchor is given
    pub default_anchor: Terminal,
    /// Where the session continues after this element
    pub drop: Point,
    /// Axis length for two-terminal kinds
    pub length: f64,
    /// Half height of the drawn body, used to clear labels
    pub half_height: f64,
}

impl Footprint {
    /// Build the mirrored local footprint for a kind
    pub fn new(
        kind: ElementKind,
        length: f64,
        options: &ElementOptions,
        reverse: bool,
        flip: bool,
    ) -> Self {
        match kind {
            ElementKind::NFet | ElementKind::PFet => {
                transistor(kind == ElementKind::PFet, options.bulk, reverse, flip)
            }
            ElementKind::Dot | ElementKind::Ground | ElementKind::Label => {
                marker(kind, options.open)
            }
            _ => two_terminal(kind, length, reverse, flip),
        }
    }

    pub fn terminal(&self, terminal: Terminal) -> Option<Point> {
        self.terminals
            .iter()
            .find(|(t, _)| *t == terminal)
            .map(|(_, p)| *p)
    }

    pub fn terminal_names(&self) -> Vec<&'static str> {
        let mut names: Vec<Terminal> = self.terminals.iter().map(|(t, _)| *t).collect();
        names.sort();
        names.into_iter().map(|t| t.as_str()).collect()
    }

    /// Local extent of strokes and terminals
    pub fn bounds(&self) -> BoundingBox {
        let points = self
            .strokes
            .iter()
            .flat_map(|s| s.extent_points())
            .chain(self.terminals.iter().map(|(_, p)| *p));
        BoundingBox::from_points(points).unwrap_or_else(|| BoundingBox::at(Point::origin()))
    }
}

fn line(points: &[(f64, f64)]) -> Stroke {
    Stroke::Polyline(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
}

/// Center the nominal body on the axis, shrinking it for short elements
fn body_span(length: f64, body: f64) -> (f64, f64) {
    let body = body.min(length);
    let mid = length / 2.0;
    (mid - body / 2.0, mid + body / 2.0)
}

fn two_terminal(kind: ElementKind, length: f64, reverse: bool, flip: bool) -> Footprint {
    let mid = length / 2.0;
    let (strokes, half_height) = match kind {
        ElementKind::Resistor => (resistor(length), RESISTOR_AMPLITUDE),
        ElementKind::Capacitor => (capacitor(length), CAPACITOR_HALF_HEIGHT),
        ElementKind::Inductor => {
            let (a, b) = body_span(length, INDUCTOR_LENGTH);
            (inductor(length), (b - a) / (2 * INDUCTOR_LOOPS) as f64)
        }
        ElementKind::SourceV
        | ElementKind::SourceI
        | ElementKind::SourceSin
        | ElementKind::SourceSquare => (source(kind, length), SOURCE_RADIUS),
        _ => (vec![line(&[(0.0, 0.0), (length, 0.0)])], 0.0),
    };

    let mirror = |p: Point| {
        Point::new(
            if reverse { length - p.x } else { p.x },
            if flip { -p.y } else { p.y },
        )
    };

    let mut terminals = vec![
        (Terminal::Start, Point::origin()),
        (Terminal::End, Point::new(length, 0.0)),
        (Terminal::Center, Point::new(mid, 0.0)),
    ];
    if kind.is_source() {
        // Polarity follows the mirrored symbol, the occupied segment does not
        terminals.push((Terminal::Plus, mirror(Point::new(mid + SOURCE_RADIUS, 0.0))));
        terminals.push((Terminal::Minus, mirror(Point::new(mid - SOURCE_RADIUS, 0.0))));
    }

    Footprint {
        terminals,
        strokes: strokes.iter().map(|s| s.map(mirror)).collect(),
        default_anchor: Terminal::Start,
        drop: Point::new(length, 0.0),
        length,
        half_height,
    }
}

fn resistor(length: f64) -> Vec<Stroke> {
    let (a, b) = body_span(length, RESISTOR_LENGTH);
    let seg = (b - a) / 12.0;
    let mut points = vec![Point::origin(), Point::new(a, 0.0)];
    for i in 0..6 {
        let x = a + seg * (2 * i + 1) as f64;
        let y = if i % 2 == 0 {
            RESISTOR_AMPLITUDE
        } else {
            -RESISTOR_AMPLITUDE
        };
        points.push(Point::new(x, y));
    }
    points.push(Point::new(b, 0.0));
    points.push(Point::new(length, 0.0));
    vec![Stroke::Polyline(points)]
}

fn capacitor(length: f64) -> Vec<Stroke> {
    let mid = length / 2.0;
    let g = CAPACITOR_GAP / 2.0;
    let h = CAPACITOR_HALF_HEIGHT;
    vec![
        line(&[(0.0, 0.0), (mid - g, 0.0)]),
        line(&[(mid - g, -h), (mid - g, h)]),
        line(&[(mid + g, -h), (mid + g, h)]),
        line(&[(mid + g, 0.0), (length, 0.0)]),
    ]
}

fn inductor(length: f64) -> Vec<Stroke> {
    let (a, b) = body_span(length, INDUCTOR_LENGTH);
    let width = (b - a) / INDUCTOR_LOOPS as f64;
    let radius = width / 2.0;
    let mut points = vec![Point::origin(), Point::new(a, 0.0)];
    for i in 0..INDUCTOR_LOOPS {
        let cx = a + width * i as f64 + radius;
        for step in 1..=8 {
            let t = PI * (1.0 - step as f64 / 8.0);
            points.push(Point::new(cx + radius * t.cos(), radius * t.sin()));
        }
    }
    points.push(Point::new(length, 0.0));
    vec![Stroke::Polyline(points)]
}

fn source(kind: ElementKind, length: f64) -> Vec<Stroke> {
    let mid = length / 2.0;
    let r = SOURCE_RADIUS;
    let s = GLYPH_SIZE;
    let mut strokes = vec![
        line(&[(0.0, 0.0), (mid - r, 0.0)]),
        Stroke::Circle {
            center: Point::new(mid, 0.0),
            radius: r,
            filled: false,
        },
        line(&[(mid + r, 0.0), (length, 0.0)]),
    ];
    match kind {
        ElementKind::SourceV => {
            let plus = mid + r / 2.0;
            let minus = mid - r / 2.0;
            strokes.push(line(&[(plus - 0.1, 0.0), (plus + 0.1, 0.0)]));
            strokes.push(line(&[(plus, -0.1), (plus, 0.1)]));
            strokes.push(line(&[(minus, -0.1), (minus, 0.1)]));
        }
        ElementKind::SourceI => {
            strokes.push(line(&[(mid - s, 0.0), (mid + s / 2.0, 0.0)]));
            strokes.push(Stroke::Polygon(vec![
                Point::new(mid + s, 0.0),
                Point::new(mid + s / 3.0, 0.1),
                Point::new(mid + s / 3.0, -0.1),
            ]));
        }
        ElementKind::SourceSin => {
            let points = (0..=24)
                .map(|i| {
                    let t = i as f64 / 24.0;
                    Point::new(mid - s + 2.0 * s * t, 0.15 * (2.0 * PI * t).sin())
                })
                .collect();
            strokes.push(Stroke::Polyline(points));
        }
        ElementKind::SourceSquare => {
            strokes.push(line(&[
                (mid - s, 0.0),
                (mid - s, 0.15),
                (mid, 0.15),
                (mid, -0.15),
                (mid + s, -0.15),
                (mid + s, 0.0),
            ]));
        }
        _ => {}
    }
    strokes
}

fn transistor(pmos: bool, bulk: bool, reverse: bool, flip: bool) -> Footprint {
    let (top, bottom) = if pmos {
        (Terminal::Source, Terminal::Drain)
    } else {
        (Terminal::Drain, Terminal::Source)
    };
    let mid = -FET_HEIGHT / 2.0;
    let ch = FET_CHANNEL_X;

    let mut terminals = vec![
        (top, Point::origin()),
        (bottom, Point::new(0.0, -FET_HEIGHT)),
        (Terminal::Gate, Point::new(FET_GATE_X, mid)),
        (Terminal::Center, Point::new(0.0, mid)),
    ];
    if bulk {
        terminals.push((Terminal::Bulk, Point::new(0.0, mid)));
    }

    let mut strokes = vec![
        line(&[(0.0, 0.0), (0.0, -0.5), (ch, -0.5)]),
        line(&[(0.0, -FET_HEIGHT), (0.0, -1.5), (ch, -1.5)]),
        line(&[(ch, -0.4), (ch, -1.6)]),
        line(&[(FET_GATE_BAR_X, -0.5), (FET_GATE_BAR_X, -1.5)]),
    ];
    if pmos {
        let bubble_x = FET_GATE_BAR_X + FET_BUBBLE_RADIUS;
        strokes.push(Stroke::Circle {
            center: Point::new(bubble_x, mid),
            radius: FET_BUBBLE_RADIUS,
            filled: false,
        });
        strokes.push(line(&[(bubble_x + FET_BUBBLE_RADIUS, mid), (FET_GATE_X, mid)]));
    } else {
        strokes.push(line(&[(FET_GATE_BAR_X, mid), (FET_GATE_X, mid)]));
    }
    if bulk {
        strokes.push(line(&[(0.0, mid), (ch, mid)]));
        // NMOS arrow points into the channel, PMOS out of it
        let (tip, tail) = if pmos { (0.2, 0.4) } else { (ch, 0.4) };
        strokes.push(Stroke::Polygon(vec![
            Point::new(tip, mid),
            Point::new(tail, mid + 0.1),
            Point::new(tail, mid - 0.1),
        ]));
    }

    let mirror = |p: Point| {
        Point::new(
            if reverse { -p.x } else { p.x },
            if flip { -FET_HEIGHT - p.y } else { p.y },
        )
    };
    for (_, p) in terminals.iter_mut() {
        *p = mirror(*p);
    }

    Footprint {
        terminals,
        strokes: strokes.iter().map(|s| s.map(mirror)).collect(),
        default_anchor: top,
        drop: mirror(Point::new(0.0, -FET_HEIGHT)),
        length: 0.0,
        half_height: FET_HEIGHT / 2.0,
    }
}

fn marker(kind: ElementKind, open: bool) -> Footprint {
    let strokes = match kind {
        ElementKind::Dot => vec![Stroke::Circle {
            center: Point::origin(),
            radius: DOT_RADIUS,
            filled: !open,
        }],
        ElementKind::Ground => {
            let mut strokes = vec![line(&[(0.0, 0.0), (0.0, -GROUND_LEAD)])];
            for (i, width) in GROUND_BARS.iter().enumerate() {
                let y = -GROUND_LEAD - GROUND_BAR_SPACING * i as f64;
                strokes.push(line(&[(-width / 2.0, y), (width / 2.0, y)]));
            }
            strokes
        }
        _ => vec![],
    };
    Footprint {
        terminals: vec![
            (Terminal::Start, Point::origin()),
            (Terminal::Center, Point::origin()),
            (Terminal::End, Point::origin()),
        ],
        strokes,
        default_anchor: Terminal::Start,
        drop: Point::origin(),
        length: 0.0,
        half_height: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bulk() -> ElementOptions {
        ElementOptions {
            bulk: true,
            ..ElementOptions::default()
        }
    }

    #[test]
    fn test_two_terminal_terminals() {
        let fp = Footprint::new(ElementKind::Resistor, 3.0, &ElementOptions::default(), false, false);
        assert_eq!(fp.terminal(Terminal::Start), Some(Point::new(0.0, 0.0)));
        assert_eq!(fp.terminal(Terminal::End), Some(Point::new(3.0, 0.0)));
        assert_eq!(fp.terminal(Terminal::Center), Some(Point::new(1.5, 0.0)));
        assert_eq!(fp.terminal(Terminal::Plus), None);
        assert_eq!(fp.terminal_names(), vec!["start", "end", "center"]);
    }

    #[test]
    fn test_source_reverse_swaps_polarity_only() {
        let opts = ElementOptions::default();
        let fwd = Footprint::new(ElementKind::SourceV, 2.0, &opts, false, false);
        let rev = Footprint::new(ElementKind::SourceV, 2.0, &opts, true, false);
        assert_eq!(fwd.terminal(Terminal::Plus), rev.terminal(Terminal::Minus));
        assert_eq!(fwd.terminal(Terminal::Minus), rev.terminal(Terminal::Plus));
        assert_eq!(fwd.terminal(Terminal::Start), rev.terminal(Terminal::Start));
        assert_eq!(fwd.terminal(Terminal::End), rev.terminal(Terminal::End));
        assert_eq!(fwd.drop, rev.drop);
    }

    #[test]
    fn test_flip_mirrors_strokes_across_axis() {
        let opts = ElementOptions::default();
        let fwd = Footprint::new(ElementKind::Resistor, 2.0, &opts, false, false);
        let flipped = Footprint::new(ElementKind::Resistor, 2.0, &opts, false, true);
        let bb = fwd.bounds();
        let fb = flipped.bounds();
        assert_eq!(bb.x, fb.x);
        assert_eq!(bb.top(), -fb.y);
        assert_ne!(fwd.strokes, flipped.strokes);
        assert_eq!(fwd.terminals, flipped.terminals);
    }

    #[test]
    fn test_nfet_terminals() {
        let fp = Footprint::new(ElementKind::NFet, 0.0, &bulk(), false, false);
        assert_eq!(fp.default_anchor, Terminal::Drain);
        assert_eq!(fp.terminal(Terminal::Drain), Some(Point::new(0.0, 0.0)));
        assert_eq!(fp.terminal(Terminal::Source), Some(Point::new(0.0, -2.0)));
        assert_eq!(fp.terminal(Terminal::Gate), Some(Point::new(1.4, -1.0)));
        assert_eq!(fp.terminal(Terminal::Bulk), Some(Point::new(0.0, -1.0)));
    }

    #[test]
    fn test_bulk_only_when_requested() {
        let fp = Footprint::new(ElementKind::PFet, 0.0, &ElementOptions::default(), false, false);
        assert_eq!(fp.terminal(Terminal::Bulk), None);
        assert_eq!(fp.terminal_names(), vec!["center", "drain", "gate", "source"]);
    }

    #[test]
    fn test_pfet_source_on_top() {
        let fp = Footprint::new(ElementKind::PFet, 0.0, &bulk(), false, false);
        assert_eq!(fp.default_anchor, Terminal::Source);
        assert_eq!(fp.terminal(Terminal::Source), Some(Point::new(0.0, 0.0)));
        assert_eq!(fp.terminal(Terminal::Drain), Some(Point::new(0.0, -2.0)));
    }

    #[test]
    fn test_fet_reverse_moves_gate_only() {
        let fwd = Footprint::new(ElementKind::NFet, 0.0, &bulk(), false, false);
        let rev = Footprint::new(ElementKind::NFet, 0.0, &bulk(), true, false);
        assert_eq!(rev.terminal(Terminal::Gate), Some(Point::new(-1.4, -1.0)));
        for t in [Terminal::Drain, Terminal::Source, Terminal::Bulk, Terminal::Center] {
            assert_eq!(fwd.terminal(t), rev.terminal(t));
        }
    }

    #[test]
    fn test_fet_flip_swaps_drain_and_source() {
        let fwd = Footprint::new(ElementKind::NFet, 0.0, &bulk(), false, false);
        let flipped = Footprint::new(ElementKind::NFet, 0.0, &bulk(), false, true);
        assert_eq!(flipped.terminal(Terminal::Drain), fwd.terminal(Terminal::Source));
        assert_eq!(flipped.terminal(Terminal::Source), fwd.terminal(Terminal::Drain));
        assert_eq!(flipped.terminal(Terminal::Gate), fwd.terminal(Terminal::Gate));
    }

    #[test]
    fn test_markers_collapse_to_a_point() {
        for kind in [ElementKind::Dot, ElementKind::Ground, ElementKind::Label] {
            let fp = Footprint::new(kind, 0.0, &ElementOptions::default(), false, false);
            for t in [Terminal::Start, Terminal::Center, Terminal::End] {
                assert_eq!(fp.terminal(t), Some(Point::origin()));
            }
            assert_eq!(fp.drop, Point::origin());
        }
    }

    #[test]
    fn test_open_dot_is_hollow() {
        let open = ElementOptions {
            open: true,
            ..ElementOptions::default()
        };
        let fp = Footprint::new(ElementKind::Dot, 0.0, &open, false, false);
        assert!(matches!(fp.strokes[0], Stroke::Circle { filled: false, .. }));
    }
}
