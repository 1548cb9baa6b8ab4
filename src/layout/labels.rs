//! Label placement around placed elements

use crate::parser::ast::{ElementKind, LabelText};

use super::command::LabelSpec;
use super::shapes::Footprint;
use super::transform::Transform;
use super::types::{BoundingBox, LabelLoc, PlacedLabel, Point, TextAnchor};

/// Clearance between a body and the center line of its label
const LABEL_GAP: f64 = 0.3;
/// Half the run a spread label covers, as a fraction of the element length
const SPREAD_FRACTION: f64 = 0.4;
/// Spacing of spread parts around a bounding box
const SPREAD_STEP: f64 = 0.5;

/// Default location when a label gives none
fn default_loc(kind: ElementKind) -> LabelLoc {
    match kind {
        ElementKind::Label => LabelLoc::Center,
        _ => LabelLoc::Top,
    }
}

fn text_anchor(direction: Point) -> TextAnchor {
    if direction.x > 1e-9 {
        TextAnchor::Start
    } else if direction.x < -1e-9 {
        TextAnchor::End
    } else {
        TextAnchor::Middle
    }
}

fn parts(text: &LabelText, reversed: bool) -> Vec<String> {
    match text {
        LabelText::Single(s) => vec![s.clone()],
        LabelText::Spread(parts) => {
            let mut parts = parts.clone();
            if reversed {
                parts.reverse();
            }
            parts
        }
    }
}

/// Fraction along a spread for part `i` of `n`
fn spread_fraction(i: usize, n: usize) -> f64 {
    if n <= 1 {
        0.5
    } else {
        i as f64 / (n - 1) as f64
    }
}

/// Place labels of a two-terminal element in its local frame, then transform.
///
/// Text stays upright; only the anchor point follows the element's rotation.
pub fn along_axis(
    spec: &LabelSpec,
    footprint: &Footprint,
    transform: &Transform,
    reversed: bool,
) -> Vec<PlacedLabel> {
    let length = footprint.length;
    let mid = length / 2.0;
    let clear = footprint.half_height + LABEL_GAP + spec.offset;
    let (base, normal) = match spec.loc.unwrap_or(LabelLoc::Top) {
        LabelLoc::Top => (Point::new(mid, clear), Point::new(0.0, 1.0)),
        LabelLoc::Bot => (Point::new(mid, -clear), Point::new(0.0, -1.0)),
        LabelLoc::Lft => (
            Point::new(-(LABEL_GAP + spec.offset), 0.0),
            Point::new(-1.0, 0.0),
        ),
        LabelLoc::Rgt => (
            Point::new(length + LABEL_GAP + spec.offset, 0.0),
            Point::new(1.0, 0.0),
        ),
        LabelLoc::Center => (Point::new(mid, spec.offset), Point::origin()),
    };
    let anchor = text_anchor(transform.transform_vector(normal));
    let runs_along = matches!(
        spec.loc.unwrap_or(LabelLoc::Top),
        LabelLoc::Top | LabelLoc::Bot | LabelLoc::Center
    );

    let parts = parts(&spec.text, reversed);
    let n = parts.len();
    let half = length * SPREAD_FRACTION;
    parts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let local = if n > 1 && runs_along {
                Point::new(mid - half + 2.0 * half * spread_fraction(i, n), base.y)
            } else {
                base
            };
            PlacedLabel {
                text,
                position: transform.transform_point(local),
                anchor,
            }
        })
        .collect()
}

/// Place labels of any other kind around its drawn extent
pub fn around_bounds(
    spec: &LabelSpec,
    kind: ElementKind,
    bounds: &BoundingBox,
    reversed: bool,
) -> Vec<PlacedLabel> {
    let c = bounds.center();
    let ofst = spec.offset;
    let (position, anchor) = match spec.loc.unwrap_or_else(|| default_loc(kind)) {
        LabelLoc::Top => (
            Point::new(c.x, bounds.top() + LABEL_GAP + ofst),
            TextAnchor::Middle,
        ),
        LabelLoc::Bot => (
            Point::new(c.x, bounds.y - LABEL_GAP - ofst),
            TextAnchor::Middle,
        ),
        LabelLoc::Lft => (
            Point::new(bounds.x - LABEL_GAP - ofst, c.y),
            TextAnchor::End,
        ),
        LabelLoc::Rgt => (
            Point::new(bounds.right() + LABEL_GAP + ofst, c.y),
            TextAnchor::Start,
        ),
        LabelLoc::Center => (Point::new(c.x, c.y + ofst), TextAnchor::Middle),
    };

    let parts = parts(&spec.text, reversed);
    let n = parts.len();
    parts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let shift = (i as f64 - (n as f64 - 1.0) / 2.0) * SPREAD_STEP;
            PlacedLabel {
                text,
                position: Point::new(position.x + shift, position.y),
                anchor,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::ElementOptions;

    fn resistor(length: f64) -> Footprint {
        Footprint::new(
            ElementKind::Resistor,
            length,
            &ElementOptions::default(),
            false,
            false,
        )
    }

    #[test]
    fn test_top_label_above_horizontal_element() {
        let fp = resistor(2.0);
        let labels = along_axis(&LabelSpec::new("R1"), &fp, &Transform::identity(), false);
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].position, Point::new(1.0, 0.25 + LABEL_GAP));
        assert_eq!(labels[0].anchor, TextAnchor::Middle);
    }

    #[test]
    fn test_top_label_left_of_upward_element() {
        let fp = resistor(2.0);
        let t = Transform::new(Point::origin(), 90.0);
        let labels = along_axis(&LabelSpec::new("R1"), &fp, &t, false);
        assert!(labels[0].position.x < 0.0);
        assert_eq!(labels[0].position.y, 1.0);
        assert_eq!(labels[0].anchor, TextAnchor::End);
    }

    #[test]
    fn test_spread_label_runs_start_to_end() {
        let fp = resistor(2.0);
        let spec = LabelSpec::spread(["+", "v", "-"]).with_loc(LabelLoc::Bot);
        let labels = along_axis(&spec, &fp, &Transform::identity(), false);
        let texts: Vec<_> = labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["+", "v", "-"]);
        assert!(labels[0].position.x < labels[1].position.x);
        assert!(labels[1].position.x < labels[2].position.x);
        assert!(labels.iter().all(|l| l.position.y < 0.0));
    }

    #[test]
    fn test_spread_label_reversed() {
        let fp = resistor(2.0);
        let spec = LabelSpec::spread(["+", "v", "-"]);
        let labels = along_axis(&spec, &fp, &Transform::identity(), true);
        assert_eq!(labels[0].text, "-");
        assert_eq!(labels[2].text, "+");
    }

    #[test]
    fn test_offset_moves_label_toward_body() {
        let bounds = BoundingBox::new(0.0, -2.0, 1.4, 2.0);
        let plain = around_bounds(&LabelSpec::new("M3"), ElementKind::PFet, &bounds, false);
        let tucked = around_bounds(
            &LabelSpec::new("M3").with_offset(-0.15),
            ElementKind::PFet,
            &bounds,
            false,
        );
        assert!(tucked[0].position.y < plain[0].position.y);
    }

    #[test]
    fn test_free_label_centered_on_point() {
        let bounds = BoundingBox::at(Point::new(3.0, 1.0));
        let labels = around_bounds(&LabelSpec::new("vout"), ElementKind::Label, &bounds, false);
        assert_eq!(labels[0].position, Point::new(3.0, 1.0));
        assert_eq!(labels[0].anchor, TextAnchor::Middle);
    }

    #[test]
    fn test_right_label_starts_after_bounds() {
        let bounds = BoundingBox::at(Point::new(3.0, 1.0));
        let labels = around_bounds(
            &LabelSpec::new("+").with_loc(LabelLoc::Rgt),
            ElementKind::Dot,
            &bounds,
            false,
        );
        assert!(labels[0].position.x > 3.0);
        assert_eq!(labels[0].anchor, TextAnchor::Start);
    }
}
