//! End-to-end placement scenarios driven through the script language

use pretty_assertions::assert_eq;

use schemline::layout::{Point, Terminal};
use schemline::{render_to_file, BuildError, Config, Drawing, LayoutError, RenderError, Script, Session};

fn run(source: &str) -> Result<Drawing, LayoutError> {
    let script = Script::parse(source).expect("script should parse");
    let mut session = Session::default();
    script.run(&mut session)?;
    Ok(session.into_drawing())
}

fn endpoints(drawing: &Drawing) -> Vec<(Point, Point)> {
    drawing.elements.iter().map(|e| (e.start, e.end)).collect()
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn test_at_terminal_reference() {
    let drawing = run("line up length 2\nline at #0.end right length 3").unwrap();
    assert_eq!(
        endpoints(&drawing),
        vec![
            (Point::new(0.0, 0.0), Point::new(0.0, 2.0)),
            (Point::new(0.0, 2.0), Point::new(3.0, 2.0)),
        ]
    );
}

#[test]
fn test_tox_keeps_current_row() {
    let drawing = run("line up length 2\nline tox (5, 5)").unwrap();
    assert_eq!(drawing.elements[1].start, Point::new(0.0, 2.0));
    assert_eq!(drawing.elements[1].end, Point::new(5.0, 2.0));
}

#[test]
fn test_toy_keeps_current_column() {
    let drawing = run("line right length 1\nline toy (7, -2)").unwrap();
    assert_eq!(drawing.elements[1].end, Point::new(1.0, -2.0));
}

#[test]
fn test_implicit_chaining() {
    let drawing = run("resistor right\ncapacitor down\ninductor left").unwrap();
    for pair in drawing.elements.windows(2) {
        assert_eq!(pair[1].start, pair[0].end);
    }
    assert_eq!(drawing.elements[2].end, Point::new(0.0, -3.0));
}

#[test]
fn test_explicit_anchor_lands_on_point() {
    let drawing = run("M1 = nfet [bulk: true] at (1, 1) anchor gate theta 0").unwrap();
    let gate = drawing.elements[0].terminal(Terminal::Gate).unwrap();
    assert!(close(gate, Point::new(1.0, 1.0)), "gate at {gate}");
}

#[test]
fn test_to_lands_exactly() {
    let drawing = run("V1 = source_v up\nresistor right\nline to V1.start").unwrap();
    assert_eq!(drawing.elements[2].end, Point::origin());
}

#[test]
fn test_reverse_and_flip_keep_endpoints() {
    let plain = run("source_v up").unwrap();
    let mirrored = run("source_v up reverse flip").unwrap();
    assert_eq!(endpoints(&plain), endpoints(&mirrored));

    let plus = plain.elements[0].terminal(Terminal::Plus).unwrap();
    let swapped = mirrored.elements[0].terminal(Terminal::Minus).unwrap();
    assert!(close(plus, swapped));
}

#[test]
fn test_identical_scripts_are_deterministic() {
    let source = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/circuits/ota.sch"))
        .unwrap();
    let a = run(&source).unwrap();
    let b = run(&source).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_unresolved_anchor_writes_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.svg");

    let err = render_to_file("line up length 2\nline at #0.foo", &path, &Config::default())
        .unwrap_err();

    match err {
        RenderError::Build {
            error: BuildError::Layout(LayoutError::UnresolvedAnchor { index, terminal, .. }),
            ..
        } => {
            assert_eq!(index, 1);
            assert_eq!(terminal, "foo");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!path.exists());
}

#[test]
fn test_pop_without_push() {
    let err = run("line right\npop").unwrap_err();
    assert_eq!(err, LayoutError::EmptyStateStack { index: 1 });
}

#[test]
fn test_push_pop_returns_to_branch_point() {
    let drawing = run("line right length 2\npush\nline up length 1\npop\nline down length 1").unwrap();
    assert_eq!(drawing.elements[2].start, Point::new(2.0, 0.0));
    assert_eq!(drawing.elements[2].end, Point::new(2.0, -1.0));
}
