//! Error messages users see for broken scripts

use schemline::{render, Script};

fn first_error(source: &str) -> String {
    match Script::parse(source) {
        Ok(_) => panic!("script should be rejected: {source}"),
        Err(errors) => errors[0].to_string(),
    }
}

#[test]
fn test_length_on_marker() {
    insta::assert_snapshot!(
        first_error("ground length 2"),
        @"Invalid script at 7..15: 'ground' cannot take length, only two-terminal elements can"
    );
}

#[test]
fn test_conflicting_endpoints() {
    insta::assert_snapshot!(
        first_error("line tox (1, 1) toy (2, 2)"),
        @"Invalid script at 16..26: Conflicting endpoints: only one of 'to', 'tox' or 'toy' may be given"
    );
}

#[test]
fn test_bad_label_location() {
    insta::assert_snapshot!(
        first_error(r#"resistor label "R" [loc: middle]"#),
        @"Invalid script at 25..31: unknown label location 'middle' (expected top, bot, lft, rgt or center)"
    );
}

#[test]
fn test_every_statement_is_checked() {
    let errors = Script::parse("line up up\nground length 1").unwrap_err();
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_undefined_element_message() {
    let err = render("line right\nline at Rx.end").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"command 1: undefined element 'Rx'");
}

#[test]
fn test_dangling_chain_message() {
    let err = render("line at last.end").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"command 0: nothing to chain from, no element has been placed yet"
    );
}

#[test]
fn test_report_points_at_statement() {
    let source = "R1 = resistor right\nline at R1.drain up";
    let report = render(source).unwrap_err().format(source, "bad.sch");
    assert!(report.contains("bad.sch"));
    assert!(report.contains("element 'R1' has no terminal 'drain'"));
    assert!(report.contains("start, end, center"));
}
