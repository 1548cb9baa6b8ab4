//! Lowering parsed scripts into layout commands
//!
//! Each statement becomes exactly one [`Command`], so a command index reported
//! by the layout engine is also the statement index in the script.

use crate::error::ParseError;
use crate::layout::{
    Command, ElementOptions, LabelLoc, LabelSpec, LayoutError, PlaceCommand, Session,
};
use crate::parser::ast::*;
use crate::parser::parse;

/// A validated script, ready to drive a [`Session`]
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub commands: Vec<Spanned<Command>>,
}

impl Script {
    /// Parse and validate script source
    pub fn parse(source: &str) -> Result<Self, Vec<ParseError>> {
        let doc = parse(source)?;
        Self::from_document(&doc)
    }

    /// Lower a parsed document, collecting every validation error
    pub fn from_document(doc: &Document) -> Result<Self, Vec<ParseError>> {
        let mut commands = Vec::with_capacity(doc.statements.len());
        let mut errors = Vec::new();

        for stmt in &doc.statements {
            match lower_statement(&stmt.node) {
                Ok(command) => commands.push(Spanned::new(command, stmt.span.clone())),
                Err(mut errs) => errors.append(&mut errs),
            }
        }

        if errors.is_empty() {
            Ok(Self { commands })
        } else {
            Err(errors)
        }
    }

    /// Source span of the command at `index`
    pub fn span_of(&self, index: usize) -> Option<Span> {
        self.commands.get(index).map(|c| c.span.clone())
    }

    /// Apply every command in order, stopping at the first failure
    pub fn run(&self, session: &mut Session) -> Result<(), LayoutError> {
        for command in &self.commands {
            session.apply(&command.node)?;
        }
        Ok(())
    }
}

fn lower_statement(stmt: &Statement) -> Result<Command, Vec<ParseError>> {
    match stmt {
        Statement::Unit(unit) => Ok(Command::SetUnit(unit.node)),
        Statement::Push => Ok(Command::Push),
        Statement::Pop => Ok(Command::Pop),
        Statement::Element(decl) => lower_element(decl).map(Command::Place),
    }
}

fn lower_element(decl: &ElementDecl) -> Result<PlaceCommand, Vec<ParseError>> {
    let kind = decl.kind.node;
    let mut cmd = PlaceCommand::new(kind);
    let mut errors = Vec::new();

    if let Some(name) = &decl.name {
        cmd = cmd.named(name.node.as_str());
    }

    match element_options(kind, &decl.settings) {
        Ok(options) => cmd.options = options,
        Err(mut errs) => errors.append(&mut errs),
    }

    let mut direction_span: Option<Span> = None;
    let mut start_span: Option<Span> = None;
    let mut endpoint_span: Option<Span> = None;

    for placement in &decl.placements {
        let span = placement.span.clone();
        match &placement.node {
            Placement::Direction(d) => {
                if direction_span.is_some() {
                    errors.push(ParseError::invalid(
                        span.clone(),
                        format!("Direction given twice (second is '{}')", direction_name(*d)),
                    ));
                }
                direction_span = Some(span);
                cmd = cmd.direction(*d);
            }
            Placement::Length(length) => {
                if !kind.is_two_terminal() {
                    errors.push(not_two_terminal(span, "length", kind));
                }
                cmd = cmd.length(*length);
            }
            Placement::Theta(theta) => cmd = cmd.theta(*theta),
            Placement::At(_) | Placement::Chain if start_span.is_some() => {
                let what = if matches!(placement.node, Placement::At(_)) {
                    "at"
                } else {
                    "chain"
                };
                errors.push(ParseError::invalid(
                    span,
                    format!("Conflicting start: '{}' after an earlier 'at' or 'chain'", what),
                ));
            }
            Placement::At(point) => {
                start_span = Some(span);
                cmd = cmd.at(point.clone());
            }
            Placement::Chain => {
                start_span = Some(span);
                cmd = cmd.chain();
            }
            Placement::To(point) | Placement::ToX(point) | Placement::ToY(point) => {
                if !kind.is_two_terminal() {
                    errors.push(not_two_terminal(span.clone(), "an endpoint", kind));
                }
                if endpoint_span.is_some() {
                    errors.push(ParseError::invalid(
                        span.clone(),
                        "Conflicting endpoints: only one of 'to', 'tox' or 'toy' may be given",
                    ));
                }
                endpoint_span = Some(span);
                cmd = match &placement.node {
                    Placement::ToX(_) => cmd.tox(point.clone()),
                    Placement::ToY(_) => cmd.toy(point.clone()),
                    _ => cmd.to(point.clone()),
                };
            }
            Placement::Anchor(terminal) => cmd = cmd.anchor(terminal.node.as_str()),
            Placement::Reverse => cmd = cmd.reverse(),
            Placement::Flip => cmd = cmd.flip(),
            Placement::Dot(settings) => match dot_open(settings) {
                Ok(open) => cmd = cmd.dot(open),
                Err(mut errs) => errors.append(&mut errs),
            },
            Placement::IDot(settings) => match dot_open(settings) {
                Ok(open) => cmd = cmd.idot(open),
                Err(mut errs) => errors.append(&mut errs),
            },
            Placement::Label { text, settings } => match label_spec(text, settings) {
                Ok(label) => cmd = cmd.label(label),
                Err(mut errs) => errors.append(&mut errs),
            },
        }
    }

    if errors.is_empty() {
        Ok(cmd)
    } else {
        Err(errors)
    }
}

fn direction_name(d: Direction) -> &'static str {
    match d {
        Direction::Up => "up",
        Direction::Down => "down",
        Direction::Left => "left",
        Direction::Right => "right",
    }
}

fn not_two_terminal(span: Span, what: &str, kind: ElementKind) -> ParseError {
    ParseError::invalid(
        span,
        format!("'{}' cannot take {}, only two-terminal elements can", kind, what),
    )
}

fn unknown_setting(setting: &Spanned<Setting>, allowed: &[&str]) -> ParseError {
    ParseError::invalid(
        setting.node.key.span.clone(),
        format!(
            "Unknown setting '{}' (expected one of: {})",
            setting.node.key.node,
            allowed.join(", ")
        ),
    )
}

fn expect_bool(value: &Spanned<SettingValue>) -> Result<bool, ParseError> {
    match &value.node {
        SettingValue::Keyword(k) if k == "true" => Ok(true),
        SettingValue::Keyword(k) if k == "false" => Ok(false),
        other => Err(ParseError::invalid(
            value.span.clone(),
            format!("Expected true or false, found {}", other),
        )),
    }
}

fn expect_number(value: &Spanned<SettingValue>) -> Result<f64, ParseError> {
    match &value.node {
        SettingValue::Number(n) => Ok(*n),
        other => Err(ParseError::invalid(
            value.span.clone(),
            format!("Expected a number, found {}", other),
        )),
    }
}

fn expect_text(value: &Spanned<SettingValue>) -> Result<String, ParseError> {
    match &value.node {
        SettingValue::String(s) | SettingValue::Keyword(s) => Ok(s.clone()),
        other => Err(ParseError::invalid(
            value.span.clone(),
            format!("Expected a name or string, found {}", other),
        )),
    }
}

fn element_options(
    kind: ElementKind,
    settings: &[Spanned<Setting>],
) -> Result<ElementOptions, Vec<ParseError>> {
    let mut options = ElementOptions::default();
    let mut errors = Vec::new();

    for setting in settings {
        let value = &setting.node.value;
        let result = match setting.node.key.node.as_str() {
            "bulk" if kind.is_transistor() => expect_bool(value).map(|b| options.bulk = b),
            "open" if kind == ElementKind::Dot => expect_bool(value).map(|b| options.open = b),
            "color" => expect_text(value).map(|c| options.color = Some(c)),
            "lw" => expect_number(value).map(|w| options.line_width = Some(w)),
            _ => {
                let mut allowed = vec!["color", "lw"];
                if kind.is_transistor() {
                    allowed.insert(0, "bulk");
                }
                if kind == ElementKind::Dot {
                    allowed.insert(0, "open");
                }
                Err(unknown_setting(setting, &allowed))
            }
        };
        if let Err(e) = result {
            errors.push(e);
        }
    }

    if errors.is_empty() {
        Ok(options)
    } else {
        Err(errors)
    }
}

fn dot_open(settings: &[Spanned<Setting>]) -> Result<bool, Vec<ParseError>> {
    let mut open = false;
    let mut errors = Vec::new();
    for setting in settings {
        match setting.node.key.node.as_str() {
            "open" => match expect_bool(&setting.node.value) {
                Ok(b) => open = b,
                Err(e) => errors.push(e),
            },
            _ => errors.push(unknown_setting(setting, &["open"])),
        }
    }
    if errors.is_empty() {
        Ok(open)
    } else {
        Err(errors)
    }
}

fn label_spec(text: &LabelText, settings: &[Spanned<Setting>]) -> Result<LabelSpec, Vec<ParseError>> {
    let mut spec = LabelSpec {
        text: text.clone(),
        loc: None,
        offset: 0.0,
    };
    let mut errors = Vec::new();
    for setting in settings {
        let value = &setting.node.value;
        match setting.node.key.node.as_str() {
            "loc" => match expect_text(value)
                .and_then(|s| {
                    s.parse::<LabelLoc>()
                        .map_err(|msg| ParseError::invalid(value.span.clone(), msg))
                }) {
                Ok(loc) => spec.loc = Some(loc),
                Err(e) => errors.push(e),
            },
            "ofst" => match expect_number(value) {
                Ok(n) => spec.offset = n,
                Err(e) => errors.push(e),
            },
            _ => errors.push(unknown_setting(setting, &["loc", "ofst"])),
        }
    }
    if errors.is_empty() {
        Ok(spec)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Endpoint, Start};
    use pretty_assertions::assert_eq;

    fn place(source: &str) -> PlaceCommand {
        let script = Script::parse(source).expect("Should lower");
        match script.commands.into_iter().next().map(|c| c.node) {
            Some(Command::Place(cmd)) => cmd,
            other => panic!("Expected placement, got {:?}", other),
        }
    }

    fn messages(source: &str) -> Vec<String> {
        Script::parse(source)
            .expect_err("Should fail")
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn test_lower_fet_with_label() {
        let cmd = place(r#"M3 = pfet [bulk: true] anchor drain theta 0 label "M3" [loc: top, ofst: -0.15]"#);
        let expected = PlaceCommand::new(ElementKind::PFet)
            .named("M3")
            .bulk()
            .anchor("drain")
            .theta(0.0)
            .label(LabelSpec::new("M3").with_loc(LabelLoc::Top).with_offset(-0.15));
        assert_eq!(cmd, expected);
    }

    #[test]
    fn test_lower_wire_with_markers() {
        let cmd = place("line at M3.gate down toy M3.drain dot [open: true] idot");
        assert_eq!(cmd.start, Start::At(PointExpr::terminal("M3", "gate")));
        assert_eq!(
            cmd.endpoint,
            Some(Endpoint::ToY(PointExpr::terminal("M3", "drain")))
        );
        assert_eq!(cmd.dots.len(), 2);
        assert!(cmd.dots[0].open);
        assert!(!cmd.dots[1].open);
    }

    #[test]
    fn test_statement_kinds() {
        let script = Script::parse("unit 2.0\npush\nline chain\npop").unwrap();
        let nodes: Vec<_> = script.commands.iter().map(|c| c.node.clone()).collect();
        assert_eq!(nodes[0], Command::SetUnit(2.0));
        assert_eq!(nodes[1], Command::Push);
        assert_eq!(nodes[2], Command::Place(PlaceCommand::new(ElementKind::Line).chain()));
        assert_eq!(nodes[3], Command::Pop);
        assert_eq!(script.span_of(2), Some(14..24));
    }

    #[test]
    fn test_unknown_setting_reported() {
        insta::assert_snapshot!(
            messages("resistor [blk: true]").join("\n"),
            @"Invalid script at 10..13: Unknown setting 'blk' (expected one of: color, lw)"
        );
    }

    #[test]
    fn test_bad_label_location_reported() {
        let errs = messages(r#"resistor label "R" [loc: middle]"#);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("unknown label location 'middle'"));
    }

    #[test]
    fn test_conflicting_endpoints_reported() {
        let errs = messages("line to (1, 1) tox (2, 2)");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("Conflicting endpoints"));
    }

    #[test]
    fn test_repeated_direction_reported() {
        let errs = messages("line up left");
        assert!(errs[0].contains("Direction given twice"));
    }

    #[test]
    fn test_errors_collected_across_statements() {
        let errs = messages("line up up\nnfet [open: true]\ndot [bulk: false]");
        assert_eq!(errs.len(), 3);
    }

    #[test]
    fn test_endpoint_on_transistor_rejected() {
        let errs = messages("nfet to (1, 1)");
        assert!(errs[0].contains("only two-terminal elements"));
    }
}
