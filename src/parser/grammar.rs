//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::ast::*;
use crate::parser::lexer::{self, Token};
use crate::ParseError;

/// Helper enum for folding `*` and `/` in point expressions
#[derive(Debug, Clone)]
enum ProductOp {
    Mul,
    Div,
}

/// Helper enum for folding `+` and `-` in point expressions
#[derive(Debug, Clone)]
enum SumOp {
    Add,
    Sub,
}

/// Parse script source into an AST
pub fn parse(input: &str) -> Result<Document, Vec<ParseError>> {
    let invalid = lexer::invalid_spans(input);
    if !invalid.is_empty() {
        return Err(invalid
            .into_iter()
            .map(|span| ParseError::Syntax {
                message: format!("Unexpected character '{}'", &input[span.clone()]),
                span,
                expected: vec![],
            })
            .collect());
    }

    let len = input.len();

    // Create a logos lexer and convert to token stream
    let token_iter = lexer::lex(input).map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn document_parser<'a, I>() -> impl Parser<'a, I, Document, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    // Basic token parsers
    let identifier = select! {
        Token::Ident(s) => Identifier::new(s),
    }
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let string_literal = select! {
        Token::String(s) => s,
    };

    let number = select! {
        Token::Number(n) => n,
    };

    let signed_number = just(Token::Minus)
        .or_not()
        .then(number)
        .map(|(neg, n)| if neg.is_some() { -n } else { n });

    // Settings: [key: value, ...]
    let setting_value = choice((
        signed_number.clone().map(SettingValue::Number),
        string_literal.clone().map(SettingValue::String),
        select! {
            Token::Ident(s) => SettingValue::Keyword(s),
            // Direction keywords double as label locations
            Token::Left => SettingValue::Keyword("left".to_string()),
            Token::Right => SettingValue::Keyword("right".to_string()),
            Token::Up => SettingValue::Keyword("up".to_string()),
            Token::Down => SettingValue::Keyword("down".to_string()),
        },
    ))
    .map_with(|v, e| Spanned::new(v, span_range(&e.span())));

    let setting = identifier
        .clone()
        .then_ignore(just(Token::Colon))
        .then(setting_value)
        .map_with(|(key, value), e| Spanned::new(Setting { key, value }, span_range(&e.span())));

    let settings = setting
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::BracketOpen), just(Token::BracketClose));

    // Terminal references: M1.drain, last.end, #3.start
    let element_ref = choice((
        select! { Token::Ident(s) => ElementRef::Name(Identifier::new(s)) },
        just(Token::Last).to(ElementRef::Last),
        just(Token::Hash)
            .ignore_then(number)
            .map(|n| ElementRef::Index(n as usize)),
    ));

    let terminal_ref = element_ref
        .then_ignore(just(Token::Period))
        .then(select! { Token::Ident(s) => s })
        .map(|(element, terminal)| PointExpr::Terminal { element, terminal });

    // Point expressions with the usual precedence: atoms, then * and /, then + and -
    let point = recursive(|point| {
        let literal = signed_number
            .clone()
            .then_ignore(just(Token::Comma))
            .then(signed_number.clone())
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
            .map(|(x, y)| PointExpr::Literal { x, y });

        let grouped = point
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let midpoint = just(Token::Mid)
            .ignore_then(
                point
                    .clone()
                    .then_ignore(just(Token::Comma))
                    .then(point.clone())
                    .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            )
            .map(|(a, b)| PointExpr::mid(a, b));

        // literal must come before grouped, both start with '('
        let atom = choice((
            literal,
            grouped,
            midpoint,
            just(Token::Here).to(PointExpr::Here),
            terminal_ref.clone(),
        ));

        let product_op = choice((
            just(Token::Star).to(ProductOp::Mul),
            just(Token::Slash).to(ProductOp::Div),
        ));

        let product = atom
            .then(product_op.then(number).repeated().collect::<Vec<_>>())
            .map(|(base, ops)| {
                ops.into_iter().fold(base, |acc, (op, k)| match op {
                    ProductOp::Mul => PointExpr::Scale(Box::new(acc), k),
                    ProductOp::Div => PointExpr::Div(Box::new(acc), k),
                })
            });

        let sum_op = choice((
            just(Token::Plus).to(SumOp::Add),
            just(Token::Minus).to(SumOp::Sub),
        ));

        product
            .clone()
            .then(sum_op.then(product).repeated().collect::<Vec<_>>())
            .map(|(first, rest)| {
                rest.into_iter().fold(first, |acc, (op, rhs)| match op {
                    SumOp::Add => PointExpr::Add(Box::new(acc), Box::new(rhs)),
                    SumOp::Sub => PointExpr::Sub(Box::new(acc), Box::new(rhs)),
                })
            })
            .boxed()
    });

    let direction = choice((
        just(Token::Up).to(Direction::Up),
        just(Token::Down).to(Direction::Down),
        just(Token::Left).to(Direction::Left),
        just(Token::Right).to(Direction::Right),
    ));

    let label_text = choice((
        string_literal.clone().map(LabelText::Single),
        string_literal
            .clone()
            .separated_by(just(Token::Comma))
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose))
            .map(LabelText::Spread),
    ));

    let placement = choice((
        direction.map(Placement::Direction),
        just(Token::Length)
            .ignore_then(signed_number.clone())
            .map(Placement::Length),
        just(Token::Theta)
            .ignore_then(signed_number.clone())
            .map(Placement::Theta),
        just(Token::At).ignore_then(point.clone()).map(Placement::At),
        just(Token::To).ignore_then(point.clone()).map(Placement::To),
        just(Token::ToX).ignore_then(point.clone()).map(Placement::ToX),
        just(Token::ToY).ignore_then(point.clone()).map(Placement::ToY),
        just(Token::Chain).to(Placement::Chain),
        just(Token::Anchor)
            .ignore_then(identifier.clone())
            .map(Placement::Anchor),
        just(Token::Reverse).to(Placement::Reverse),
        just(Token::Flip).to(Placement::Flip),
        just(Token::Dot)
            .ignore_then(settings.clone().or_not())
            .map(|s| Placement::Dot(s.unwrap_or_default())),
        just(Token::IDot)
            .ignore_then(settings.clone().or_not())
            .map(|s| Placement::IDot(s.unwrap_or_default())),
        just(Token::Label)
            .ignore_then(label_text)
            .then(settings.clone().or_not())
            .map(|(text, s)| Placement::Label {
                text,
                settings: s.unwrap_or_default(),
            }),
    ))
    .map_with(|p, e| Spanned::new(p, span_range(&e.span())));

    let kind = choice((
        just(Token::Line).to(ElementKind::Line),
        just(Token::Resistor).to(ElementKind::Resistor),
        just(Token::Capacitor).to(ElementKind::Capacitor),
        just(Token::Inductor).to(ElementKind::Inductor),
        just(Token::SourceV).to(ElementKind::SourceV),
        just(Token::SourceI).to(ElementKind::SourceI),
        just(Token::SourceSin).to(ElementKind::SourceSin),
        just(Token::SourceSquare).to(ElementKind::SourceSquare),
        just(Token::NFet).to(ElementKind::NFet),
        just(Token::PFet).to(ElementKind::PFet),
        just(Token::Dot).to(ElementKind::Dot),
        just(Token::Ground).to(ElementKind::Ground),
        just(Token::Label).to(ElementKind::Label),
    ))
    .map_with(|k, e| Spanned::new(k, span_range(&e.span())));

    // Element declaration: [name =] kind [settings] placement*
    let element_decl = identifier
        .clone()
        .then_ignore(just(Token::Equals))
        .or_not()
        .then(kind)
        .then(settings.clone().or_not())
        .then(placement.repeated().collect::<Vec<_>>())
        .map(|(((name, kind), settings), placements)| ElementDecl {
            name,
            kind,
            settings: settings.unwrap_or_default(),
            placements,
        });

    let unit_decl = just(Token::Unit)
        .ignore_then(signed_number.clone())
        .map_with(|n, e| Statement::Unit(Spanned::new(n, span_range(&e.span()))));

    let statement = choice((
        unit_decl,
        just(Token::Push).to(Statement::Push),
        just(Token::Pop).to(Statement::Pop),
        element_decl.map(Statement::Element),
    ))
    .map_with(|s, e| Spanned::new(s, span_range(&e.span())));

    // Statements are separated by one or more newlines
    let newlines = just(Token::Newline).repeated().at_least(1);

    just(Token::Newline)
        .repeated()
        .ignore_then(
            statement
                .separated_by(newlines)
                .allow_trailing()
                .collect::<Vec<_>>(),
        )
        .then_ignore(end())
        .map(|statements| Document { statements })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_element(input: &str) -> ElementDecl {
        let doc = parse(input).expect("Should parse");
        assert_eq!(doc.statements.len(), 1);
        match doc.statements.into_iter().next().map(|s| s.node) {
            Some(Statement::Element(decl)) => decl,
            other => panic!("Expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_simple_element() {
        let decl = single_element("line up");
        assert_eq!(decl.kind.node, ElementKind::Line);
        assert!(decl.name.is_none());
        assert_eq!(decl.placements.len(), 1);
        assert_eq!(
            decl.placements[0].node,
            Placement::Direction(Direction::Up)
        );
    }

    #[test]
    fn test_parse_named_element_with_settings() {
        let decl = single_element(r#"M3 = pfet [bulk: true] anchor drain theta 0"#);
        assert_eq!(decl.name.as_ref().unwrap().node.as_str(), "M3");
        assert_eq!(decl.kind.node, ElementKind::PFet);
        assert_eq!(decl.settings.len(), 1);
        assert_eq!(decl.settings[0].node.key.node.as_str(), "bulk");
        assert_eq!(
            decl.settings[0].node.value.node,
            SettingValue::Keyword("true".to_string())
        );
        match &decl.placements[0].node {
            Placement::Anchor(id) => assert_eq!(id.node.as_str(), "drain"),
            other => panic!("Expected anchor, got {:?}", other),
        }
        assert_eq!(decl.placements[1].node, Placement::Theta(0.0));
    }

    #[test]
    fn test_parse_label_with_settings() {
        let decl = single_element(r#"pfet label "M3" [loc: top, ofst: -0.15]"#);
        match &decl.placements[0].node {
            Placement::Label { text, settings } => {
                assert_eq!(text, &LabelText::Single("M3".to_string()));
                assert_eq!(settings.len(), 2);
                assert_eq!(settings[1].node.value.node, SettingValue::Number(-0.15));
            }
            other => panic!("Expected label, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_spread_label() {
        let decl = single_element(r#"capacitor down label ("+", "$v_{out}$", "-") [loc: bot]"#);
        match &decl.placements[1].node {
            Placement::Label { text, .. } => assert_eq!(
                text,
                &LabelText::Spread(vec![
                    "+".to_string(),
                    "$v_{out}$".to_string(),
                    "-".to_string()
                ])
            ),
            other => panic!("Expected label, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_terminal_reference() {
        let decl = single_element("line at M3.gate down toy M3.drain");
        assert_eq!(
            decl.placements[0].node,
            Placement::At(PointExpr::terminal("M3", "gate"))
        );
        assert_eq!(
            decl.placements[2].node,
            Placement::ToY(PointExpr::terminal("M3", "drain"))
        );
    }

    #[test]
    fn test_parse_midpoint_expression() {
        let decl = single_element("dot at (M1.drain + M2.drain) / 2");
        let expected = PointExpr::Div(
            Box::new(PointExpr::Add(
                Box::new(PointExpr::terminal("M1", "drain")),
                Box::new(PointExpr::terminal("M2", "drain")),
            )),
            2.0,
        );
        assert_eq!(decl.placements[0].node, Placement::At(expected));
    }

    #[test]
    fn test_parse_mid_literal_and_index() {
        let decl = single_element("line at mid(#0.start, last.end) to (-1.5, 2)");
        assert_eq!(
            decl.placements[0].node,
            Placement::At(PointExpr::mid(
                PointExpr::nth(0, "start"),
                PointExpr::last("end")
            ))
        );
        assert_eq!(
            decl.placements[1].node,
            Placement::To(PointExpr::literal(-1.5, 2.0))
        );
    }

    #[test]
    fn test_parse_dot_modifiers() {
        let decl = single_element("line right length 1.5 dot [open: true] idot");
        assert_eq!(decl.placements.len(), 4);
        match &decl.placements[2].node {
            Placement::Dot(settings) => assert_eq!(settings.len(), 1),
            other => panic!("Expected dot, got {:?}", other),
        }
        assert_eq!(decl.placements[3].node, Placement::IDot(vec![]));
    }

    #[test]
    fn test_parse_statements_on_separate_lines() {
        let doc = parse(
            r#"
            unit 2.5
            line tox M3.drain dot
            dot at M3.gate

            push
            pop
        "#,
        )
        .expect("Should parse");
        assert_eq!(doc.statements.len(), 5);
        assert!(matches!(doc.statements[0].node, Statement::Unit(ref u) if u.node == 2.5));
        assert!(matches!(doc.statements[3].node, Statement::Push));
        assert!(matches!(doc.statements[4].node, Statement::Pop));
    }

    #[test]
    fn test_parse_empty_document() {
        let doc = parse("\n// nothing here\n").expect("Should parse");
        assert!(doc.statements.is_empty());
    }

    #[test]
    fn test_statement_spans_cover_one_line() {
        let source = "line up\nresistor right";
        let doc = parse(source).expect("Should parse");
        assert_eq!(&source[doc.statements[1].span.clone()], "resistor right");
    }

    #[test]
    fn test_two_statements_on_one_line_rejected() {
        assert!(parse("line up line down").is_err());
    }

    #[test]
    fn test_invalid_character_error() {
        let errors = parse("line @ up").unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("'@'"));
    }

    #[test]
    fn test_missing_point_error() {
        assert!(parse("line at").is_err());
    }
}
