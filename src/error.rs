//! Error types for parsing and script validation

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    /// Well-formed syntax with a meaning the layout engine cannot accept
    #[error("Invalid script at {span:?}: {message}")]
    Invalid { span: Span, message: String },
}

impl ParseError {
    pub fn invalid(span: Span, message: impl Into<String>) -> Self {
        ParseError::Invalid {
            span,
            message: message.into(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::Syntax { span, .. } | ParseError::Invalid { span, .. } => span.clone(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                format_report(
                    source,
                    filename,
                    span.clone(),
                    message,
                    &format!("{}{}", message, expected_str),
                    None,
                )
            }
            ParseError::Invalid { span, message } => {
                format_report(source, filename, span.clone(), message, message, None)
            }
        }
    }
}

/// Render a single-label ariadne report into a string
pub(crate) fn format_report(
    source: &str,
    filename: &str,
    span: Span,
    message: &str,
    label: &str,
    help: Option<String>,
) -> String {
    let mut buf = Vec::new();
    let mut report = Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span))
                .with_message(label)
                .with_color(Color::Red),
        );
    if let Some(help) = help {
        report = report.with_help(help);
    }
    if report
        .finish()
        .write((filename, Source::from(source)), &mut buf)
        .is_err()
    {
        return format!("{}: {}", filename, message);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::Custom(msg) => msg.to_string(),
            _ => {
                let found_str = match err.found() {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
        };

        let mut expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                _ => None,
            })
            .collect();
        expected.sort();
        expected.dedup();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::String(s) => format!("string \"{}\"", s),
        Token::Number(n) => format!("number {}", n),
        Token::Newline => "end of line".to_string(),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::BracketOpen => "'['".to_string(),
        Token::BracketClose => "']'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Period => "'.'".to_string(),
        Token::Hash => "'#'".to_string(),
        // Element kinds
        Token::Line => "keyword 'line'".to_string(),
        Token::Resistor => "keyword 'resistor'".to_string(),
        Token::Capacitor => "keyword 'capacitor'".to_string(),
        Token::Inductor => "keyword 'inductor'".to_string(),
        Token::SourceV => "keyword 'source_v'".to_string(),
        Token::SourceI => "keyword 'source_i'".to_string(),
        Token::SourceSin => "keyword 'source_sin'".to_string(),
        Token::SourceSquare => "keyword 'source_square'".to_string(),
        Token::NFet => "keyword 'nfet'".to_string(),
        Token::PFet => "keyword 'pfet'".to_string(),
        Token::Dot => "keyword 'dot'".to_string(),
        Token::Ground => "keyword 'ground'".to_string(),
        Token::Label => "keyword 'label'".to_string(),
        // Directions
        Token::Up => "keyword 'up'".to_string(),
        Token::Down => "keyword 'down'".to_string(),
        Token::Left => "keyword 'left'".to_string(),
        Token::Right => "keyword 'right'".to_string(),
        // Other
        _ => format!("{:?}", tok),
    }
}
