//! Lexer for schematic scripts using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
pub enum Token {
    // Element kind keywords
    #[token("line")]
    Line,
    #[token("resistor")]
    Resistor,
    #[token("capacitor")]
    Capacitor,
    #[token("inductor")]
    Inductor,
    #[token("source_v")]
    SourceV,
    #[token("source_i")]
    SourceI,
    #[token("source_sin")]
    SourceSin,
    #[token("source_square")]
    SourceSquare,
    #[token("nfet")]
    NFet,
    #[token("pfet")]
    PFet,
    #[token("dot")]
    Dot,
    #[token("ground")]
    Ground,
    #[token("label")]
    Label,

    // Session statements
    #[token("unit")]
    Unit,
    #[token("push")]
    Push,
    #[token("pop")]
    Pop,

    // Direction keywords
    #[token("up")]
    Up,
    #[token("down")]
    Down,
    #[token("left")]
    Left,
    #[token("right")]
    Right,

    // Placement keywords
    #[token("length")]
    Length,
    #[token("theta")]
    Theta,
    #[token("at")]
    At,
    #[token("to")]
    To,
    #[token("tox")]
    ToX,
    #[token("toy")]
    ToY,
    #[token("chain")]
    Chain,
    #[token("anchor")]
    Anchor,
    #[token("reverse")]
    Reverse,
    #[token("flip")]
    Flip,
    #[token("idot")]
    IDot,

    // Point expression keywords
    #[token("here")]
    Here,
    #[token("last")]
    Last,
    #[token("mid")]
    Mid,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("=")]
    Equals,

    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Period,
    #[token("#")]
    Hash,

    /// Statements are newline separated
    #[token("\n")]
    Newline,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    String(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    // Comments (skip)
    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/", logos::skip)]
    BlockComment,
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

/// Spans of input that no token matches
pub fn invalid_spans(input: &str) -> Vec<Span> {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.is_err().then_some(span))
        .collect()
}
