//! Lexer for the stylesheet dialect, built on [`logos`].
//!
//! The token set is deliberately closed: identifiers, numbers, dimensions
//! (`fr`, `%`, `vw`, `vh`), hex colors, pseudo-state selectors, `!important`,
//! and punctuation. Comments are stripped before lexing (see
//! [`crate::css::parser::strip_comments`]).

use logos::Logos;

/// A lexical token. Pattern order matters: more specific patterns
/// (dimensions, hex colors) are listed before the general ident/number ones.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    /// `!important` (whitespace allowed after the bang).
    #[regex(r"![ \t]*important")]
    Important,

    /// Hex color: `#rgb`, `#rrggbb`, or `#rrggbbaa`.
    #[regex(r"#[0-9a-fA-F]{3,8}")]
    HexColor,

    /// A number with a unit suffix: `1fr`, `50%`, `100vw`, `80vh`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?(fr|%|vw|vh)")]
    Dimension,

    /// Pseudo-state selector: `:focus`, `:hover`, `:disabled`.
    #[regex(r":[a-zA-Z][a-zA-Z0-9_-]*")]
    PseudoState,

    /// A bare number: `3`, `-1`, `2.5`.
    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    /// Identifier: property names, keywords, type/class names.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("#")]
    Hash,

    #[token("*")]
    Star,

    #[token(">")]
    GreaterThan,
}

/// Tokenize `input`, discarding spans. Unlexable slices are skipped.
///
/// Primarily a test convenience; the parser uses spans via
/// [`crate::css::parser::tokenize_with_spans`].
pub fn tokenize(input: &str) -> Vec<(Token, String)> {
    let mut lexer = Token::lexer(input);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        if let Ok(token) = result {
            out.push((token, lexer.slice().to_owned()));
        }
    }
    out
}

// ===========================================================================
// Tests
// ===========================================================================
