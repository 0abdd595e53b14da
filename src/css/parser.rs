//! Recursive-descent stylesheet parser.
//!
//! The parser is strict: any syntax error or unknown pseudo-state rejects
//! the whole stylesheet, and every error carries the 1-based line and column
//! of the offending token so the author can find it.

use logos::Logos;

use crate::css::model::{
    Combinator, CompoundSelector, Declaration, DeclarationValue, PseudoState, RuleSet, Selector,
    SelectorComponent, SelectorPart, StyleSheet,
};
use crate::css::tokenizer::Token;

// ---------------------------------------------------------------------------
// ParseError
// ---------------------------------------------------------------------------

/// A stylesheet parse failure. The sheet it came from is rejected whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at line {line}, column {column}: {message}")]
    UnexpectedToken {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("unknown pseudo-state ':{name}' at line {line}, column {column}")]
    UnknownPseudoState {
        line: usize,
        column: usize,
        name: String,
    },

    #[error("unexpected end of stylesheet")]
    UnexpectedEof,
}

// ---------------------------------------------------------------------------
// Tokens with positions
// ---------------------------------------------------------------------------

/// A token annotated with its source position.
#[derive(Debug, Clone)]
pub struct PToken {
    pub token: Token,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub byte_start: usize,
    pub byte_end: usize,
}

/// Blank out `/* ... */` comments, preserving length and newlines so byte
/// offsets into the result still map to the original source.
pub fn strip_comments(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'/' && bytes[i + 1] == b'*' {
            let mut j = i;
            loop {
                if j + 1 >= bytes.len() {
                    j = bytes.len();
                    break;
                }
                if bytes[j] == b'*' && bytes[j + 1] == b'/' {
                    j += 2;
                    break;
                }
                j += 1;
            }
            for cell in out.iter_mut().take(j).skip(i) {
                if *cell != b'\n' {
                    *cell = b' ';
                }
            }
            i = j;
        } else {
            i += 1;
        }
    }
    // Comments are ASCII-blanked in place, so the result stays valid UTF-8.
    String::from_utf8(out).unwrap_or_else(|_| input.to_owned())
}

/// Tokenize with positions. An unlexable slice is an error, not a skip.
pub fn tokenize_with_spans(source: &str) -> Result<Vec<PToken>, ParseError> {
    let stripped = strip_comments(source);
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(
            stripped
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        )
        .collect();
    let locate = |byte: usize| -> (usize, usize) {
        let line_idx = match line_starts.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line_idx + 1, byte - line_starts[line_idx] + 1)
    };

    let mut lexer = Token::lexer(&stripped);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let (line, column) = locate(span.start);
        match result {
            Ok(token) => tokens.push(PToken {
                token,
                text: lexer.slice().to_owned(),
                line,
                column,
                byte_start: span.start,
                byte_end: span.end,
            }),
            Err(()) => {
                return Err(ParseError::UnexpectedToken {
                    line,
                    column,
                    message: format!("unrecognized input: {:?}", lexer.slice()),
                });
            }
        }
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Recursive-descent parser over positioned tokens.
pub struct Parser {
    tokens: Vec<PToken>,
    cursor: usize,
}

/// Parse a stylesheet source into its data model.
pub fn parse_stylesheet(source: &str) -> Result<StyleSheet, ParseError> {
    let tokens = tokenize_with_spans(source)?;
    Parser::new(tokens).parse()
}

impl Parser {
    pub fn new(tokens: Vec<PToken>) -> Self {
        Self { tokens, cursor: 0 }
    }

    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<&PToken> {
        let tok = self.tokens.get(self.cursor);
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    /// Whether the current token starts at the byte where the previous one
    /// ended. Compound selectors are exactly the adjacent runs.
    fn is_adjacent(&self) -> bool {
        if self.cursor == 0 {
            return true;
        }
        match (self.tokens.get(self.cursor - 1), self.peek()) {
            (Some(prev), Some(cur)) => prev.byte_end == cur.byte_start,
            _ => false,
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        match self.peek() {
            Some(tok) => ParseError::UnexpectedToken {
                line: tok.line,
                column: tok.column,
                message: message.into(),
            },
            None => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<&PToken, ParseError> {
        match self.peek() {
            Some(tok) if tok.token == expected => Ok(self.advance().unwrap()),
            Some(_) => Err(self.error_here(format!("expected {what}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    /// Parse the whole token stream as a stylesheet.
    pub fn parse(&mut self) -> Result<StyleSheet, ParseError> {
        let mut rules = Vec::new();
        while !self.is_eof() {
            rules.push(self.parse_rule()?);
        }
        Ok(StyleSheet { rules })
    }

    fn parse_rule(&mut self) -> Result<RuleSet, ParseError> {
        let selectors = self.parse_selector_list()?;
        self.expect(Token::BraceOpen, "'{'")?;
        let declarations = self.parse_declarations()?;
        self.expect(Token::BraceClose, "'}'")?;
        Ok(RuleSet {
            selectors,
            declarations,
        })
    }

    fn parse_selector_list(&mut self) -> Result<Vec<Selector>, ParseError> {
        let mut selectors = vec![self.parse_selector()?];
        while matches!(self.peek().map(|t| &t.token), Some(Token::Comma)) {
            self.advance();
            selectors.push(self.parse_selector()?);
        }
        Ok(selectors)
    }

    fn starts_compound(token: &Token) -> bool {
        matches!(
            token,
            Token::Ident | Token::Star | Token::Dot | Token::Hash | Token::PseudoState
                | Token::HexColor
        )
    }

    fn parse_selector(&mut self) -> Result<Selector, ParseError> {
        let mut parts = vec![SelectorPart::Compound(self.parse_compound_selector()?)];
        loop {
            match self.peek().map(|t| &t.token) {
                Some(Token::GreaterThan) => {
                    self.advance();
                    parts.push(SelectorPart::Combinator(Combinator::Child));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                Some(token) if Self::starts_compound(token) => {
                    parts.push(SelectorPart::Combinator(Combinator::Descendant));
                    parts.push(SelectorPart::Compound(self.parse_compound_selector()?));
                }
                _ => break,
            }
        }
        Ok(Selector { parts })
    }

    fn parse_compound_selector(&mut self) -> Result<CompoundSelector, ParseError> {
        let mut components = Vec::new();
        loop {
            // After the first component, only byte-adjacent tokens extend
            // the compound; a gap means a descendant combinator.
            if !components.is_empty() && !self.is_adjacent() {
                break;
            }
            let Some(tok) = self.peek() else { break };
            match tok.token {
                Token::Ident => {
                    let name = tok.text.clone();
                    self.advance();
                    components.push(SelectorComponent::Type(name));
                }
                Token::Star => {
                    self.advance();
                    components.push(SelectorComponent::Universal);
                }
                Token::Dot => {
                    self.advance();
                    if !self.is_adjacent() {
                        return Err(self.error_here("expected class name after '.'"));
                    }
                    let tok = self.expect(Token::Ident, "class name after '.'")?;
                    components.push(SelectorComponent::Class(tok.text.clone()));
                }
                Token::Hash => {
                    self.advance();
                    if !self.is_adjacent() {
                        return Err(self.error_here("expected id after '#'"));
                    }
                    let tok = self.expect(Token::Ident, "id after '#'")?;
                    components.push(SelectorComponent::Id(tok.text.clone()));
                }
                // An id whose name happens to be hex digits lexes as a color.
                Token::HexColor => {
                    let name = tok.text.trim_start_matches('#').to_owned();
                    self.advance();
                    components.push(SelectorComponent::Id(name));
                }
                Token::PseudoState => {
                    let name = tok.text.trim_start_matches(':').to_owned();
                    let (line, column) = (tok.line, tok.column);
                    self.advance();
                    let state = PseudoState::parse(&name).ok_or(
                        ParseError::UnknownPseudoState { line, column, name },
                    )?;
                    components.push(SelectorComponent::PseudoState(state));
                }
                _ => break,
            }
        }
        if components.is_empty() {
            return Err(self.error_here("expected selector"));
        }
        Ok(CompoundSelector { components })
    }

    fn parse_declarations(&mut self) -> Result<Vec<Declaration>, ParseError> {
        let mut declarations = Vec::new();
        while let Some(tok) = self.peek() {
            if tok.token == Token::BraceClose {
                break;
            }
            declarations.push(self.parse_declaration()?);
        }
        Ok(declarations)
    }

    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        let property = self
            .expect(Token::Ident, "property name")?
            .text
            .clone();

        // `color:red` lexes the colon fused with the value as a pseudo-state
        // token; split it back apart.
        let mut values = Vec::new();
        match self.peek() {
            Some(tok) if tok.token == Token::Colon => {
                self.advance();
            }
            Some(tok) if tok.token == Token::PseudoState => {
                let ident = tok.text.trim_start_matches(':').to_owned();
                self.advance();
                values.push(DeclarationValue::Ident(ident));
            }
            _ => return Err(self.error_here("expected ':' after property name")),
        }

        let mut important = false;
        loop {
            let Some(tok) = self.peek() else {
                return Err(ParseError::UnexpectedEof);
            };
            match tok.token {
                Token::Semicolon => {
                    self.advance();
                    break;
                }
                Token::BraceClose => break,
                Token::Important => {
                    important = true;
                    self.advance();
                }
                _ => values.push(self.parse_declaration_value()?),
            }
        }

        if values.is_empty() {
            return Err(self.error_here("expected value in declaration"));
        }
        Ok(Declaration {
            property,
            values,
            important,
        })
    }

    fn parse_declaration_value(&mut self) -> Result<DeclarationValue, ParseError> {
        let Some(tok) = self.peek() else {
            return Err(ParseError::UnexpectedEof);
        };
        let value = match tok.token {
            Token::Ident => DeclarationValue::Ident(tok.text.clone()),
            Token::Number => {
                let n: f32 = tok
                    .text
                    .parse()
                    .map_err(|_| self.error_here("invalid number"))?;
                DeclarationValue::Number(n)
            }
            Token::Dimension => {
                let (number, unit) = split_dimension(&tok.text)
                    .ok_or_else(|| self.error_here("invalid dimension"))?;
                DeclarationValue::Dimension(number, unit)
            }
            Token::HexColor => {
                DeclarationValue::Color(tok.text.trim_start_matches('#').to_owned())
            }
            _ => return Err(self.error_here("expected declaration value")),
        };
        self.advance();
        Ok(value)
    }
}

/// Split `"1.5fr"` into `(1.5, "fr")`.
fn split_dimension(text: &str) -> Option<(f32, String)> {
    let unit_start = text.find(|c: char| c.is_ascii_alphabetic() || c == '%')?;
    let number: f32 = text[..unit_start].parse().ok()?;
    Some((number, text[unit_start..].to_owned()))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_comments_preserves_length() {
        let src = "a /* gone\nstill gone */ b";
        let stripped = strip_comments(src);
        assert_eq!(stripped.len(), src.len());
        assert!(stripped.contains('\n'));
        assert!(!stripped.contains("gone"));
    }

    #[test]
    fn strip_unterminated_comment() {
        let stripped = strip_comments("a /* never ends");
        assert_eq!(stripped.trim(), "a");
    }

    #[test]
    fn parse_empty() {
        let sheet = parse_stylesheet("").unwrap();
        assert!(sheet.rules.is_empty());
    }

    #[test]
    fn parse_simple_rule() {
        let sheet = parse_stylesheet("Button { color: red; }").unwrap();
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.selectors.len(), 1);
        assert_eq!(rule.declarations.len(), 1);
        assert_eq!(rule.declarations[0].property, "color");
        assert_eq!(
            rule.declarations[0].values,
            vec![DeclarationValue::Ident("red".into())]
        );
    }

    #[test]
    fn parse_unspaced_declaration_colon() {
        let sheet = parse_stylesheet("Button { color:red; }").unwrap();
        assert_eq!(
            sheet.rules[0].declarations[0].values,
            vec![DeclarationValue::Ident("red".into())]
        );
    }

    #[test]
    fn parse_compound_selector_components() {
        let sheet = parse_stylesheet("Button.primary#ok:focus { color: red; }").unwrap();
        let Selector { parts } = &sheet.rules[0].selectors[0];
        assert_eq!(parts.len(), 1);
        let SelectorPart::Compound(compound) = &parts[0] else {
            panic!("expected compound");
        };
        assert_eq!(
            compound.components,
            vec![
                SelectorComponent::Type("Button".into()),
                SelectorComponent::Class("primary".into()),
                SelectorComponent::Id("ok".into()),
                SelectorComponent::PseudoState(PseudoState::Focus),
            ]
        );
    }

    #[test]
    fn parse_descendant_vs_compound() {
        // `.a .b` is two compounds; `.a.b` is one.
        let apart = parse_stylesheet(".a .b { color: red; }").unwrap();
        assert_eq!(apart.rules[0].selectors[0].parts.len(), 3);

        let together = parse_stylesheet(".a.b { color: red; }").unwrap();
        assert_eq!(together.rules[0].selectors[0].parts.len(), 1);
    }

    #[test]
    fn parse_child_combinator() {
        let sheet = parse_stylesheet("Panel > Button { color: red; }").unwrap();
        let parts = &sheet.rules[0].selectors[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[1],
            SelectorPart::Combinator(Combinator::Child)
        );
    }

    #[test]
    fn parse_selector_list() {
        let sheet = parse_stylesheet("Button, .primary, #ok { color: red; }").unwrap();
        assert_eq!(sheet.rules[0].selectors.len(), 3);
    }

    #[test]
    fn parse_dimension_values() {
        let sheet = parse_stylesheet("Panel { width: 1fr; height: 50%; }").unwrap();
        let decls = &sheet.rules[0].declarations;
        assert_eq!(
            decls[0].values,
            vec![DeclarationValue::Dimension(1.0, "fr".into())]
        );
        assert_eq!(
            decls[1].values,
            vec![DeclarationValue::Dimension(50.0, "%".into())]
        );
    }

    #[test]
    fn parse_hex_color_value() {
        let sheet = parse_stylesheet("Panel { background: #ff0000; }").unwrap();
        assert_eq!(
            sheet.rules[0].declarations[0].values,
            vec![DeclarationValue::Color("ff0000".into())]
        );
    }

    #[test]
    fn parse_important() {
        let sheet = parse_stylesheet("Panel { color: red !important; }").unwrap();
        assert!(sheet.rules[0].declarations[0].important);
    }

    #[test]
    fn parse_multiple_values() {
        let sheet = parse_stylesheet("Panel { margin: 1 2 3 4; }").unwrap();
        assert_eq!(sheet.rules[0].declarations[0].values.len(), 4);
    }

    #[test]
    fn parse_last_declaration_without_semicolon() {
        let sheet = parse_stylesheet("Panel { color: red }").unwrap();
        assert_eq!(sheet.rules[0].declarations.len(), 1);
    }

    #[test]
    fn unknown_pseudo_state_is_rejected_with_position() {
        let err = parse_stylesheet("Button:active { color: red; }").unwrap_err();
        match err {
            ParseError::UnknownPseudoState { line, column, name } => {
                assert_eq!(name, "active");
                assert_eq!(line, 1);
                assert_eq!(column, 7);
            }
            other => panic!("expected UnknownPseudoState, got: {other:?}"),
        }
    }

    #[test]
    fn missing_brace_reports_position() {
        let err = parse_stylesheet("Button color: red; }").unwrap_err();
        match err {
            ParseError::UnexpectedToken { line, column, .. } => {
                assert_eq!(line, 1);
                assert!(column > 1);
            }
            other => panic!("expected UnexpectedToken, got: {other:?}"),
        }
    }

    #[test]
    fn error_position_counts_lines() {
        let err = parse_stylesheet("Button {\n  color: red;\n  oops\n}").unwrap_err();
        match err {
            ParseError::UnexpectedToken { line, .. } => assert_eq!(line, 4),
            other => panic!("expected UnexpectedToken, got: {other:?}"),
        }
    }

    #[test]
    fn unterminated_rule_is_eof() {
        let err = parse_stylesheet("Button { color: red;").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEof);
    }

    #[test]
    fn comments_are_ignored() {
        let sheet =
            parse_stylesheet("/* header */ Button { /* inline */ color: red; }").unwrap();
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].declarations.len(), 1);
    }

    #[test]
    fn parse_multiple_rules() {
        let sheet = parse_stylesheet("A { color: red; } B { color: blue; }").unwrap();
        assert_eq!(sheet.rules.len(), 2);
    }
}
