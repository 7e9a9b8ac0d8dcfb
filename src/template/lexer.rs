//! logos-based tokenizer for template expressions.
//!
//! Token priority in logos is determined by:
//! 1. Longest match wins (e.g. `===` beats `==` beats `=`)
//! 2. For equal length matches, earlier-defined variants win
//!
//! Keywords are declared with `#[token]` so they beat [`Token::Ident`] on
//! equal length.

use logos::Logos;

/// Expression token produced by the lexer.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Operators (longest first) ────────────────────────────────────
    #[token("===")]
    StrictEq,
    #[token("!==")]
    StrictNe,
    #[token("==")]
    Eq,
    #[token("!=")]
    Ne,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("??")]
    Nullish,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("=")]
    Assign,

    // ── Punctuation ──────────────────────────────────────────────────
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,

    // ── Keywords ─────────────────────────────────────────────────────
    #[token("this")]
    This,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,

    // ── Literals ─────────────────────────────────────────────────────

    /// Unsigned decimal number; negation is a unary operator.
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    /// Double-quoted string with backslash escapes.
    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoted,

    /// Single-quoted string with backslash escapes.
    #[regex(r"'([^'\\]|\\.)*'")]
    SingleQuoted,

    /// Identifier: property, variable and method names.
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,
}

/// Remove the quotes of a string token and resolve its escapes.
pub fn unquote(raw: &str) -> String {
    let inner = &raw[1..raw.len().saturating_sub(1).max(1)];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token> {
        Token::lexer(input).filter_map(Result::ok).collect()
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(lex("a === b"), vec![Token::Ident, Token::StrictEq, Token::Ident]);
        assert_eq!(lex("a !== b"), vec![Token::Ident, Token::StrictNe, Token::Ident]);
        assert_eq!(lex("!a"), vec![Token::Bang, Token::Ident]);
    }

    #[test]
    fn keywords_beat_identifiers() {
        assert_eq!(lex("this.x"), vec![Token::This, Token::Dot, Token::Ident]);
        assert_eq!(lex("thisx"), vec![Token::Ident]);
        assert_eq!(lex("true false null undefined"), vec![
            Token::True,
            Token::False,
            Token::Null,
            Token::Undefined
        ]);
    }

    #[test]
    fn strings_and_numbers() {
        assert_eq!(lex(r#"'it\'s' "a\"b" 1.5"#), vec![
            Token::SingleQuoted,
            Token::DoubleQuoted,
            Token::Number
        ]);
    }

    #[test]
    fn unquote_resolves_escapes() {
        assert_eq!(unquote(r"'it\'s'"), "it's");
        assert_eq!(unquote(r"'a\\b\nc\td'"), "a\\b\nc\td");
        assert_eq!(unquote("''"), "");
    }

    #[test]
    fn unknown_character_is_an_error() {
        let results: Vec<_> = Token::lexer("a # b").collect();
        assert!(results.iter().any(Result::is_err));
    }
}
