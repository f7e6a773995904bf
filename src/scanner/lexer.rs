//! Lexer for delimited expression regions using logos
//!
//! Only delimiters matter while scanning a region. Quoted string literals are
//! lexed as single opaque tokens so that delimiters inside them never change
//! nesting depth. An unclosed quote runs to the end of the input.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionToken {
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token("[")]
    BracketOpen,
    #[token("]")]
    BracketClose,
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,

    #[regex(r#""([^"\\]|\\.)*"?"#)]
    #[regex(r"'([^'\\]|\\.)*'?")]
    StringLiteral,

    #[regex(r#"[^{}\[\]()"']+"#)]
    Text,
}

/// The three delimiter families an expression region can nest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Brace,
    Bracket,
    Paren,
}

impl Delimiter {
    pub fn close_char(self) -> char {
        match self {
            Delimiter::Brace => '}',
            Delimiter::Bracket => ']',
            Delimiter::Paren => ')',
        }
    }
}

impl RegionToken {
    /// The delimiter this token opens, if any
    pub fn opens(self) -> Option<Delimiter> {
        match self {
            RegionToken::BraceOpen => Some(Delimiter::Brace),
            RegionToken::BracketOpen => Some(Delimiter::Bracket),
            RegionToken::ParenOpen => Some(Delimiter::Paren),
            _ => None,
        }
    }

    /// The delimiter this token closes, if any
    pub fn closes(self) -> Option<Delimiter> {
        match self {
            RegionToken::BraceClose => Some(Delimiter::Brace),
            RegionToken::BracketClose => Some(Delimiter::Bracket),
            RegionToken::ParenClose => Some(Delimiter::Paren),
            _ => None,
        }
    }
}

/// Lex `source` from byte offset `start`, yielding spans relative to the whole source.
pub fn lex_region(source: &str, start: usize) -> impl Iterator<Item = (RegionToken, Span)> + '_ {
    RegionToken::lexer(&source[start..])
        .spanned()
        .map(move |(tok, span)| {
            let span = span.start + start..span.end + start;
            (tok.unwrap_or(RegionToken::Text), span)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<RegionToken> {
        lex_region(input, 0).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(
            kinds("{}[]()"),
            vec![
                RegionToken::BraceOpen,
                RegionToken::BraceClose,
                RegionToken::BracketOpen,
                RegionToken::BracketClose,
                RegionToken::ParenOpen,
                RegionToken::ParenClose,
            ]
        );
    }

    #[test]
    fn test_text_runs_merge() {
        assert_eq!(
            kinds("a + b}"),
            vec![RegionToken::Text, RegionToken::BraceClose]
        );
    }

    #[test]
    fn test_strings_hide_delimiters() {
        assert_eq!(
            kinds(r#"f("}") + g('{')"#),
            vec![
                RegionToken::Text,
                RegionToken::ParenOpen,
                RegionToken::StringLiteral,
                RegionToken::ParenClose,
                RegionToken::Text,
                RegionToken::ParenOpen,
                RegionToken::StringLiteral,
                RegionToken::ParenClose,
            ]
        );
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        assert_eq!(
            kinds(r#""a\"}" }"#),
            vec![
                RegionToken::StringLiteral,
                RegionToken::Text,
                RegionToken::BraceClose
            ]
        );
    }

    #[test]
    fn test_unclosed_quote_runs_to_end() {
        assert_eq!(
            kinds("it's }"),
            vec![RegionToken::Text, RegionToken::StringLiteral]
        );
    }

    #[test]
    fn test_spans_are_offset() {
        let spans: Vec<_> = lex_region("xx{a}", 2).map(|(_, s)| s).collect();
        assert_eq!(spans, vec![2..3, 3..4, 4..5]);
    }

    #[test]
    fn test_close_char() {
        assert_eq!(Delimiter::Paren.close_char(), ')');
        assert_eq!(Delimiter::Bracket.close_char(), ']');
    }
}
