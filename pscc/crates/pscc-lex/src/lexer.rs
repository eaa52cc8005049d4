//! The lexer proper: one compiled master pattern, applied left to right.
//!
//! Every entry of [`TOKEN_SPECS`] becomes one capture group of the master
//! regex, in table order. The regex engine prefers earlier alternatives at
//! the same position, so the table ordering is load-bearing:
//!
//! * multi-word keywords (`cat timp`, `pana cand`) come before anything
//!   that could eat their first word;
//! * multi-character operators (`<-`, `<=`, `>=`, `!=`) come before their
//!   single-character prefixes;
//! * the identifier rule comes after every keyword, and the final `.`
//!   rule catches anything unrecognized so it can be reported.
//!
//! Keywords are matched with word boundaries and the whole pattern is
//! case-insensitive; identifier lexemes keep their original casing.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use pscc_util::Span;

use crate::token::{Token, TokenKind};

/// What to do with a matched pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rule {
    /// Produce a token of this kind.
    Emit(TokenKind),
    /// Bump the line counter, emit nothing.
    Newline,
    /// Discard (spaces, tabs, carriage returns).
    Skip,
    /// Unrecognized character: lexical error.
    Mismatch,
}

/// Ordered pattern table. Order is a contract, not an optimization.
const TOKEN_SPECS: &[(Rule, &str)] = &[
    // Execution flow
    (Rule::Emit(TokenKind::CatTimp), r"\bcat timp\b"),
    (Rule::Emit(TokenKind::Executa), r"\bexecuta\b"),
    (Rule::Emit(TokenKind::SfarsitCat), r"\bsfarsit_cat_timp\b"),
    (Rule::Emit(TokenKind::Daca), r"\bdaca\b"),
    (Rule::Emit(TokenKind::Atunci), r"\batunci\b"),
    (Rule::Emit(TokenKind::Altfel), r"\baltfel\b"),
    (Rule::Emit(TokenKind::SfarsitDaca), r"\bsfarsit_daca\b"),
    (Rule::Emit(TokenKind::Pentru), r"\bpentru\b"),
    (Rule::Emit(TokenKind::SfarsitPentru), r"\bsfarsit_pentru\b"),
    (Rule::Emit(TokenKind::Repeta), r"\brepeta\b"),
    (Rule::Emit(TokenKind::PanaCand), r"\bpana cand\b"),
    // Command keywords
    (Rule::Emit(TokenKind::Citeste), r"\bciteste\b"),
    (Rule::Emit(TokenKind::Scrie), r"\bscrie\b"),
    (Rule::Emit(TokenKind::Sqrt), r"\bsqrt\b"),
    // Boolean literals
    (Rule::Emit(TokenKind::True), r"\badevarat\b"),
    (Rule::Emit(TokenKind::False), r"\bfals\b"),
    // Logical operators
    (Rule::Emit(TokenKind::Not), r"\bnot\b"),
    (Rule::Emit(TokenKind::And), r"\bsi\b"),
    (Rule::Emit(TokenKind::Or), r"\bsau\b"),
    // Operators, multi-character spellings first
    (Rule::Emit(TokenKind::Assign), r"<-|:="),
    (Rule::Emit(TokenKind::Neq), r"≠|!="),
    (Rule::Emit(TokenKind::Lte), r"≤|<="),
    (Rule::Emit(TokenKind::Gte), r"≥|>="),
    (Rule::Emit(TokenKind::Pow), r"\^"),
    (Rule::Emit(TokenKind::Lt), r"<"),
    (Rule::Emit(TokenKind::Gt), r">"),
    (Rule::Emit(TokenKind::Eq), r"="),
    (Rule::Emit(TokenKind::Plus), r"\+"),
    (Rule::Emit(TokenKind::Minus), r"-"),
    (Rule::Emit(TokenKind::Mul), r"\*"),
    (Rule::Emit(TokenKind::Div), r"/"),
    (Rule::Emit(TokenKind::Mod), r"%"),
    // Delimiters
    (Rule::Emit(TokenKind::LBracket), r"\["),
    (Rule::Emit(TokenKind::RBracket), r"\]"),
    (Rule::Emit(TokenKind::LParen), r"\("),
    (Rule::Emit(TokenKind::RParen), r"\)"),
    (Rule::Emit(TokenKind::Comma), r","),
    // Numbers: integer or decimal
    (Rule::Emit(TokenKind::Number), r"\d+(?:\.\d+)?"),
    // Identifiers
    (Rule::Emit(TokenKind::Id), r"[a-zA-Z_][a-zA-Z0-9_]*"),
    // Strings: single- or double-quoted, with backslash escapes
    (
        Rule::Emit(TokenKind::Str),
        r#"'(?:\\.|[^\\'])*'|"(?:\\.|[^\\"])*""#,
    ),
    (Rule::Newline, r"\n"),
    (Rule::Skip, r"[ \t\r]+"),
    (Rule::Mismatch, r"."),
];

/// The master pattern, compiled once. Group `i + 1` corresponds to
/// `TOKEN_SPECS[i]`.
static MASTER: Lazy<Regex> = Lazy::new(|| {
    let alternation = TOKEN_SPECS
        .iter()
        .map(|(_, pattern)| format!("({pattern})"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){alternation}")).expect("master token pattern must compile")
});

/// Lexical error: the source contained a character no rule accepts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Character outside the lexical surface of the dialect.
    #[error("Caracter neașteptat '{ch}' la linia {line}, coloana {col}")]
    UnexpectedChar { ch: char, line: u32, col: u32 },
}

/// Transform source text into a token stream terminated by `EOF`.
///
/// Whitespace is discarded, newlines advance the line counter, and the
/// first unrecognized character aborts the scan.
///
/// # Examples
///
/// ```
/// use pscc_lex::{tokenize, TokenKind};
///
/// let tokens = tokenize("a <- 5").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![TokenKind::Id, TokenKind::Assign, TokenKind::Number, TokenKind::Eof]
/// );
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut line: u32 = 1;
    let mut line_start: usize = 0;

    for caps in MASTER.captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(index) = (1..=TOKEN_SPECS.len()).find(|&i| caps.get(i).is_some()) else {
            continue;
        };
        let col = (whole.start() - line_start) as u32;

        match TOKEN_SPECS[index - 1].0 {
            Rule::Newline => {
                line += 1;
                line_start = whole.end();
            }
            Rule::Skip => {}
            Rule::Mismatch => {
                let ch = whole.as_str().chars().next().unwrap_or('\u{fffd}');
                return Err(LexError::UnexpectedChar { ch, line, col });
            }
            Rule::Emit(kind) => {
                tokens.push(Token::new(kind, whole.as_str(), Span::new(line, col)));
            }
        }
    }

    tokens.push(Token::eof(line));
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("lexing failed")
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_empty_source_is_just_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_assignment_statement() {
        assert_eq!(
            kinds("suma <- 0"),
            vec![TokenKind::Id, TokenKind::Assign, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn test_multi_word_keywords_win_over_identifiers() {
        assert_eq!(
            kinds("cat timp x executa"),
            vec![
                TokenKind::CatTimp,
                TokenKind::Id,
                TokenKind::Executa,
                TokenKind::Eof
            ]
        );
        assert_eq!(
            kinds("repeta pana cand x"),
            vec![
                TokenKind::Repeta,
                TokenKind::PanaCand,
                TokenKind::Id,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_terminator_keywords_are_not_split() {
        // "sfarsit_cat_timp" must not decompose into ID + "cat timp".
        assert_eq!(kinds("sfarsit_cat_timp"), vec![TokenKind::SfarsitCat, TokenKind::Eof]);
        assert_eq!(
            kinds("sfarsit_pentru"),
            vec![TokenKind::SfarsitPentru, TokenKind::Eof]
        );
    }

    #[test]
    fn test_multi_char_operators_before_prefixes() {
        assert_eq!(
            kinds("a <- b <= c < d"),
            vec![
                TokenKind::Id,
                TokenKind::Assign,
                TokenKind::Id,
                TokenKind::Lte,
                TokenKind::Id,
                TokenKind::Lt,
                TokenKind::Id,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unicode_operator_spellings() {
        assert_eq!(
            kinds("a ≠ b ≤ c ≥ d"),
            vec![
                TokenKind::Id,
                TokenKind::Neq,
                TokenKind::Id,
                TokenKind::Lte,
                TokenKind::Id,
                TokenKind::Gte,
                TokenKind::Id,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_alternate_assign_spelling() {
        assert_eq!(
            kinds("x := 3"),
            vec![TokenKind::Id, TokenKind::Assign, TokenKind::Number, TokenKind::Eof]
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(
            kinds("DACA x ATUNCI SCRIE x SFARSIT_DACA"),
            vec![
                TokenKind::Daca,
                TokenKind::Id,
                TokenKind::Atunci,
                TokenKind::Scrie,
                TokenKind::Id,
                TokenKind::SfarsitDaca,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_identifier_casing_is_preserved() {
        let tokens = tokenize("Suma <- 1").unwrap();
        assert_eq!(tokens[0].lexeme, "Suma");
    }

    #[test]
    fn test_numbers_integer_and_decimal() {
        let tokens = tokenize("3 3.25").unwrap();
        assert_eq!(tokens[0].lexeme, "3");
        assert_eq!(tokens[1].lexeme, "3.25");
        assert_eq!(tokens[1].kind, TokenKind::Number);
    }

    #[test]
    fn test_strings_keep_quotes_in_lexeme() {
        let tokens = tokenize(r#"scrie "DA", 'nu'"#).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Str);
        assert_eq!(tokens[1].lexeme, r#""DA""#);
        assert_eq!(tokens[3].lexeme, "'nu'");
    }

    #[test]
    fn test_string_with_escaped_quote() {
        let tokens = tokenize(r#"scrie "a\"b""#).unwrap();
        assert_eq!(tokens[1].lexeme, r#""a\"b""#);
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = tokenize("a <- 1\n  b <- 2").unwrap();
        assert_eq!(tokens[0].span.line, 1);
        assert_eq!(tokens[0].span.col, 0);
        // "b" sits on line 2, after two spaces.
        assert_eq!(tokens[3].span.line, 2);
        assert_eq!(tokens[3].span.col, 2);
    }

    #[test]
    fn test_crlf_input_lexes_cleanly() {
        assert_eq!(
            kinds("a <- 1\r\nb <- 2"),
            vec![
                TokenKind::Id,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Id,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unexpected_character_reports_position() {
        let err = tokenize("a <- 1\nb @ 2").unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedChar {
                ch: '@',
                line: 2,
                col: 2
            }
        );
        let message = err.to_string();
        assert!(message.contains("Caracter neașteptat"));
        assert!(message.contains("linia 2"));
    }

    #[test]
    fn test_floor_brackets_and_parens() {
        assert_eq!(
            kinds("[ ( ) ] ,"),
            vec![
                TokenKind::LBracket,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::RBracket,
                TokenKind::Comma,
                TokenKind::Eof
            ]
        );
    }

    proptest! {
        // Two invocations over the same input must agree, errors included.
        #[test]
        fn prop_tokenize_is_deterministic(source in ".{0,120}") {
            prop_assert_eq!(tokenize(&source), tokenize(&source));
        }

        // Every successful scan ends in exactly one EOF token.
        #[test]
        fn prop_eof_terminates_stream(source in "[a-z0-9 <>=+*/,\\n-]{0,80}") {
            if let Ok(tokens) = tokenize(&source) {
                prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
                let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
                prop_assert_eq!(eofs, 1);
            }
        }
    }
}
