//! pscc-lex - Lexical analyzer for the pbinfo pseudocode dialect.
//!
//! The surface language is Romanian, case-insensitive, and contains
//! multi-word keywords (`cat timp`, `pana cand`) as well as Unicode
//! operator spellings (`≠`, `≤`, `≥`). A hand-written character scanner
//! would have to special-case all of that, so the lexer is instead a
//! single compiled regex alternation over an ordered pattern table; the
//! order of the table is part of the language contract (longer keywords
//! and multi-character operators must win over their prefixes).

mod lexer;
mod token;

pub use lexer::{tokenize, LexError};
pub use token::{Token, TokenKind};
