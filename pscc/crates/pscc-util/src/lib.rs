//! pscc-util - Shared infrastructure for the pseudocode toolchain.
//!
//! The only thing every phase needs is a way to talk about source
//! positions; it lives here so that `pscc-lex`, `pscc-par` and `pscc-int`
//! agree on what a location is.

pub mod span;

pub use span::Span;
