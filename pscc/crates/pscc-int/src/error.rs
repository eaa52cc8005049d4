//! Runtime errors.
//!
//! All of them are fatal within a run: the interpreter aborts at the
//! first one and the caller gets a Romanian message carrying the
//! offending construct and the source line. Steps recorded before the
//! failure stay available on the interpreter.

use thiserror::Error;

/// Fatal runtime error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecError {
    /// Read of a variable that was never assigned.
    #[error("Variabilă nedefinită '{name}' la linia {line}")]
    UndefinedVariable { name: String, line: u32 },

    /// `/` or `%` with a zero divisor.
    #[error("Împărțire la zero la linia {line}")]
    DivisionByZero { line: u32 },

    /// Operand types the operator does not accept (e.g. subtracting a
    /// string).
    #[error("Operanzi nevalizi pentru '{op}' la linia {line}")]
    InvalidOperands { op: String, line: u32 },

    /// `sqrt` of a negative number.
    #[error("Radical din număr negativ la linia {line}")]
    NegativeSqrt { line: u32 },

    /// Integer arithmetic left the machine range.
    #[error("Depășire aritmetică la '{op}' la linia {line}")]
    Overflow { op: String, line: u32 },

    /// A numeric literal whose lexeme does not fit the machine types.
    #[error("Literal numeric nevalid '{text}' la linia {line}")]
    InvalidLiteral { text: String, line: u32 },

    /// `pentru` with a step that evaluates to zero would never terminate.
    #[error("Pas zero în bucla 'pentru' la linia {line}")]
    ZeroStep { line: u32 },

    /// `pentru` with a non-numeric step.
    #[error("Pas nevalid în bucla 'pentru' la linia {line}")]
    InvalidStep { line: u32 },

    /// READ requested a line and the input provider had none.
    #[error("Nu există valoare de intrare pentru '{name}' la linia {line}")]
    InputExhausted { name: String, line: u32 },
}
