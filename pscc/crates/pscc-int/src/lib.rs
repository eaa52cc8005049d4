//! pscc-int - Tracing interpreter for the pseudocode dialect.
//!
//! A single-threaded, synchronous visitor over the AST. One run owns one
//! global variable store (the language has no scopes) and one output
//! buffer; when tracing is enabled, every visited node records an
//! [`ExecutionStep`] carrying a deep snapshot of the store and the output
//! accumulated so far. The step sequence is what the step-by-step
//! debugger surface serves to clients, as a JSON array.
//!
//! READ is satisfied by an [`InputProvider`]; tests and the service layer
//! use [`QueueInput`] to make runs deterministic, the CLI uses
//! [`StdinInput`].

mod error;
mod input;
mod interpreter;
mod ops;
mod step;
mod value;

pub use error::ExecError;
pub use input::{InputProvider, QueueInput, StdinInput};
pub use interpreter::Interpreter;
pub use step::{ExecutionStep, VarStore};
pub use value::Value;
