//! pscc-drv - Pipeline driver.
//!
//! Owns the three pure entry points the request layer calls (pseudocode →
//! C++, C++ → pseudocode, pseudocode → execution trace) and the `pscc`
//! binary, which can stop the pipeline after any phase:
//!
//! ```text
//! pscc tokens program.psc    lexer output
//! pscc ast program.psc       parser output as a JSON tree
//! pscc cpp program.psc       generated C++
//! pscc trace program.psc     execution trace JSON (reads stdin on citeste)
//! pscc run program.psc       execute and print the program output
//! pscc pseudo program.cpp    C++ → pseudocode
//! ```

use anyhow::Context;
use thiserror::Error;

use pscc_int::{ExecError, Interpreter, QueueInput, StdinInput};
use pscc_lex::{tokenize, LexError};
use pscc_par::{ParseError, Parser, Program};

/// Any failure of a pipeline invocation. The Romanian display strings of
/// the phase errors pass through unchanged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Lex and parse pseudocode into an AST.
pub fn parse_pseudocode(pseudocode: &str) -> Result<Program, PipelineError> {
    let tokens = tokenize(pseudocode)?;
    Ok(Parser::new(tokens).parse_program()?)
}

/// Translate pseudocode to a complete C++ translation unit.
pub fn pseudocode_to_cpp(pseudocode: &str) -> Result<String, PipelineError> {
    let program = parse_pseudocode(pseudocode)?;
    Ok(pscc_gen::emit_cpp(&program))
}

/// Translate a C++ subset back to pseudocode.
pub fn cpp_to_pseudocode(cpp_code: &str) -> String {
    pscc_ctp::transpile(cpp_code)
}

/// Execute pseudocode with tracing enabled and return the step-by-step
/// trace as a JSON array. READ is answered from the pre-filled `inputs`
/// queue so the run is deterministic.
pub fn step_by_step_execution(
    pseudocode: &str,
    inputs: &[String],
) -> Result<String, PipelineError> {
    let program = parse_pseudocode(pseudocode)?;
    let mut interp = Interpreter::with_input(QueueInput::new(inputs.iter().cloned()), true);
    interp.run(&program)?;
    Ok(interp.export_trace_json())
}

/// Execute pseudocode without tracing and return the program output.
pub fn run_program(pseudocode: &str, inputs: &[String]) -> Result<String, PipelineError> {
    let program = parse_pseudocode(pseudocode)?;
    let mut interp = Interpreter::with_input(QueueInput::new(inputs.iter().cloned()), false);
    interp.run(&program)?;
    Ok(interp.final_output().to_string())
}

/// What the CLI should produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Tokens,
    Ast,
    Cpp,
    Pseudo,
    Trace,
    Run,
}

const USAGE: &str = "Utilizare: pscc <tokens|ast|cpp|trace|run|pseudo> <fișier>";

fn parse_command(name: &str) -> Option<Command> {
    match name {
        "tokens" => Some(Command::Tokens),
        "ast" => Some(Command::Ast),
        "cpp" => Some(Command::Cpp),
        "pseudo" => Some(Command::Pseudo),
        "trace" => Some(Command::Trace),
        "run" => Some(Command::Run),
        _ => None,
    }
}

/// Entry point of the `pscc` binary.
pub fn run_cli() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, path) = match args.as_slice() {
        [command, path] => (
            parse_command(command).with_context(|| format!("comandă necunoscută '{command}'\n{USAGE}"))?,
            path,
        ),
        _ => anyhow::bail!("{USAGE}"),
    };

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("nu am putut citi fișierul '{path}'"))?;

    match command {
        Command::Tokens => {
            for token in tokenize(&source)? {
                println!(
                    "{} {:?} (linia {}, coloana {})",
                    token.kind, token.lexeme, token.span.line, token.span.col
                );
            }
        }
        Command::Ast => {
            let program = parse_pseudocode(&source)?;
            println!("{}", serde_json::to_string_pretty(&program.to_json())?);
        }
        Command::Cpp => {
            println!("{}", pseudocode_to_cpp(&source)?);
        }
        Command::Pseudo => {
            println!("{}", cpp_to_pseudocode(&source));
        }
        Command::Trace => {
            let program = parse_pseudocode(&source)?;
            let mut interp = Interpreter::with_input(StdinInput, true);
            interp.run(&program)?;
            println!("{}", interp.export_trace_json());
        }
        Command::Run => {
            let program = parse_pseudocode(&source)?;
            let mut interp = Interpreter::with_input(StdinInput, false);
            interp.run(&program)?;
            print!("{}", interp.final_output());
        }
    }

    Ok(())
}
