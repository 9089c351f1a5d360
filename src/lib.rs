//! # dakota
//!
//! Dakota is a small interpreted language for numerical and matrix
//! programming with indentation-defined blocks. This crate contains the full
//! front end and evaluator: an off-side-rule lexer, a precedence-climbing
//! parser over a flat AST arena, and a tree-walking evaluator whose value
//! model covers integers, floats, booleans, strings and dense 2-D matrices.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]

use crate::interpreter::{evaluator::Interpreter, lexer::Lexer, parser::Parser};

/// Defines the structure of parsed code.
///
/// This module declares the flat AST node record, its per-kind payloads and
/// the operator enums. Nodes refer to each other through 32-bit arena
/// indices; ordered children form `next_sibling` chains.
pub mod ast;
/// Provides the error types of every phase.
///
/// Lexical errors are fatal and abort tokenization. Parse errors are
/// recorded as diagnostics with positions while the parser recovers and
/// keeps going. Runtime errors unwind evaluation to the top level.
pub mod error;
/// Orchestrates the pipeline: lexer, parser, and evaluator.
///
/// Control flows `source → tokens → AST arena → evaluation` against a root
/// environment; each component consumes the previous one's output.
pub mod interpreter;

/// Runs a source string through the full pipeline.
///
/// This is the one-shot entry point used by the driver and the tests:
/// tokenize, parse, and interpret against a fresh environment, writing
/// program output to standard output.
///
/// # Errors
/// Returns the lexical error, the first parse diagnostic, or the runtime
/// error that stopped execution.
///
/// # Examples
/// ```
/// use dakota::run_source;
///
/// // The pipeline accepts a full program and executes it.
/// assert!(run_source("x = 2 + 3\n").is_ok());
///
/// // An unknown variable is a runtime error.
/// assert!(run_source("y = missing + 1\n").is_err());
/// ```
pub fn run_source(source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tokens = Lexer::new(source).tokenize()?;

    let mut parser = Parser::new(tokens);
    parser.parse();

    if let Some(diagnostic) = parser.diagnostics().first() {
        return Err(Box::new(diagnostic.clone()));
    }

    let mut interpreter = Interpreter::new(&parser);
    interpreter.interpret()?;
    Ok(())
}
