//! Matching runtime for RSPT grammars.
//!
//! [`Interpreter`] runs a compiled [`Grammar`] directly. Parsers generated by
//! `#[derive(Parser)]` drive the same [`Attempt`] machinery, so both produce
//! identical output for identical input.

mod error;
mod interpreter;
mod position;
mod state;

pub use error::{Error, ParseError};
pub use grammar::{Grammar, GrammarError, Instruction};
pub use interpreter::{Interpreter, OffsetMode, Options, OutputMode};
pub use position::Position;
pub use state::Attempt;

/// A parser generated for a grammar with a single export.
pub trait Parser {
    fn parse(input: &str) -> Result<String, Error>;
}

/// Interpret `input` with the grammar's single exported non-terminal, using
/// default options.
pub fn interpret(grammar: &Grammar, input: &str) -> Result<String, Error> {
    Interpreter::new(grammar).parse(input)
}

/// Match `start` from the beginning of `input`, requiring the whole input to
/// be consumed.
pub fn run<'i, F>(input: &'i str, start: F) -> Result<String, Error>
where
    F: FnOnce(&mut Position<'i>, &mut String) -> Result<bool, Error>,
{
    let mut cursor = Position::new(input);
    let mut output = String::new();
    if start(&mut cursor, &mut output)? && cursor.at_end() {
        Ok(output)
    } else {
        tracing::debug!(offset = cursor.idx(), "input not matched");
        Err(ParseError::new(input, cursor.idx()).into())
    }
}
