use grammar::GrammarError;
use thiserror::Error;

/// Most characters of unconsumed input quoted in a [`ParseError`].
const REMAINING_MAX: usize = 50;

/// No sequence of rules accounts for the whole input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error at offset {offset}: cannot handle '{remaining}'")]
pub struct ParseError {
    /// Byte offset of the failure.
    pub offset: usize,
    /// Start of the unconsumed input, shortened with `...` when long.
    pub remaining: String,
}

impl ParseError {
    pub fn new(input: &str, offset: usize) -> Self {
        let rest = input.get(offset..).unwrap_or_default();
        let remaining = match rest.char_indices().nth(REMAINING_MAX) {
            Some((end, _)) => format!("{}...", &rest[..end]),
            None => rest.to_owned(),
        };
        ParseError { offset, remaining }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("the grammar must export exactly one non terminal, found {0}")]
    Exports(usize),
    #[error("unknown non terminal '{0}'")]
    UnknownNonTerminal(String),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}
