use thiserror::Error;

/// Malformed lexical structure in grammar text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("unexpected end of line at offset {offset}, expected '{quote}'")]
    UnterminatedString { quote: char, offset: usize },
    #[error("invalid escape sequence '\\{found}' at offset {offset}, expected one of: \\ ' \" t r n")]
    InvalidEscape { found: char, offset: usize },
    #[error("unexpected end of input, expected '{expected}'")]
    UnterminatedGroup { expected: char },
}

/// Structural or referential problem in a grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("{owner}: unexpected token '{found}', expected '='")]
    ExpectedEquals { owner: String, found: String },
    #[error("{owner}: unexpected end of grammar, expected {expected}")]
    UnexpectedEnd {
        owner: String,
        expected: &'static str,
    },
    #[error("invalid non terminal symbol name '{0}'")]
    InvalidName(String),
    #[error("{0}: symbol is used but not defined")]
    Undefined(String),
    #[error("{owner}: invalid instruction '{found}'")]
    InvalidInstruction { owner: String, found: String },
    #[error("{owner}: range '{literal}' needs a lower and an upper bound")]
    InvalidRange { owner: String, literal: String },
    #[error("invalid code '{code}' at offset {offset}")]
    InvalidAction { code: String, offset: usize },
    #[error("invalid code '{code}': '{marker}' refers to slot {index}, but only {available} are available")]
    ActionIndex {
        code: String,
        marker: String,
        index: usize,
        available: usize,
    },
}

/// Any failure turning grammar text into a [`crate::Grammar`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}
