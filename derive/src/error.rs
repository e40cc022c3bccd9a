use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, DeriveError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DeriveError {
    MissingGrammarSource,
    MultipleGrammarSources,
    NotAString,
    ReadFile { path: String, reason: String },
    Grammar(grammar::Error),
    Syn(String),
}

impl Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DeriveError::MissingGrammarSource => write!(f, "No grammar source provided"),
            DeriveError::MultipleGrammarSources => {
                write!(f, "At most one grammar source can be provided")
            }
            DeriveError::NotAString => write!(f, "Grammar source must be a string literal"),
            DeriveError::ReadFile {
                ref path,
                ref reason,
            } => write!(f, "Failed to read grammar file {}: {}", path, reason),
            DeriveError::Grammar(ref e) => write!(f, "Invalid grammar: {}", e),
            DeriveError::Syn(ref s) => write!(f, "syn error: {}", s),
        }
    }
}

impl From<syn::Error> for DeriveError {
    fn from(e: syn::Error) -> DeriveError {
        DeriveError::Syn(e.to_string())
    }
}

impl From<grammar::Error> for DeriveError {
    fn from(e: grammar::Error) -> DeriveError {
        DeriveError::Grammar(e)
    }
}

impl From<grammar::GrammarError> for DeriveError {
    fn from(e: grammar::GrammarError) -> DeriveError {
        DeriveError::Grammar(e.into())
    }
}
