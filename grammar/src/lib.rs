//! Grammar DSL front end: tokenizer, model and compiler.
//!
//! A grammar is a set of non-terminals, each with ordered alternatives. An
//! alternative is a sequence of symbols: quoted literals, references to other
//! non-terminals, `{...}` action code and `<...>` instructions that modify the
//! symbol following them.
//!
//! ```text
//! <export>
//! S = A B {$2$1} ;
//! A = 'x' {$i1} ;
//! B = 'y' {$i1} ;
//! ```

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::ops::{Index, Range};
use std::str::FromStr;

pub mod action;
mod compiler;
mod error;
mod tokenizer;

pub use compiler::{compile, is_identifier};
pub use error::{Error, GrammarError, TokenizeError};
pub use tokenizer::tokenize;

/// Handle of a non-terminal inside the grammar that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonTermId(usize);

impl NonTermId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Modifier for the symbol directly following it in a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `<to:NAME>` overrides the result of the following non-terminal. Parsed
    /// and carried, but has no effect on matching or output.
    To(String),
    /// `<set>` matches one character contained in the following literal.
    Set,
    /// `<range>` matches one character between the first two characters of
    /// the following literal, inclusive.
    Range,
    /// `<notset>` matches one character not contained in the following
    /// literal.
    NotSet,
}

impl Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::To(name) => write!(f, "<to:{}>", name),
            Instruction::Set => write!(f, "<set>"),
            Instruction::Range => write!(f, "<range>"),
            Instruction::NotSet => write!(f, "<notset>"),
        }
    }
}

/// A single element of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    NonTerminal(NonTermId),
    /// Literal text, quotes stripped and escapes decoded.
    Terminal(String),
    /// Action code, braces and surrounding spaces stripped.
    Code(String),
    Instruction(Instruction),
}

/// One alternative of a non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rule {
    pub symbols: Vec<Symbol>,
}

/// A named set of alternatives, tried in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub name: String,
    /// Declared output type. Opaque, only meaningful to code generators.
    pub ty: Option<String>,
    pub rules: Vec<Rule>,
}

/// A compiled grammar.
///
/// Non-terminals are stored in the order they were first mentioned and refer
/// to each other through [`NonTermId`] handles, so recursive grammars carry no
/// ownership cycles.
/// One `NAME = ... ;` occurrence in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Definition {
    rules: Range<usize>,
    export: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grammar {
    non_terminals: Vec<NonTerminal>,
    index: HashMap<String, NonTermId>,
    /// Every non-terminal mention in defining position, redefinitions
    /// included.
    definitions: Vec<NonTermId>,
    /// Rules and export marker contributed by each entry of `definitions`.
    layout: Vec<Definition>,
    exports: Vec<NonTermId>,
    includes: Vec<String>,
    codes: Vec<String>,
    namespace: Option<String>,
    class: Option<String>,
    ty: Option<String>,
}

impl Grammar {
    /// Look up a non-terminal by name.
    pub fn get(&self, name: &str) -> Option<NonTermId> {
        self.index.get(name).copied()
    }

    /// All non-terminals with their handles, in first-seen order.
    pub fn non_terminals(&self) -> impl Iterator<Item = (NonTermId, &NonTerminal)> {
        self.non_terminals
            .iter()
            .enumerate()
            .map(|(idx, nt)| (NonTermId(idx), nt))
    }

    pub fn len(&self) -> usize {
        self.non_terminals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.non_terminals.is_empty()
    }

    pub fn definitions(&self) -> &[NonTermId] {
        &self.definitions
    }

    /// Non-terminals marked with `<export>`, in order.
    pub fn exports(&self) -> &[NonTermId] {
        &self.exports
    }

    pub fn is_exported(&self, id: NonTermId) -> bool {
        self.exports.contains(&id)
    }

    /// Values of `<include:...>` directives.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Top-level `{...}` code fragments, unattached to any rule.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Type of input symbols, set by `<type:...>`.
    pub fn input_type(&self) -> Option<&str> {
        self.ty.as_deref()
    }

    fn write_symbol(&self, f: &mut fmt::Formatter, symbol: &Symbol) -> fmt::Result {
        match symbol {
            Symbol::NonTerminal(id) => write!(f, "{}", self[*id].name),
            Symbol::Terminal(text) => write!(f, "'{}'", quote(text)),
            Symbol::Code(code) if code.is_empty() => write!(f, "{{ }}"),
            Symbol::Code(code) => write!(f, "{{{}}}", code),
            Symbol::Instruction(instr) => write!(f, "{}", instr),
        }
    }
}

impl Index<NonTermId> for Grammar {
    type Output = NonTerminal;

    fn index(&self, id: NonTermId) -> &NonTerminal {
        &self.non_terminals[id.0]
    }
}

/// Escape literal text so the tokenizer decodes it back unchanged.
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '"' => quoted.push_str("\\\""),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted
}

impl Display for Grammar {
    /// Canonical DSL text: directives first, then the definitions in source
    /// order.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for include in &self.includes {
            writeln!(f, "<include:{}>", include)?;
        }
        if let Some(namespace) = &self.namespace {
            writeln!(f, "<namespace:{}>", namespace)?;
        }
        if let Some(class) = &self.class {
            writeln!(f, "<class:{}>", class)?;
        }
        if let Some(ty) = &self.ty {
            writeln!(f, "<type:{}>", ty)?;
        }
        for code in &self.codes {
            writeln!(f, "{{{}}}", code)?;
        }

        for (id, def) in self.definitions.iter().zip(&self.layout) {
            let nt = &self[*id];
            if def.export {
                writeln!(f, "<export>")?;
            }
            write!(f, "{}", nt.name)?;
            if let Some(ty) = &nt.ty {
                write!(f, " : {}", ty)?;
            }
            write!(f, " =")?;
            for (idx, rule) in nt.rules[def.rules.clone()].iter().enumerate() {
                if idx > 0 {
                    write!(f, "\n    |")?;
                }
                for symbol in &rule.symbols {
                    write!(f, " ")?;
                    self.write_symbol(f, symbol)?;
                }
            }
            writeln!(f, " ;")?;
        }
        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens = tokenize(s)?;
        Ok(compile(&tokens)?)
    }
}
