use grammar::{Grammar, NonTermId, Rule, Symbol};

use crate::error::{Error, ParseError};
use crate::position::Position;
use crate::state::Attempt;

/// What happens to output written by an alternative that later fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Each alternative writes into its own buffer, handed to the caller only
    /// when the alternative matches.
    #[default]
    Buffered,
    /// Alternatives write straight into the caller's buffer, so output of
    /// abandoned alternatives stays.
    Shared,
}

/// Which offset a [`ParseError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetMode {
    /// Where the exported non-terminal left the cursor: the start of the
    /// input when it failed, the end of the matched prefix when input was
    /// left over.
    #[default]
    Entry,
    /// The furthest cursor position reached by any attempt.
    Deepest,
}

/// Interpreter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub output: OutputMode,
    pub offset: OffsetMode,
}

impl Options {
    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn offset(mut self, offset: OffsetMode) -> Self {
        self.offset = offset;
        self
    }
}

/// Runs a compiled grammar directly against input text.
///
/// The grammar is only read, so one grammar can serve any number of
/// interpreters on any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Interpreter<'g> {
    grammar: &'g Grammar,
    options: Options,
}

impl<'g> Interpreter<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_options(grammar, Options::default())
    }

    pub fn with_options(grammar: &'g Grammar, options: Options) -> Self {
        Interpreter { grammar, options }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Parse `input` with the grammar's exported non-terminal, which must be
    /// unique.
    pub fn parse(&self, input: &str) -> Result<String, Error> {
        match self.grammar.exports() {
            [export] => self.parse_from(*export, input),
            exports => Err(Error::Exports(exports.len())),
        }
    }

    /// Parse `input` starting from any non-terminal.
    pub fn parse_with(&self, name: &str, input: &str) -> Result<String, Error> {
        let start = self
            .grammar
            .get(name)
            .ok_or_else(|| Error::UnknownNonTerminal(name.to_owned()))?;
        self.parse_from(start, input)
    }

    fn parse_from(&self, start: NonTermId, input: &str) -> Result<String, Error> {
        let mut furthest = 0;
        let result = crate::run(input, |cursor, out| {
            self.non_terminal(start, cursor, out, &mut furthest)
        });

        match result {
            Err(Error::Parse(err)) if self.options.offset == OffsetMode::Deepest => {
                Err(ParseError::new(input, furthest.max(err.offset)).into())
            }
            result => result,
        }
    }

    fn non_terminal<'i>(
        &self,
        id: NonTermId,
        cursor: &mut Position<'i>,
        out: &mut String,
        furthest: &mut usize,
    ) -> Result<bool, Error> {
        let nt = &self.grammar[id];
        tracing::trace!(name = %nt.name, offset = cursor.idx(), "trying non terminal");

        for (idx, rule) in nt.rules.iter().enumerate() {
            let mut attempt = Attempt::new(*cursor);
            if self.rule(rule, &mut attempt, furthest)? {
                tracing::trace!(
                    name = %nt.name,
                    alternative = idx,
                    end = attempt.cursor().idx(),
                    "matched non terminal"
                );
                attempt.commit(cursor, out);
                return Ok(true);
            }
            attempt.abandon(self.options.output, out);
        }
        Ok(false)
    }

    fn rule<'i>(
        &self,
        rule: &Rule,
        attempt: &mut Attempt<'i>,
        furthest: &mut usize,
    ) -> Result<bool, Error> {
        for symbol in &rule.symbols {
            let matched = match symbol {
                Symbol::NonTerminal(id) => attempt.non_terminal(|cursor, out| {
                    self.non_terminal(*id, cursor, out, &mut *furthest)
                })?,
                Symbol::Terminal(literal) => attempt.terminal(literal),
                Symbol::Code(code) => {
                    attempt.code(code)?;
                    true
                }
                Symbol::Instruction(instr) => {
                    attempt.instruction(instr.clone());
                    true
                }
            };
            *furthest = (*furthest).max(attempt.cursor().idx());
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
