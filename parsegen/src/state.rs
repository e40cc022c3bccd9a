use grammar::{action, Instruction};

use crate::error::Error;
use crate::position::Position;
use crate::OutputMode;

/// One in-flight alternative of a non-terminal.
///
/// Both the interpreter and generated parsers feed every symbol of an
/// alternative through an `Attempt`, in order:
///
/// ```
/// use parsegen::{Attempt, Position};
///
/// let input = "xy";
/// let mut cursor = Position::new(input);
/// let mut out = String::new();
///
/// let mut attempt = Attempt::new(cursor);
/// assert!(attempt.terminal("x"));
/// assert!(attempt.terminal("y"));
/// attempt.code("[$i2$i1]").unwrap();
/// attempt.commit(&mut cursor, &mut out);
///
/// assert_eq!(out, "[yx]");
/// assert!(cursor.at_end());
/// ```
#[derive(Debug)]
pub struct Attempt<'a> {
    cursor: Position<'a>,
    /// Cursor before the alternative, then after each matched symbol.
    positions: Vec<usize>,
    /// Output of each matched non-terminal.
    outputs: Vec<String>,
    /// Instruction waiting for the next terminal or non-terminal.
    pending: Option<Instruction>,
    output: String,
}

impl<'a> Attempt<'a> {
    pub fn new(start: Position<'a>) -> Self {
        Attempt {
            cursor: start,
            positions: vec![start.idx()],
            outputs: Vec::new(),
            pending: None,
            output: String::new(),
        }
    }

    /// Working cursor of this alternative.
    pub fn cursor(&self) -> Position<'a> {
        self.cursor
    }

    /// Match a non-terminal using `f`, which must leave the cursor untouched
    /// when it returns `Ok(false)`.
    pub fn non_terminal<F>(&mut self, f: F) -> Result<bool, Error>
    where
        F: FnOnce(&mut Position<'a>, &mut String) -> Result<bool, Error>,
    {
        // A pending `<to:...>` ends here without effect.
        self.pending = None;

        let mut output = String::new();
        if !f(&mut self.cursor, &mut output)? {
            return Ok(false);
        }
        self.positions.push(self.cursor.idx());
        self.outputs.push(output);
        Ok(true)
    }

    /// Match a literal, or a character class when an instruction is pending.
    pub fn terminal(&mut self, literal: &str) -> bool {
        let matched = match self.pending.take() {
            Some(Instruction::Set) => self.cursor.match_set(literal),
            Some(Instruction::Range) => self.cursor.match_range(literal),
            Some(Instruction::NotSet) => self.cursor.match_not_set(literal),
            Some(Instruction::To(_)) | None => self.cursor.match_str(literal),
        };
        if matched {
            self.positions.push(self.cursor.idx());
        }
        matched
    }

    /// Set the instruction for the next terminal or non-terminal, replacing
    /// any instruction still pending.
    pub fn instruction(&mut self, instr: Instruction) {
        self.pending = Some(instr);
    }

    /// Run action code, appending its expansion to this alternative's output.
    pub fn code(&mut self, code: &str) -> Result<(), Error> {
        action::expand(
            code,
            self.cursor.input(),
            &self.positions,
            &self.outputs,
            &mut self.output,
        )?;
        Ok(())
    }

    /// The alternative matched: move the caller's cursor and hand over the
    /// output.
    pub fn commit(self, cursor: &mut Position<'a>, out: &mut String) {
        *cursor = self.cursor;
        out.push_str(&self.output);
    }

    /// The alternative failed. Its output is dropped unless `mode` asks for
    /// the shared-buffer behavior, where it stays in the caller's output.
    pub fn abandon(self, mode: OutputMode, out: &mut String) {
        if mode == OutputMode::Shared {
            out.push_str(&self.output);
        }
    }
}
