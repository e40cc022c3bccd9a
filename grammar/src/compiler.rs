use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1},
    combinator::{all_consuming, recognize},
    multi::many0,
    sequence::pair,
    IResult,
};

use crate::action;
use crate::error::GrammarError;
use crate::{Definition, Grammar, Instruction, NonTermId, NonTerminal, Rule, Symbol};

/// Build a grammar from a token sequence produced by [`crate::tokenize`].
///
/// Fails if a definition is malformed or if any non-terminal is referenced
/// without ever being defined.
pub fn compile(tokens: &[String]) -> Result<Grammar, GrammarError> {
    let mut compiler = Compiler {
        tokens,
        pos: 0,
        grammar: Grammar::default(),
        export: false,
    };
    compiler.run()?;

    let grammar = compiler.grammar;
    if let Some(nt) = grammar.non_terminals.iter().find(|nt| nt.rules.is_empty()) {
        return Err(GrammarError::Undefined(nt.name.clone()));
    }

    tracing::debug!(
        non_terminals = grammar.non_terminals.len(),
        exports = grammar.exports.len(),
        "compiled grammar"
    );
    Ok(grammar)
}

/// Check that a name is a valid non-terminal name.
pub fn is_identifier(s: &str) -> bool {
    all_consuming(identifier)(s).is_ok()
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))(input)
}

struct Compiler<'t> {
    tokens: &'t [String],
    pos: usize,
    grammar: Grammar,
    /// Set by `<export>`, consumed by the next definition.
    export: bool,
}

impl<'t> Compiler<'t> {
    fn run(&mut self) -> Result<(), GrammarError> {
        while let Some(token) = self.next() {
            if token == "<export>" {
                self.export = true;
            } else if let Some(text) = directive(token, "include") {
                self.grammar.includes.push(text.to_owned());
            } else if let Some(text) = directive(token, "namespace") {
                self.grammar.namespace = Some(text.to_owned());
            } else if let Some(text) = directive(token, "class") {
                self.grammar.class = Some(text.to_owned());
            } else if let Some(text) = directive(token, "type") {
                self.grammar.ty = Some(text.to_owned());
            } else if let Some(code) = code(token) {
                self.grammar.codes.push(code.to_owned());
            } else {
                self.definition(token)?;
            }
        }
        Ok(())
    }

    fn next(&mut self) -> Option<&'t str> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token.as_str())
    }

    fn expect(&mut self, owner: &str, expected: &'static str) -> Result<&'t str, GrammarError> {
        self.next().ok_or_else(|| GrammarError::UnexpectedEnd {
            owner: owner.to_owned(),
            expected,
        })
    }

    /// `NAME [: TYPE] = ALT ( '|' ALT )* ;`, the name already consumed.
    fn definition(&mut self, name: &str) -> Result<(), GrammarError> {
        let id = self.non_terminal(name)?;
        let export = std::mem::take(&mut self.export);
        if export {
            self.grammar.exports.push(id);
        }

        let mut token = self.expect(name, "'='")?;
        if token == ":" {
            let ty = self.expect(name, "a type")?;
            self.grammar.non_terminals[id.0].ty = Some(ty.to_owned());
            token = self.expect(name, "'='")?;
        }
        if token != "=" {
            return Err(GrammarError::ExpectedEquals {
                owner: name.to_owned(),
                found: token.to_owned(),
            });
        }

        let first = self.grammar.non_terminals[id.0].rules.len();
        loop {
            let mut symbols = Vec::new();
            let terminator = loop {
                let token = self.expect(name, "';'")?;
                if token == "|" || token == ";" {
                    break token;
                }
                symbols.push(self.symbol(name, token)?);
            };
            check_ranges(name, &symbols)?;
            self.grammar.non_terminals[id.0].rules.push(Rule { symbols });

            if terminator == ";" {
                break;
            }
        }

        let last = self.grammar.non_terminals[id.0].rules.len();
        self.grammar.definitions.push(id);
        self.grammar.layout.push(Definition {
            rules: first..last,
            export,
        });
        Ok(())
    }

    fn symbol(&mut self, owner: &str, token: &str) -> Result<Symbol, GrammarError> {
        if let Some(text) = token.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
            Ok(Symbol::Terminal(text.to_owned()))
        } else if let Some(code) = code(token) {
            let code = code.trim_matches(' ');
            action::segments(code)?;
            Ok(Symbol::Code(code.to_owned()))
        } else if let Some(text) = bracketed(token, '<', '>') {
            instruction(owner, text).map(Symbol::Instruction)
        } else {
            self.non_terminal(token).map(Symbol::NonTerminal)
        }
    }

    /// Look up a non-terminal, creating it on first mention.
    fn non_terminal(&mut self, name: &str) -> Result<NonTermId, GrammarError> {
        if let Some(&id) = self.grammar.index.get(name) {
            return Ok(id);
        }
        if !is_identifier(name) {
            return Err(GrammarError::InvalidName(name.to_owned()));
        }

        let id = NonTermId(self.grammar.non_terminals.len());
        self.grammar.non_terminals.push(NonTerminal {
            name: name.to_owned(),
            ty: None,
            rules: Vec::new(),
        });
        self.grammar.index.insert(name.to_owned(), id);
        Ok(id)
    }
}

/// Contents of a non-empty `open ... close` token.
fn bracketed(token: &str, open: char, close: char) -> Option<&str> {
    token
        .strip_prefix(open)
        .and_then(|t| t.strip_suffix(close))
        .filter(|t| !t.is_empty())
}

fn code(token: &str) -> Option<&str> {
    bracketed(token, '{', '}')
}

/// Text of a `<name:TEXT>` directive.
fn directive<'a>(token: &'a str, name: &str) -> Option<&'a str> {
    token
        .strip_prefix('<')?
        .strip_prefix(name)?
        .strip_prefix(':')?
        .strip_suffix('>')
}

fn instruction(owner: &str, text: &str) -> Result<Instruction, GrammarError> {
    match text {
        "set" => Ok(Instruction::Set),
        "range" => Ok(Instruction::Range),
        "notset" => Ok(Instruction::NotSet),
        _ => match text.strip_prefix("to:") {
            Some(name) => Ok(Instruction::To(name.to_owned())),
            None => Err(GrammarError::InvalidInstruction {
                owner: owner.to_owned(),
                found: format!("<{}>", text),
            }),
        },
    }
}

/// A `<range>` literal must provide both bounds.
fn check_ranges(owner: &str, symbols: &[Symbol]) -> Result<(), GrammarError> {
    let mut pending = None;
    for symbol in symbols {
        match symbol {
            Symbol::Instruction(instr) => pending = Some(instr),
            Symbol::Terminal(literal) => {
                if pending == Some(&Instruction::Range) && literal.chars().count() < 2 {
                    return Err(GrammarError::InvalidRange {
                        owner: owner.to_owned(),
                        literal: literal.clone(),
                    });
                }
                pending = None;
            }
            Symbol::NonTerminal(_) => pending = None,
            Symbol::Code(_) => {}
        }
    }
    Ok(())
}
