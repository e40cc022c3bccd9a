use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::TokenizeError;

/// Split grammar text into tokens.
///
/// Whitespace and `#` comments separate tokens. Quoted runs are kept as a
/// single token including their quotes, with escapes decoded. Bracket groups
/// are kept verbatim, nesting included, so code fragments and directives
/// survive as one token each.
pub fn tokenize(text: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokenizer = Tokenizer {
        len: text.len(),
        chars: text.char_indices().peekable(),
        tokens: Vec::new(),
        token: String::new(),
        closers: Vec::new(),
    };
    tokenizer.run()?;
    tracing::trace!(tokens = tokenizer.tokens.len(), "tokenized grammar");
    Ok(tokenizer.tokens)
}

struct Tokenizer<'a> {
    len: usize,
    chars: Peekable<CharIndices<'a>>,
    tokens: Vec<String>,
    /// Token currently being built.
    token: String,
    /// Expected closing delimiters of the open bracket groups, innermost last.
    closers: Vec<char>,
}

impl<'a> Tokenizer<'a> {
    fn run(&mut self) -> Result<(), TokenizeError> {
        while let Some((_, c)) = self.chars.next() {
            if self.closers.last() == Some(&c) {
                self.closers.pop();
                self.token.push(c);
            } else if !self.closers.is_empty() {
                // Group contents are opaque, only nesting is tracked. `<` does
                // not nest so comparisons inside code stay plain characters.
                if let Some(closer) = nested_closer(c) {
                    self.closers.push(closer);
                }
                self.token.push(c);
            } else if is_whitespace(c) {
                self.flush();
            } else if c == '#' {
                self.flush();
                self.skip_line();
            } else if c == '"' || c == '\'' {
                self.token.push(c);
                self.quoted(c)?;
            } else {
                if let Some(closer) = nested_closer(c) {
                    self.closers.push(closer);
                } else if c == '<' {
                    self.closers.push('>');
                }
                self.token.push(c);
            }
        }

        self.flush();
        match self.closers.last() {
            Some(&expected) => Err(TokenizeError::UnterminatedGroup { expected }),
            None => Ok(()),
        }
    }

    /// Consume the rest of a quoted run, the opening quote having been pushed
    /// already.
    fn quoted(&mut self, quote: char) -> Result<(), TokenizeError> {
        loop {
            let (offset, c) = match self.chars.next() {
                Some((offset, '\r')) | Some((offset, '\n')) => {
                    return Err(TokenizeError::UnterminatedString { quote, offset })
                }
                Some(next) => next,
                None => {
                    return Err(TokenizeError::UnterminatedString {
                        quote,
                        offset: self.len,
                    })
                }
            };

            if c == quote {
                self.token.push(c);
                return Ok(());
            }

            if c != '\\' {
                self.token.push(c);
                continue;
            }

            let decoded = match self.chars.next() {
                Some((_, '\\')) => '\\',
                Some((_, '\'')) => '\'',
                Some((_, '"')) => '"',
                Some((_, 't')) => '\t',
                Some((_, 'r')) => '\r',
                Some((_, 'n')) => '\n',
                Some((_, found)) => {
                    return Err(TokenizeError::InvalidEscape {
                        found,
                        offset: offset + 1,
                    })
                }
                None => {
                    return Err(TokenizeError::UnterminatedString {
                        quote,
                        offset: self.len,
                    })
                }
            };
            self.token.push(decoded);
        }
    }

    fn skip_line(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c == '\r' || c == '\n' {
                break;
            }
            self.chars.next();
        }
    }

    fn flush(&mut self) {
        if !self.token.is_empty() {
            self.tokens.push(std::mem::take(&mut self.token));
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Closer for brackets that nest at any depth.
fn nested_closer(c: char) -> Option<char> {
    match c {
        '(' => Some(')'),
        '{' => Some('}'),
        '[' => Some(']'),
        _ => None,
    }
}
