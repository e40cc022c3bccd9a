/// Keep track of a position within a str, updating on successful operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position<'a> {
    input: &'a str,
    idx: usize,
}

impl<'a> Position<'a> {
    /// Create a cursor at the start of `input`.
    pub fn new(input: &'a str) -> Self {
        Position { input, idx: 0 }
    }

    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Byte offset into the input.
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.idx..]
    }

    pub fn at_end(&self) -> bool {
        self.idx == self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Advance past the next character if it satisfies `f`.
    fn match_char<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(char) -> bool,
    {
        match self.peek() {
            Some(c) if f(c) => {
                self.idx += c.len_utf8();
                true
            }
            _ => false,
        }
    }

    /// Check if a string matches the current input starting at the current
    /// index. The index will be updated on match.
    pub fn match_str(&mut self, s: &str) -> bool {
        if self.rest().starts_with(s) {
            self.idx += s.len();
            true
        } else {
            false
        }
    }

    /// Match one character contained in `set`.
    pub fn match_set(&mut self, set: &str) -> bool {
        self.match_char(|c| set.contains(c))
    }

    /// Match one character not contained in `set`. Never matches at the end
    /// of input.
    pub fn match_not_set(&mut self, set: &str) -> bool {
        self.match_char(|c| !set.contains(c))
    }

    /// Match one character between the first two characters of `range`,
    /// inclusive.
    pub fn match_range(&mut self, range: &str) -> bool {
        let mut bounds = range.chars();
        match (bounds.next(), bounds.next()) {
            (Some(lo), Some(hi)) => self.match_char(|c| lo <= c && c <= hi),
            _ => false,
        }
    }
}
