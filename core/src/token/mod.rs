use std::fmt;

use serde::Serialize;

pub mod lexer;

#[cfg(test)]
mod token_test;

pub use lexer::{Token, TokenKind, Tokenizer, tokenize};

/// Zero-based line/column location resolved from a character offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Character offsets of every line start, for offset -> line lookups.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len_chars: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut len_chars = 0;
        for (i, ch) in text.chars().enumerate() {
            if ch == '\n' {
                line_starts.push(i + 1);
            }
            len_chars = i + 1;
        }
        Self { line_starts, len_chars }
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    pub fn len_chars(&self) -> usize {
        self.len_chars
    }

    /// Offsets past the end clamp to the end of the text.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len_chars);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = offset - self.line_starts[line];
        Position::new(line as u32, column as u32, offset)
    }

    pub fn line_of(&self, offset: usize) -> u32 {
        self.position(offset).line
    }
}

/// Convenience wrapper over [`LineIndex`] for one-off lookups.
pub fn offset_to_position(text: &str, offset: usize) -> Position {
    LineIndex::new(text).position(offset)
}
