use serde::Serialize;

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum TokenKind {
    Whitespace,
    LineComment,
    BlockComment,
    Number,
    String,
    Regexp,
    Symbol,
    ChevronOpen,           // <<
    ChevronString,         // literal text inside << >>
    ChevronBeestingOpen,   // #{
    ChevronBeestingClose,  // }
    ChevronClose,          // >>
    Raw,                   // operators and punctuation
    Illegal,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "WHITESPACE",
            TokenKind::LineComment => "LINE-COMMENT",
            TokenKind::BlockComment => "BLOCK-COMMENT",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Regexp => "REGEXP",
            TokenKind::Symbol => "SYMBOL",
            TokenKind::ChevronOpen => "CHEVRON-OPEN",
            TokenKind::ChevronString => "CHEVRON-STRING",
            TokenKind::ChevronBeestingOpen => "CHEVRON-BEESTING-OPEN",
            TokenKind::ChevronBeestingClose => "CHEVRON-BEESTING-CLOSE",
            TokenKind::ChevronClose => "CHEVRON-CLOSE",
            TokenKind::Raw => "RAW",
            TokenKind::Illegal => "ILLEGAL",
        }
    }
}

/// A lexeme together with its character span `[start, end)` in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

/// Operators and punctuation, longest alternatives first where prefixes overlap.
const RAW_TOKENS: &[&str] = &[
    "<=>", "<=", "<", "||", "|", "==", "=>", "=", ":=", ":", ">=", "><", ">", "&&", "!=", "(", ")", "{", "}", "[",
    "]", ",", "/", ".", "-", "%", "+", ";", "*",
];

#[inline]
fn is_space_char(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Two-character marker that ends a run of template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChevronMarker {
    BeestingOpen,
    Close,
}

/// State of one open `#{ ... }` interpolation.
#[derive(Debug, Default)]
struct BeestingFrame {
    brace_depth: u32,
}

/// Single-pass KRL tokenizer. Never fails: input that matches no rule is
/// emitted as [`TokenKind::Illegal`] and scanning continues.
pub struct Tokenizer {
    chars: Vec<char>,
    idx: usize,
    len: usize,
    emit_whitespace: bool,
    emit_raw: bool,
    tokens: Vec<Token>,
    beestings: Vec<BeestingFrame>,
}

impl Tokenizer {
    pub fn new(source: &str, emit_whitespace: bool, emit_raw: bool) -> Self {
        let chars: Vec<char> = source.chars().collect();
        Self {
            len: chars.len(),
            chars,
            idx: 0,
            emit_whitespace,
            emit_raw,
            tokens: Vec::with_capacity(source.len() / 4),
            beestings: Vec::new(),
        }
    }

    /// Tokenize everything, keeping whitespace and operators.
    /// Concatenating the token texts reproduces `source`.
    pub fn tokenize_full(source: &str) -> Vec<Token> {
        Self::new(source, true, true).run()
    }

    /// Tokenize keeping only tokens that carry meaning for completion.
    pub fn tokenize_significant(source: &str) -> Vec<Token> {
        Self::new(source, false, false).run()
    }

    pub fn run(mut self) -> Vec<Token> {
        while !self.eof() {
            let start = self.idx;
            self.step();
            debug_assert!(self.idx > start, "tokenizer made no progress at {start}");
        }
        self.tokens
    }

    fn eof(&self) -> bool {
        self.idx >= self.len
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn looking_at(&self, s: &str) -> bool {
        let mut i = self.idx;
        for c in s.chars() {
            if self.chars.get(i) != Some(&c) {
                return false;
            }
            i += 1;
        }
        true
    }

    fn advance_char(&mut self) {
        self.idx += 1;
    }

    fn advance_by(&mut self, n: usize) {
        self.idx = (self.idx + n).min(self.len);
    }

    /// Emit `[start, idx)` as a token of `kind`, honoring suppression flags.
    fn emit(&mut self, kind: TokenKind, start: usize) {
        if kind == TokenKind::Whitespace && !self.emit_whitespace {
            return;
        }
        if kind == TokenKind::Raw && !self.emit_raw {
            return;
        }
        self.tokens.push(Token {
            kind,
            text: self.chars[start..self.idx].iter().collect(),
            start,
            end: self.idx,
        });
    }

    /// Advance while `stop` is false, honoring backslash escapes when `escaping`.
    /// `stop` receives the tokenizer and the number of characters consumed so far.
    fn consume_until<F>(&mut self, start: usize, escaping: bool, stop: F)
    where
        F: Fn(&Self, usize) -> bool,
    {
        let mut escaped = false;
        while !self.eof() && (escaped || !stop(self, self.idx - start)) {
            if escaped {
                escaped = false;
            } else if escaping {
                escaped = self.chars[self.idx] == '\\';
            }
            self.advance_char();
        }
    }

    fn step(&mut self) {
        let c = self.chars[self.idx];
        let next = self.peek_at(1);

        if is_space_char(c) {
            return self.parse_whitespace();
        }
        if c == '/' && next == Some('/') {
            return self.parse_line_comment();
        }
        if c == '/' && next == Some('*') {
            return self.parse_block_comment();
        }
        if c.is_ascii_digit() {
            return self.parse_number();
        }
        if c == '.' && next.is_some_and(|n| n.is_ascii_digit()) {
            return self.parse_number();
        }
        if c == '"' {
            return self.parse_str();
        }
        if c == 'r' && self.peek_at(1) == Some('e') && self.peek_at(2) == Some('#') {
            return self.parse_regexp();
        }
        if c == '<' && next == Some('<') {
            let start = self.idx;
            self.advance_by(2);
            self.emit(TokenKind::ChevronOpen, start);
            return self.parse_chevron_body();
        }
        if is_ident_start(c) {
            return self.parse_id();
        }
        if self.close_beesting_if_open(c) {
            return;
        }
        self.parse_raw_or_illegal();
    }

    fn parse_whitespace(&mut self) {
        let start = self.idx;
        while !self.eof() && is_space_char(self.chars[self.idx]) {
            self.advance_char();
        }
        self.emit(TokenKind::Whitespace, start);
    }

    fn parse_line_comment(&mut self) {
        let start = self.idx;
        self.consume_until(start, false, |t, _| matches!(t.chars[t.idx], '\n' | '\r'));
        if !self.eof() {
            // the terminator belongs to the comment
            self.advance_char();
        }
        self.emit(TokenKind::LineComment, start);
    }

    fn parse_block_comment(&mut self) {
        let start = self.idx;
        // `consumed > 1` keeps the '*' of the opener from closing it, so "/*/" stays open
        self.consume_until(start, false, |t, consumed| {
            consumed > 1 && t.chars[t.idx] == '*' && t.peek_at(1) == Some('/')
        });
        if self.eof() {
            self.emit(TokenKind::Illegal, start);
        } else {
            self.advance_by(2);
            self.emit(TokenKind::BlockComment, start);
        }
    }

    fn parse_number(&mut self) {
        let start = self.idx;
        while !self.eof() && self.chars[self.idx].is_ascii_digit() {
            self.advance_char();
        }
        // A '.' only joins the literal when a digit follows: `3.14` vs `3.foo`
        if self.peek_at(0) == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance_char();
            while !self.eof() && self.chars[self.idx].is_ascii_digit() {
                self.advance_char();
            }
        }
        self.emit(TokenKind::Number, start);
    }

    fn parse_str(&mut self) {
        let start = self.idx;
        self.consume_until(start, true, |t, consumed| consumed > 0 && t.chars[t.idx] == '"');
        if self.eof() {
            self.emit(TokenKind::Illegal, start);
        } else {
            self.advance_char();
            self.emit(TokenKind::String, start);
        }
    }

    fn parse_regexp(&mut self) {
        let start = self.idx;
        // skip past the `re#` opener before looking for the closing '#'
        self.consume_until(start, true, |t, consumed| consumed > 2 && t.chars[t.idx] == '#');
        if self.eof() {
            self.emit(TokenKind::Illegal, start);
            return;
        }
        let flags = match (self.peek_at(1), self.peek_at(2)) {
            (Some('g'), Some('i')) | (Some('i'), Some('g')) => 2,
            (Some('g' | 'i'), _) => 1,
            _ => 0,
        };
        self.advance_by(1 + flags);
        self.emit(TokenKind::Regexp, start);
    }

    fn parse_id(&mut self) {
        let start = self.idx;
        while !self.eof() && is_ident_continue(self.chars[self.idx]) {
            self.advance_char();
        }
        self.emit(TokenKind::Symbol, start);
    }

    fn chevron_marker(&self) -> Option<ChevronMarker> {
        if self.looking_at("#{") {
            Some(ChevronMarker::BeestingOpen)
        } else if self.looking_at(">>") {
            Some(ChevronMarker::Close)
        } else {
            None
        }
    }

    /// Scan template text up to the next `#{` or `>>`. Entered right after `<<`
    /// and again after each interpolation closes.
    fn parse_chevron_body(&mut self) {
        let start = self.idx;
        self.consume_until(start, true, |t, _| t.chevron_marker().is_some());

        let Some(marker) = self.chevron_marker() else {
            // ran off the end of input without `>>`
            if self.idx > start {
                self.emit(TokenKind::Illegal, start);
            }
            return;
        };

        if self.idx > start {
            self.emit(TokenKind::ChevronString, start);
        }
        let marker_start = self.idx;
        self.advance_by(2);
        match marker {
            ChevronMarker::BeestingOpen => {
                self.emit(TokenKind::ChevronBeestingOpen, marker_start);
                self.beestings.push(BeestingFrame::default());
            }
            ChevronMarker::Close => self.emit(TokenKind::ChevronClose, marker_start),
        }
    }

    /// Track braces inside an open interpolation. Returns true when `c` closed it.
    fn close_beesting_if_open(&mut self, c: char) -> bool {
        let Some(frame) = self.beestings.last_mut() else {
            return false;
        };
        match c {
            '{' => frame.brace_depth += 1,
            '}' if frame.brace_depth == 0 => {
                let start = self.idx;
                self.advance_char();
                self.emit(TokenKind::ChevronBeestingClose, start);
                self.beestings.pop();
                self.parse_chevron_body();
                return true;
            }
            '}' => frame.brace_depth -= 1,
            _ => {}
        }
        false
    }

    fn parse_raw_or_illegal(&mut self) {
        let start = self.idx;
        match RAW_TOKENS.iter().find(|op| self.looking_at(op)) {
            Some(op) => {
                self.advance_by(op.chars().count());
                self.emit(TokenKind::Raw, start);
            }
            None => {
                self.advance_char();
                self.emit(TokenKind::Illegal, start);
            }
        }
    }
}

/// Tokenize `source`. Total: never fails and always consumes the whole input.
pub fn tokenize(source: &str, emit_whitespace: bool, emit_raw_operators: bool) -> Vec<Token> {
    Tokenizer::new(source, emit_whitespace, emit_raw_operators).run()
}
