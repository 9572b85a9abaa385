use std::fmt;

use crate::token::{ParseError, Position};

/// Reserved words of Lua 5.1. Identifiers matching one of these are retagged as keywords.
pub const KEYWORDS: [&str; 21] = [
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "if", "in", "local", "nil", "not",
    "or", "repeat", "return", "then", "true", "until", "while",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    /// Single `=`
    Assign,
    /// `==`, `~=`, `<`, `>`, `<=`, `>=`
    Comparison,
    Integer,
    Symbol,
    Str,
    Comment,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "ID",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Comparison => "COMPARE",
            TokenKind::Integer => "INTEGER",
            TokenKind::Symbol => "SYMBOL",
            TokenKind::Str => "STR",
            TokenKind::Comment => "COMMENT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. String tokens keep their delimiters.
    pub text: String,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    /// Body of a string token without its delimiters.
    pub fn string_body(&self) -> Option<&str> {
        if self.kind != TokenKind::Str {
            return None;
        }
        let mut chars = self.text.chars();
        chars.next();
        chars.next_back();
        Some(chars.as_str())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}: |{}|", self.line, self.column, self.kind, self.text)
    }
}

/// Output of one lexing run. Comments are split out of the code tokens; the resolver attaches
/// them to declarations in a separate pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub comments: Vec<Token>,
    /// At most one entry: lexing stops at the first character no rule accepts.
    pub errors: Vec<ParseError>,
    /// Number of lines in the source, counting a trailing empty line.
    pub line_count: u32,
}

impl TokenStream {
    pub fn first_error(&self) -> Option<&ParseError> {
        self.errors.first()
    }
}

const ASCII_DIGIT: u8 = 1 << 0;
const ASCII_IDENT_START: u8 = 1 << 1;
const ASCII_IDENT_CONT: u8 = 1 << 2;
const ASCII_BLANK: u8 = 1 << 3;
const ASCII_SYMBOL: u8 = 1 << 4;

const fn build_ascii_class() -> [u8; 128] {
    let mut table = [0u8; 128];
    let mut i = 0;
    while i < 128 {
        let c = i as u8;
        if matches!(c, b' ' | b'\t' | b'\r') {
            table[i] |= ASCII_BLANK;
        }
        if c >= b'0' && c <= b'9' {
            table[i] |= ASCII_DIGIT | ASCII_IDENT_CONT;
        }
        if (c >= b'a' && c <= b'z') || (c >= b'A' && c <= b'Z') || c == b'_' {
            table[i] |= ASCII_IDENT_START | ASCII_IDENT_CONT;
        }
        if matches!(
            c,
            b'+' | b'-' | b'*' | b'/' | b'%' | b'^' | b'#' | b'(' | b')' | b'{' | b'}' | b'[' | b']' | b';' | b':' | b','
        ) {
            table[i] |= ASCII_SYMBOL;
        }
        i += 1;
    }
    table
}

const ASCII_CLASS: [u8; 128] = build_ascii_class();

#[inline]
fn ascii_flags(c: char) -> u8 {
    if c.is_ascii() { ASCII_CLASS[c as usize] } else { 0 }
}

#[inline]
fn is_ident_start(c: char) -> bool {
    ascii_flags(c) & ASCII_IDENT_START != 0
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    ascii_flags(c) & ASCII_IDENT_CONT != 0 || (!c.is_ascii() && c.is_alphanumeric())
}

/// Single-pass, error-tolerant Lua lexer. Lines and columns are zero-based.
pub struct Tokenizer {
    chars: Vec<char>,
    idx: usize,
    len: usize,
    line: u32,
    line_start: usize,
    stream: TokenStream,
}

impl Tokenizer {
    pub fn tokenize(source: &str) -> TokenStream {
        let chars: Vec<char> = source.chars().collect();
        let mut t = Tokenizer {
            len: chars.len(),
            chars,
            idx: 0,
            line: 0,
            line_start: 0,
            stream: TokenStream {
                tokens: Vec::with_capacity(source.len() / 4),
                ..TokenStream::default()
            },
        };
        t.run();
        t.stream.line_count = source.matches('\n').count() as u32 + 1;
        t.stream
    }

    fn eof(&self) -> bool {
        self.idx >= self.len
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, (self.idx - self.line_start) as u32)
    }

    fn advance_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_at(0) {
            if !pred(c) {
                break;
            }
            self.idx += 1;
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, position: Position) {
        let text: String = self.chars[start..self.idx].iter().collect();
        let kind = if kind == TokenKind::Identifier && is_keyword(&text) {
            TokenKind::Keyword
        } else {
            kind
        };
        let token = Token::new(kind, text, position.line, position.column);
        if kind == TokenKind::Comment {
            self.stream.comments.push(token);
        } else {
            self.stream.tokens.push(token);
        }
    }

    fn run(&mut self) {
        while let Some(c) = self.peek_at(0) {
            let start = self.idx;
            let position = self.current_position();

            if c == '\n' {
                self.idx += 1;
                self.line += 1;
                self.line_start = self.idx;
                continue;
            }
            if ascii_flags(c) & ASCII_BLANK != 0 {
                self.advance_while(|c| ascii_flags(c) & ASCII_BLANK != 0);
                continue;
            }

            let kind = match self.scan(c) {
                Some(kind) => kind,
                None => {
                    tracing::debug!(character = %c, %position, "lexing stopped");
                    self.stream.errors.push(ParseError::Lexical { character: c, position });
                    return;
                }
            };
            self.push(kind, start, position);
        }
    }

    /// Consumes one token starting at `c`. Returns `None` when no rule accepts the input.
    fn scan(&mut self, c: char) -> Option<TokenKind> {
        if c == '-' && self.peek_at(1) == Some('-') {
            self.advance_while(|c| c != '\n');
            return Some(TokenKind::Comment);
        }
        if is_ident_start(c) {
            self.advance_while(is_ident_continue);
            return Some(TokenKind::Identifier);
        }
        if ascii_flags(c) & ASCII_DIGIT != 0 {
            self.advance_while(|c| ascii_flags(c) & ASCII_DIGIT != 0);
            return Some(TokenKind::Integer);
        }
        match c {
            '=' => {
                if self.peek_at(1) == Some('=') {
                    self.idx += 2;
                    Some(TokenKind::Comparison)
                } else {
                    self.idx += 1;
                    Some(TokenKind::Assign)
                }
            }
            '~' => {
                if self.peek_at(1) == Some('=') {
                    self.idx += 2;
                    Some(TokenKind::Comparison)
                } else {
                    None
                }
            }
            '<' | '>' => {
                self.idx += if self.peek_at(1) == Some('=') { 2 } else { 1 };
                Some(TokenKind::Comparison)
            }
            '.' => {
                let run = (0..3).take_while(|&i| self.peek_at(i) == Some('.')).count();
                self.idx += run;
                Some(TokenKind::Symbol)
            }
            '"' | '\'' => self.scan_string(c),
            c if ascii_flags(c) & ASCII_SYMBOL != 0 => {
                self.idx += 1;
                Some(TokenKind::Symbol)
            }
            _ => None,
        }
    }

    /// Strings end at the first unescaped matching delimiter on the same line.
    fn scan_string(&mut self, quote: char) -> Option<TokenKind> {
        let mut i = self.idx + 1;
        let mut escaped = false;
        while let Some(&c) = self.chars.get(i) {
            if c == '\n' {
                return None;
            }
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                self.idx = i + 1;
                return Some(TokenKind::Str);
            }
            i += 1;
        }
        None
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("idx", &self.idx)
            .field("len", &self.len)
            .field("line", &self.line)
            .field("eof", &self.eof())
            .finish()
    }
}
