//! Scope-resolving parser.
//!
//! Walks the token stream once, statement by statement, maintaining a stack of open lexical
//! scopes and binding every declaration it meets to an approximate [`Value`]. It does not
//! build a syntax tree. The first error stops the walk; everything bound up to that point,
//! including scopes still open, is kept.

use std::sync::Arc;

use crate::annotation::DocComment;
use crate::scope::{GlobalScope, ScopeArena, ScopeId};
use crate::token::{ParseError, Token};
use crate::util::fast_map::FastHashMap;
use crate::val::{Function, Value};

mod comments;
mod control;
mod declarations;
mod expr;
mod function;
mod helpers;
mod program;
mod table;


pub type ParseResult<T> = Result<T, ParseError>;

/// Half-open line interval `[start, stop)` covered by a closed scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeRange {
    pub start: u32,
    pub stop: u32,
    pub scope: ScopeId,
}

impl ScopeRange {
    pub fn contains(&self, line: u32) -> bool {
        self.start <= line && line < self.stop
    }

    pub fn span(&self) -> u32 {
        self.stop.saturating_sub(self.start)
    }
}

/// Everything the resolver produced for one file.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub arena: ScopeArena,
    /// Closed scopes, innermost-closed first.
    pub scopes: Vec<ScopeRange>,
    /// Values of each `return` statement executed at file level.
    pub returns: Vec<Vec<Value>>,
    pub error: Option<ParseError>,
    /// The error was raised after the last token was consumed.
    pub error_at_end: bool,
}

pub struct ScopeParser<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) pos: usize,
    pub(crate) len: usize,
    pub(crate) docs: FastHashMap<usize, DocComment>,
    pub(crate) file: Option<Arc<str>>,
    pub(crate) global: &'a mut GlobalScope,
    pub(crate) arena: ScopeArena,
    /// Open scopes with the line each one started on, innermost last.
    pub(crate) stack: Vec<(u32, ScopeId)>,
    pub(crate) closed: Vec<ScopeRange>,
    /// Functions whose bodies are being parsed, innermost last.
    pub(crate) functions: Vec<Function>,
    pub(crate) file_returns: Vec<Vec<Value>>,
    pub(crate) line_count: u32,
    /// Blocks, expressions and tables currently being parsed inside each other.
    pub(crate) depth: u32,
}

impl<'a> ScopeParser<'a> {
    pub fn new(
        tokens: &'a [Token],
        comments: &[Token],
        line_count: u32,
        global: &'a mut GlobalScope,
        file: Option<Arc<str>>,
    ) -> Self {
        let mut arena = ScopeArena::new();
        let root = arena.push_root("outer");
        Self {
            tokens,
            pos: 0,
            len: tokens.len(),
            docs: comments::attach_doc_comments(tokens, comments),
            file,
            global,
            arena,
            stack: vec![(0, root)],
            closed: Vec::new(),
            functions: Vec::new(),
            file_returns: Vec::new(),
            line_count,
            depth: 0,
        }
    }
}
