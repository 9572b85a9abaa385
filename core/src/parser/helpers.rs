use super::{ParseResult, ScopeParser, ScopeRange};
use crate::annotation::DocComment;
use crate::scope::{Env, Resolved, ScopeId};
use crate::token::{ParseError, Position, Token, TokenKind};
use crate::val::{Origin, Value};

/// Deepest nesting the resolver follows before giving up on a file.
pub(super) const MAX_NESTING: u32 = 100;

impl<'a> ScopeParser<'a> {
    /// Runs `parse` one nesting level deeper, failing past [`MAX_NESTING`] instead of
    /// exhausting the stack.
    pub(super) fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::unhandled("nesting too deep", self.at()));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(super) fn eof(&self) -> bool {
        self.pos >= self.len
    }

    pub(super) fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub(super) fn peek_ahead(&self, offset: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    pub(super) fn previous(&self) -> Option<&'a Token> {
        self.pos.checked_sub(1).and_then(|p| self.tokens.get(p))
    }

    /// Consumes the next token, failing at end of input.
    pub(super) fn take(&mut self) -> ParseResult<&'a Token> {
        match self.tokens.get(self.pos) {
            Some(token) => {
                self.pos += 1;
                Ok(token)
            }
            None => Err(ParseError::syntax("Unexpected end of file", self.at())),
        }
    }

    /// Position of the next token, or of the last one at end of input.
    pub(super) fn at(&self) -> Position {
        self.peek()
            .or_else(|| self.tokens.last())
            .map(Token::position)
            .unwrap_or_default()
    }

    pub(super) fn describe_next(&self) -> String {
        match self.peek() {
            Some(token) => token.to_string(),
            None => "end of file".to_string(),
        }
    }

    pub(super) fn peek_symbol(&self, symbol: &str) -> bool {
        self.peek().is_some_and(|t| t.is_symbol(symbol))
    }

    pub(super) fn peek_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(keyword))
    }

    pub(super) fn peek_kind(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    pub(super) fn eat_symbol(&mut self, symbol: &str) -> Option<&'a Token> {
        if self.peek_symbol(symbol) {
            self.pos += 1;
            self.previous()
        } else {
            None
        }
    }

    pub(super) fn eat_keyword(&mut self, keyword: &str) -> Option<&'a Token> {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            self.previous()
        } else {
            None
        }
    }

    pub(super) fn eat_assign(&mut self) -> bool {
        if self.peek_kind(TokenKind::Assign) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(super) fn expect_symbol(&mut self, symbol: &str) -> ParseResult<&'a Token> {
        match self.eat_symbol(symbol) {
            Some(token) => Ok(token),
            None => Err(ParseError::syntax(
                format!("Expected '{}', found {}", symbol, self.describe_next()),
                self.at(),
            )),
        }
    }

    pub(super) fn expect_keyword(&mut self, keyword: &str) -> ParseResult<&'a Token> {
        match self.eat_keyword(keyword) {
            Some(token) => Ok(token),
            None => Err(ParseError::syntax(
                format!("Expected '{}', found {}", keyword, self.describe_next()),
                self.at(),
            )),
        }
    }

    pub(super) fn expect_name(&mut self) -> ParseResult<&'a Token> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Identifier => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(ParseError::syntax(
                format!("Expected name, found {}", self.describe_next()),
                self.at(),
            )),
        }
    }

    /// Doc comment attached to the next token, if any. Each comment is handed out once.
    pub(super) fn take_doc_comment(&mut self) -> Option<DocComment> {
        self.docs.remove(&self.pos)
    }

    pub(super) fn origin_of(&self, token: &Token) -> Origin {
        Origin::at(self.file.clone(), token.line, token.column)
    }

    pub(super) fn current_scope(&self) -> Option<ScopeId> {
        self.stack.last().map(|(_, id)| *id)
    }

    pub(super) fn env(&self) -> Env<'_> {
        Env::new(&self.arena, self.current_scope(), &*self.global)
    }

    pub(super) fn push_scope(&mut self, start_line: u32, label: Option<String>) -> ScopeId {
        let id = match self.current_scope() {
            Some(parent) => self.arena.push_child(parent, label),
            None => self.arena.push_root(label.unwrap_or_default()),
        };
        tracing::trace!(line = start_line, depth = self.stack.len(), "open scope");
        self.stack.push((start_line, id));
        id
    }

    /// Closes the innermost scope; it covers lines `start..=end_line`.
    pub(super) fn pop_scope(&mut self, end_line: u32) {
        if let Some((start, scope)) = self.stack.pop() {
            self.closed.push(ScopeRange {
                start,
                stop: end_line + 1,
                scope,
            });
        }
    }

    pub(super) fn bind_local(&mut self, name: &str, value: Value) {
        if let Some(scope) = self.current_scope() {
            self.arena.bind(scope, name, value);
        }
    }

    /// Assignment without `local` always targets the global scope, even when a local of the
    /// same name is visible.
    pub(super) fn assign_name(&mut self, name: &str, value: Value) {
        self.global.assign(name, value);
    }

    /// Stores `value` under `path` when everything but the last segment resolves to a table.
    /// Returns false when the target does not exist or is not a table.
    pub(super) fn assign_path(&mut self, path: &[String], value: Value) -> bool {
        let Some((last, prefix)) = path.split_last() else {
            return false;
        };
        if prefix.is_empty() {
            self.assign_name(last, value);
            return true;
        }

        let table = match self.env().lookup_path(prefix) {
            Some(Resolved::Global(_)) => None,
            Some(Resolved::Value(target)) => match target.as_table() {
                Some(table) => Some(table.clone()),
                None => return false,
            },
            None => return false,
        };
        match table {
            Some(table) => table.insert(last.as_str(), value),
            None => self.global.assign(last.as_str(), value),
        }
        true
    }

    /// Skips a bracketed group starting at the current opener, including nested groups.
    pub(super) fn skip_balanced(&mut self) -> ParseResult<()> {
        let open = self.take()?;
        let mut depth = 0usize;
        let mut token = open;
        loop {
            match token.text.as_str() {
                "(" | "[" | "{" if token.kind == TokenKind::Symbol => depth += 1,
                ")" | "]" | "}" if token.kind == TokenKind::Symbol => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
            token = match self.peek() {
                Some(next) => {
                    self.pos += 1;
                    next
                }
                None => {
                    return Err(ParseError::syntax(
                        format!("Unexpected end of file in group opened at {}", open.position()),
                        self.at(),
                    ));
                }
            };
        }
    }
}
