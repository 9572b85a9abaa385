use super::declarations::BLOCK_ENDS;
use super::{ParseResult, ParsedFile, ScopeParser};
use crate::token::{ParseError, Token, TokenKind};

impl<'a> ScopeParser<'a> {
    /// Resolves the whole file. Scopes left open by an error are closed at the end of the
    /// document, innermost first.
    pub fn parse(mut self) -> ParsedFile {
        let error = self.parse_block(&[]).err();
        let error_at_end = error.is_some() && self.eof();
        if let Some(err) = &error {
            tracing::debug!(error = %err, position = %err.position(), "scope resolution stopped");
        }

        let end_line = self.file_end_line();
        while !self.stack.is_empty() {
            self.pop_scope(end_line);
        }
        ParsedFile {
            arena: self.arena,
            scopes: self.closed,
            returns: self.file_returns,
            error,
            error_at_end,
        }
    }

    fn file_end_line(&self) -> u32 {
        let after_last_token = self.tokens.last().map_or(0, |t| t.line + 1);
        after_last_token.max(self.line_count.saturating_sub(1))
    }

    /// Statements until end of input or one of `terminators`, which is left unconsumed.
    pub(super) fn parse_block(&mut self, terminators: &[&str]) -> ParseResult<()> {
        self.nested(|p| p.parse_statements(terminators))
    }

    fn parse_statements(&mut self, terminators: &[&str]) -> ParseResult<()> {
        while !self.eof() {
            if terminators.iter().any(|k| self.peek_keyword(k)) {
                return Ok(());
            }
            self.parse_statement(terminators)?;
        }
        Ok(())
    }

    fn parse_statement(&mut self, terminators: &[&str]) -> ParseResult<()> {
        let doc = self.take_doc_comment();
        let Some(token) = self.peek() else {
            return Ok(());
        };
        match token.kind {
            TokenKind::Keyword => self.parse_keyword_statement(token, doc, terminators),
            TokenKind::Identifier => self.parse_name_statement(doc),
            TokenKind::Symbol if token.text == ";" => {
                self.pos += 1;
                Ok(())
            }
            TokenKind::Symbol if token.text == ":" => Err(ParseError::unhandled("labels", token.position())),
            TokenKind::Symbol if token.text == "(" => Err(ParseError::unhandled(
                "statements starting with a parenthesized expression",
                token.position(),
            )),
            _ => Err(unhandled_token(token)),
        }
    }

    fn parse_keyword_statement(
        &mut self,
        token: &'a Token,
        doc: Option<crate::annotation::DocComment>,
        terminators: &[&str],
    ) -> ParseResult<()> {
        let keyword = token.text.as_str();
        if terminators.contains(&keyword) {
            return Ok(());
        }
        if BLOCK_ENDS.contains(&keyword) {
            return Err(ParseError::syntax(format!("Unmatched {token}"), token.position()));
        }
        self.pos += 1;
        match keyword {
            "local" => self.parse_local(doc),
            "function" => self.parse_function_statement(doc),
            "return" => self.parse_return(),
            "do" => self.parse_do(token),
            "while" => self.parse_while(),
            "repeat" => self.parse_repeat(token),
            "if" => self.parse_if(),
            "for" => self.parse_for(),
            "break" => Ok(()),
            _ => Err(unhandled_token(token)),
        }
    }
}

fn unhandled_token(token: &Token) -> ParseError {
    ParseError::syntax(format!("Unhandled token {token}"), token.position())
}
