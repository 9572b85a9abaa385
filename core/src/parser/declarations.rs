use super::expr::Suffixed;
use super::{ParseResult, ScopeParser};
use crate::annotation::DocComment;
use crate::token::{ParseError, Token, TokenKind};
use crate::val::Value;

/// Keywords that close a block.
pub(super) const BLOCK_ENDS: [&str; 4] = ["end", "else", "elseif", "until"];

impl<'a> ScopeParser<'a> {
    /// `local a, b <const> = x, y` and `local function`, after the keyword. Names without a
    /// value are bound as uninitialized; surplus values are dropped.
    pub(super) fn parse_local(&mut self, doc: Option<DocComment>) -> ParseResult<()> {
        if self.eat_keyword("function").is_some() {
            return self.parse_local_function(doc);
        }
        let mut names = vec![self.expect_name()?];
        self.skip_attribute()?;
        while self.eat_symbol(",").is_some() {
            names.push(self.expect_name()?);
            self.skip_attribute()?;
        }
        let values = if self.eat_assign() {
            self.parse_expression_list(doc)?
        } else {
            Vec::new()
        };
        for (name, value) in self.pair_with_values(names, values) {
            self.bind_local(&name.text, value);
        }
        Ok(())
    }

    fn skip_attribute(&mut self) -> ParseResult<()> {
        let opens = self
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Comparison && t.text == "<");
        if opens {
            self.pos += 1;
            self.expect_name()?;
            match self.peek() {
                Some(t) if t.kind == TokenKind::Comparison && t.text == ">" => self.pos += 1,
                _ => {
                    return Err(ParseError::syntax(
                        format!("Expected '>' after attribute, found {}", self.describe_next()),
                        self.at(),
                    ));
                }
            }
        }
        Ok(())
    }

    fn pair_with_values(&self, names: Vec<&'a Token>, values: Vec<Value>) -> Vec<(&'a Token, Value)> {
        let mut values = values.into_iter();
        names
            .into_iter()
            .map(|name| {
                let value = values
                    .next()
                    .unwrap_or_else(|| Value::uninitialized(name.text.clone(), self.origin_of(name)));
                (name, value)
            })
            .collect()
    }

    /// Statements starting with a name: assignments and calls.
    pub(super) fn parse_name_statement(&mut self, doc: Option<DocComment>) -> ParseResult<()> {
        let first = self.take()?;

        if self.peek_symbol(",") {
            let mut names = vec![first];
            while self.eat_symbol(",").is_some() {
                names.push(self.expect_name()?);
            }
            if !self.eat_assign() {
                return Err(ParseError::syntax(
                    format!("Expected '=' after name list, found {}", self.describe_next()),
                    self.at(),
                ));
            }
            let values = self.parse_expression_list(doc)?;
            self.assign_names(names, values);
            return Ok(());
        }
        if self.eat_assign() {
            let values = self.parse_expression_list(doc)?;
            self.assign_names(vec![first], values);
            return Ok(());
        }

        let target = self.parse_suffixes(Suffixed::Path {
            segments: vec![first.text.clone()],
            origin: self.origin_of(first),
        })?;
        match target {
            Suffixed::Path { segments, .. } if segments.len() > 1 => {
                if self.eat_assign() {
                    let mut values = self.parse_expression_list(doc)?;
                    if values.len() != 1 {
                        return Err(ParseError::unhandled(
                            "assigning several values to an indexed name",
                            first.position(),
                        ));
                    }
                    let value = values.pop().unwrap_or_default();
                    if !self.assign_path(&segments, value) {
                        tracing::debug!(path = %segments.join("."), "dropping assignment into a non-table");
                    }
                    return Ok(());
                }
                if self.peek_symbol(",") {
                    return Err(ParseError::unhandled(
                        "assignment to several indexed names",
                        first.position(),
                    ));
                }
                Err(self.unexpected_in_statement())
            }
            Suffixed::Path { .. } => Err(self.unexpected_in_statement()),
            Suffixed::Value { .. } if self.peek_kind(TokenKind::Assign) || self.peek_symbol(",") => Err(
                ParseError::unhandled("assignment to a computed target", first.position()),
            ),
            Suffixed::Value { called: true, .. } => Ok(()),
            Suffixed::Value { .. } => Err(self.unexpected_in_statement()),
        }
    }

    fn assign_names(&mut self, names: Vec<&'a Token>, values: Vec<Value>) {
        for (name, value) in self.pair_with_values(names, values) {
            self.assign_name(&name.text, value);
        }
    }

    fn unexpected_in_statement(&self) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::unhandled(format!("unexpected token {token}"), token.position()),
            None => ParseError::syntax("Unexpected end of file", self.at()),
        }
    }

    /// `return explist`, after the keyword. Values go to the innermost function being parsed,
    /// or to the file when outside any function.
    pub(super) fn parse_return(&mut self) -> ParseResult<()> {
        let bare = self.eof() || self.peek_symbol(";") || BLOCK_ENDS.iter().any(|k| self.peek_keyword(k));
        let values = if bare {
            Vec::new()
        } else {
            self.parse_expression_list(None)?
        };
        match self.functions.last_mut() {
            Some(function) => function.add_returns(values),
            None => self.file_returns.push(values),
        }
        Ok(())
    }
}
