use super::{ParseResult, ScopeParser};
use crate::token::{ParseError, Token};
use crate::val::Value;

impl<'a> ScopeParser<'a> {
    /// `do ... end`
    pub(super) fn parse_do(&mut self, keyword: &'a Token) -> ParseResult<()> {
        self.push_scope(keyword.line, Some("do".to_string()));
        self.parse_block(&["end"])?;
        let end = self.expect_keyword("end")?;
        self.pop_scope(end.line);
        Ok(())
    }

    /// `while cond do ... end`
    pub(super) fn parse_while(&mut self) -> ParseResult<()> {
        self.parse_expression(None)?;
        let do_keyword = self.expect_keyword("do")?;
        self.push_scope(do_keyword.line, Some("while".to_string()));
        self.parse_block(&["end"])?;
        let end = self.expect_keyword("end")?;
        self.pop_scope(end.line);
        Ok(())
    }

    /// `repeat ... until cond`. The condition sees the body's locals.
    pub(super) fn parse_repeat(&mut self, keyword: &'a Token) -> ParseResult<()> {
        self.push_scope(keyword.line, Some("repeat".to_string()));
        self.parse_block(&["until"])?;
        let until = self.expect_keyword("until")?;
        self.parse_expression(None)?;
        let last_line = self.previous().map_or(until.line, |t| t.line);
        self.pop_scope(last_line);
        Ok(())
    }

    /// `if c then ... elseif c then ... else ... end`. Each branch gets its own scope.
    pub(super) fn parse_if(&mut self) -> ParseResult<()> {
        self.parse_expression(None)?;
        let then = self.expect_keyword("then")?;
        self.push_scope(then.line, Some("if".to_string()));
        self.parse_block(&["elseif", "else", "end"])?;

        loop {
            if let Some(keyword) = self.eat_keyword("elseif") {
                self.pop_scope(keyword.line);
                self.parse_expression(None)?;
                let then = self.expect_keyword("then")?;
                self.push_scope(then.line, Some("elseif".to_string()));
                self.parse_block(&["elseif", "else", "end"])?;
            } else if let Some(keyword) = self.eat_keyword("else") {
                self.pop_scope(keyword.line);
                self.push_scope(keyword.line, Some("else".to_string()));
                self.parse_block(&["end"])?;
            } else {
                let end = self.expect_keyword("end")?;
                self.pop_scope(end.line);
                return Ok(());
            }
        }
    }

    /// Numeric `for i = a, b[, c] do` and generic `for k, v in explist do` loops.
    pub(super) fn parse_for(&mut self) -> ParseResult<()> {
        let first = self.expect_name()?;
        let bindings: Vec<(&'a Token, Value)> = if self.eat_assign() {
            self.parse_expression(None)?;
            self.expect_symbol(",")?;
            self.parse_expression(None)?;
            if self.eat_symbol(",").is_some() {
                self.parse_expression(None)?;
            }
            vec![(first, Value::number(None, self.origin_of(first)))]
        } else {
            let mut names = vec![first];
            while self.eat_symbol(",").is_some() {
                names.push(self.expect_name()?);
            }
            if self.eat_keyword("in").is_none() {
                return Err(ParseError::syntax(
                    format!("Expected '=' or 'in' in for loop, found {}", self.describe_next()),
                    self.at(),
                ));
            }
            self.parse_expression_list(None)?;
            names
                .into_iter()
                .map(|n| (n, Value::uninitialized(n.text.clone(), self.origin_of(n))))
                .collect()
        };

        let do_keyword = self.expect_keyword("do")?;
        self.push_scope(do_keyword.line, Some("for".to_string()));
        for (name, value) in bindings {
            self.bind_local(&name.text, value);
        }
        self.parse_block(&["end"])?;
        let end = self.expect_keyword("end")?;
        self.pop_scope(end.line);
        Ok(())
    }
}
