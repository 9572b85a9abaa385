use super::{ParseResult, ScopeParser};
use crate::annotation::DocComment;
use crate::token::{ParseError, Token, TokenKind};
use crate::val::{Argument, Function, Origin, Value};

impl<'a> ScopeParser<'a> {
    /// `function name.path:method(args) body end`, after the keyword.
    pub(super) fn parse_function_statement(&mut self, doc: Option<DocComment>) -> ParseResult<()> {
        let mut name = self.expect_name()?;
        let mut path = vec![name.text.clone()];
        let mut is_method = false;
        while self.eat_symbol(".").is_some() {
            name = self.expect_name()?;
            path.push(name.text.clone());
        }
        if self.eat_symbol(":").is_some() {
            name = self.expect_name()?;
            path.push(name.text.clone());
            is_method = true;
        }

        let (params, close) = self.parse_parameter_list()?;
        let mut function = Function::new(Some(name.text.clone()), arguments(&params), doc);
        if path.len() > 1 {
            function = function.with_path(path.clone(), is_method);
        }
        let label = path.join(".");
        let function = self.parse_function_body(function, close.line, label, &params, is_method)?;
        let value = Value::function(function, self.origin_of(name));

        if let [single] = path.as_slice() {
            self.assign_name(single, value);
        } else if !self.assign_path(&path, value) {
            tracing::debug!(path = %path.join("."), "dropping function definition on a non-table");
        }
        Ok(())
    }

    /// `local function name(args) body end`, after both keywords. The name is bound before the
    /// body so the function can call itself, then re-bound with what the body revealed.
    pub(super) fn parse_local_function(&mut self, doc: Option<DocComment>) -> ParseResult<()> {
        let name = self.expect_name()?;
        let (params, close) = self.parse_parameter_list()?;
        let function = Function::new(Some(name.text.clone()), arguments(&params), doc);
        let origin = self.origin_of(name);
        self.bind_local(&name.text, Value::function(function.clone(), origin.clone()));

        let function = self.parse_function_body(function, close.line, name.text.clone(), &params, false)?;
        self.bind_local(&name.text, Value::function(function, origin));
        Ok(())
    }

    /// `function(args) body end` in expression position, after the keyword.
    pub(super) fn parse_anonymous_function(
        &mut self,
        keyword: &'a Token,
        doc: Option<DocComment>,
    ) -> ParseResult<Value> {
        let (params, close) = self.parse_parameter_list()?;
        let function = Function::new(None, arguments(&params), doc);
        let label = format!("anonymous at {}", keyword.position());
        let function = self.parse_function_body(function, close.line, label, &params, false)?;
        Ok(Value::function(function, self.origin_of(keyword)))
    }

    /// `(a, b, ...)`. Returns the parameter tokens and the closing parenthesis.
    fn parse_parameter_list(&mut self) -> ParseResult<(Vec<&'a Token>, &'a Token)> {
        if self.eat_symbol("(").is_none() {
            return Err(ParseError::syntax(
                format!("Missing argument list, found {}", self.describe_next()),
                self.at(),
            ));
        }
        let mut params = Vec::new();
        if let Some(close) = self.eat_symbol(")") {
            return Ok((params, close));
        }
        loop {
            match self.peek() {
                Some(t) if t.kind == TokenKind::Identifier || t.is_symbol("...") => {
                    self.pos += 1;
                    params.push(t);
                }
                Some(t) => {
                    return Err(ParseError::syntax(
                        format!("Expected parameter name, found {t}"),
                        t.position(),
                    ));
                }
                None => {
                    return Err(ParseError::syntax(
                        "Unexpected end of file in parameter list",
                        self.at(),
                    ));
                }
            }
            if let Some(close) = self.eat_symbol(")") {
                return Ok((params, close));
            }
            let Some(comma) = self.eat_symbol(",") else {
                return Err(ParseError::syntax(
                    format!("Expected ',' or ')' in parameter list, found {}", self.describe_next()),
                    self.at(),
                ));
            };
            if self.peek_symbol(")") {
                return Err(ParseError::syntax(
                    format!("Trailing comma in parameter list at {}", comma.position()),
                    comma.position(),
                ));
            }
        }
    }

    /// Opens the function scope at `start_line`, binds the parameters, parses the body up to
    /// and including `end`, then closes the scope.
    fn parse_function_body(
        &mut self,
        function: Function,
        start_line: u32,
        label: String,
        params: &[&'a Token],
        is_method: bool,
    ) -> ParseResult<Function> {
        self.push_scope(start_line, Some(label));
        if is_method {
            let origin = Origin::in_file(self.file.clone());
            self.bind_local("self", Value::uninitialized("self", origin));
        }
        for param in params.iter().filter(|p| p.kind == TokenKind::Identifier) {
            self.bind_local(&param.text, Value::uninitialized(param.text.clone(), self.origin_of(param)));
        }

        self.functions.push(function);
        let body = self.parse_block(&["end"]);
        let function = self.functions.pop().unwrap_or_default();
        body?;
        let end = self.expect_keyword("end")?;
        self.pop_scope(end.line);
        Ok(function)
    }
}

fn arguments(params: &[&Token]) -> Vec<Argument> {
    params.iter().map(|p| Argument::new(p.text.clone())).collect()
}
