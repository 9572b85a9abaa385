use super::{ParseResult, ScopeParser};
use crate::annotation::DocComment;
use crate::token::{ParseError, Token, TokenKind};
use crate::val::{Origin, Value, ValueKind};

/// Binary operator families, loosest binding first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BinaryClass {
    Or,
    And,
    Comparison,
    Concat,
    Arithmetic,
}

/// A prefix expression while its suffixes are being read. Plain dotted names stay symbolic so
/// statements can assign through them.
pub(super) enum Suffixed {
    Path { segments: Vec<String>, origin: Origin },
    Value { value: Value, called: bool },
}

impl<'a> ScopeParser<'a> {
    pub(super) fn parse_expression_list(&mut self, doc: Option<DocComment>) -> ParseResult<Vec<Value>> {
        let mut values = vec![self.parse_expression(doc)?];
        while self.eat_symbol(",").is_some() {
            values.push(self.parse_expression(None)?);
        }
        Ok(values)
    }

    /// Parses one expression and approximates its value. Operator chains only keep the type
    /// implied by their loosest operator.
    pub(super) fn parse_expression(&mut self, doc: Option<DocComment>) -> ParseResult<Value> {
        self.nested(|p| p.parse_operator_chain(doc))
    }

    fn parse_operator_chain(&mut self, doc: Option<DocComment>) -> ParseResult<Value> {
        let origin = self.peek().map(|t| self.origin_of(t)).unwrap_or_default();
        let first = self.parse_unary(doc)?;
        let mut operands = vec![first];
        let mut loosest: Option<BinaryClass> = None;
        while let Some(class) = self.peek_binary_operator() {
            self.pos += 1;
            operands.push(self.parse_unary(None)?);
            loosest = Some(loosest.map_or(class, |l| l.min(class)));
        }

        let Some(class) = loosest else {
            return Ok(operands.into_iter().next().unwrap_or_default());
        };
        Ok(match class {
            BinaryClass::Arithmetic => Value::number(None, origin),
            BinaryClass::Concat => Value::string(None, origin),
            BinaryClass::Comparison => Value::boolean(None, origin),
            BinaryClass::And => operands.pop().unwrap_or_default(),
            BinaryClass::Or => {
                let concrete = operands.iter().position(Value::is_concrete);
                match concrete {
                    Some(idx) => operands.swap_remove(idx),
                    None => operands.pop().unwrap_or_default(),
                }
            }
        })
    }

    fn peek_binary_operator(&self) -> Option<BinaryClass> {
        let token = self.peek()?;
        match token.kind {
            TokenKind::Comparison => Some(BinaryClass::Comparison),
            TokenKind::Keyword if token.text == "and" => Some(BinaryClass::And),
            TokenKind::Keyword if token.text == "or" => Some(BinaryClass::Or),
            TokenKind::Symbol => match token.text.as_str() {
                "+" | "-" | "*" | "/" | "%" | "^" => Some(BinaryClass::Arithmetic),
                ".." => Some(BinaryClass::Concat),
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_unary(&mut self, doc: Option<DocComment>) -> ParseResult<Value> {
        let Some(token) = self.peek() else {
            return self.parse_primary(doc);
        };
        let origin = self.origin_of(token);
        if token.is_symbol("-") {
            self.pos += 1;
            let operand = self.nested(|p| p.parse_unary(None))?;
            return Ok(match operand.kind {
                ValueKind::Number(Some(n)) => Value::number(n.checked_neg(), origin),
                _ => Value::number(None, origin),
            });
        }
        if token.is_symbol("#") {
            self.pos += 1;
            self.nested(|p| p.parse_unary(None))?;
            return Ok(Value::number(None, origin));
        }
        if token.is_keyword("not") {
            self.pos += 1;
            self.nested(|p| p.parse_unary(None))?;
            return Ok(Value::boolean(None, origin));
        }
        self.parse_primary(doc)
    }

    fn parse_primary(&mut self, doc: Option<DocComment>) -> ParseResult<Value> {
        let Some(token) = self.peek() else {
            return Err(ParseError::syntax("Unexpected end of file, expected an expression", self.at()));
        };
        let origin = self.origin_of(token);
        match token.kind {
            TokenKind::Integer => {
                self.pos += 1;
                Ok(Value::number(token.text.parse().ok(), origin))
            }
            TokenKind::Str => {
                self.pos += 1;
                Ok(Value::string(token.string_body().map(str::to_string), origin))
            }
            TokenKind::Keyword => match token.text.as_str() {
                "true" | "false" => {
                    self.pos += 1;
                    Ok(Value::boolean(Some(token.text == "true"), origin))
                }
                "nil" => {
                    self.pos += 1;
                    Ok(Value::any(Some("nil".to_string()), origin))
                }
                "function" => {
                    self.pos += 1;
                    self.parse_anonymous_function(token, doc)
                }
                _ => Err(unexpected(token)),
            },
            TokenKind::Symbol => match token.text.as_str() {
                "{" => self.nested(Self::parse_table),
                "..." => {
                    self.pos += 1;
                    Ok(Value::any(Some("varargs".to_string()), origin))
                }
                "(" => {
                    self.pos += 1;
                    let value = self.parse_expression(doc)?;
                    self.expect_symbol(")")?;
                    let suffixed = self.parse_suffixes(Suffixed::Value { value, called: false })?;
                    Ok(self.suffixed_value(suffixed))
                }
                _ => Err(unexpected(token)),
            },
            TokenKind::Identifier => {
                self.pos += 1;
                let suffixed = self.parse_suffixes(Suffixed::Path {
                    segments: vec![token.text.clone()],
                    origin,
                })?;
                Ok(self.suffixed_value(suffixed))
            }
            _ => Err(unexpected(token)),
        }
    }

    pub(super) fn peek_call_start(&self) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Str || t.is_symbol("(") || t.is_symbol("{"))
    }

    /// Reads `.name`, `:name(args)`, `(args)`, `"str"`, `{...}` and `[expr]` suffixes.
    pub(super) fn parse_suffixes(&mut self, mut target: Suffixed) -> ParseResult<Suffixed> {
        while let Some(token) = self.peek() {
            if token.is_symbol(".") {
                self.pos += 1;
                let name = self.expect_name()?;
                target = match target {
                    Suffixed::Path { mut segments, origin } => {
                        segments.push(name.text.clone());
                        Suffixed::Path { segments, origin }
                    }
                    Suffixed::Value { value, .. } => Suffixed::Value {
                        value: self.field_or_unknown(&value, name),
                        called: false,
                    },
                };
            } else if token.is_symbol(":") {
                self.pos += 1;
                let name = self.expect_name()?;
                if !self.peek_call_start() {
                    return Err(ParseError::syntax(
                        format!("Expected arguments after method {}, found {}", name.text, self.describe_next()),
                        self.at(),
                    ));
                }
                let receiver = self.suffixed_value(target);
                let method = self.field_or_unknown(&receiver, name);
                target = Suffixed::Value {
                    value: self.parse_call(&method)?,
                    called: true,
                };
            } else if self.peek_call_start() {
                let callee = self.suffixed_value(target);
                target = Suffixed::Value {
                    value: self.parse_call(&callee)?,
                    called: true,
                };
            } else if token.is_symbol("[") {
                self.skip_balanced()?;
                target = Suffixed::Value {
                    value: Value::any(Some("indexed value".to_string()), self.origin_of(token)),
                    called: false,
                };
            } else {
                break;
            }
        }
        Ok(target)
    }

    pub(super) fn suffixed_value(&self, suffixed: Suffixed) -> Value {
        match suffixed {
            Suffixed::Path { segments, origin } => self.env().resolve_path(&segments, origin),
            Suffixed::Value { value, .. } => value,
        }
    }

    fn field_or_unknown(&self, value: &Value, name: &Token) -> Value {
        match value.field(&name.text) {
            Some(field) => field.clone(),
            None => Value::unknown(name.text.clone(), self.origin_of(name)),
        }
    }

    /// Skips the arguments of a call and returns the approximate result.
    fn parse_call(&mut self, callee: &Value) -> ParseResult<Value> {
        let Some(open) = self.peek() else {
            return Err(ParseError::syntax("Unexpected end of file in call", self.at()));
        };
        let origin = self.origin_of(open);
        if open.kind == TokenKind::Str {
            self.pos += 1;
        } else {
            self.skip_balanced()?;
        }
        Ok(match callee.as_function() {
            Some(function) => function.call_result(origin),
            None => {
                let what = match &callee.kind {
                    ValueKind::Unknown(name) => name.clone(),
                    _ => callee.type_name().to_string(),
                };
                Value::any(Some(format!("Call result for non-function {what}")), origin)
            }
        })
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::syntax(format!("Unexpected {token}"), token.position())
}
