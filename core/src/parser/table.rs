use super::{ParseResult, ScopeParser};
use crate::annotation::DocComment;
use crate::token::{ParseError, TokenKind};
use crate::val::{Table, Value, ValueKind};

impl<'a> ScopeParser<'a> {
    /// Table constructor. `name = expr` fields are recorded; positional entries are parsed and
    /// dropped. Fields are separated by `,`, `;` or a line break, and a trailing separator is
    /// allowed. A doc comment above a field documents a function stored there, and an
    /// anonymous function takes the field's name.
    pub(super) fn parse_table(&mut self) -> ParseResult<Value> {
        let open = self.expect_symbol("{")?;
        let table = Table::new();
        loop {
            let doc = self.take_doc_comment();
            match self.peek() {
                Some(t) if t.is_symbol("}") => {
                    self.pos += 1;
                    break;
                }
                Some(_) => {}
                None => {
                    return Err(ParseError::syntax(
                        format!("End of file in table opened at {}", open.position()),
                        self.at(),
                    ));
                }
            }

            self.parse_table_entry(&table, doc)?;

            if self.eat_symbol(",").is_some() || self.eat_symbol(";").is_some() {
                continue;
            }
            match self.peek() {
                Some(t) if t.is_symbol("}") => {
                    self.pos += 1;
                    break;
                }
                Some(t) if self.previous().is_some_and(|p| p.line < t.line) => {}
                Some(t) => {
                    return Err(ParseError::syntax(
                        format!("Expected ',' or '}}' in table, found {t}"),
                        t.position(),
                    ));
                }
                None => {
                    return Err(ParseError::syntax(
                        format!("End of file in table opened at {}", open.position()),
                        self.at(),
                    ));
                }
            }
        }
        Ok(Value::table(table, self.origin_of(open)))
    }

    fn parse_table_entry(&mut self, table: &Table, doc: Option<DocComment>) -> ParseResult<()> {
        let named = self.peek_kind(TokenKind::Identifier)
            && self.peek_ahead(1).is_some_and(|t| t.kind == TokenKind::Assign);
        if named {
            let key = self.take()?;
            self.pos += 1;
            let mut value = self.parse_expression(doc)?;
            if let ValueKind::Function(function) = &mut value.kind {
                function.name.get_or_insert_with(|| key.text.clone());
            }
            table.insert(key.text.clone(), value);
            return Ok(());
        }
        if self.peek_symbol("[") {
            return Err(ParseError::unhandled("table keys in brackets", self.at()));
        }
        self.parse_expression(None)?;
        Ok(())
    }
}
