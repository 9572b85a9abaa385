use std::{fmt, sync::Arc};

mod display;
mod function;
mod table;

pub use function::{Argument, Function, ReturnType};
pub use table::Table;

/// Where a value was defined. Values built outside any file (built-ins, placeholders) carry no
/// file; line and column default to 0 when a file is known but they are not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    pub file: Option<Arc<str>>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Origin {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn in_file(file: Option<Arc<str>>) -> Self {
        Self {
            file,
            line: None,
            column: None,
        }
    }

    pub fn at(file: Option<Arc<str>>, line: u32, column: u32) -> Self {
        Self {
            file,
            line: Some(line),
            column: Some(column),
        }
    }

    /// `(file, line, column)` when the value is traceable to a file.
    pub fn location(&self) -> Option<(&str, u32, u32)> {
        let file = self.file.as_deref()?;
        Some((file, self.line.unwrap_or(0), self.column.unwrap_or(0)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// Integer literal, or `None` for a number of unknown value.
    Number(Option<i64>),
    String(Option<String>),
    Boolean(Option<bool>),
    Function(Function),
    Table(Table),
    /// Value of unknown type; the description says where it came from.
    Any(Option<String>),
    /// A name that resolved nowhere.
    Unknown(String),
    /// Declared but never assigned.
    Uninitialized(String),
    /// A construct the resolver recognised but does not model.
    Unimplemented(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub kind: ValueKind,
    pub origin: Origin,
}

impl Value {
    pub fn new(kind: ValueKind, origin: Origin) -> Self {
        Self { kind, origin }
    }

    pub fn number(value: Option<i64>, origin: Origin) -> Self {
        Self::new(ValueKind::Number(value), origin)
    }

    pub fn string(value: Option<String>, origin: Origin) -> Self {
        Self::new(ValueKind::String(value), origin)
    }

    pub fn boolean(value: Option<bool>, origin: Origin) -> Self {
        Self::new(ValueKind::Boolean(value), origin)
    }

    pub fn function(function: Function, origin: Origin) -> Self {
        Self::new(ValueKind::Function(function), origin)
    }

    pub fn table(table: Table, origin: Origin) -> Self {
        Self::new(ValueKind::Table(table), origin)
    }

    pub fn any(description: Option<String>, origin: Origin) -> Self {
        Self::new(ValueKind::Any(description), origin)
    }

    pub fn unknown(name: impl Into<String>, origin: Origin) -> Self {
        Self::new(ValueKind::Unknown(name.into()), origin)
    }

    pub fn uninitialized(name: impl Into<String>, origin: Origin) -> Self {
        Self::new(ValueKind::Uninitialized(name.into()), origin)
    }

    pub fn unimplemented(what: impl Into<String>, origin: Origin) -> Self {
        Self::new(ValueKind::Unimplemented(what.into()), origin)
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.kind {
            ValueKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match &self.kind {
            ValueKind::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, ValueKind::Function(_))
    }

    /// Whether the value carries real type information, as opposed to a placeholder.
    pub fn is_concrete(&self) -> bool {
        matches!(
            self.kind,
            ValueKind::Number(_)
                | ValueKind::String(_)
                | ValueKind::Boolean(_)
                | ValueKind::Function(_)
                | ValueKind::Table(_)
        )
    }

    /// Field `key` of a table value.
    pub fn field(&self, key: &str) -> Option<Value> {
        self.as_table()?.get(key)
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ValueKind::Number(_) => "number",
            ValueKind::String(_) => "string",
            ValueKind::Boolean(_) => "boolean",
            ValueKind::Function(_) => "function",
            ValueKind::Table(_) => "table",
            ValueKind::Any(_) => "any",
            ValueKind::Unknown(_) => "unknown",
            ValueKind::Uninitialized(_) => "uninitialized",
            ValueKind::Unimplemented(_) => "unimplemented",
        }
    }

    /// Multi-line human readable rendering used by hover.
    pub fn pretty(&self) -> String {
        self.pretty_indented(0)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::any(None, Origin::none())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}
