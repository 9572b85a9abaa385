use std::fmt;

use crate::annotation::DocComment;

use super::{Origin, Value};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Argument {
    pub name: String,
    /// Declared through `@param`.
    pub lua_type: Option<String>,
    pub doc: Option<String>,
}

impl Argument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lua_type: None,
            doc: None,
        }
    }

    /// `name` or `name: type`.
    pub fn signature(&self) -> String {
        match &self.lua_type {
            Some(t) => format!("{}: {}", self.name, t),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReturnType {
    /// From an `@return` annotation.
    Declared(String),
    /// From a `return` statement in the body.
    Inferred(Value),
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Declared(t) => f.write_str(t),
            ReturnType::Inferred(v) if v.is_concrete() => f.write_str(v.type_name()),
            ReturnType::Inferred(_) => f.write_str("any"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Function {
    pub name: Option<String>,
    /// Full dotted path for definitions like `function a.b:c()`.
    pub path: Option<Vec<String>>,
    pub is_method: bool,
    pub args: Vec<Argument>,
    pub doc: Option<DocComment>,
    pub returns: Vec<ReturnType>,
}

impl Function {
    /// Builds a function and applies the doc comment's `@param` types and `@return` entries.
    pub fn new(name: Option<String>, mut args: Vec<Argument>, doc: Option<DocComment>) -> Self {
        let mut returns = Vec::new();
        if let Some(doc) = &doc {
            for arg in args.iter_mut() {
                if let Some(t) = doc.param_type(&arg.name) {
                    arg.lua_type = Some(t.to_string());
                }
                if let Some(d) = doc.param_doc(&arg.name) {
                    arg.doc = Some(d.to_string());
                }
            }
            returns.extend(doc.return_types().map(|t| ReturnType::Declared(t.to_string())));
        }
        Self {
            name,
            path: None,
            is_method: false,
            args,
            doc,
            returns,
        }
    }

    pub fn with_path(mut self, path: Vec<String>, is_method: bool) -> Self {
        self.path = Some(path);
        self.is_method = is_method;
        self
    }

    /// Records inferred return values unless return types are already known. Annotations and
    /// the first `return` statement win over later ones.
    pub fn add_returns(&mut self, values: Vec<Value>) {
        if !self.returns.is_empty() {
            return;
        }
        self.returns.extend(values.into_iter().map(ReturnType::Inferred));
    }

    /// `(a: number, b)`
    pub fn arg_list(&self) -> String {
        let args: Vec<String> = self
            .args
            .iter()
            .map(Argument::signature)
            .filter(|s| !s.is_empty())
            .collect();
        format!("({})", args.join(", "))
    }

    /// `→ number, string`, or `None` when no return type is known.
    pub fn return_summary(&self) -> Option<String> {
        if self.returns.is_empty() {
            return None;
        }
        let types: Vec<String> = self.returns.iter().map(ToString::to_string).collect();
        Some(format!("→ {}", types.join(", ")))
    }

    /// `name(a: number, b) → number`
    pub fn signature(&self) -> String {
        let mut sig = format!("{}{}", self.name.as_deref().unwrap_or_default(), self.arg_list());
        if let Some(ret) = self.return_summary() {
            sig.push(' ');
            sig.push_str(&ret);
        }
        sig
    }

    /// Doc prose followed by parameter notes, empty without a doc comment.
    pub fn documentation(&self) -> String {
        self.doc.as_ref().map(DocComment::documentation).unwrap_or_default()
    }

    /// Value produced by calling this function: a placeholder of the declared primitive type,
    /// the first inferred value, or `Any`.
    pub fn call_result(&self, origin: Origin) -> Value {
        match self.returns.first() {
            Some(ReturnType::Declared(t)) => match t.as_str() {
                "integer" | "float" | "number" => Value::number(None, origin),
                "string" => Value::string(None, origin),
                "boolean" | "bool" => Value::boolean(None, origin),
                _ => self.opaque_result(origin),
            },
            Some(ReturnType::Inferred(v)) if v.is_concrete() => v.clone(),
            _ => self.opaque_result(origin),
        }
    }

    fn opaque_result(&self, origin: Origin) -> Value {
        Value::any(Some(format!("Call result for {}", self.signature())), origin)
    }
}
