use super::{Value, ValueKind};

impl Value {
    pub fn pretty_indented(&self, indent: usize) -> String {
        self.pretty_inner(indent, &mut Vec::new())
    }

    /// `open` holds the tables being rendered on the current path; meeting one again prints a
    /// back reference instead of recursing.
    fn pretty_inner(&self, indent: usize, open: &mut Vec<usize>) -> String {
        match &self.kind {
            ValueKind::Number(Some(n)) => format!("{n}: number"),
            ValueKind::Number(None) => "number".to_string(),
            ValueKind::String(Some(s)) => format!("\"{s}\":string"),
            ValueKind::String(None) => "string".to_string(),
            ValueKind::Boolean(Some(b)) => format!("{b}: boolean"),
            ValueKind::Boolean(None) => "boolean".to_string(),
            ValueKind::Function(f) => {
                let doc = f.documentation();
                if doc.is_empty() {
                    f.signature()
                } else {
                    format!("{}\n\n{}", f.signature(), doc)
                }
            }
            ValueKind::Table(t) => {
                if open.contains(&t.id()) {
                    return "{...}".to_string();
                }
                open.push(t.id());
                let ind = " ".repeat(indent);
                let ind2 = " ".repeat(indent + 1);
                let mut out = String::from("{");
                for (key, value) in t.entries() {
                    out.push_str(&format!("\n{ind2}{key}={}", value.pretty_inner(indent + 1, open)));
                }
                out.push_str(&format!("\n{ind}}}"));
                open.pop();
                out
            }
            ValueKind::Any(Some(desc)) => format!("any<{desc}>"),
            ValueKind::Any(None) => "any".to_string(),
            ValueKind::Unknown(name) => format!("<{name}>: Unknown"),
            ValueKind::Uninitialized(_) => "<uninitialized>".to_string(),
            ValueKind::Unimplemented(what) => format!("[unimplemented {what}]"),
        }
    }
}
