//! Doc-comment annotations.
//!
//! A comment block directly above a declaration documents it. Inside the block two
//! annotations are recognised:
//!
//! - `@param <name> <type> [docs]` where docs run until the next `@` or the end of the comment
//! - `@return <type>`
//!
//! Types are dotted names (`Some.Other.Type`). Text that does not match either form stays in
//! the prose.

use once_cell::sync::Lazy;
use regex::Regex;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Param {
        name: String,
        lua_type: String,
        doc: Option<String>,
    },
    Return {
        lua_type: String,
    },
}

static COMMENT_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?m)^-*").ok());

static ANNOTATION: Lazy<Option<Regex>> = Lazy::new(|| {
    let name = r"[A-Za-z_]\w*";
    let qual = format!(r"{name}(?:\.{name})*");
    let param = format!(r"@param[ \t]+(?P<pname>{name})[ \t]+(?P<ptype>{qual})(?:[ \t]+(?P<pdoc>[^@]*))?");
    let ret = format!(r"@return[ \t]+(?P<rtype>{qual})");
    Regex::new(&format!("{param}|{ret}")).ok()
});

fn trimmed_non_empty_lines(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Removes leading dashes from every line, trims lines and drops the empty ones.
pub fn strip_prefix(comment: &str) -> String {
    let stripped = match COMMENT_PREFIX.as_ref() {
        Some(re) => re.replace_all(comment, "").into_owned(),
        None => comment.to_string(),
    };
    trimmed_non_empty_lines(&stripped)
}

/// The prose of a comment: prefix removed, annotations removed, lines trimmed.
pub fn strip_annotations(comment: &str) -> String {
    let mut text = strip_prefix(comment);
    if let Some(re) = ANNOTATION.as_ref() {
        // Removing one annotation can splice the text around it into a new one.
        loop {
            let next = re.replace_all(&text, "").into_owned();
            if next == text {
                break;
            }
            text = next;
        }
    }
    trimmed_non_empty_lines(&text)
}

pub fn parse_comment(comment: &str) -> Vec<Annotation> {
    let Some(re) = ANNOTATION.as_ref() else {
        return Vec::new();
    };
    let stripped = strip_prefix(comment);
    re.captures_iter(&stripped)
        .filter_map(|caps| {
            if let (Some(name), Some(lua_type)) = (caps.name("pname"), caps.name("ptype")) {
                let doc = caps
                    .name("pdoc")
                    .map(|m| m.as_str().to_string())
                    .filter(|d| !d.trim().is_empty());
                Some(Annotation::Param {
                    name: name.as_str().to_string(),
                    lua_type: lua_type.as_str().to_string(),
                    doc,
                })
            } else {
                caps.name("rtype").map(|t| Annotation::Return {
                    lua_type: t.as_str().to_string(),
                })
            }
        })
        .collect()
}

/// A parsed documentation comment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocComment {
    pub prose: String,
    pub annotations: Vec<Annotation>,
}

impl DocComment {
    pub fn parse(raw: &str) -> Self {
        Self {
            prose: strip_annotations(raw),
            annotations: parse_comment(raw),
        }
    }

    /// Declared type of parameter `name`, from the first `@param` naming it.
    pub fn param_type(&self, name: &str) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Param { name: n, lua_type, .. } if n == name => Some(lua_type.as_str()),
            _ => None,
        })
    }

    pub fn param_doc(&self, name: &str) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Param { name: n, doc, .. } if n == name => doc.as_deref().map(str::trim),
            _ => None,
        })
    }

    pub fn return_types(&self) -> impl Iterator<Item = &str> {
        self.annotations.iter().filter_map(|a| match a {
            Annotation::Return { lua_type } => Some(lua_type.as_str()),
            _ => None,
        })
    }

    /// `**Parameter notes**` section listing documented parameters, empty when none are.
    pub fn parameter_notes(&self) -> String {
        let notes: Vec<String> = self
            .annotations
            .iter()
            .filter_map(|a| match a {
                Annotation::Param {
                    name, doc: Some(doc), ..
                } => Some(format!("  {name}: {}", doc.trim())),
                _ => None,
            })
            .collect();
        if notes.is_empty() {
            return String::new();
        }
        format!("\n\n**Parameter notes**:\n{}", notes.join("\n"))
    }

    /// Prose followed by the parameter notes.
    pub fn documentation(&self) -> String {
        format!("{}{}", self.prose, self.parameter_notes())
    }
}
