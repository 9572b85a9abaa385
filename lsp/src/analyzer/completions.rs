use lunar_core::{Env, Value, ValueKind};
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Position, Url};
use tracing::debug;

use super::LunarAnalyzer;
use crate::text;

/// Kind shown next to a completed name.
pub(crate) fn completion_kind(value: &Value) -> CompletionItemKind {
    match value.kind {
        ValueKind::Number(_) => CompletionItemKind::VALUE,
        ValueKind::Function(_) => CompletionItemKind::FUNCTION,
        ValueKind::Table(_) => CompletionItemKind::STRUCT,
        _ => CompletionItemKind::TEXT,
    }
}

fn completion_item(name: &str, value: &Value) -> CompletionItem {
    CompletionItem {
        label: name.to_string(),
        kind: Some(completion_kind(value)),
        detail: value.as_function().map(|f| f.signature()),
        ..Default::default()
    }
}

impl LunarAnalyzer {
    /// Names that can continue the text before `position`: module names inside a `require`
    /// string, fields after `a.b.` or methods after `a:`, otherwise locals then globals.
    pub fn completions(&self, uri: &Url, position: Position) -> Vec<CompletionItem> {
        let Some(ctx) = self.context(uri, position) else {
            return Vec::new();
        };
        let Some(line) = ctx.document.line(ctx.line) else {
            return Vec::new();
        };
        let prefix: String = line.chars().take(ctx.column).collect();

        if let Some(partial) = text::require_prefix(&prefix) {
            return self.module_completions(uri, partial);
        }

        let expr = text::trailing_indexing(&prefix);
        let mut path: Vec<&str> = expr.split('.').collect();
        let mut methods_only = false;
        if let Some((receiver, partial)) = path.last().copied().and_then(|last| last.split_once(':')) {
            path.pop();
            path.push(receiver);
            path.push(partial);
            methods_only = true;
        }
        debug!(expr, methods_only, "completing");

        match path.as_slice() {
            [single] => complete_name(single, &ctx.env),
            _ => complete_field(&path, &ctx.env, methods_only),
        }
    }
}

/// Locals visible at the position, closest first, then globals not shadowed by them.
fn complete_name(prefix: &str, env: &Env<'_>) -> Vec<CompletionItem> {
    let locals: Vec<(&str, &Value)> = env
        .visible_locals()
        .into_iter()
        .filter(|(name, _)| name.starts_with(prefix))
        .collect();
    let mut items: Vec<CompletionItem> = locals.iter().map(|(name, value)| completion_item(name, value)).collect();
    items.extend(
        env.global()
            .iter()
            .filter(|(name, _)| name.starts_with(prefix) && !locals.iter().any(|(local, _)| local == name))
            .map(|(name, value)| completion_item(name, value)),
    );
    items
}

/// Fields of the table `path[..len - 1]` whose names start with the last segment.
fn complete_field(path: &[&str], env: &Env<'_>, methods_only: bool) -> Vec<CompletionItem> {
    let Some((partial, table_path)) = path.split_last() else {
        return Vec::new();
    };
    let Some(fields) = env.lookup_path(table_path).and_then(|resolved| resolved.fields()) else {
        debug!(path = %table_path.join("."), "completion target is not a table");
        return Vec::new();
    };
    fields
        .iter()
        .filter(|(name, value)| name.starts_with(partial) && (!methods_only || value.is_function()))
        .map(|(name, value)| completion_item(name, value))
        .collect()
}
