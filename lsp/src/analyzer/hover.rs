use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position, Range, Url};
use tracing::debug;

use super::LunarAnalyzer;
use crate::text;

fn plain_hover(value: String, range: Range) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::PlainText,
            value,
        }),
        range: Some(range),
    }
}

impl LunarAnalyzer {
    /// The resolved value of the indexing expression under the cursor. When the expression does
    /// not resolve the hover shows its text; with no expression at all it is empty.
    pub fn hover(&self, uri: &Url, position: Position) -> Option<Hover> {
        let ctx = self.context(uri, position)?;
        let Some(found) = text::find_indexing_at(ctx.document.lines(), ctx.line, ctx.column) else {
            return Some(plain_hover(String::new(), Range::new(position, position)));
        };
        let range = ctx.document.to_lsp_range(found.line, found.start, found.end);
        let path = found.text.replace(':', ".");
        let segments: Vec<&str> = path.split('.').collect();

        let contents = match ctx.env.lookup_path(&segments) {
            Some(resolved) => resolved.pretty(),
            None => {
                debug!(expr = %found.text, "hover target did not resolve");
                found.text
            }
        };
        Some(plain_hover(contents, range))
    }
}
