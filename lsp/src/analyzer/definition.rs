use tower_lsp::lsp_types::{Location, Position, Range, Url};
use tracing::debug;

use super::LunarAnalyzer;

impl LunarAnalyzer {
    /// Where the value of the name under the cursor was assigned, as a zero-width location.
    pub fn definition(&self, uri: &Url, position: Position) -> Option<Location> {
        let ctx = self.context(uri, position)?;
        let word = ctx.document.word_at(position);
        if word.is_empty() {
            return None;
        }
        let value = ctx.env.lookup(&word)?.into_value()?;
        let Some((file, line, column)) = value.origin.location() else {
            debug!(word = %word, "definition target has no source location");
            return None;
        };
        let target = Url::parse(file).ok()?;
        let position = match self.document(&target) {
            Some(document) => document.to_lsp_position(line as usize, column as usize),
            None => Position::new(line, column),
        };
        Some(Location::new(target, Range::new(position, position)))
    }

    /// Values carry no separate type declaration, so this is the definition location.
    pub fn type_definition(&self, uri: &Url, position: Position) -> Option<Location> {
        self.definition(uri, position)
    }
}
