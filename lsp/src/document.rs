use thiserror::Error;
use tower_lsp::lsp_types::{Position, Range, TextDocumentContentChangeEvent, Url};

use crate::text;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("unsynchronized edit: document is at version {current}, change has version {received}")]
    Desynchronized { current: i32, received: i32 },
    #[error("edit range {line}:{character} is outside the document")]
    RangeOutOfBounds { line: u32, character: u32 },
    #[error("document {0} is not open")]
    NotOpen(Url),
}

/// Text of an open document as a line list.
///
/// The list always ends with an extra empty line, so a document of `n` newlines has `n + 2`
/// lines. Columns inside the model are char offsets; LSP positions (UTF-16) are converted at
/// the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    uri: Url,
    lines: Vec<String>,
    version: i32,
}

fn lines_from_text(text: &str) -> Vec<String> {
    let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    lines.push(String::new());
    lines
}

/// Char column of a UTF-16 offset within `line`, clamped to the line end.
pub fn utf16_to_char_column(line: &str, utf16: u32) -> usize {
    let target = utf16 as usize;
    if line.is_ascii() {
        return target.min(line.len());
    }
    let mut seen = 0usize;
    let mut column = 0usize;
    for ch in line.chars() {
        let width = ch.len_utf16();
        if seen + width > target {
            break;
        }
        seen += width;
        column += 1;
        if seen == target {
            break;
        }
    }
    column
}

/// UTF-16 offset of a char column within `line`, clamped to the line end.
pub fn char_to_utf16_column(line: &str, column: usize) -> u32 {
    line.chars().take(column).map(char::len_utf16).sum::<usize>() as u32
}

impl Document {
    pub fn new(uri: Url, text: &str) -> Self {
        Self {
            uri,
            lines: lines_from_text(text),
            version: 0,
        }
    }

    /// Starts from the version the client assigned when opening the document.
    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    /// The lines joined with `\n`, so it ends with the newline of the trailing empty line.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Applies one batch of changes, which must carry version `current + 1`. The batch is
    /// applied in order to a copy; the document only changes when every edit succeeds.
    pub fn apply_changes(
        &mut self,
        changes: &[TextDocumentContentChangeEvent],
        version: i32,
    ) -> Result<(), DocumentError> {
        if version != self.version + 1 {
            return Err(DocumentError::Desynchronized {
                current: self.version,
                received: version,
            });
        }
        let mut lines = self.lines.clone();
        for change in changes {
            match change.range {
                None => {
                    tracing::debug!(uri = %self.uri, "full document change");
                    lines = lines_from_text(&change.text);
                }
                Some(range) => splice(&mut lines, range, &change.text)?,
            }
        }
        self.lines = lines;
        self.version = version;
        Ok(())
    }

    /// `(line, char column)` of an LSP position.
    pub fn to_char_position(&self, position: Position) -> (usize, usize) {
        let line = position.line as usize;
        let column = self
            .line(line)
            .map_or(position.character as usize, |text| utf16_to_char_column(text, position.character));
        (line, column)
    }

    /// LSP position of a `(line, char column)` pair.
    pub fn to_lsp_position(&self, line: usize, column: usize) -> Position {
        let character = match self.line(line) {
            Some(text) => char_to_utf16_column(text, column),
            None => column as u32,
        };
        Position::new(line as u32, character)
    }

    pub fn to_lsp_range(&self, line: usize, start: usize, end: usize) -> Range {
        Range::new(self.to_lsp_position(line, start), self.to_lsp_position(line, end))
    }

    /// Name under the position, empty when there is none.
    pub fn word_at(&self, position: Position) -> String {
        let (line, column) = self.to_char_position(position);
        self.line(line).map(|text| text::word_at(text, column)).unwrap_or_default()
    }
}

/// Replaces `range` with `text`: the start line's prefix, the new lines, then the end line's
/// suffix. An edit starting one past the last line appends a line first.
fn splice(lines: &mut Vec<String>, range: Range, text: &str) -> Result<(), DocumentError> {
    let (start, end) = if range.start <= range.end {
        (range.start, range.end)
    } else {
        (range.end, range.start)
    };
    let start_line = start.line as usize;
    let end_line = end.line as usize;
    if start_line == lines.len() {
        lines.push(String::new());
    }
    let out_of_bounds = |p: Position| DocumentError::RangeOutOfBounds {
        line: p.line,
        character: p.character,
    };
    let first = lines.get(start_line).ok_or_else(|| out_of_bounds(start))?;
    let last = lines.get(end_line).ok_or_else(|| out_of_bounds(end))?;

    let pre: String = first.chars().take(utf16_to_char_column(first, start.character)).collect();
    let post: String = last.chars().skip(utf16_to_char_column(last, end.character)).collect();

    let mut replacement: Vec<String> = text.split('\n').map(str::to_string).collect();
    if let Some(head) = replacement.first_mut() {
        head.insert_str(0, &pre);
    }
    if let Some(tail) = replacement.last_mut() {
        tail.push_str(&post);
    }
    lines.splice(start_line..=end_line, replacement);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> Url {
        Url::parse("file:///doc.lua").unwrap()
    }

    fn edit(start: (u32, u32), end: (u32, u32), text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: Some(Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1))),
            range_length: None,
            text: text.to_string(),
        }
    }

    fn full(text: &str) -> TextDocumentContentChangeEvent {
        TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: text.to_string(),
        }
    }

    const TEXT: &str = "local util = require(\"util\")\nlocal Small = require(\"small\")\nlocal result = util.addNumbers(5, 5)\n\na_function(x, y)";

    #[test]
    fn test_lines_include_trailing_empty_line() {
        let doc = Document::new(uri(), TEXT);
        assert_eq!(doc.lines().len(), 6);
        assert_eq!(doc.line(0), Some("local util = require(\"util\")"));
        assert_eq!(doc.line(5), Some(""));
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_word_at() {
        let doc = Document::new(uri(), TEXT);
        assert_eq!(doc.word_at(Position::new(0, 0)), "local");
        assert_eq!(doc.word_at(Position::new(0, 4)), "local");
        assert_eq!(doc.word_at(Position::new(0, 5)), "");
        assert_eq!(doc.word_at(Position::new(0, 6)), "util");
        assert_eq!(doc.word_at(Position::new(4, 10)), "");
        assert_eq!(doc.word_at(Position::new(4, 11)), "x");
        assert_eq!(doc.word_at(Position::new(9, 0)), "");
    }

    #[test]
    fn test_full_change_round_trip() {
        let mut doc = Document::new(uri(), "old");
        doc.apply_changes(&[full("a = 1\nb = 2")], 1).unwrap();
        assert_eq!(doc.text(), "a = 1\nb = 2\n");
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_range_edits() {
        let mut doc = Document::new(uri(), "local a = 1\nlocal b = 2");
        doc.apply_changes(&[edit((0, 6), (0, 7), "alpha")], 1).unwrap();
        assert_eq!(doc.line(0), Some("local alpha = 1"));

        doc.apply_changes(&[edit((0, 15), (1, 0), "\nprint(alpha)\n")], 2).unwrap();
        assert_eq!(doc.lines(), &["local alpha = 1", "print(alpha)", "local b = 2", ""]);

        doc.apply_changes(&[edit((1, 0), (2, 11), "")], 3).unwrap();
        assert_eq!(doc.lines(), &["local alpha = 1", "", ""]);
    }

    #[test]
    fn test_edits_in_one_batch_apply_in_order() {
        let mut doc = Document::new(uri(), "abc");
        doc.apply_changes(&[edit((0, 3), (0, 3), "d"), edit((0, 0), (0, 1), "")], 1)
            .unwrap();
        assert_eq!(doc.line(0), Some("bcd"));
    }

    #[test]
    fn test_insert_past_last_line_appends() {
        let mut doc = Document::new(uri(), "x");
        doc.apply_changes(&[edit((2, 0), (2, 0), "y")], 1).unwrap();
        assert_eq!(doc.lines(), &["x", "", "y"]);
    }

    #[test]
    fn test_utf16_columns() {
        let mut doc = Document::new(uri(), "s = \"😀é\" x");
        assert_eq!(doc.to_char_position(Position::new(0, 8)), (0, 7));
        assert_eq!(doc.to_lsp_position(0, 7), Position::new(0, 8));
        doc.apply_changes(&[edit((0, 9), (0, 10), "y")], 1).unwrap();
        assert_eq!(doc.line(0), Some("s = \"😀é\"yx"));
    }

    #[test]
    fn test_desynchronized_version_is_rejected() {
        let mut doc = Document::new(uri(), "a").with_version(4);
        let err = doc.apply_changes(&[full("b")], 6).unwrap_err();
        assert_eq!(err, DocumentError::Desynchronized { current: 4, received: 6 });
        assert_eq!(doc.text(), "a\n");
        assert_eq!(doc.version(), 4);

        assert!(doc.apply_changes(&[full("b")], 4).is_err());
        assert!(doc.apply_changes(&[full("b")], 5).is_ok());
    }

    #[test]
    fn test_failed_batch_leaves_document_untouched() {
        let mut doc = Document::new(uri(), "a\nb");
        let err = doc
            .apply_changes(&[full("x"), edit((7, 0), (7, 1), "z")], 1)
            .unwrap_err();
        assert_eq!(err, DocumentError::RangeOutOfBounds { line: 7, character: 0 });
        assert_eq!(doc.lines(), &["a", "b", ""]);
        assert_eq!(doc.version(), 0);
    }
}
