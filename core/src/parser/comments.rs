use crate::annotation::DocComment;
use crate::token::Token;
use crate::util::fast_map::{FastHashMap, fast_hash_map_new};

/// Maps the index of a code token to the comment block directly above it.
///
/// A block is a run of comments on consecutive lines. Comments that trail code on the same
/// line never document anything, and a blank line starts a new block.
pub(crate) fn attach_doc_comments(tokens: &[Token], comments: &[Token]) -> FastHashMap<usize, DocComment> {
    let mut docs = fast_hash_map_new();
    let mut block: Vec<&str> = Vec::new();
    let mut last_line: Option<u32> = None;

    let mut flush = |block: &mut Vec<&str>, last: &Token| {
        if block.is_empty() {
            return;
        }
        let next = tokens.partition_point(|t| t.position() < last.position());
        if next < tokens.len() {
            docs.insert(next, DocComment::parse(&block.join("\n")));
        }
        block.clear();
    };

    for (i, comment) in comments.iter().enumerate() {
        let before = tokens.partition_point(|t| t.position() < comment.position());
        let trailing = before
            .checked_sub(1)
            .and_then(|idx| tokens.get(idx))
            .is_some_and(|t| t.line == comment.line);
        let contiguous = last_line.is_some_and(|l| comment.line == l + 1);

        if !contiguous || trailing {
            if let Some(prev) = i.checked_sub(1).and_then(|p| comments.get(p)) {
                flush(&mut block, prev);
            }
        }
        if trailing {
            last_line = None;
            continue;
        }
        block.push(comment.text.as_str());
        last_line = Some(comment.line);
    }
    if let Some(last) = comments.last() {
        flush(&mut block, last);
    }
    docs
}
