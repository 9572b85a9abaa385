//! Line-level scanners for code that does not currently parse.
//!
//! All positions are `(line, column)` pairs with columns counted in chars. Lines are the
//! document's line list, so a scanner can walk backwards across line boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

const OPENERS: &str = "([{";
const CLOSERS: &str = ")]}";
const INDEXING_SYMBOLS: &str = ".:";
const WHITESPACE: &str = " \t\n";
const STRING_DELIMITERS: &str = "\"'";

static REQUIRE_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#"require\s*\(?\s*["']([^"']*)$"#).ok());

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_indexing_char(ch: char) -> bool {
    is_name_char(ch) || INDEXING_SYMBOLS.contains(ch)
}

fn closer_for(opener: char) -> Option<char> {
    match opener {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        _ => None,
    }
}

fn chars_of<S: AsRef<str>>(lines: &[S], line: usize) -> Option<Vec<char>> {
    lines.get(line).map(|l| l.as_ref().chars().collect())
}

/// Half-open char intervals `[open, close)` of the string literals on `line`. The opening
/// quote is inside its interval, the closing one is not. An unterminated literal runs to the
/// last char. Backslashes escape the next char anywhere on the line.
pub fn find_string_intervals(line: &str) -> Vec<(usize, usize)> {
    let chars: Vec<char> = line.chars().collect();
    let mut intervals = Vec::new();
    let mut open: Option<(char, usize)> = None;
    let mut escaped = false;

    for (idx, &ch) in chars.iter().enumerate() {
        if ch == '\\' {
            escaped = !escaped;
            continue;
        }
        if escaped {
            escaped = false;
            continue;
        }
        match open {
            None if STRING_DELIMITERS.contains(ch) => open = Some((ch, idx)),
            Some((delim, start)) if ch == delim => {
                intervals.push((start, idx));
                open = None;
            }
            _ => {}
        }
    }
    if let Some((_, start)) = open {
        intervals.push((start, chars.len().saturating_sub(1)));
    }
    intervals
}

fn within(idx: usize, intervals: &[(usize, usize)]) -> bool {
    intervals.iter().any(|&(start, stop)| start <= idx && idx < stop)
}

/// Start of the innermost argument list open at `(line, column)`, just past its `(`.
///
/// Walks backwards keeping a bracket stack, ignoring string contents. An unmatched `(`
/// becomes a candidate; a name char before it confirms the candidate, a comma discards it
/// and a `)` before it means a call on a call result, which also confirms it.
pub fn find_arglist_start<S: AsRef<str>>(lines: &[S], line: usize, column: usize) -> Option<(usize, usize)> {
    let mut stack: Vec<char> = Vec::new();
    let mut candidate: Option<(usize, usize)> = None;

    for ln in (0..=line).rev() {
        let chars = chars_of(lines, ln)?;
        let intervals = find_string_intervals(lines[ln].as_ref());
        let upto = if ln == line {
            if column > chars.len() {
                return None;
            }
            column
        } else {
            chars.len()
        };

        for idx in (0..upto).rev() {
            let ch = chars[idx];
            if within(idx, &intervals) {
                continue;
            }
            if CLOSERS.contains(ch) {
                if ch == ')' && candidate.is_some() {
                    return candidate;
                }
                stack.push(ch);
            } else if OPENERS.contains(ch) {
                match stack.last() {
                    None if ch == '(' => candidate = Some((ln, idx + 1)),
                    None => return None,
                    Some(&top) => {
                        if closer_for(ch) == Some(top) {
                            stack.pop();
                        }
                    }
                }
            } else if candidate.is_some() && !WHITESPACE.contains(ch) {
                if is_name_char(ch) {
                    return candidate;
                }
                if ch == ',' {
                    candidate = None;
                }
            }
        }
    }
    candidate
}

/// The indexing expression ending at or before `(line, column)`, skipping whitespace and line
/// breaks in front of it. Returns the line and the char range of the expression.
pub fn find_indexing_before<S: AsRef<str>>(
    lines: &[S],
    line: usize,
    column: usize,
) -> Option<(usize, (usize, usize))> {
    let mut word_end: Option<usize> = None;

    for ln in (0..=line).rev() {
        let chars = chars_of(lines, ln)?;
        let from = if ln == line { column } else { chars.len() };

        for idx in (0..=from).rev() {
            let Some(&ch) = chars.get(idx) else {
                continue;
            };
            if WHITESPACE.contains(ch) {
                if let Some(end) = word_end {
                    return Some((ln, (idx + 1, end)));
                }
            } else if is_indexing_char(ch) {
                if word_end.is_none() {
                    word_end = Some(idx + 1);
                }
            } else {
                return word_end.map(|end| (ln, (idx + 1, end)));
            }
        }
        if let Some(end) = word_end {
            return Some((ln, (0, end)));
        }
    }
    None
}

/// An indexing expression found around a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indexing {
    pub text: String,
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

/// The indexing expression around `(line, column)`: every segment up to the one the position
/// is in, so `abc.d|ef.ghi` yields `abc.def`. When the position is on a `.` or `:` the
/// expression ends there. A position past the end of the line looks at the last char.
pub fn find_indexing_at<S: AsRef<str>>(lines: &[S], line: usize, column: usize) -> Option<Indexing> {
    let chars = chars_of(lines, line)?;
    let last = chars.len().checked_sub(1)?;
    let column = column.min(last);

    let mut start = None;
    for idx in (0..=column).rev() {
        if !is_indexing_char(chars[idx]) {
            break;
        }
        start = Some(idx);
    }
    let start = start?;

    let end = if INDEXING_SYMBOLS.contains(chars[column]) {
        column
    } else {
        chars[column..]
            .iter()
            .position(|&c| !is_name_char(c))
            .map_or(chars.len(), |offset| column + offset)
    };

    let first = *chars.get(start)?;
    if end <= start || !is_name_start(first) {
        return None;
    }
    Some(Indexing {
        text: chars[start..end].iter().collect(),
        line,
        start,
        end,
    })
}

/// Commas between the innermost unmatched `(` and `(line, column)`, not counting commas
/// nested in brackets or inside strings.
pub fn count_commas_before<S: AsRef<str>>(lines: &[S], line: usize, column: usize) -> usize {
    let mut depth = 0usize;
    let mut commas = 0usize;

    for ln in (0..=line).rev() {
        let Some(chars) = chars_of(lines, ln) else {
            return commas;
        };
        let intervals = find_string_intervals(lines[ln].as_ref());
        let upto = if ln == line { column.min(chars.len()) } else { chars.len() };

        for idx in (0..upto).rev() {
            if within(idx, &intervals) {
                continue;
            }
            match chars[idx] {
                ')' | ']' | '}' => depth += 1,
                '(' | '[' | '{' if depth > 0 => depth -= 1,
                '(' => return commas,
                ',' if depth == 0 => commas += 1,
                _ => {}
            }
        }
    }
    commas
}

/// Word chars around `column`: ASCII letters, digits and `_`. Empty when the position is not
/// on a word.
pub fn word_at(line: &str, column: usize) -> String {
    let chars: Vec<char> = line.chars().collect();
    let Some(last) = chars.len().checked_sub(1) else {
        return String::new();
    };
    let column = column.min(last);
    if !is_name_char(chars[column]) {
        return String::new();
    }
    let start = chars[..column]
        .iter()
        .rposition(|&c| !is_name_char(c))
        .map_or(0, |idx| idx + 1);
    let end = chars[column..]
        .iter()
        .position(|&c| !is_name_char(c))
        .map_or(chars.len(), |offset| column + offset);
    chars[start..end].iter().collect()
}

/// The partially typed module name when `prefix` ends inside the string of a `require` call.
pub fn require_prefix(prefix: &str) -> Option<&str> {
    let re = REQUIRE_PREFIX.as_ref()?;
    re.captures(prefix).and_then(|caps| caps.get(1)).map(|m| m.as_str())
}

/// The indexing expression being typed at the end of `prefix`, e.g. `t.a:` for `x = t.a:`.
pub fn trailing_indexing(prefix: &str) -> &str {
    let start = prefix
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_indexing_char(c))
        .last()
        .map_or(prefix.len(), |(idx, _)| idx);
    &prefix[start..]
}
