use std::sync::Arc;

use crate::parser::{ParsedFile, ScopeParser, ScopeRange};
use crate::scope::{Env, GlobalScope, LocalScope, ScopeArena, ScopeId};
use crate::token::{ParseError, Tokenizer};
use crate::val::Value;

mod analysis_test;

/// Result of analysing one file: its closed scopes, the errors that stopped analysis and the
/// values returned at file level. Globals are written to the shared [`GlobalScope`] instead.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    arena: ScopeArena,
    scopes: Vec<ScopeRange>,
    errors: Vec<ParseError>,
    returns: Vec<Vec<Value>>,
}

/// Lexes and resolves `source`, assigning its globals into `global`. `file` becomes the origin
/// of every value defined in the source.
pub fn analyze(source: &str, global: &mut GlobalScope, file: Option<&str>) -> Analysis {
    let stream = Tokenizer::tokenize(source);
    let parsed = ScopeParser::new(
        &stream.tokens,
        &stream.comments,
        stream.line_count,
        global,
        file.map(Arc::from),
    )
    .parse();
    Analysis::from_parts(parsed, stream.errors)
}

impl Analysis {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lexical errors come before the resolver's error. A lexical error ends the token stream
    /// early, so a resolver error about running out of tokens is dropped in favour of it.
    pub fn from_parts(parsed: ParsedFile, lexical: Vec<ParseError>) -> Self {
        let truncated = !lexical.is_empty() && parsed.error_at_end;
        let mut errors = lexical;
        if truncated {
            tracing::debug!("dropping end-of-input error caused by a lexical error");
        } else {
            errors.extend(parsed.error);
        }
        Self {
            arena: parsed.arena,
            scopes: parsed.scopes,
            errors,
            returns: parsed.returns,
        }
    }

    /// Innermost scope covering `line`: the range of smallest span, the first one closed when
    /// several tie.
    pub fn scope_at(&self, line: u32) -> Option<ScopeId> {
        let mut best: Option<&ScopeRange> = None;
        for range in self.scopes.iter().filter(|r| r.contains(line)) {
            if best.is_none_or(|b| range.span() < b.span()) {
                best = Some(range);
            }
        }
        best.map(|r| r.scope)
    }

    /// Name resolution as seen from `line`: its innermost scope's chain, then the globals.
    pub fn env_at<'a>(&'a self, line: u32, global: &'a GlobalScope) -> Env<'a> {
        Env::new(&self.arena, self.scope_at(line), global)
    }

    pub fn scope(&self, id: ScopeId) -> Option<&LocalScope> {
        self.arena.get(id)
    }

    pub fn scopes(&self) -> &[ScopeRange] {
        &self.scopes
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn file_returns(&self) -> &[Vec<Value>] {
        &self.returns
    }

    /// Scopes by starting line with their bindings, for debugging output.
    pub fn pretty(&self) -> String {
        let mut ranges: Vec<&ScopeRange> = self.scopes.iter().collect();
        ranges.sort_by_key(|r| (r.start, std::cmp::Reverse(r.stop)));
        let mut out = String::new();
        for range in ranges {
            let Some(scope) = self.arena.get(range.scope) else {
                continue;
            };
            let ind = " ".repeat(scope.depth() as usize);
            out.push_str(&format!("{ind}{} [{}, {}) {{", scope.label(), range.start, range.stop));
            for (name, value) in scope.iter() {
                out.push_str(&format!("\n{ind} {name}={}", value.pretty_indented(scope.depth() as usize + 1)));
            }
            out.push_str(&format!("\n{ind}}}\n"));
        }
        out
    }
}
