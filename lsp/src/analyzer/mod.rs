//! Query engine: the shared global scope, the latest analysis of every open document and the
//! module search path.
//!
//! Every query works on the analysis stored for the document, so a document that stopped
//! parsing halfway still answers from the scopes resolved before the error.

use std::collections::hash_map::Entry;
use std::path::Path;

use anyhow::{Context, anyhow};
use lunar_core::util::fast_map::{FastHashMap, fast_hash_map_new};
use lunar_core::{Analysis, Env, GlobalScope, analyze};
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};
use tracing::{debug, trace, warn};

use crate::document::{Document, DocumentError};

mod completions;
mod definition;
mod diagnostics;
mod hover;
mod require;
mod signature;

#[cfg(test)]
mod tests;

pub use require::LuaPath;

/// An open document and the analysis of its current text.
#[derive(Debug)]
pub struct OpenDocument {
    pub document: Document,
    pub analysis: Analysis,
}

/// Where a query was made: the document, the char position and the names visible there.
pub(crate) struct QueryContext<'a> {
    pub(crate) document: &'a Document,
    pub(crate) env: Env<'a>,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

#[derive(Debug)]
pub struct LunarAnalyzer {
    global: GlobalScope,
    documents: FastHashMap<Url, OpenDocument>,
    lua_path: LuaPath,
}

impl Default for LunarAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LunarAnalyzer {
    /// An analyzer whose global scope starts with the built-ins.
    pub fn new() -> Self {
        Self::with_globals(lunar_stdlib::builtin_globals())
    }

    pub fn with_globals(global: GlobalScope) -> Self {
        Self {
            global,
            documents: fast_hash_map_new(),
            lua_path: LuaPath::default(),
        }
    }

    pub fn with_lua_path(mut self, lua_path: LuaPath) -> Self {
        self.lua_path = lua_path;
        self
    }

    pub fn set_lua_path(&mut self, lua_path: LuaPath) {
        debug!(lua_path = %lua_path, "module search path changed");
        self.lua_path = lua_path;
    }

    pub fn lua_path(&self) -> &LuaPath {
        &self.lua_path
    }

    pub fn global(&self) -> &GlobalScope {
        &self.global
    }

    pub fn document(&self, uri: &Url) -> Option<&Document> {
        self.documents.get(uri).map(|open| &open.document)
    }

    pub fn analysis(&self, uri: &Url) -> Option<&Analysis> {
        self.documents.get(uri).map(|open| &open.analysis)
    }

    /// Reads a Lua file into the global scope without opening it as a document.
    pub fn preload(&mut self, path: &Path) -> anyhow::Result<Analysis> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preload file: {}", path.display()))?;
        let absolute = std::fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve preload file: {}", path.display()))?;
        let uri = Url::from_file_path(&absolute)
            .map_err(|_| anyhow!("Preload path is not a valid file URI: {}", absolute.display()))?;
        Ok(self.preload_source(&uri, &source))
    }

    /// Resolves `source` as the file `uri` into the global scope.
    pub fn preload_source(&mut self, uri: &Url, source: &str) -> Analysis {
        let analysis = analyze(source, &mut self.global, Some(uri.as_str()));
        for err in analysis.errors() {
            warn!(%uri, position = %err.position(), error = %err, "preloaded module did not fully resolve");
        }
        debug!(%uri, globals = self.global.len(), "preloaded module");
        analysis
    }

    /// Opens (or reopens) a document and analyzes its text.
    pub fn open(&mut self, uri: Url, text: &str, version: i32) -> &Analysis {
        let document = Document::new(uri.clone(), text).with_version(version);
        let analysis = self.reanalyze(&document);
        let open = OpenDocument { document, analysis };
        let slot = match self.documents.entry(uri) {
            Entry::Occupied(mut entry) => {
                entry.insert(open);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(open),
        };
        &slot.analysis
    }

    /// Applies an edit batch and re-analyzes the whole document. A rejected batch keeps both
    /// the text and the previous analysis.
    pub fn change(
        &mut self,
        uri: &Url,
        version: i32,
        changes: &[TextDocumentContentChangeEvent],
    ) -> Result<&Analysis, DocumentError> {
        let open = self
            .documents
            .get_mut(uri)
            .ok_or_else(|| DocumentError::NotOpen(uri.clone()))?;
        open.document.apply_changes(changes, version)?;
        open.analysis = analyze(&open.document.text(), &mut self.global, Some(uri.as_str()));
        trace!(%uri, analysis = %open.analysis.pretty(), "document changed");
        Ok(&open.analysis)
    }

    /// Forgets a document. Globals it assigned stay in the global scope.
    pub fn close(&mut self, uri: &Url) -> bool {
        self.documents.remove(uri).is_some()
    }

    fn reanalyze(&mut self, document: &Document) -> Analysis {
        let uri = document.uri();
        let analysis = analyze(&document.text(), &mut self.global, Some(uri.as_str()));
        debug!(%uri, scopes = analysis.scopes().len(), errors = analysis.errors().len(), "analyzed document");
        trace!(%uri, analysis = %analysis.pretty(), "document opened");
        analysis
    }

    pub(crate) fn context(&self, uri: &Url, position: Position) -> Option<QueryContext<'_>> {
        let Some(open) = self.documents.get(uri) else {
            debug!(%uri, "query on a document that is not open");
            return None;
        };
        let (line, column) = open.document.to_char_position(position);
        let scope = open.analysis.scope_at(line as u32);
        debug!(
            line,
            column,
            scope = scope.and_then(|id| open.analysis.scope(id)).map(|s| s.label()),
            "resolved query scope"
        );
        Some(QueryContext {
            document: &open.document,
            env: open.analysis.env_at(line as u32, &self.global),
            line,
            column,
        })
    }
}
