use std::fmt;
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Url};
use tracing::debug;

use super::LunarAnalyzer;

const MODULE_PATTERN: &str = "?.lua";

/// The module search path: `;`-separated patterns such as `/project/?.lua`. Only patterns that
/// end in `?.lua` name a directory that can be listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LuaPath {
    patterns: Vec<String>,
}

impl LuaPath {
    pub fn parse(joined: &str) -> Self {
        Self {
            patterns: joined
                .split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// `{root}/?.lua`, the default for a workspace.
    pub fn for_workspace(root: &Path) -> Self {
        Self {
            patterns: vec![root.join(MODULE_PATTERN).to_string_lossy().into_owned()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn search_dirs(&self) -> Vec<PathBuf> {
        self.patterns
            .iter()
            .filter_map(|p| p.strip_suffix(MODULE_PATTERN))
            .map(|dir| if dir.is_empty() { PathBuf::from(".") } else { PathBuf::from(dir) })
            .collect()
    }

    /// Stems of the `.lua` files in the search directories whose name starts with `prefix`,
    /// sorted and without duplicates. `exclude` drops the file being edited.
    pub fn modules_matching(&self, prefix: &str, exclude: Option<&Path>) -> Vec<String> {
        let exclude = exclude.and_then(|p| std::fs::canonicalize(p).ok());
        let mut modules = Vec::new();
        for dir in self.search_dirs() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    debug!(dir = %dir.display(), error = %err, "skipping unreadable module directory");
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if !path.is_file() || path.extension().is_none_or(|ext| ext != "lua") {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if !name.starts_with(prefix) {
                    continue;
                }
                if exclude.is_some() && std::fs::canonicalize(&path).ok() == exclude {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    modules.push(stem.to_string());
                }
            }
        }
        modules.sort();
        modules.dedup();
        modules
    }
}

impl fmt::Display for LuaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.patterns.join(";"))
    }
}

impl LunarAnalyzer {
    pub(crate) fn module_completions(&self, uri: &Url, partial: &str) -> Vec<CompletionItem> {
        debug!(partial, "completing a required module");
        let current = uri.to_file_path().ok();
        self.lua_path
            .modules_matching(partial, current.as_deref())
            .into_iter()
            .map(|module| CompletionItem {
                label: module,
                kind: Some(CompletionItemKind::MODULE),
                ..Default::default()
            })
            .collect()
    }
}
