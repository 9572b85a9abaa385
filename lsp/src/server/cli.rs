use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::Parser;
use tower_lsp::lsp_types::{DiagnosticSeverity, Url};

use super::config::ServerConfig;
use crate::analyzer::{LuaPath, LunarAnalyzer};

#[derive(Debug, Parser)]
#[command(
    name = "lunar-lsp",
    author,
    version,
    about = "Language server for Lua",
    long_about = None
)]
pub struct Cli {
    /// Do not install a log subscriber
    #[arg(long)]
    pub disable_log: bool,

    /// Answer hover requests with nothing
    #[arg(long)]
    pub disable_hover: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Module search path, e.g. `/project/?.lua;/project/lib/?.lua`
    #[arg(long, value_name = "PATTERNS")]
    pub lua_path: Option<String>,

    /// Lua file whose globals are known before any document is opened
    #[arg(long = "preload", value_name = "FILE")]
    pub preload: Vec<PathBuf>,

    /// Analyze FILE, print the result and exit
    #[arg(long, value_name = "FILE")]
    pub analyze: Option<PathBuf>,

    /// With --analyze, print only the errors
    #[arg(long, requires = "analyze")]
    pub errors_only: bool,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            hover_enabled: !self.disable_hover,
            lua_path: self.lua_path.clone(),
        }
    }

    /// An analyzer with the built-ins, the `--preload` files and the `--lua-path`.
    pub fn build_analyzer(&self) -> anyhow::Result<LunarAnalyzer> {
        let mut analyzer = LunarAnalyzer::new();
        if let Some(path) = &self.lua_path {
            analyzer.set_lua_path(LuaPath::parse(path));
        }
        for file in &self.preload {
            analyzer.preload(file)?;
        }
        Ok(analyzer)
    }
}

/// The `--analyze` output: error lines with `errors_only`, otherwise diagnostics, scopes and
/// globals as pretty JSON.
pub fn analyze_file(cli: &Cli, path: &std::path::Path) -> anyhow::Result<String> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path.display()))?;
    let absolute = std::fs::canonicalize(path).with_context(|| format!("Failed to resolve '{}'", path.display()))?;
    let uri = Url::from_file_path(&absolute).map_err(|_| anyhow!("Not a file path: {}", absolute.display()))?;

    let mut analyzer = cli.build_analyzer()?;
    analyzer.open(uri.clone(), &content, 0);
    let diagnostics = analyzer.diagnostics(&uri);

    if cli.errors_only {
        let errors: Vec<String> = diagnostics
            .iter()
            .filter(|d| d.severity == Some(DiagnosticSeverity::ERROR))
            .map(|d| format!("Line {}:{}: {}", d.range.start.line + 1, d.range.start.character + 1, d.message))
            .collect();
        if errors.is_empty() {
            return Ok("No errors found".to_string());
        }
        return Ok(errors.join("\n"));
    }

    let globals: Vec<&str> = analyzer.global().iter().map(|(name, _)| name).collect();
    let output = serde_json::json!({
        "diagnostics": diagnostics,
        "scopes": analyzer.analysis(&uri).map(|a| a.pretty()).unwrap_or_default(),
        "globals": globals,
    });
    serde_json::to_string_pretty(&output).context("Failed to render analysis")
}
