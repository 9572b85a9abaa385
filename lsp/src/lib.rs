//! Lua language intelligence: document model, textual scanners, the query engine and the
//! tower-lsp server around them.

pub mod analyzer;
pub mod document;
pub mod server;
pub mod text;

pub use analyzer::{LuaPath, LunarAnalyzer};
pub use document::{Document, DocumentError};
pub use server::{LspClient, LunarLanguageServer, ServerConfig};
