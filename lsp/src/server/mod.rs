mod cli;
mod client;
mod config;
mod entry;
mod handlers;
mod state;

pub use cli::{Cli, analyze_file};
pub use client::LspClient;
pub use config::ServerConfig;
pub use entry::run;
pub use state::LunarLanguageServer;
