use std::fs::File;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use super::cli::{Cli, analyze_file};
use super::state::LunarLanguageServer;

/// Parses the command line, then either prints a one-shot analysis or serves LSP over
/// stdin/stdout until the client disconnects.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.analyze {
        println!("{}", analyze_file(&cli, path)?);
        return Ok(());
    }

    init_logging(&cli)?;

    let analyzer = cli.build_analyzer()?;
    let config = cli.server_config();
    tracing::info!(
        hover = config.hover_enabled,
        lua_path = %analyzer.lua_path(),
        globals = analyzer.global().len(),
        "starting lunar-lsp"
    );

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) =
        LspService::new(move |client| LunarLanguageServer::with_client(client, analyzer, config));
    Server::new(stdin, stdout, socket).serve(service).await;
    Ok(())
}

/// stdout carries the protocol, so logs go to stderr or to `--log-file`.
fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    if cli.disable_log {
        return Ok(());
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match &cli.log_file {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("Failed to create log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }
    Ok(())
}
