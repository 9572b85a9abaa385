use std::sync::{Mutex, MutexGuard};

use tower_lsp::Client;
use tower_lsp::lsp_types::{Diagnostic, MessageType, Url};
use tracing::{error, warn};

use super::client::LspClient;
use super::config::ServerConfig;
use crate::analyzer::LunarAnalyzer;
use crate::document::DocumentError;

/// Server state shared across handlers. Every handler takes the analyzer lock for the whole
/// query and releases it before awaiting the client.
pub struct LunarLanguageServer<C: LspClient = Client> {
    pub(crate) client: C,
    pub(crate) analyzer: Mutex<LunarAnalyzer>,
    pub(crate) config: Mutex<ServerConfig>,
}

impl LunarLanguageServer<Client> {
    pub fn new(client: Client) -> Self {
        Self::with_client(client, LunarAnalyzer::new(), ServerConfig::default())
    }
}

impl<C: LspClient> LunarLanguageServer<C> {
    pub fn with_client(client: C, analyzer: LunarAnalyzer, config: ServerConfig) -> Self {
        Self {
            client,
            analyzer: Mutex::new(analyzer),
            config: Mutex::new(config),
        }
    }

    pub(crate) fn analyzer(&self) -> Option<MutexGuard<'_, LunarAnalyzer>> {
        match self.analyzer.lock() {
            Ok(guard) => Some(guard),
            Err(err) => {
                error!(error = %err, "analyzer lock poisoned");
                None
            }
        }
    }

    pub(crate) fn config(&self) -> ServerConfig {
        self.config.lock().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Runs `f` with the analyzer locked, `None` when the lock is poisoned.
    pub(crate) fn with_analyzer<R>(&self, f: impl FnOnce(&mut LunarAnalyzer) -> R) -> Option<R> {
        self.analyzer().map(|mut guard| f(&mut guard))
    }

    pub(crate) async fn publish(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>) {
        self.client.publish_diagnostics(uri, diagnostics, version).await;
    }

    pub(crate) async fn report_rejected_change(&self, uri: &Url, err: &DocumentError) {
        warn!(%uri, error = %err, "rejected document change");
        self.client
            .show_message(MessageType::WARNING, format!("{uri}: {err}"))
            .await;
    }
}
