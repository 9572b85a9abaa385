use tower_lsp::Client;
use tower_lsp::async_trait;
use tower_lsp::lsp_types::{ConfigurationItem, Diagnostic, MessageType, Url};

/// The requests and notifications the server sends to the editor. Implemented for
/// [`tower_lsp::Client`]; tests drive the server with a recording mock.
#[async_trait]
pub trait LspClient: Send + Sync + Clone + 'static {
    async fn publish_diagnostics(&self, uri: Url, diags: Vec<Diagnostic>, version: Option<i32>);
    async fn show_message(&self, typ: MessageType, message: String);
    async fn log_message(&self, typ: MessageType, message: String);
    /// `None` when the editor does not answer `workspace/configuration`.
    async fn configuration(&self, items: Vec<ConfigurationItem>) -> Option<Vec<serde_json::Value>>;
}

#[async_trait]
impl LspClient for Client {
    async fn publish_diagnostics(&self, uri: Url, diags: Vec<Diagnostic>, version: Option<i32>) {
        self.publish_diagnostics(uri, diags, version).await;
    }

    async fn show_message(&self, typ: MessageType, message: String) {
        self.show_message(typ, message).await;
    }

    async fn log_message(&self, typ: MessageType, message: String) {
        self.log_message(typ, message).await;
    }

    async fn configuration(&self, items: Vec<ConfigurationItem>) -> Option<Vec<serde_json::Value>> {
        self.configuration(items).await.ok()
    }
}
