use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::request::{GotoTypeDefinitionParams, GotoTypeDefinitionResponse};
use tower_lsp::lsp_types::*;
use tracing::{debug, info};

use super::client::LspClient;
use super::state::LunarLanguageServer;
use crate::analyzer::LuaPath;
use crate::document::DocumentError;

fn capabilities(hover_enabled: bool) -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
        hover_provider: hover_enabled.then_some(HoverProviderCapability::Simple(true)),
        completion_provider: Some(CompletionOptions {
            resolve_provider: Some(false),
            trigger_characters: Some([".", ":", "\"", "'"].map(String::from).to_vec()),
            ..Default::default()
        }),
        signature_help_provider: Some(SignatureHelpOptions {
            trigger_characters: Some(vec!["(".to_string(), ",".to_string()]),
            retrigger_characters: None,
            work_done_progress_options: Default::default(),
        }),
        definition_provider: Some(OneOf::Left(true)),
        type_definition_provider: Some(TypeDefinitionProviderCapability::Simple(true)),
        ..Default::default()
    }
}

fn workspace_root(params: &InitializeParams) -> Option<std::path::PathBuf> {
    let from_folders = params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri);
    from_folders.or(params.root_uri.as_ref())?.to_file_path().ok()
}

#[tower_lsp::async_trait]
impl<C: LspClient> LanguageServer for LunarLanguageServer<C> {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("Lunar language server initializing with params: {:?}", params.root_uri);

        let config = self.config();
        if config.lua_path.is_none() {
            if let Some(root) = workspace_root(&params) {
                let lua_path = LuaPath::for_workspace(&root);
                info!(lua_path = %lua_path, "using workspace module search path");
                self.with_analyzer(|analyzer| analyzer.set_lua_path(lua_path));
            }
        }

        Ok(InitializeResult {
            capabilities: capabilities(config.hover_enabled),
            server_info: Some(ServerInfo {
                name: "lunar-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Lunar language server initialized".to_string())
            .await;
        self.load_config().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("shutting down");
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        info!(uri = %doc.uri, version = doc.version, "did_open");
        let diagnostics = self.with_analyzer(|analyzer| {
            analyzer.open(doc.uri.clone(), &doc.text, doc.version);
            analyzer.diagnostics(&doc.uri)
        });
        if let Some(diagnostics) = diagnostics {
            self.publish(doc.uri, diagnostics, Some(doc.version)).await;
        }
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        debug!(%uri, version, changes = params.content_changes.len(), "did_change");
        let outcome = self.with_analyzer(|analyzer| -> std::result::Result<Vec<Diagnostic>, DocumentError> {
            analyzer.change(&uri, version, &params.content_changes)?;
            Ok(analyzer.diagnostics(&uri))
        });
        match outcome {
            Some(Ok(diagnostics)) => self.publish(uri, diagnostics, Some(version)).await,
            Some(Err(err)) => self.report_rejected_change(&uri, &err).await,
            None => {}
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        info!(%uri, "did_close");
        self.with_analyzer(|analyzer| analyzer.close(&uri));
        self.publish(uri, Vec::new(), None).await;
    }

    async fn did_change_configuration(&self, _: DidChangeConfigurationParams) {
        self.load_config().await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let position = params.text_document_position;
        let items = self
            .with_analyzer(|analyzer| analyzer.completions(&position.text_document.uri, position.position))
            .unwrap_or_default();
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        if !self.config().hover_enabled {
            return Ok(None);
        }
        let position = params.text_document_position_params;
        Ok(self
            .with_analyzer(|analyzer| analyzer.hover(&position.text_document.uri, position.position))
            .flatten())
    }

    async fn goto_definition(&self, params: GotoDefinitionParams) -> Result<Option<GotoDefinitionResponse>> {
        let position = params.text_document_position_params;
        Ok(self
            .with_analyzer(|analyzer| analyzer.definition(&position.text_document.uri, position.position))
            .flatten()
            .map(GotoDefinitionResponse::Scalar))
    }

    async fn goto_type_definition(
        &self,
        params: GotoTypeDefinitionParams,
    ) -> Result<Option<GotoTypeDefinitionResponse>> {
        let position = params.text_document_position_params;
        Ok(self
            .with_analyzer(|analyzer| analyzer.type_definition(&position.text_document.uri, position.position))
            .flatten()
            .map(GotoTypeDefinitionResponse::Scalar))
    }

    async fn signature_help(&self, params: SignatureHelpParams) -> Result<Option<SignatureHelp>> {
        let position = params.text_document_position_params;
        Ok(self
            .with_analyzer(|analyzer| analyzer.signature_help(&position.text_document.uri, position.position))
            .flatten())
    }
}
