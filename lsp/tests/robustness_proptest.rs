use lunar_lsp::{LspClient, LunarAnalyzer, LunarLanguageServer, ServerConfig};
use proptest::prelude::*;
use tower_lsp::LanguageServer;
use tower_lsp::async_trait;
use tower_lsp::lsp_types::{
    ConfigurationItem, Diagnostic, DidChangeTextDocumentParams, DidOpenTextDocumentParams, MessageType, Position,
    Range, TextDocumentContentChangeEvent, TextDocumentItem, Url, VersionedTextDocumentIdentifier,
};

#[derive(Clone)]
struct MockClient;

#[async_trait]
impl LspClient for MockClient {
    async fn publish_diagnostics(&self, _: Url, _: Vec<Diagnostic>, _: Option<i32>) {}
    async fn show_message(&self, _: MessageType, _: String) {}
    async fn log_message(&self, _: MessageType, _: String) {}
    async fn configuration(&self, _: Vec<ConfigurationItem>) -> Option<Vec<serde_json::Value>> {
        None
    }
}

const PIECES: &[&str] = &[
    "local", "function", "end", "if", "then", "else", "do", "for", "in", "while", "return", "require", "a", "b.c",
    "t:m", "self", "_G", "=", "==", ",", ".", ":", "(", ")", "{", "}", "[", "]", "1", "\"s\"", "'", "\"", "--",
    "-- @param x number doc", "\n", " ", "é", "😀",
];

/// Token soup that reaches deep into the resolver, mixed with arbitrary text.
fn lua_like() -> impl Strategy<Value = String> {
    prop_oneof![
        proptest::collection::vec(proptest::sample::select(PIECES), 0..60).prop_map(|pieces| pieces.concat()),
        "\\PC*",
    ]
}

proptest! {
    #[test]
    fn test_queries_never_panic(text in lua_like(), line in 0u32..8, character in 0u32..40) {
        let mut analyzer = LunarAnalyzer::new();
        let uri = Url::parse("file:///fuzz.lua").unwrap();
        analyzer.open(uri.clone(), &text, 0);
        let position = Position::new(line, character);

        let _ = analyzer.completions(&uri, position);
        let _ = analyzer.hover(&uri, position);
        let _ = analyzer.definition(&uri, position);
        let _ = analyzer.type_definition(&uri, position);
        let _ = analyzer.signature_help(&uri, position);
        let _ = analyzer.diagnostics(&uri);
    }

    #[test]
    fn test_edits_never_panic(
        text in lua_like(),
        insert in lua_like(),
        start in (0u32..6, 0u32..30),
        end in (0u32..6, 0u32..30),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async {
            let server = LunarLanguageServer::with_client(MockClient, LunarAnalyzer::new(), ServerConfig::default());
            let uri = Url::parse("file:///fuzz.lua").unwrap();
            server
                .did_open(DidOpenTextDocumentParams {
                    text_document: TextDocumentItem::new(uri.clone(), "lua".to_string(), 1, text.clone()),
                })
                .await;
            server
                .did_change(DidChangeTextDocumentParams {
                    text_document: VersionedTextDocumentIdentifier::new(uri.clone(), 2),
                    content_changes: vec![TextDocumentContentChangeEvent {
                        range: Some(Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1))),
                        range_length: None,
                        text: insert.clone(),
                    }],
                })
                .await;
        });
    }
}
