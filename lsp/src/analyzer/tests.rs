use super::*;
use crate::document::DocumentError;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, DiagnosticSeverity, Documentation, HoverContents, NumberOrString,
    ParameterLabel, Range, TextDocumentContentChangeEvent,
};

const FIXTURE: &str = r#"my_table = { x = 1, xavier = "x", y = 2 }
my_value = 3
global_value = 4
function a_function(a, b) end
t1 = {
    t2 = {
       f = function(x, y) end
    }
}
"#;

fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///{name}")).unwrap()
}

fn create_analyzer() -> LunarAnalyzer {
    let mut analyzer = LunarAnalyzer::new();
    analyzer.preload_source(&uri("fixture.lua"), FIXTURE);
    analyzer
}

fn open(analyzer: &mut LunarAnalyzer, text: &str) -> Url {
    let doc = uri("test.lua");
    analyzer.open(doc.clone(), text, 0);
    doc
}

/// Completions with the cursor at the end of a one-line document.
fn complete(analyzer: &mut LunarAnalyzer, prefix: &str) -> Vec<CompletionItem> {
    let doc = open(analyzer, prefix);
    analyzer.completions(&doc, Position::new(0, prefix.encode_utf16().count() as u32))
}

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_str()).collect()
}

fn kind_of(items: &[CompletionItem], label: &str) -> Option<CompletionItemKind> {
    items.iter().find(|i| i.label == label).and_then(|i| i.kind)
}

fn hover_text(analyzer: &LunarAnalyzer, doc: &Url, position: Position) -> Option<(String, Option<Range>)> {
    analyzer.hover(doc, position).map(|hover| match hover.contents {
        HoverContents::Markup(markup) => (markup.value, hover.range),
        other => panic!("unexpected hover contents {other:?}"),
    })
}

fn full(text: &str) -> TextDocumentContentChangeEvent {
    TextDocumentContentChangeEvent {
        range: None,
        range_length: None,
        text: text.to_string(),
    }
}

#[test]
fn test_complete_locals_before_globals() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "local apple = 1\nlocal answer = 'x'\na");
    let items = analyzer.completions(&doc, Position::new(2, 1));

    assert_eq!(labels(&items), vec!["apple", "answer", "assert"]);
    assert_eq!(kind_of(&items, "apple"), Some(CompletionItemKind::VALUE));
    assert_eq!(kind_of(&items, "answer"), Some(CompletionItemKind::TEXT));
    assert_eq!(kind_of(&items, "assert"), Some(CompletionItemKind::FUNCTION));
}

#[test]
fn test_complete_closest_binding_wins() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "local x = 1\nfunction f()\n  local x = \"s\"\n  x");
    let items = analyzer.completions(&doc, Position::new(3, 3));
    assert_eq!(labels(&items), vec!["x"]);
    assert_eq!(kind_of(&items, "x"), Some(CompletionItemKind::TEXT));
}

#[test]
fn test_complete_all_names() {
    let mut analyzer = create_analyzer();
    let items = complete(&mut analyzer, "");
    assert_eq!(kind_of(&items, "my_table"), Some(CompletionItemKind::STRUCT));
    assert_eq!(kind_of(&items, "my_value"), Some(CompletionItemKind::VALUE));
    assert_eq!(kind_of(&items, "global_value"), Some(CompletionItemKind::VALUE));
    assert_eq!(kind_of(&items, "a_function"), Some(CompletionItemKind::FUNCTION));
    assert!(!labels(&items).contains(&"_G"));
}

#[test]
fn test_complete_global_prefix() {
    let mut analyzer = create_analyzer();
    let items = complete(&mut analyzer, "my");
    assert_eq!(labels(&items), vec!["my_table", "my_value"]);
}

#[test]
fn test_complete_table_fields() {
    let mut analyzer = create_analyzer();
    assert_eq!(labels(&complete(&mut analyzer, "my_table.")), vec!["x", "xavier", "y"]);

    let items = complete(&mut analyzer, "my_table.x");
    assert_eq!(labels(&items), vec!["x", "xavier"]);
    assert_eq!(kind_of(&items, "x"), Some(CompletionItemKind::VALUE));
    assert_eq!(kind_of(&items, "xavier"), Some(CompletionItemKind::TEXT));

    let items = complete(&mut analyzer, "local f = t1.t2.");
    assert_eq!(labels(&items), vec!["f"]);
    assert_eq!(kind_of(&items, "f"), Some(CompletionItemKind::FUNCTION));
    assert_eq!(items[0].detail.as_deref(), Some("f(x, y)"));
}

#[test]
fn test_complete_fields_added_through_an_alias() {
    let mut analyzer = create_analyzer();
    let doc = open(
        &mut analyzer,
        "local M = {}\nFoo = M\nfunction M.bar(a) end\nlocal alias = Foo\nalias.x = 1\nFoo.",
    );
    let items = analyzer.completions(&doc, Position::new(5, 4));
    assert_eq!(labels(&items), vec!["bar", "x"]);
    assert_eq!(items[0].detail.as_deref(), Some("bar(a)"));

    let hover = hover_text(&analyzer, &doc, Position::new(1, 1)).map(|(text, _)| text);
    assert_eq!(hover.as_deref(), Some("{\n bar=bar(a)\n x=1: number\n}"));
}

#[test]
fn test_complete_through_global_self_reference() {
    let mut analyzer = create_analyzer();
    assert_eq!(labels(&complete(&mut analyzer, "_G.my_v")), vec!["my_value"]);
}

#[test]
fn test_complete_unresolved_path_is_empty() {
    let mut analyzer = create_analyzer();
    assert!(complete(&mut analyzer, "a_function.something.").is_empty());
    assert!(complete(&mut analyzer, "nothing.here").is_empty());
}

#[test]
fn test_complete_methods_only_lists_functions() {
    let mut analyzer = LunarAnalyzer::new();
    let text = "local obj = { size = 1 }\nfunction obj:grow(n) end\nfunction obj:get() end\nobj:g";
    let doc = open(&mut analyzer, text);
    let items = analyzer.completions(&doc, Position::new(3, 5));
    assert_eq!(labels(&items), vec!["grow", "get"]);

    let items = analyzer.completions(&doc, Position::new(3, 4));
    assert_eq!(labels(&items), vec!["grow", "get"]);
    assert!(items.iter().all(|i| i.kind == Some(CompletionItemKind::FUNCTION)));
}

#[test]
fn test_complete_builtin_library() {
    let mut analyzer = LunarAnalyzer::new();
    let items = complete(&mut analyzer, "string.up");
    assert_eq!(labels(&items), vec!["upper"]);
}

#[test]
fn test_complete_required_modules() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["first_file.lua", "second_file.lua", "current.lua"] {
        std::fs::write(dir.path().join(name), "return {}\n").unwrap();
    }
    let mut analyzer = LunarAnalyzer::new().with_lua_path(LuaPath::for_workspace(dir.path()));
    let doc = Url::from_file_path(dir.path().join("current.lua")).unwrap();

    analyzer.open(doc.clone(), "local m = require(\"", 0);
    let items = analyzer.completions(&doc, Position::new(0, 19));
    assert_eq!(labels(&items), vec!["first_file", "second_file"]);
    assert!(items.iter().all(|i| i.kind == Some(CompletionItemKind::MODULE)));

    analyzer.open(doc.clone(), "require 'sec", 1);
    let items = analyzer.completions(&doc, Position::new(0, 12));
    assert_eq!(labels(&items), vec!["second_file"]);
}

#[test]
fn test_completions_on_unknown_document() {
    let analyzer = create_analyzer();
    assert!(analyzer.completions(&uri("missing.lua"), Position::new(0, 0)).is_empty());
}

#[test]
fn test_signature_help_counts_parameters() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "function f(x, y) end\nf(1, ");

    let help = analyzer.signature_help(&doc, Position::new(1, 5)).unwrap();
    assert_eq!(help.signatures.len(), 1);
    assert_eq!(help.signatures[0].label, "f(x, y)");
    assert_eq!(help.active_signature, Some(0));
    assert_eq!(help.active_parameter, Some(1));
    let params: Vec<ParameterLabel> = help.signatures[0].parameters.clone().unwrap().into_iter().map(|p| p.label).collect();
    assert_eq!(
        params,
        vec![ParameterLabel::Simple("x".to_string()), ParameterLabel::Simple("y".to_string())]
    );

    let help = analyzer.signature_help(&doc, Position::new(1, 2)).unwrap();
    assert_eq!(help.active_parameter, Some(0));
}

#[test]
fn test_signature_help_nested_table_function() {
    let mut analyzer = create_analyzer();
    let doc = open(&mut analyzer, "t1.t2.f(");
    let help = analyzer.signature_help(&doc, Position::new(0, 8)).unwrap();
    assert_eq!(help.signatures[0].label, "f(x, y)");
    assert_eq!(help.signatures[0].parameters.as_ref().map(Vec::len), Some(2));
}

#[test]
fn test_signature_help_method_with_docs() {
    let mut analyzer = LunarAnalyzer::new();
    let text = "local obj = {}\n-- Greets someone\n-- @param name string who to greet\nfunction obj:greet(name, punctuation) end\nobj:greet(\"hi\", ";
    let doc = open(&mut analyzer, text);

    let help = analyzer.signature_help(&doc, Position::new(4, 16)).unwrap();
    let signature = &help.signatures[0];
    assert_eq!(signature.label, "greet(name: string, punctuation)");
    assert_eq!(
        signature.documentation,
        Some(Documentation::String(
            "Greets someone\n\n**Parameter notes**:\n  name: who to greet".to_string()
        ))
    );
    let params = signature.parameters.clone().unwrap();
    assert_eq!(params[0].documentation, Some(Documentation::String("who to greet".to_string())));
    assert_eq!(params[1].documentation, None);
    assert_eq!(help.active_parameter, Some(1));
}

#[test]
fn test_signature_help_needs_a_function() {
    let mut analyzer = create_analyzer();
    let doc = open(&mut analyzer, "my_value(\nmy_table(1, \n(1, \nprint(1)");
    assert!(analyzer.signature_help(&doc, Position::new(0, 9)).is_none());
    assert!(analyzer.signature_help(&doc, Position::new(1, 12)).is_none());
    assert!(analyzer.signature_help(&doc, Position::new(2, 4)).is_none());
    assert!(analyzer.signature_help(&doc, Position::new(3, 8)).is_none());
}

#[test]
fn test_signature_help_rejects_chained_methods() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "a:b:c(");
    assert!(analyzer.signature_help(&doc, Position::new(0, 6)).is_none());
}

#[test]
fn test_hover_unresolved_expression_shows_text() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "x = a.b.c\n");
    let (text, range) = hover_text(&analyzer, &doc, Position::new(0, 8)).unwrap();
    assert_eq!(text, "a.b.c");
    assert_eq!(range, Some(Range::new(Position::new(0, 4), Position::new(0, 9))));
}

#[test]
fn test_hover_resolves_values() {
    let mut analyzer = create_analyzer();
    let doc = open(&mut analyzer, "local n = 5\nprint(n, my_table.xavier)\n");

    let (text, range) = hover_text(&analyzer, &doc, Position::new(1, 6)).unwrap();
    assert_eq!(text, "5: number");
    assert_eq!(range, Some(Range::new(Position::new(1, 6), Position::new(1, 7))));

    let (text, _) = hover_text(&analyzer, &doc, Position::new(1, 20)).unwrap();
    assert_eq!(text, "\"x\":string");

    let (text, range) = hover_text(&analyzer, &doc, Position::new(1, 17)).unwrap();
    assert_eq!(text, "{\n x=1: number\n xavier=\"x\":string\n y=2: number\n}");
    assert_eq!(range, Some(Range::new(Position::new(1, 9), Position::new(1, 17))));
}

#[test]
fn test_hover_method_and_global_table() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "local obj = {}\nfunction obj:size() end\nobj:size()\nprint(_G)\n");
    let (text, _) = hover_text(&analyzer, &doc, Position::new(2, 6)).unwrap();
    assert_eq!(text, "size()");

    let (text, _) = hover_text(&analyzer, &doc, Position::new(3, 7)).unwrap();
    assert!(text.starts_with("Global env {\n print="));
}

#[test]
fn test_hover_without_expression_is_empty() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "local n = 5\n\n");
    let (text, range) = hover_text(&analyzer, &doc, Position::new(1, 0)).unwrap();
    assert_eq!(text, "");
    assert_eq!(range, Some(Range::new(Position::new(1, 0), Position::new(1, 0))));
}

#[test]
fn test_definition_locations() {
    let mut analyzer = create_analyzer();
    let doc = open(&mut analyzer, "function greet(name) end\nlocal answer = 42\ngreet(answer, my_value)\n");

    let at = |line, character| Range::new(Position::new(line, character), Position::new(line, character));

    let location = analyzer.definition(&doc, Position::new(2, 1)).unwrap();
    assert_eq!(location.uri, doc);
    assert_eq!(location.range, at(0, 9));

    let location = analyzer.definition(&doc, Position::new(2, 8)).unwrap();
    assert_eq!(location.range, at(1, 15));

    let location = analyzer.type_definition(&doc, Position::new(2, 16)).unwrap();
    assert_eq!(location.uri, uri("fixture.lua"));
    assert_eq!(location.range, at(1, 11));

    assert!(analyzer.definition(&doc, Position::new(2, 5)).is_none());
}

#[test]
fn test_definition_of_builtins_and_unknown_names() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "print(nothing)\n");
    assert!(analyzer.definition(&doc, Position::new(0, 2)).is_none());
    assert!(analyzer.definition(&doc, Position::new(0, 9)).is_none());
}

#[test]
fn test_definition_columns_are_utf16() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "local s = \"é😀\" local t = 1\nprint(t)\n");
    let location = analyzer.definition(&doc, Position::new(1, 6)).unwrap();
    assert_eq!(location.range.start, Position::new(0, 26));
}

#[test]
fn test_diagnostics() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "local a = 1\n");
    assert!(analyzer.diagnostics(&doc).is_empty());

    analyzer.open(doc.clone(), "local a = 1\ngoto done\n", 1);
    let diagnostics = analyzer.diagnostics(&doc);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::WARNING));
    assert_eq!(diagnostics[0].code, Some(NumberOrString::String("lunar-unhandled".to_string())));
    assert_eq!(diagnostics[0].source.as_deref(), Some("lunar"));
    assert_eq!(diagnostics[0].range, Range::new(Position::new(1, 0), Position::new(1, 0)));

    analyzer.open(doc.clone(), "local s = \"😀\" end\n", 2);
    let diagnostics = analyzer.diagnostics(&doc);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(diagnostics[0].code, Some(NumberOrString::String("lunar-syntax".to_string())));
    assert_eq!(diagnostics[0].range.start, Position::new(0, 15));
}

#[test]
fn test_change_reanalyzes_document() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "local a = 1\n");
    analyzer.change(&doc, 1, &[full("local b = 2\nb")]).unwrap();
    assert_eq!(analyzer.document(&doc).map(Document::version), Some(1));
    assert_eq!(labels(&analyzer.completions(&doc, Position::new(1, 1))), vec!["b"]);

    let edit = TextDocumentContentChangeEvent {
        range: Some(Range::new(Position::new(0, 6), Position::new(0, 7))),
        range_length: None,
        text: "bravo".to_string(),
    };
    analyzer.change(&doc, 2, &[edit]).unwrap();
    assert_eq!(analyzer.document(&doc).and_then(|d| d.line(0)), Some("local bravo = 2"));
    assert_eq!(labels(&analyzer.completions(&doc, Position::new(1, 1))), vec!["bravo"]);
}

#[test]
fn test_desynchronized_change_keeps_previous_analysis() {
    let mut analyzer = LunarAnalyzer::new();
    let doc = open(&mut analyzer, "local a = 1\na");
    let err = analyzer.change(&doc, 3, &[full("local z = 1\nz")]).unwrap_err();
    assert_eq!(err, DocumentError::Desynchronized { current: 0, received: 3 });
    assert_eq!(labels(&analyzer.completions(&doc, Position::new(1, 1))), vec!["a", "assert"]);

    let missing = uri("missing.lua");
    assert_eq!(
        analyzer.change(&missing, 1, &[full("")]).unwrap_err(),
        DocumentError::NotOpen(missing)
    );
}

#[test]
fn test_close_keeps_globals() {
    let mut analyzer = LunarAnalyzer::new();
    let first = uri("first.lua");
    analyzer.open(first.clone(), "shared_counter = 1\n", 0);
    assert!(analyzer.close(&first));
    assert!(!analyzer.close(&first));
    assert!(analyzer.analysis(&first).is_none());

    let items = complete(&mut analyzer, "shared");
    assert_eq!(labels(&items), vec!["shared_counter"]);
}

#[test]
fn test_preload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("some_globals.lua");
    std::fs::write(&path, "-- Says hi\nfunction hello(who) end\n").unwrap();

    let mut analyzer = LunarAnalyzer::new();
    let analysis = analyzer.preload(&path).unwrap();
    assert!(analysis.errors().is_empty());
    let hello = analyzer.global().get("hello").and_then(|v| v.as_function());
    assert_eq!(hello.map(|f| f.documentation()), Some("Says hi".to_string()));

    let err = analyzer.preload(&dir.path().join("missing.lua")).unwrap_err();
    assert!(err.to_string().contains("Failed to read preload file"));
}
