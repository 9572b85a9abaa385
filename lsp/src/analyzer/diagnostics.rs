use lunar_core::token::{ErrorCategory, ParseError};
use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Range, Url};

use super::LunarAnalyzer;
use crate::document::Document;

pub(crate) const DIAGNOSTIC_SOURCE: &str = "lunar";

/// Zero-width diagnostic at the error position. Code the resolver does not model yet is a
/// warning, everything else an error.
pub fn to_diagnostic(err: &ParseError, document: &Document) -> Diagnostic {
    let position = err.position();
    let at = document.to_lsp_position(position.line as usize, position.column as usize);
    let severity = match err.category() {
        ErrorCategory::Unhandled => DiagnosticSeverity::WARNING,
        ErrorCategory::Lexical | ErrorCategory::Syntax => DiagnosticSeverity::ERROR,
    };
    Diagnostic {
        range: Range::new(at, at),
        severity: Some(severity),
        code: Some(NumberOrString::String(err.category().code().to_string())),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: err.to_string(),
        ..Default::default()
    }
}

impl LunarAnalyzer {
    pub fn diagnostics(&self, uri: &Url) -> Vec<Diagnostic> {
        let (Some(document), Some(analysis)) = (self.document(uri), self.analysis(uri)) else {
            return Vec::new();
        };
        analysis.errors().iter().map(|err| to_diagnostic(err, document)).collect()
    }
}
