use lunar_core::scope::Resolved;
use tower_lsp::lsp_types::{
    Documentation, ParameterInformation, ParameterLabel, Position, SignatureHelp, SignatureInformation, Url,
};
use tracing::debug;

use super::LunarAnalyzer;
use crate::text;

impl LunarAnalyzer {
    /// Signature of the function whose argument list encloses the cursor.
    pub fn signature_help(&self, uri: &Url, position: Position) -> Option<SignatureHelp> {
        let ctx = self.context(uri, position)?;
        let lines = ctx.document.lines();

        let Some((arg_line, arg_column)) = text::find_arglist_start(lines, ctx.line, ctx.column) else {
            debug!("no enclosing argument list");
            return None;
        };
        if arg_column < 2 {
            debug!(arg_line, arg_column, "argument list has nothing callable before it");
            return None;
        }
        let (callee_line, (start, end)) = text::find_indexing_before(lines, arg_line, arg_column - 2)?;
        let callee: String = lines
            .get(callee_line)?
            .chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect();
        if callee.matches(':').count() > 1 {
            debug!(callee = %callee, "malformed method call");
            return None;
        }
        let path = callee.replace(':', ".");
        let segments: Vec<&str> = path.split('.').collect();
        let Some(function) = ctx
            .env
            .lookup_path(&segments)
            .and_then(Resolved::into_value)
            .and_then(|value| value.as_function().cloned())
        else {
            debug!(callee = %callee, "call target is not a function");
            return None;
        };

        let active = text::count_commas_before(lines, ctx.line, ctx.column).min(1) as u32;
        let parameters = function
            .args
            .iter()
            .map(|arg| ParameterInformation {
                label: ParameterLabel::Simple(arg.name.clone()),
                documentation: arg.doc.clone().map(Documentation::String),
            })
            .collect();
        let documentation = function.documentation();
        let signature = SignatureInformation {
            label: function.signature(),
            documentation: (!documentation.is_empty()).then_some(Documentation::String(documentation)),
            parameters: Some(parameters),
            active_parameter: Some(active),
        };
        Some(SignatureHelp {
            signatures: vec![signature],
            active_signature: Some(0),
            active_parameter: Some(active),
        })
    }
}
