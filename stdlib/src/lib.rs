//! Built-in globals.
//!
//! The prelude is annotated Lua read by the same resolver as user code, so built-ins get
//! signatures and documentation from their doc comments. Built-ins carry no source file,
//! which keeps definition lookups on them empty.

use lunar_core::{GlobalScope, analyze};


const PRELUDE: &str = include_str!("prelude.lua");

/// Names the prelude defines, in definition order.
pub const BUILTIN_NAMES: [&str; 13] = [
    "print", "type", "tostring", "tonumber", "pairs", "ipairs", "require", "error", "assert", "select", "string",
    "table", "math",
];

/// Adds the built-in functions and library tables to `global`, replacing same-named entries.
pub fn register_builtins(global: &mut GlobalScope) {
    let analysis = analyze(PRELUDE, global, None);
    for err in analysis.errors() {
        tracing::error!(error = %err, position = %err.position(), "built-in prelude failed to resolve");
    }
}

/// A fresh global scope holding only the built-ins.
pub fn builtin_globals() -> GlobalScope {
    let mut global = GlobalScope::new();
    register_builtins(&mut global);
    global
}
