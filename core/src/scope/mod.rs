//! Lexical scopes and the global environment.
//!
//! Local scopes live in a [`ScopeArena`] and point at their parent by id, so a scope can be
//! shared by the resolver (while it is open) and by the finished analysis (after it closed)
//! without reference cycles. The global scope is a separate, process-wide table that every file
//! writes into.

use crate::util::fast_map::{FastIndexMap, fast_index_map_new};
use crate::val::{Origin, Table, Value};


/// Name under which the global scope refers to itself.
pub const GLOBAL_SELF_NAME: &str = "_G";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct LocalScope {
    names: FastIndexMap<String, Value>,
    parent: Option<ScopeId>,
    depth: u32,
    label: String,
}

impl LocalScope {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names.get(name)
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScopeArena {
    scopes: Vec<LocalScope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_root(&mut self, label: impl Into<String>) -> ScopeId {
        self.scopes.push(LocalScope {
            names: fast_index_map_new(),
            parent: None,
            depth: 0,
            label: label.into(),
        });
        ScopeId(self.scopes.len() - 1)
    }

    /// Child of `parent`; without a label it inherits the parent's.
    pub fn push_child(&mut self, parent: ScopeId, label: Option<String>) -> ScopeId {
        let (depth, inherited) = match self.get(parent) {
            Some(p) => (p.depth + 1, p.label.clone()),
            None => (0, String::new()),
        };
        self.scopes.push(LocalScope {
            names: fast_index_map_new(),
            parent: Some(parent),
            depth,
            label: label.unwrap_or(inherited),
        });
        ScopeId(self.scopes.len() - 1)
    }

    pub fn get(&self, id: ScopeId) -> Option<&LocalScope> {
        self.scopes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Binds `name` in scope `id`, replacing an existing binding in that scope only.
    pub fn bind(&mut self, id: ScopeId, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.get_mut(id.0) {
            scope.names.insert(name.into(), value);
        }
    }

    /// Scopes from `id` outwards, innermost first.
    pub fn chain(&self, id: ScopeId) -> impl Iterator<Item = &LocalScope> {
        std::iter::successors(self.get(id), |scope| scope.parent.and_then(|p| self.get(p)))
    }

    /// Innermost scope on the chain from `id` that binds `name`.
    pub fn owner_of(&self, id: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let scope = self.get(cur)?;
            if scope.names.contains_key(name) {
                return Some(cur);
            }
            current = scope.parent;
        }
        None
    }

    pub fn lookup(&self, id: ScopeId, name: &str) -> Option<&Value> {
        self.chain(id).find_map(|scope| scope.get(name))
    }

    /// Every name visible from `id`, closest binding first, shadowed names omitted.
    pub fn visible(&self, id: ScopeId) -> Vec<(&str, &Value)> {
        let mut seen: FastIndexMap<&str, &Value> = fast_index_map_new();
        for scope in self.chain(id) {
            for (name, value) in scope.iter() {
                seen.entry(name).or_insert(value);
            }
        }
        seen.into_iter().collect()
    }
}

/// Names assigned without `local`, shared by every analysed file.
#[derive(Debug, Clone)]
pub struct GlobalScope {
    names: FastIndexMap<String, Value>,
}

impl Default for GlobalScope {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalScope {
    pub fn new() -> Self {
        Self {
            names: fast_index_map_new(),
        }
    }

    /// Sets a global. The self reference `_G` cannot be rebound.
    pub fn assign(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if name == GLOBAL_SELF_NAME {
            tracing::debug!("ignoring assignment to {}", GLOBAL_SELF_NAME);
            return;
        }
        self.names.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        name == GLOBAL_SELF_NAME || self.names.contains_key(name)
    }

    /// Number of names, the self reference included.
    pub fn len(&self) -> usize {
        self.names.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Globals in assignment order, without the self reference.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Snapshot of the globals as a new table.
    pub fn to_table(&self) -> Table {
        let table = Table::new();
        for (name, value) in self.iter() {
            table.insert(name, value.clone());
        }
        table
    }

    pub fn pretty(&self) -> String {
        self.pretty_indented(0)
    }

    pub fn pretty_indented(&self, indent: usize) -> String {
        let ind = " ".repeat(indent);
        let ind2 = " ".repeat(indent + 1);
        let mut out = format!("{ind}Global env {{");
        for (name, value) in self.iter() {
            out.push_str(&format!("\n{ind2}{name}={}", value.pretty_indented(indent + 1)));
        }
        out.push_str(&format!("\n{ind}}}"));
        out
    }
}

/// What a name or path resolved to. `_G` resolves to the global scope itself. Tables inside a
/// resolved value are handles, so writing through them updates the bound table.
#[derive(Debug, Clone)]
pub enum Resolved<'a> {
    Global(&'a GlobalScope),
    Value(Value),
}

impl<'a> Resolved<'a> {
    pub fn field(&self, key: &str) -> Option<Resolved<'a>> {
        match self {
            Resolved::Global(global) if key == GLOBAL_SELF_NAME => Some(Resolved::Global(*global)),
            Resolved::Global(global) => global.get(key).cloned().map(Resolved::Value),
            Resolved::Value(value) => value.field(key).map(Resolved::Value),
        }
    }

    /// Fields when the target is indexable.
    pub fn fields(&self) -> Option<Vec<(String, Value)>> {
        match self {
            Resolved::Global(global) => Some(global.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()),
            Resolved::Value(value) => value.as_table().map(Table::entries),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Resolved::Value(value) => Some(value),
            Resolved::Global(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolved::Value(value) => Some(value),
            Resolved::Global(_) => None,
        }
    }

    /// The resolved value; `_G` becomes a snapshot table of the globals.
    pub fn to_value(&self) -> Value {
        match self {
            Resolved::Value(value) => value.clone(),
            Resolved::Global(global) => Value::table(global.to_table(), Origin::none()),
        }
    }

    pub fn pretty(&self) -> String {
        match self {
            Resolved::Value(value) => value.pretty(),
            Resolved::Global(global) => global.pretty(),
        }
    }
}

/// Read-only view for resolving names at one point of a file: the local chain of a scope,
/// then the globals.
#[derive(Debug, Clone, Copy)]
pub struct Env<'a> {
    arena: &'a ScopeArena,
    scope: Option<ScopeId>,
    global: &'a GlobalScope,
}

impl<'a> Env<'a> {
    pub fn new(arena: &'a ScopeArena, scope: Option<ScopeId>, global: &'a GlobalScope) -> Self {
        Self { arena, scope, global }
    }

    pub fn global(&self) -> &'a GlobalScope {
        self.global
    }

    pub fn lookup_local(&self, name: &str) -> Option<&'a Value> {
        self.arena.lookup(self.scope?, name)
    }

    pub fn lookup(&self, name: &str) -> Option<Resolved<'a>> {
        if let Some(value) = self.lookup_local(name) {
            return Some(Resolved::Value(value.clone()));
        }
        if name == GLOBAL_SELF_NAME {
            return Some(Resolved::Global(self.global));
        }
        self.global.get(name).cloned().map(Resolved::Value)
    }

    /// Walks `path` through tables. `None` as soon as a segment is missing.
    pub fn lookup_path<S: AsRef<str>>(&self, path: &[S]) -> Option<Resolved<'a>> {
        let (head, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.lookup(head.as_ref())?, |cur, key| cur.field(key.as_ref()))
    }

    /// Like [`Env::lookup_path`] but yields an `Unknown` placeholder for a failed lookup.
    pub fn resolve_path<S: AsRef<str>>(&self, path: &[S], origin: Origin) -> Value {
        match self.lookup_path(path) {
            Some(resolved) => resolved.to_value(),
            None => {
                let name: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
                Value::unknown(name.join("."), origin)
            }
        }
    }

    /// Locals visible from this point, closest binding first.
    pub fn visible_locals(&self) -> Vec<(&'a str, &'a Value)> {
        match self.scope {
            Some(id) => self.arena.visible(id),
            None => Vec::new(),
        }
    }
}
