use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::util::fast_map::{FastIndexMap, fast_index_map_new};

use super::Value;

type Fields = FastIndexMap<String, Value>;

/// String-keyed fields in definition order. Re-assigning a key keeps its original slot.
///
/// A `Table` is a handle: clones share the same fields, so a write through one name is seen
/// through every other name bound to the table. Equality is identity.
#[derive(Clone)]
pub struct Table {
    fields: Arc<RwLock<Fields>>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new()
    }
}

impl Table {
    pub fn new() -> Self {
        Self {
            fields: Arc::new(RwLock::new(fast_index_map_new())),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Fields> {
        self.fields.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Fields> {
        self.fields.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets `key`. Every handle to this table sees the new value.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.write().insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of the fields in definition order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Whether both handles refer to the same table.
    pub fn same_as(&self, other: &Table) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }

    pub(super) fn id(&self) -> usize {
        Arc::as_ptr(&self.fields) as *const () as usize
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: a table may contain itself.
        f.debug_struct("Table")
            .field("id", &self.id())
            .field("keys", &self.keys())
            .finish()
    }
}
