pub type FastHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Insertion-ordered map. Scopes and tables enumerate their names in definition order.
pub type FastIndexMap<K, V> = indexmap::IndexMap<K, V, rustc_hash::FxBuildHasher>;

#[inline]
pub fn fast_hash_map_new<K, V>() -> FastHashMap<K, V> {
    rustc_hash::FxHashMap::default()
}

#[inline]
pub fn fast_index_map_new<K, V>() -> FastIndexMap<K, V> {
    indexmap::IndexMap::with_hasher(rustc_hash::FxBuildHasher)
}
