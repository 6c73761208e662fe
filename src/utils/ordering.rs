// deterministic ordering of mappings

use indexmap::IndexMap;
use std::hash::Hash;

/// produce a copy of `map` with the keys in `keys` order
///
/// keys in `map` that don't appear in `keys` come afterwards, in the
/// iteration order of `map`. keys in `keys` that aren't in `map` are
/// ignored, and a key listed twice is placed at its first occurrence.
pub fn order_map<K, V>(map: &IndexMap<K, V>, keys: &[K]) -> IndexMap<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    let mut with_order = IndexMap::with_capacity(map.len());

    for key in keys {
        if with_order.contains_key(key) {
            continue;
        }
        if let Some(value) = map.get(key) {
            with_order.insert(key.clone(), value.clone());
        }
    }

    for (key, value) in map {
        if !with_order.contains_key(key) {
            with_order.insert(key.clone(), value.clone());
        }
    }

    with_order
}
