use std::hash::Hash;

use fnv::FnvHashMap;

/// Small-key lookup table (species numbers, cached axis lengths).
#[derive(Debug, Clone)]
pub struct Map<K, V>(pub FnvHashMap<K, V>);

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self(FnvHashMap::default())
    }
}

impl<K: Eq + Hash, V> Map<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, k: K, data: V) -> Option<V> {
        self.0.insert(k, data)
    }

    pub fn get(&self, k: &K) -> Option<&V> {
        self.0.get(k)
    }

    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, k: K, f: F) -> &mut V {
        self.0.entry(k).or_insert_with(f)
    }

    pub fn contains_key(&self, k: &K) -> bool {
        self.0.contains_key(k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
