//! Memoization validated against an externally supplied version token.
//!
//! Entries never expire on their own. A lookup is a hit only when the caller's
//! token equals the token stored with the value; anything else is a miss that
//! calls for recomputation. The stale value is still handed back so callers
//! can decide for themselves whether it is of any use.

use std::collections::HashMap;
use std::hash::Hash;

/// Version token compared on lookup
pub type ValidityToken = u64;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    token: ValidityToken,
    value: V,
}

/// Outcome of a token-checked lookup
#[derive(Debug, PartialEq)]
pub enum Lookup<'a, V> {
    /// Stored token equals the expected one
    Hit(&'a V),
    /// Entry present but saved under a different token
    Stale(&'a V),
    /// Nothing stored for the key
    Missing,
}

impl<'a, V> Lookup<'a, V> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// The stored value, valid or not
    pub fn value(&self) -> Option<&'a V> {
        match *self {
            Lookup::Hit(value) | Lookup::Stale(value) => Some(value),
            Lookup::Missing => None,
        }
    }
}

/// Key → (token, value) store with no eviction
#[derive(Debug, Clone)]
pub struct ValidityCache<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
}

impl<K: Eq + Hash, V> ValidityCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Whether any entry exists for `key`, regardless of its token
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn lookup(&self, key: &K, expected: ValidityToken) -> Lookup<'_, V> {
        match self.entries.get(key) {
            Some(entry) if entry.token == expected => Lookup::Hit(&entry.value),
            Some(entry) => Lookup::Stale(&entry.value),
            None => Lookup::Missing,
        }
    }

    /// Insert or replace the entry for `key`, returning the stored value
    pub fn save(&mut self, key: K, value: V, token: ValidityToken) -> &V {
        use std::collections::hash_map::Entry;

        let entry = CacheEntry { token, value };
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(entry);
                &occupied.into_mut().value
            }
            Entry::Vacant(vacant) => &vacant.insert(entry).value,
        }
    }

    /// Token the entry for `key` was saved under
    pub fn token(&self, key: &K) -> Option<ValidityToken> {
        self.entries.get(key).map(|entry| entry.token)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V> Default for ValidityCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
