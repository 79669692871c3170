//! Keyed fetch cache: each resource is loaded at most once per
//! invalidation cycle and served from memory afterwards.

use std::collections::HashMap;

/// Memoize-until-invalidated store for fetched payloads.
///
/// An absent key ("never fetched") is distinct from a present key holding
/// an empty payload ("fetched empty"). A failed load stores nothing, so the
/// next `get_or_fetch` on that key retries. There is no partial or
/// stale-while-revalidate behavior; `invalidate` drops every entry.
#[derive(Debug, Default)]
pub struct FetchCache<T> {
    entries: HashMap<String, T>,
}

impl<T> FetchCache<T> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Return the cached payload for `key`, invoking `loader` only when the
    /// key is absent. The result is stored only on success; a loader error
    /// propagates and leaves the entry absent.
    pub fn get_or_fetch<E, F>(&mut self, key: &str, loader: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if !self.entries.contains_key(key) {
            let payload = loader()?;
            self.entries.insert(key.to_string(), payload);
        }
        // Inserted above when missing, so the lookup cannot fail.
        Ok(&self.entries[key])
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop all entries unconditionally.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }
}
