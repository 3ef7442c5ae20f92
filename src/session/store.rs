//! Scoped key/value storage backing the session codec.

use std::collections::HashMap;

/// A string key/value store scoped to one session (e.g. a cookie jar).
pub trait ScopedStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    inner: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

impl ScopedStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.inner.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.inner.remove(key);
    }
}
