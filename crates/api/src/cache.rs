use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("{label} not found: {key}")]
    NotFound { label: &'static str, key: String },

    #[error("{label} {key} already exists")]
    Occupied { label: &'static str, key: String },

    #[error("An extraction for upload {0} is already running")]
    InFlight(String),
}

impl CacheError {
    pub fn kind(&self) -> &'static str {
        match self {
            CacheError::NotFound { .. } => "NotFoundError",
            CacheError::Occupied { .. } | CacheError::InFlight(_) => "Conflict",
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Keyed session store. A written key is never replaced; values are handed
/// out as shared, immutable `Arc`s so readers never see a partial write.
pub struct SessionStore<V> {
    label: &'static str,
    entries: Arc<DashMap<String, Arc<V>>>,
    max_entries: usize,
}

impl<V> Clone for SessionStore<V> {
    fn clone(&self) -> Self {
        Self {
            label: self.label,
            entries: Arc::clone(&self.entries),
            max_entries: self.max_entries,
        }
    }
}

impl<V> SessionStore<V> {
    pub fn new(label: &'static str, max_entries: usize) -> Self {
        Self {
            label,
            entries: Arc::new(DashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn put(&self, key: impl Into<String>, value: V) -> Result<Arc<V>> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(self.occupied(key));
        }
        if self.entries.len() >= self.max_entries {
            self.evict(&key);
        }

        let value = Arc::new(value);
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Err(self.occupied(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&value));
                Ok(value)
            }
        }
    }

    pub fn get(&self, key: &str) -> Result<Arc<V>> {
        self.entries
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| CacheError::NotFound {
                label: self.label,
                key: key.to_string(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Arc<V>> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn occupied(&self, key: String) -> CacheError {
        CacheError::Occupied {
            label: self.label,
            key,
        }
    }

    /// Simple eviction: drop a quarter of the entries when full, never the
    /// key about to be written.
    fn evict(&self, keep: &str) {
        let to_remove: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key() != keep)
            .take((self.max_entries / 4).max(1))
            .map(|entry| entry.key().clone())
            .collect();
        for key in &to_remove {
            self.entries.remove(key);
        }
        debug!(store = self.label, evicted = to_remove.len(), "Evicted sessions");
    }
}

/// Keys with an operation in progress.
#[derive(Clone, Default)]
pub struct InFlight {
    keys: Arc<DashSet<String>>,
}

impl InFlight {
    /// Claim `key` until the returned guard is dropped.
    pub fn claim(&self, key: &str) -> Result<ClaimGuard> {
        if !self.keys.insert(key.to_string()) {
            return Err(CacheError::InFlight(key.to_string()));
        }
        Ok(ClaimGuard {
            keys: Arc::clone(&self.keys),
            key: key.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

pub struct ClaimGuard {
    keys: Arc<DashSet<String>>,
    key: String,
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        self.keys.remove(&self.key);
    }
}
