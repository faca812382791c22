//! Cache invalidation signals and the cached view reads they act on
//!
//! Actions only ever talk to the [`Revalidator`] seam. [`PageCache`] is the
//! in-process implementation: a bounded read-through store keyed by session
//! scope and route path, where each entry is registered under logical tags.

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::backend::ApiError;

/// Logical groups of cached reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheTag {
    Authors,
    Books,
    Categories,
    Users,
    Employees,
    Borrowing,
    Fines,
    Warehouse,
    Notifications,
}

impl CacheTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheTag::Authors => "authors",
            CacheTag::Books => "books",
            CacheTag::Categories => "categories",
            CacheTag::Users => "users",
            CacheTag::Employees => "employees",
            CacheTag::Borrowing => "borrowing",
            CacheTag::Fines => "fines",
            CacheTag::Warehouse => "warehouse",
            CacheTag::Notifications => "notifications",
        }
    }
}

impl std::fmt::Display for CacheTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Receiver of fire-and-forget staleness signals
#[cfg_attr(test, mockall::automock)]
pub trait Revalidator: Send + Sync {
    /// Mark one rendered route as stale
    fn revalidate_path(&self, path: &str);

    /// Mark every read registered under `tag` as stale
    fn revalidate_tag(&self, tag: CacheTag);
}

/// Per-session partition of the cache, so one operator never reads another's views
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheScope(String);

impl CacheScope {
    pub fn anonymous() -> Self {
        Self("anonymous".to_string())
    }

    /// Derive a scope from the bearer token without keeping the token itself
    pub fn for_token(token: &str) -> Self {
        if token.is_empty() {
            return Self::anonymous();
        }
        let digest = Sha256::digest(token.as_bytes());
        Self(hex::encode(&digest[..16]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    scope: CacheScope,
    path: String,
    variant: String,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    path: String,
    tags: Vec<CacheTag>,
    value: Value,
    stale: bool,
}

struct CacheState {
    entries: LruCache<CacheKey, CacheEntry>,
    /// Bumped on every invalidation; lets in-flight fetches detect they raced one
    generation: u64,
    path_generations: LruCache<String, u64>,
    tag_generations: HashMap<CacheTag, u64>,
    /// Newest generation dropped from `path_generations`
    forgotten: u64,
}

impl CacheState {
    fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            generation: 0,
            path_generations: LruCache::new(capacity),
            tag_generations: HashMap::new(),
            forgotten: 0,
        }
    }

    /// A forgotten path generation newer than `start` counts as a hit
    fn invalidated_since(&self, start: u64, path: &str, tags: &[CacheTag]) -> bool {
        self.forgotten > start
            || self.path_generations.peek(path).is_some_and(|g| *g > start)
            || tags
                .iter()
                .any(|tag| self.tag_generations.get(tag).is_some_and(|g| *g > start))
    }

    fn record_path_generation(&mut self, path: &str, generation: u64) {
        if let Some((dropped, older)) = self.path_generations.push(path.to_string(), generation) {
            if dropped != path {
                self.forgotten = self.forgotten.max(older);
            }
        }
    }
}

/// Cached view reads kept when no capacity is configured
pub const DEFAULT_CAPACITY: usize = 2048;

/// In-memory read-through cache for view data
pub struct PageCache {
    state: Mutex<CacheState>,
}

impl Default for PageCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl PageCache {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self::with_capacity(capacity))
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState::with_capacity(capacity)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the cached value for `path` + `variant` (usually the query
    /// string), or fetch, store and return it.
    ///
    /// Fetch errors are passed through and never stored. Once full, the
    /// least recently read entry makes room.
    pub async fn read<T, F, Fut>(
        &self,
        scope: &CacheScope,
        path: &str,
        variant: &str,
        tags: &[CacheTag],
        fetch: F,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let key = CacheKey {
            scope: scope.clone(),
            path: path.to_string(),
            variant: variant.to_string(),
        };

        let start = {
            let mut state = self.lock();
            if let Some(entry) = state.entries.get(&key).filter(|entry| !entry.stale) {
                if let Ok(value) = serde_json::from_value(entry.value.clone()) {
                    tracing::trace!(path, "Cache hit");
                    return Ok(value);
                }
            }
            state.generation
        };

        tracing::debug!(path, "Cache miss, fetching from backend");
        let fresh = fetch().await?;
        let value = serde_json::to_value(&fresh).map_err(|e| ApiError::Decode(e.to_string()))?;

        let mut state = self.lock();
        let stale = state.invalidated_since(start, path, tags);
        let entry = CacheEntry {
            path: path.to_string(),
            tags: tags.to_vec(),
            value,
            stale,
        };
        if let Some((dropped, _)) = state.entries.push(key.clone(), entry) {
            if dropped != key {
                tracing::trace!(path = dropped.path.as_str(), "Cache full, dropped least recent read");
            }
        }

        Ok(fresh)
    }

    /// Whether any variant of `path` is cached and not stale
    pub fn is_fresh(&self, scope: &CacheScope, path: &str) -> bool {
        self.lock()
            .entries
            .iter()
            .any(|(key, entry)| key.scope == *scope && key.path == path && !entry.stale)
    }

    /// Forget everything cached for one session (logout, token rotation)
    pub fn evict_scope(&self, scope: &CacheScope) {
        let mut state = self.lock();
        let keys: Vec<CacheKey> = state
            .entries
            .iter()
            .filter(|(key, _)| key.scope == *scope)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            state.entries.pop(key);
        }
        tracing::debug!(evicted = keys.len(), "Session cache evicted");
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Revalidator for PageCache {
    fn revalidate_path(&self, path: &str) {
        let mut state = self.lock();
        state.generation += 1;
        let generation = state.generation;
        state.record_path_generation(path, generation);

        let mut marked = 0;
        for (_, entry) in state.entries.iter_mut().filter(|(_, entry)| entry.path == path) {
            entry.stale = true;
            marked += 1;
        }
        tracing::debug!(path, marked, "Path revalidated");
    }

    fn revalidate_tag(&self, tag: CacheTag) {
        let mut state = self.lock();
        state.generation += 1;
        let generation = state.generation;
        state.tag_generations.insert(tag, generation);

        let mut marked = 0;
        for (_, entry) in state.entries.iter_mut().filter(|(_, entry)| entry.tags.contains(&tag)) {
            entry.stale = true;
            marked += 1;
        }
        tracing::debug!(%tag, marked, "Tag revalidated");
    }
}
