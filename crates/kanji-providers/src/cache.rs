//! LRU + TTL caching decorator for dictionary providers
//!
//! Wraps any [`DictionaryProvider`] so repeated lookups of the same character
//! skip the backend. Only successful hits are cached; "not found" and failures
//! always reach the inner provider again.

use async_trait::async_trait;
use kanji_core::models::DictionaryEntry;
use kanji_core::ProviderError;
use lru::LruCache;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::provider::DictionaryProvider;

struct CachedEntry {
    entry: DictionaryEntry,
    inserted_at: Instant,
}

/// Dictionary provider with a bounded, expiring cache in front of it
pub struct CachedDictionary {
    inner: Arc<dyn DictionaryProvider>,
    entries: Mutex<LruCache<String, CachedEntry>>,
    ttl: Duration,
}

impl fmt::Debug for CachedDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedDictionary")
            .field("inner", &self.inner)
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}

impl CachedDictionary {
    /// Wrap `inner`. Returns `inner` unchanged when `capacity` is 0.
    pub fn wrap(
        inner: Arc<dyn DictionaryProvider>,
        capacity: usize,
        ttl: Duration,
    ) -> Arc<dyn DictionaryProvider> {
        match NonZeroUsize::new(capacity) {
            Some(capacity) => Arc::new(Self::new(inner, capacity, ttl)),
            None => inner,
        }
    }

    pub fn new(inner: Arc<dyn DictionaryProvider>, capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            inner,
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, CachedEntry>> {
        // Poisoning is harmless here: worst case a stale entry survives.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn get_at(&self, character: &str, now: Instant) -> Option<DictionaryEntry> {
        let mut entries = self.lock();
        let expired = match entries.get(character) {
            Some(cached) if now.duration_since(cached.inserted_at) < self.ttl => {
                return Some(cached.entry.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(character);
        }
        None
    }

    fn put_at(&self, character: &str, entry: DictionaryEntry, now: Instant) {
        self.lock().put(
            character.to_string(),
            CachedEntry {
                entry,
                inserted_at: now,
            },
        );
    }
}

#[async_trait]
impl DictionaryProvider for CachedDictionary {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn lookup(&self, character: &str) -> Result<Option<DictionaryEntry>, ProviderError> {
        if let Some(entry) = self.get_at(character, Instant::now()) {
            tracing::debug!(character, "Dictionary cache hit");
            return Ok(Some(entry));
        }

        let found = self.inner.lookup(character).await?;
        if let Some(ref entry) = found {
            self.put_at(character, entry.clone(), Instant::now());
        }
        Ok(found)
    }
}
