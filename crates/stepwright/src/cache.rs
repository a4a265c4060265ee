//! In-process translation cache.
//!
//! Keyed by a SHA-256 fingerprint of the step text and the serialized
//! snapshot, so identical (step, screen state) pairs within one process reuse
//! the previous translation. The cache is an explicit value: create it at
//! startup, share it through an `Arc`, clear it on reset.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::action::Action;
use crate::result::TranslationError;
use crate::translator::StepTranslator;
use crate::tree::SemanticTree;

/// Fingerprint of a (step, snapshot) pair
#[must_use]
pub fn fingerprint(step: &str, snapshot: &SemanticTree) -> String {
    fingerprint_raw(step, &snapshot.to_json())
}

/// Fingerprint of a step and an already-serialized snapshot
#[must_use]
pub fn fingerprint_raw(step: &str, snapshot_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(step.as_bytes());
    hasher.update(b"\n");
    hasher.update(snapshot_json.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Live entries
    pub entries: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that missed
    pub misses: u64,
}

/// Concurrent map from fingerprint to the most recent translation
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: DashMap<String, Vec<Action>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TranslationCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a fingerprint, counting the hit or miss
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<Action>> {
        if let Some(entry) = self.entries.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(entry.value().clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Store the latest translation for a fingerprint
    pub fn insert(&self, key: String, actions: Vec<Action>) {
        self.entries.insert(key, actions);
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and reset counters; returns how many entries were removed
    pub fn clear(&self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        removed
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Wraps a translator with a [`TranslationCache`].
///
/// Only successful translations are stored. Two concurrent misses on the same
/// fingerprint both reach the inner translator; the later insert wins.
#[derive(Debug, Clone)]
pub struct CachedTranslator<T> {
    inner: T,
    cache: Arc<TranslationCache>,
}

impl<T: StepTranslator> CachedTranslator<T> {
    /// Wrap `inner`, sharing `cache`
    pub const fn new(inner: T, cache: Arc<TranslationCache>) -> Self {
        Self { inner, cache }
    }

    /// The shared cache
    #[must_use]
    pub const fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    /// The wrapped translator
    #[must_use]
    pub const fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: StepTranslator> StepTranslator for CachedTranslator<T> {
    async fn translate(
        &self,
        step: &str,
        snapshot: &SemanticTree,
    ) -> Result<Vec<Action>, TranslationError> {
        let key = fingerprint(step, snapshot);
        if let Some(actions) = self.cache.get(&key) {
            tracing::debug!(step, key = %&key[..12], "translation cache hit");
            return Ok(actions);
        }
        let actions = self.inner.translate(step, snapshot).await?;
        self.cache.insert(key, actions.clone());
        Ok(actions)
    }

    fn describe(&self) -> String {
        format!("cached({})", self.inner.describe())
    }
}
