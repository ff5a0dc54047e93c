//! Embedding cache: `hash(model ‖ text) → vector`, capacity-bounded LRU with
//! TTL (`spec.md` §4.A). Grounded on
//! `llmspell-memory::embeddings::cached::CachedEmbeddingService`, extended
//! with a TTL (the teacher's version is LRU-only) and wired to
//! [`crate::retry::with_backoff`] for provider misses.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use semem_config::EmbeddingCacheConfig;
use semem_core::fingerprint::embedding_cache_key;
use semem_core::providers::EmbeddingProvider;
use tracing::{debug, info};

use crate::error::Result;
use crate::retry::with_backoff;

#[derive(Clone)]
struct Entry {
    vector: Vec<f32>,
    inserted_at: Instant,
}

/// Cache statistics, exposed for diagnostics blocks (`spec.md` §4.J step 6).
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
}

/// Caching wrapper around an [`EmbeddingProvider`]. Normalizes the output
/// vector to unit L2 norm when `normalize` is set (the cosine-metric case
/// in `spec.md` §4.A: "Normalizes the returned vector (L2) iff the
/// configured metric is cosine").
pub struct EmbeddingCache {
    inner: Arc<dyn EmbeddingProvider>,
    cache: Mutex<LruCache<String, Entry>>,
    ttl: Duration,
    stats: Mutex<CacheStats>,
    normalize: bool,
    max_retry_attempts: u32,
    backoff_base: Duration,
}

impl EmbeddingCache {
    #[must_use]
    pub fn new(inner: Arc<dyn EmbeddingProvider>, config: &EmbeddingCacheConfig, normalize: bool) -> Self {
        info!(provider = inner.name(), capacity = config.capacity, "creating embedding cache");
        Self {
            inner,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(config.capacity.max(1)).unwrap(),
            )),
            ttl: Duration::from_secs(config.ttl_secs),
            stats: Mutex::new(CacheStats::default()),
            normalize,
            max_retry_attempts: config.max_retry_attempts,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        *self.stats.lock()
    }

    /// `embed(text, model?) → vector(d)` (`spec.md` §4.A).
    ///
    /// # Errors
    /// Propagates [`crate::error::ProviderError::Unavailable`] once retries
    /// are exhausted; cache state is left untouched on failure.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.inner.model().unwrap_or("default");
        let key = embedding_cache_key(model, text);

        if let Some(entry) = self.lookup(&key) {
            return Ok(entry);
        }

        let text_owned = text.to_string();
        let vector = with_backoff(self.max_retry_attempts, self.backoff_base, || {
            let provider = self.inner.clone();
            let text = text_owned.clone();
            async move {
                provider
                    .embed(&[text])
                    .await
                    .map_err(crate::error::ProviderError::from)
                    .map(|mut v| v.pop().unwrap_or_default())
            }
        })
        .await?;

        let vector = if self.normalize { l2_normalize(vector) } else { vector };
        self.cache.lock().put(
            key,
            Entry {
                vector: vector.clone(),
                inserted_at: Instant::now(),
            },
        );
        Ok(vector)
    }

    /// Batch form: per-text cache lookups, one provider round trip for the
    /// collected misses (`llmspell-memory`'s `embed_batch` pattern).
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let model = self.inner.model().unwrap_or("default").to_string();
        let mut results: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut misses = Vec::new();
        let mut miss_indices = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            let key = embedding_cache_key(&model, text);
            if let Some(entry) = self.lookup(&key) {
                results[i] = Some(entry);
            } else {
                misses.push(text.clone());
                miss_indices.push((i, key));
            }
        }

        if !misses.is_empty() {
            let generated = with_backoff(self.max_retry_attempts, self.backoff_base, || {
                let provider = self.inner.clone();
                let misses = misses.clone();
                async move {
                    provider
                        .embed(&misses)
                        .await
                        .map_err(crate::error::ProviderError::from)
                }
            })
            .await?;

            let mut cache = self.cache.lock();
            for ((idx, key), vector) in miss_indices.into_iter().zip(generated.into_iter()) {
                let vector = if self.normalize { l2_normalize(vector) } else { vector };
                cache.put(
                    key,
                    Entry {
                        vector: vector.clone(),
                        inserted_at: Instant::now(),
                    },
                );
                results[idx] = Some(vector);
            }
        }

        Ok(results.into_iter().map(Option::unwrap_or_default).collect())
    }

    fn lookup(&self, key: &str) -> Option<Vec<f32>> {
        let mut cache = self.cache.lock();
        let mut stats = self.stats.lock();
        match cache.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                stats.hits += 1;
                Some(entry.vector.clone())
            }
            Some(_) => {
                stats.expired += 1;
                cache.pop(key);
                None
            }
            None => {
                stats.misses += 1;
                debug!(key, "embedding cache miss");
                None
            }
        }
    }
}

fn l2_normalize(vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        vector
    } else {
        vector.into_iter().map(|x| x / norm).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingProvider {
        calls: AtomicU32,
    }

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        fn name(&self) -> &str {
            "counting"
        }
        async fn embed(&self, texts: &[String]) -> semem_core::error::Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|_| vec![3.0, 4.0]).collect())
        }
        fn dimension(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn repeated_embed_hits_cache() {
        let provider = Arc::new(CountingProvider { calls: AtomicU32::new(0) });
        let cache = EmbeddingCache::new(provider.clone(), &EmbeddingCacheConfig::default(), true);
        let v1 = cache.embed("hello").await.unwrap();
        let v2 = cache.embed("hello").await.unwrap();
        assert_eq!(v1, v2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn normalizes_to_unit_length() {
        let provider = Arc::new(CountingProvider { calls: AtomicU32::new(0) });
        let cache = EmbeddingCache::new(provider, &EmbeddingCacheConfig::default(), true);
        let v = cache.embed("hello").await.unwrap();
        let norm = (v[0] * v[0] + v[1] * v[1]).sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }
}
