//! Cascading lookup over stored recommendations.
//!
//! Three progressively looser filters are tried in order (exact pair, target
//! only, type only) and the first non-empty one wins. A tier that fits in the
//! candidate pool is read whole and shuffled. A larger tier is sampled by
//! drawing distinct random row offsets, so every matching row stays reachable.

use moodbridge_core::{
    ContentFilter, ContentStore, ContentType, EmotionLabel, Error, RecommendationRecord, Result,
};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};

pub const DEFAULT_CANDIDATE_POOL: usize = 200;

/// Which cascade tier produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    TargetOnly,
    TypeOnly,
}

impl MatchTier {
    pub const CASCADE: [MatchTier; 3] = [MatchTier::Exact, MatchTier::TargetOnly, MatchTier::TypeOnly];

    fn filter(&self, content_type: &ContentType, source: &EmotionLabel, target: &EmotionLabel) -> ContentFilter {
        match self {
            MatchTier::Exact => ContentFilter::exact(content_type, source, target),
            MatchTier::TargetOnly => ContentFilter::target_only(content_type, target),
            MatchTier::TypeOnly => ContentFilter::type_only(content_type),
        }
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchTier::Exact => f.write_str("exact"),
            MatchTier::TargetOnly => f.write_str("target_only"),
            MatchTier::TypeOnly => f.write_str("type_only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub records: Vec<RecommendationRecord>,
    /// `None` when every tier came back empty.
    pub tier: Option<MatchTier>,
}

pub struct Resolver {
    store: Arc<dyn ContentStore>,
    candidate_pool: usize,
    rng: Mutex<StdRng>,
}

impl Resolver {
    pub fn new(store: Arc<dyn ContentStore>, candidate_pool: usize) -> Self {
        Self::with_rng(store, candidate_pool, StdRng::from_entropy())
    }

    /// Deterministic shuffling for tests and reproducible runs.
    pub fn with_seed(store: Arc<dyn ContentStore>, candidate_pool: usize, seed: u64) -> Self {
        Self::with_rng(store, candidate_pool, StdRng::seed_from_u64(seed))
    }

    fn with_rng(store: Arc<dyn ContentStore>, candidate_pool: usize, rng: StdRng) -> Self {
        Self {
            store,
            candidate_pool: candidate_pool.max(1),
            rng: Mutex::new(rng),
        }
    }

    pub async fn resolve(
        &self,
        content_type: &ContentType,
        source: &EmotionLabel,
        target: &EmotionLabel,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>> {
        Ok(self
            .resolve_with_tier(content_type, source, target, limit)
            .await?
            .records)
    }

    pub async fn resolve_with_tier(
        &self,
        content_type: &ContentType,
        source: &EmotionLabel,
        target: &EmotionLabel,
        limit: usize,
    ) -> Result<Resolution> {
        if limit == 0 {
            return Err(Error::InvalidLimit(limit));
        }

        for tier in MatchTier::CASCADE {
            let filter = tier.filter(content_type, source, target);
            let total = self
                .store
                .count_matching(&filter)
                .await
                .map_err(Error::StorageUnavailable)?;

            tracing::debug!(
                "{} tier for {} ({} -> {}): {} matches",
                tier,
                content_type,
                source,
                target,
                total
            );

            if total == 0 {
                continue;
            }
            let records = self.sample(&filter, total, limit).await?;
            if !records.is_empty() {
                return Ok(Resolution {
                    records,
                    tier: Some(tier),
                });
            }
        }

        Ok(Resolution {
            records: Vec::new(),
            tier: None,
        })
    }

    /// Pick up to `limit` of the `total` rows matching `filter`, uniformly.
    async fn sample(
        &self,
        filter: &ContentFilter,
        total: usize,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>> {
        if total <= self.candidate_pool {
            let mut candidates = self
                .store
                .query(filter, 0, total)
                .await
                .map_err(Error::StorageUnavailable)?;
            {
                let mut rng = self.lock_rng();
                candidates.shuffle(&mut *rng);
            }
            candidates.truncate(limit);
            return Ok(candidates);
        }

        let offsets = {
            let mut rng = self.lock_rng();
            index::sample(&mut *rng, total, limit.min(total)).into_vec()
        };
        let mut records = Vec::with_capacity(offsets.len());
        for offset in offsets {
            let rows = self
                .store
                .query(filter, offset, 1)
                .await
                .map_err(Error::StorageUnavailable)?;
            records.extend(rows);
        }
        Ok(records)
    }

    fn lock_rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        // A poisoned lock only means another draw panicked; the rng is still usable.
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use moodbridge_core::EmotionRole;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct VecStore {
        rows: Vec<RecommendationRecord>,
        queries: AtomicUsize,
    }

    impl VecStore {
        fn new(rows: Vec<RecommendationRecord>) -> Self {
            Self {
                rows,
                queries: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ContentStore for VecStore {
        async fn count_matching(&self, filter: &ContentFilter) -> anyhow::Result<usize> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.iter().filter(|r| filter.matches(r)).count())
        }

        async fn query(
            &self,
            filter: &ContentFilter,
            offset: usize,
            max_rows: usize,
        ) -> anyhow::Result<Vec<RecommendationRecord>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .iter()
                .filter(|r| filter.matches(r))
                .skip(offset)
                .take(max_rows)
                .cloned()
                .collect())
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl ContentStore for BrokenStore {
        async fn count_matching(&self, _: &ContentFilter) -> anyhow::Result<usize> {
            anyhow::bail!("database is locked")
        }

        async fn query(&self, _: &ContentFilter, _: usize, _: usize) -> anyhow::Result<Vec<RecommendationRecord>> {
            anyhow::bail!("database is locked")
        }
    }

    fn label(s: &str) -> EmotionLabel {
        EmotionLabel::parse(s, EmotionRole::Source).unwrap()
    }

    fn row(t: &str, source: &str, target: &str, title: &str) -> RecommendationRecord {
        RecommendationRecord {
            title: title.to_string(),
            description: String::new(),
            content_type: ContentType::new(t),
            source_emotion: label(source),
            target_emotion: label(target),
            content: String::new(),
            image_url: String::new(),
            link: String::new(),
            external_id: None,
            external_source: None,
        }
    }

    #[tokio::test]
    async fn test_exact_tier_wins() {
        let store = VecStore::new(vec![
            row("music", "sad", "happy", "a"),
            row("music", "calm", "happy", "b"),
            row("music", "sad", "happy", "c"),
        ]);
        let resolver = Resolver::with_seed(Arc::new(store), 200, 7);
        let resolution = resolver
            .resolve_with_tier(&"music".into(), &label("sad"), &label("happy"), 5)
            .await
            .unwrap();

        assert_eq!(resolution.tier, Some(MatchTier::Exact));
        let mut titles: Vec<_> = resolution.records.iter().map(|r| r.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_type_only_tier() {
        let store = VecStore::new(vec![row("movies", "calm", "calm", "x")]);
        let resolver = Resolver::with_seed(Arc::new(store), 200, 7);
        let resolution = resolver
            .resolve_with_tier(&"movies".into(), &label("sad"), &label("happy"), 5)
            .await
            .unwrap();
        assert_eq!(resolution.tier, Some(MatchTier::TypeOnly));
        assert_eq!(resolution.records.len(), 1);
    }

    #[tokio::test]
    async fn test_all_tiers_empty() {
        let store = Arc::new(VecStore::new(vec![row("music", "sad", "happy", "a")]));
        let resolver = Resolver::with_seed(store.clone(), 200, 7);
        let resolution = resolver
            .resolve_with_tier(&"podcasts".into(), &label("sad"), &label("happy"), 5)
            .await
            .unwrap();
        assert!(resolution.records.is_empty());
        assert_eq!(resolution.tier, None);
        assert_eq!(store.queries.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_limit_rejected_before_query() {
        let store = Arc::new(VecStore::new(vec![]));
        let resolver = Resolver::with_seed(store.clone(), 200, 7);
        let err = resolver
            .resolve(&"music".into(), &label("sad"), &label("happy"), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLimit(0)));
        assert_eq!(store.queries.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_storage_unavailable() {
        let resolver = Resolver::with_seed(Arc::new(BrokenStore), 200, 7);
        let err = resolver
            .resolve(&"music".into(), &label("sad"), &label("happy"), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable(_)));
        assert!(err.to_string().contains("database is locked"));
    }

    #[tokio::test]
    async fn test_same_seed_same_order() {
        let rows: Vec<_> = (0..20)
            .map(|i| row("music", "sad", "happy", &format!("t{}", i)))
            .collect();
        let store: Arc<dyn ContentStore> = Arc::new(VecStore::new(rows));
        let a = Resolver::with_seed(store.clone(), 200, 42)
            .resolve(&"music".into(), &label("sad"), &label("happy"), 5)
            .await
            .unwrap();
        let b = Resolver::with_seed(store, 200, 42)
            .resolve(&"music".into(), &label("sad"), &label("happy"), 5)
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_large_tier_sampled_by_offset() {
        let rows: Vec<_> = (0..50)
            .map(|i| row("music", "sad", "happy", &format!("t{}", i)))
            .collect();
        let store = Arc::new(VecStore::new(rows));
        let resolver = Resolver::with_seed(store.clone(), 10, 1);
        let records = resolver
            .resolve(&"music".into(), &label("sad"), &label("happy"), 25)
            .await
            .unwrap();

        assert_eq!(records.len(), 25);
        let mut titles: Vec<_> = records.iter().map(|r| r.title.clone()).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), 25);
        // One count, then one single-row read per drawn offset.
        assert_eq!(store.queries.load(Ordering::SeqCst), 26);
    }

    #[tokio::test]
    async fn test_rows_past_candidate_pool_are_reachable() {
        let rows: Vec<_> = (0..30)
            .map(|i| row("music", "sad", "happy", &format!("t{}", i)))
            .collect();
        let store: Arc<dyn ContentStore> = Arc::new(VecStore::new(rows));

        let mut seen = std::collections::HashSet::new();
        for seed in 0..200 {
            let records = Resolver::with_seed(store.clone(), 10, seed)
                .resolve(&"music".into(), &label("sad"), &label("happy"), 3)
                .await
                .unwrap();
            assert_eq!(records.len(), 3);
            seen.extend(records.into_iter().map(|r| r.title));
        }

        assert!(seen.contains("t29"));
        assert!((10..30).any(|i| seen.contains(&format!("t{}", i))));
        assert_eq!(seen.len(), 30);
    }
}
