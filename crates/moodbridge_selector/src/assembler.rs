use crate::format::format;
use crate::resolver::Resolver;
use moodbridge_core::{
    normalize, ContentProvider, ContentType, ContentTypeSpec, Error, MappingDomain, MoodPair,
    ProviderKind, RecommendationRecord, Result,
};
use moodbridge_mapping::CategoryMapper;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

pub const DEFAULT_MAX_FETCH_CATEGORIES: usize = 3;

/// Per-type results, keyed by content type. Every requested type has an entry.
pub type Recommendations = BTreeMap<ContentType, Vec<RecommendationRecord>>;

/// Fans a transition out over the content type registry.
///
/// Stored content is always tried first. Only when the cascade comes back
/// empty, and the type has a provider route with a configured provider, is
/// live content fetched and formatted.
pub struct Assembler {
    registry: Vec<ContentTypeSpec>,
    mapper: Arc<CategoryMapper>,
    resolver: Resolver,
    providers: HashMap<ProviderKind, Arc<dyn ContentProvider>>,
    max_fetch_categories: usize,
}

impl Assembler {
    pub fn new(registry: Vec<ContentTypeSpec>, mapper: Arc<CategoryMapper>, resolver: Resolver) -> Self {
        Self {
            registry,
            mapper,
            resolver,
            providers: HashMap::new(),
            max_fetch_categories: DEFAULT_MAX_FETCH_CATEGORIES,
        }
    }

    /// Register a provider under its own kind, replacing any earlier one.
    pub fn with_provider(mut self, provider: Arc<dyn ContentProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn with_providers<I>(self, providers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ContentProvider>>,
    {
        providers.into_iter().fold(self, |acc, p| acc.with_provider(p))
    }

    pub fn with_max_fetch_categories(mut self, max: usize) -> Self {
        self.max_fetch_categories = max.max(1);
        self
    }

    pub fn registry(&self) -> &[ContentTypeSpec] {
        &self.registry
    }

    pub fn mapper(&self) -> &CategoryMapper {
        &self.mapper
    }

    /// Recommendations for every requested type (all registered types when
    /// `types` is `None`). An all-empty map is a valid answer.
    pub async fn recommendations_for_transition(
        &self,
        source: &str,
        target: &str,
        types: Option<&[ContentType]>,
        per_type_limit: usize,
    ) -> Result<Recommendations> {
        let pair = normalize(source, target)?;
        if per_type_limit == 0 {
            return Err(Error::InvalidLimit(per_type_limit));
        }

        let requested: Vec<ContentType> = match types {
            Some(types) => types.to_vec(),
            None => self.registry.iter().map(|spec| spec.name.clone()).collect(),
        };

        let mut results = Recommendations::new();
        for content_type in requested {
            if results.contains_key(&content_type) {
                continue;
            }
            let records = self.resolve_type(&content_type, &pair, per_type_limit).await?;
            results.insert(content_type, records);
        }

        let total: usize = results.values().map(Vec::len).sum();
        tracing::info!(
            "{}: {} recommendations across {} types",
            pair.key,
            total,
            results.len()
        );
        Ok(results)
    }

    /// Single-type variant with the same stored-then-fresh fallback.
    pub async fn recommendations_by_type(
        &self,
        content_type: &ContentType,
        source: &str,
        target: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>> {
        let pair = normalize(source, target)?;
        if limit == 0 {
            return Err(Error::InvalidLimit(limit));
        }
        self.resolve_type(content_type, &pair, limit).await
    }

    async fn resolve_type(
        &self,
        content_type: &ContentType,
        pair: &MoodPair,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>> {
        let resolution = self
            .resolver
            .resolve_with_tier(content_type, &pair.source, &pair.target, limit)
            .await?;
        if let Some(tier) = resolution.tier {
            tracing::debug!(
                "{} for {} served from stored content ({} tier)",
                content_type,
                pair.key,
                tier
            );
            return Ok(resolution.records);
        }

        let route = self
            .registry
            .iter()
            .find(|spec| &spec.name == content_type)
            .and_then(ContentTypeSpec::fresh_fetch_route);
        let (kind, domain) = match route {
            Some(route) => route,
            None => {
                tracing::debug!("{} has no stored content and no fresh route", content_type);
                return Ok(Vec::new());
            }
        };
        let provider = match self.providers.get(&kind) {
            Some(provider) => provider,
            None => {
                tracing::debug!("{} provider not configured; {} stays empty", kind, content_type);
                return Ok(Vec::new());
            }
        };

        self.fetch_fresh(provider.as_ref(), domain, content_type, pair, limit)
            .await
    }

    /// Walk the mapped categories in order, stopping once `limit` usable
    /// records are collected or at the first provider failure.
    async fn fetch_fresh(
        &self,
        provider: &dyn ContentProvider,
        domain: MappingDomain,
        content_type: &ContentType,
        pair: &MoodPair,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>> {
        let categories = self.mapper.categories_for_pair(pair, domain);
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for category in categories.iter().take(self.max_fetch_categories) {
            if records.len() >= limit {
                break;
            }
            // Ask for the full limit; duplicates and unusable items are dropped below.
            let items = match provider.fetch(category, limit).await {
                Ok(items) => items,
                Err(e) if e.is_provider_failure() => {
                    tracing::warn!(
                        "Fresh fetch for {} ({}) stopped at {}: {}",
                        content_type,
                        pair.key,
                        category,
                        e
                    );
                    break;
                }
                Err(e) => return Err(e),
            };

            tracing::debug!(
                "{} returned {} items for {} ({})",
                provider.kind(),
                items.len(),
                category,
                content_type
            );
            for item in &items {
                let record = format(item, content_type, pair, category);
                if !record.is_usable() {
                    continue;
                }
                if !seen.insert(item.external_id()) {
                    continue;
                }
                records.push(record);
                if records.len() >= limit {
                    break;
                }
            }
        }

        Ok(records)
    }
}
