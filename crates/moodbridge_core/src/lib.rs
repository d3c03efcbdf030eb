pub mod category;
pub mod config;
pub mod emotion;
pub mod error;
pub mod provider;
pub mod record;

pub use category::{Category, MappingDomain, MovieGenre};
pub use config::MoodbridgeConfig;
pub use emotion::{normalize, EmotionLabel, MoodPair, TransitionKey};
pub use error::{EmotionRole, Error, Result};
pub use provider::{ProviderKind, RawItem};
pub use record::{ContentType, ContentTypeSpec, RecommendationRecord};

use async_trait::async_trait;

/// A stored-content filter. `None` fields are unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFilter {
    pub content_type: ContentType,
    pub source: Option<EmotionLabel>,
    pub target: Option<EmotionLabel>,
}

impl ContentFilter {
    pub fn exact(content_type: &ContentType, source: &EmotionLabel, target: &EmotionLabel) -> Self {
        Self {
            content_type: content_type.clone(),
            source: Some(source.clone()),
            target: Some(target.clone()),
        }
    }

    pub fn target_only(content_type: &ContentType, target: &EmotionLabel) -> Self {
        Self {
            content_type: content_type.clone(),
            source: None,
            target: Some(target.clone()),
        }
    }

    pub fn type_only(content_type: &ContentType) -> Self {
        Self {
            content_type: content_type.clone(),
            source: None,
            target: None,
        }
    }

    pub fn matches(&self, record: &RecommendationRecord) -> bool {
        record.content_type == self.content_type
            && self
                .source
                .as_ref()
                .map_or(true, |s| &record.source_emotion == s)
            && self
                .target
                .as_ref()
                .map_or(true, |t| &record.target_emotion == t)
    }
}

/// Read access to curated, stored recommendations.
///
/// Both methods are deterministic. `query` walks the matching rows in a stable
/// order, skipping `offset` of them and returning at most `max_rows`;
/// randomization is the caller's job.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Number of rows matching `filter`.
    async fn count_matching(&self, filter: &ContentFilter) -> anyhow::Result<usize>;

    async fn query(
        &self,
        filter: &ContentFilter,
        offset: usize,
        max_rows: usize,
    ) -> anyhow::Result<Vec<RecommendationRecord>>;
}

/// A live third-party content source.
///
/// A provider handed a category kind it cannot search by returns no items.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn fetch(&self, category: &Category, limit: usize) -> Result<Vec<RawItem>>;
}
