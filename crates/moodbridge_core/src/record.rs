use crate::category::MappingDomain;
use crate::emotion::EmotionLabel;
use crate::provider::ProviderKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered content type such as `music`, `movies` or `african_meals`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ContentType(String);

impl ContentType {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContentType {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for ContentType {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<ContentType> for String {
    fn from(value: ContentType) -> Self {
        value.0
    }
}

/// Registry entry for one content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeSpec {
    pub name: ContentType,
    /// Provider used when stored content runs dry. `None` means curated-only.
    #[serde(default)]
    pub fresh_fetch: Option<ProviderKind>,
    /// Mapping table that turns a transition into provider categories.
    #[serde(default)]
    pub domain: Option<MappingDomain>,
}

impl ContentTypeSpec {
    pub fn curated(name: &str) -> Self {
        Self {
            name: ContentType::new(name),
            fresh_fetch: None,
            domain: None,
        }
    }

    pub fn fresh(name: &str, provider: ProviderKind, domain: MappingDomain) -> Self {
        Self {
            name: ContentType::new(name),
            fresh_fetch: Some(provider),
            domain: Some(domain),
        }
    }

    /// Both a provider and a mapping domain are needed for a live fetch.
    pub fn fresh_fetch_route(&self) -> Option<(ProviderKind, MappingDomain)> {
        match (self.fresh_fetch, self.domain) {
            (Some(provider), Some(domain)) => Some((provider, domain)),
            _ => None,
        }
    }
}

/// The uniform record shape shared by stored rows and formatted provider items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub source_emotion: EmotionLabel,
    pub target_emotion: EmotionLabel,
    /// Free-text body: ingredients and instructions, nutrition, cast, runtime...
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_source: Option<String>,
}

impl RecommendationRecord {
    /// A record with neither a title nor a link cannot be shown.
    pub fn is_usable(&self) -> bool {
        !(self.title.trim().is_empty() && self.link.trim().is_empty())
    }
}
