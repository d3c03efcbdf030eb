use crate::http::{build_client, send_json};
use anyhow::Result;
use async_trait::async_trait;
use moodbridge_core::config::EdamamConfig;
use moodbridge_core::provider::EdamamRecipe;
use moodbridge_core::{Category, ContentProvider, ProviderKind, RawItem};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    recipe: EdamamRecipe,
}

/// Edamam Recipe Search v2.
#[derive(Debug, Clone)]
pub struct EdamamProvider {
    client: Client,
    app_id: String,
    app_key: String,
    base_url: String,
}

impl EdamamProvider {
    pub fn new(app_id: &str, app_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            app_id: app_id.to_string(),
            app_key: app_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &EdamamConfig, timeout: Duration) -> Result<Option<Self>> {
        let id = config.app_id.as_deref().filter(|s| !s.is_empty());
        let key = config.app_key.as_deref().filter(|s| !s.is_empty());
        match (id, key) {
            (Some(id), Some(key)) => Ok(Some(Self::new(id, key, &config.base_url, timeout)?)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl ContentProvider for EdamamProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Edamam
    }

    async fn fetch(&self, category: &Category, limit: usize) -> moodbridge_core::Result<Vec<RawItem>> {
        let (param, value) = match category {
            Category::SearchTerm(term) => ("q", term.as_str()),
            Category::CuisineArea(area) => ("cuisineType", area.as_str()),
            Category::Genre(_) => return Ok(vec![]),
        };

        let request = self
            .client
            .get(format!("{}/api/recipes/v2", self.base_url))
            .query(&[
                ("type", "public"),
                (param, value),
                ("app_id", self.app_id.as_str()),
                ("app_key", self.app_key.as_str()),
            ]);
        let response: SearchResponse = send_json(ProviderKind::Edamam, request).await?;
        tracing::debug!("Edamam returned {} recipes for {}", response.hits.len(), category);

        Ok(response
            .hits
            .into_iter()
            .take(limit)
            .map(|hit| RawItem::Edamam(hit.recipe))
            .collect())
    }
}
