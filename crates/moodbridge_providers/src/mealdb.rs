use crate::http::{build_client, send_json};
use anyhow::Result;
use async_trait::async_trait;
use moodbridge_core::config::MealDbConfig;
use moodbridge_core::provider::MealDbMeal;
use moodbridge_core::{Category, ContentProvider, ProviderKind, RawItem};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Every TheMealDB endpoint answers `{"meals": [...]}`, or `{"meals": null}` on no match.
#[derive(Debug, Deserialize)]
struct MealsResponse {
    #[serde(default)]
    meals: Option<Vec<MealDbMeal>>,
}

impl MealsResponse {
    fn into_meals(self) -> Vec<MealDbMeal> {
        self.meals.unwrap_or_default()
    }
}

/// TheMealDB lookups by cuisine area or by meal name.
#[derive(Debug, Clone)]
pub struct MealDbProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MealDbProvider {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// TheMealDB has a public test key, so this only returns `None` when disabled.
    pub fn from_config(config: &MealDbConfig, timeout: Duration) -> Result<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        let key = if config.api_key.trim().is_empty() {
            "1"
        } else {
            config.api_key.trim()
        };
        Ok(Some(Self::new(key, &config.base_url, timeout)?))
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.api_key, name)
    }

    async fn get_meals(&self, name: &str, param: &str, value: &str) -> moodbridge_core::Result<Vec<MealDbMeal>> {
        let request = self.client.get(self.endpoint(name)).query(&[(param, value)]);
        let response: MealsResponse = send_json(ProviderKind::MealDb, request).await?;
        Ok(response.into_meals())
    }

    /// `filter.php` only returns id, name and thumbnail; each hit is expanded with
    /// `lookup.php`. A failed lookup fails the whole fetch.
    async fn by_area(&self, area: &str, limit: usize) -> moodbridge_core::Result<Vec<MealDbMeal>> {
        let summaries = self.get_meals("filter.php", "a", area).await?;
        tracing::debug!("TheMealDB listed {} meals for area '{}'", summaries.len(), area);

        let mut meals = Vec::with_capacity(limit.min(summaries.len()));
        for summary in summaries.into_iter().take(limit) {
            let detail = self
                .get_meals("lookup.php", "i", &summary.id)
                .await?
                .into_iter()
                .next();
            match detail {
                Some(meal) => meals.push(meal),
                None => {
                    tracing::debug!("TheMealDB lookup for {} came back empty, using summary", summary.id);
                    meals.push(summary);
                }
            }
        }
        Ok(meals)
    }
}

#[async_trait]
impl ContentProvider for MealDbProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::MealDb
    }

    async fn fetch(&self, category: &Category, limit: usize) -> moodbridge_core::Result<Vec<RawItem>> {
        let meals = match category {
            Category::CuisineArea(area) => self.by_area(area, limit).await?,
            Category::SearchTerm(term) => {
                let mut meals = self.get_meals("search.php", "s", term).await?;
                meals.truncate(limit);
                meals
            }
            Category::Genre(_) => return Ok(vec![]),
        };
        Ok(meals.into_iter().map(RawItem::MealDb).collect())
    }
}
