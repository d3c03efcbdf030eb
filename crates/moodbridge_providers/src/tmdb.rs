use crate::http::{build_client, send_json};
use anyhow::Result;
use async_trait::async_trait;
use moodbridge_core::config::TmdbConfig;
use moodbridge_core::provider::TmdbMovie;
use moodbridge_core::{Category, ContentProvider, ProviderKind, RawItem};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    results: Vec<TmdbMovie>,
}

/// TMDB `/discover/movie` by genre.
#[derive(Debug, Clone)]
pub struct TmdbProvider {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl TmdbProvider {
    pub fn new(api_key: &str, base_url: &str, language: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &TmdbConfig, timeout: Duration) -> Result<Option<Self>> {
        match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Ok(Some(Self::new(
                key,
                &config.base_url,
                &config.language,
                timeout,
            )?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ContentProvider for TmdbProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Tmdb
    }

    async fn fetch(&self, category: &Category, limit: usize) -> moodbridge_core::Result<Vec<RawItem>> {
        let genre = match category {
            Category::Genre(genre) => genre,
            _ => return Ok(vec![]),
        };

        let genre_id = genre.tmdb_id().to_string();
        let request = self
            .client
            .get(format!("{}/discover/movie", self.base_url))
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("with_genres", genre_id.as_str()),
                ("sort_by", "popularity.desc"),
                ("include_adult", "false"),
                ("language", self.language.as_str()),
                ("page", "1"),
            ]);

        let page: DiscoverResponse = send_json(ProviderKind::Tmdb, request).await?;
        tracing::debug!(
            "TMDB returned {} movies for genre {}",
            page.results.len(),
            genre
        );

        Ok(page
            .results
            .into_iter()
            .take(limit)
            .map(RawItem::Tmdb)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodbridge_core::{Error, MovieGenre};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer, timeout: Duration) -> TmdbProvider {
        TmdbProvider::new("test-key", &server.uri(), "en-US", timeout).unwrap()
    }

    #[tokio::test]
    async fn test_discover_by_genre() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/discover/movie"))
            .and(query_param("with_genres", "99"))
            .and(query_param("api_key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "page": 1,
                "results": [
                    {"id": 1, "title": "Planet Earth", "overview": "Nature.", "poster_path": "/a.jpg"},
                    {"id": 2, "title": "Free Solo", "overview": null},
                    {"id": 3, "title": "Jiro Dreams of Sushi"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items = provider(&server, Duration::from_secs(5))
            .fetch(&Category::Genre(MovieGenre::Documentary), 2)
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        match &items[0] {
            RawItem::Tmdb(movie) => {
                assert_eq!(movie.id, 1);
                assert_eq!(movie.title.as_deref(), Some("Planet Earth"));
            }
            other => panic!("Expected TMDB item, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_genre_category_is_empty() {
        let server = MockServer::start().await;
        let items = provider(&server, Duration::from_secs(5))
            .fetch(&Category::SearchTerm("feel good".into()), 3)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
            .mount(&server)
            .await;

        let err = provider(&server, Duration::from_secs(5))
            .fetch(&Category::Genre(MovieGenre::Comedy), 3)
            .await
            .unwrap_err();
        match err {
            Error::ProviderUnavailable { provider, reason } => {
                assert_eq!(provider, ProviderKind::Tmdb);
                assert!(reason.contains("401"));
            }
            other => panic!("Expected ProviderUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = provider(&server, Duration::from_millis(200))
            .fetch(&Category::Genre(MovieGenre::Comedy), 3)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ProviderTimeout {
                provider: ProviderKind::Tmdb
            }
        ));
    }

    #[tokio::test]
    async fn test_malformed_body_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server, Duration::from_secs(5))
            .fetch(&Category::Genre(MovieGenre::Comedy), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProviderUnavailable { .. }));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = TmdbConfig::default();
        assert!(TmdbProvider::from_config(&config, Duration::from_secs(1))
            .unwrap()
            .is_none());
        let config = TmdbConfig {
            api_key: Some("k".into()),
            ..TmdbConfig::default()
        };
        assert!(TmdbProvider::from_config(&config, Duration::from_secs(1))
            .unwrap()
            .is_some());
    }
}
