use crate::http::{build_client, send_json};
use anyhow::Result;
use async_trait::async_trait;
use moodbridge_core::config::SpotifyConfig;
use moodbridge_core::provider::SpotifyTrack;
use moodbridge_core::{Category, ContentProvider, ProviderKind, RawItem};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Spotify caps search page size at 50.
const MAX_SEARCH_LIMIT: usize = 50;
/// Refresh the token this long before Spotify says it expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Spotify track search using the client-credentials flow.
#[derive(Debug)]
pub struct SpotifyProvider {
    client: Client,
    client_id: String,
    client_secret: String,
    base_url: String,
    auth_url: String,
    market: Option<String>,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyProvider {
    pub fn new(
        client_id: &str,
        client_secret: &str,
        base_url: &str,
        auth_url: &str,
        market: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.to_string(),
            market: market.map(str::to_string),
            token: Mutex::new(None),
        })
    }

    /// `None` unless both client id and secret are configured.
    pub fn from_config(config: &SpotifyConfig, timeout: Duration) -> Result<Option<Self>> {
        let id = config.client_id.as_deref().filter(|s| !s.is_empty());
        let secret = config.client_secret.as_deref().filter(|s| !s.is_empty());
        match (id, secret) {
            (Some(id), Some(secret)) => Ok(Some(Self::new(
                id,
                secret,
                &config.base_url,
                &config.auth_url,
                config.market.as_deref(),
                timeout,
            )?)),
            _ => Ok(None),
        }
    }

    async fn access_token(&self) -> moodbridge_core::Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let request = self
            .client
            .post(&self.auth_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")]);
        let response: TokenResponse = send_json(ProviderKind::Spotify, request).await?;

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        tracing::debug!("Spotify token refreshed, valid for {}s", lifetime.as_secs());
        *cached = Some(CachedToken {
            access_token: response.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }
}

#[async_trait]
impl ContentProvider for SpotifyProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Spotify
    }

    async fn fetch(&self, category: &Category, limit: usize) -> moodbridge_core::Result<Vec<RawItem>> {
        let term = match category {
            Category::SearchTerm(term) => term,
            _ => return Ok(vec![]),
        };

        let token = self.access_token().await?;
        let page_size = limit.clamp(1, MAX_SEARCH_LIMIT).to_string();
        let mut query = vec![
            ("q", term.as_str()),
            ("type", "track"),
            ("limit", page_size.as_str()),
        ];
        if let Some(market) = &self.market {
            query.push(("market", market.as_str()));
        }

        let request = self
            .client
            .get(format!("{}/v1/search", self.base_url))
            .bearer_auth(token)
            .query(&query);
        let response: SearchResponse = send_json(ProviderKind::Spotify, request).await?;

        let tracks = response.tracks.map(|p| p.items).unwrap_or_default();
        tracing::debug!("Spotify returned {} tracks for '{}'", tracks.len(), term);
        Ok(tracks.into_iter().take(limit).map(RawItem::Spotify).collect())
    }
}
