use crate::category::MappingDomain;
use crate::provider::ProviderKind;
use crate::record::{ContentType, ContentTypeSpec};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoodbridgeConfig {
    pub store: StoreConfig,
    pub recommend: RecommendConfig,
    pub providers: ProvidersConfig,
    pub mapping: MappingConfig,
    pub gateway: GatewayConfig,
}

impl MoodbridgeConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: MoodbridgeConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from path, or return defaults with env overrides when the file does
    /// not exist. A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::metadata(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Config file {} not found, using defaults", path.display());
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                Ok(cfg)
            }
            _ => Self::load(path),
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MOODBRIDGE_DB_PATH") {
            self.store.db_path = v;
        }
        if let Ok(v) = std::env::var("MOODBRIDGE_PROVIDER_TIMEOUT_SECS") {
            if let Ok(n) = v.parse() {
                self.providers.timeout_secs = n;
            }
        }
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            self.providers.tmdb.api_key = Some(key);
        }
        if let Ok(id) = std::env::var("SPOTIFY_CLIENT_ID") {
            self.providers.spotify.client_id = Some(id);
        }
        if let Ok(secret) = std::env::var("SPOTIFY_CLIENT_SECRET") {
            self.providers.spotify.client_secret = Some(secret);
        }
        if let Ok(id) = std::env::var("EDAMAM_APP_ID") {
            self.providers.edamam.app_id = Some(id);
        }
        if let Ok(key) = std::env::var("EDAMAM_APP_KEY") {
            self.providers.edamam.app_key = Some(key);
        }
        if let Ok(key) = std::env::var("MEALDB_API_KEY") {
            self.providers.mealdb.api_key = key;
        }
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: String,
    pub max_connections: u32,
    /// Tiers with at most this many matches are read whole and shuffled;
    /// larger tiers are sampled by random offset.
    pub candidate_pool: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "moodbridge.db".to_string(),
            max_connections: 5,
            candidate_pool: 200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    pub per_type_limit: usize,
    /// How many mapped categories the assembler may try per fresh fetch.
    pub max_fetch_categories: usize,
    /// Fallback emotions for outer surfaces (CLI, gateway). The selector never
    /// substitutes these itself.
    pub default_source: String,
    pub default_target: String,
    /// Ordered content type registry.
    pub types: Vec<ContentTypeSpec>,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            per_type_limit: 5,
            max_fetch_categories: 3,
            default_source: "neutral".to_string(),
            default_target: "happy".to_string(),
            types: default_registry(),
        }
    }
}

impl RecommendConfig {
    pub fn type_names(&self) -> Vec<ContentType> {
        self.types.iter().map(|t| t.name.clone()).collect()
    }
}

fn default_registry() -> Vec<ContentTypeSpec> {
    vec![
        ContentTypeSpec::fresh("music", ProviderKind::Spotify, MappingDomain::MusicSearch),
        ContentTypeSpec::fresh("movies", ProviderKind::Tmdb, MappingDomain::MovieGenres),
        ContentTypeSpec::curated("african_meals"),
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Per-call HTTP timeout. The only cancellation mechanism on the fetch path.
    pub timeout_secs: u64,
    pub tmdb: TmdbConfig,
    pub spotify: SpotifyConfig,
    pub mealdb: MealDbConfig,
    pub edamam: EdamamConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 8,
            tmdb: TmdbConfig::default(),
            spotify: SpotifyConfig::default(),
            mealdb: MealDbConfig::default(),
            edamam: EdamamConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.themoviedb.org/3".to_string(),
            language: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub base_url: String,
    pub auth_url: String,
    pub market: Option<String>,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            base_url: "https://api.spotify.com".to_string(),
            auth_url: "https://accounts.spotify.com/api/token".to_string(),
            market: None,
        }
    }
}

/// TheMealDB is usable without registration; `"1"` is its public test key.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MealDbConfig {
    pub enabled: bool,
    pub api_key: String,
    pub base_url: String,
}

impl Default for MealDbConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: "1".to_string(),
            base_url: "https://www.themealdb.com/api/json/v1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EdamamConfig {
    pub app_id: Option<String>,
    pub app_key: Option<String>,
    pub base_url: String,
}

impl Default for EdamamConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            app_key: None,
            base_url: "https://api.edamam.com".to_string(),
        }
    }
}

/// Per-domain overrides merged over the built-in tables at startup.
///
/// ```toml
/// [mapping.movie_genres]
/// sad_to_happy = ["comedy", "family"]
/// default = ["comedy", "drama"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub movie_genres: BTreeMap<String, Vec<String>>,
    pub cuisine_areas: BTreeMap<String, Vec<String>>,
    pub music_search: BTreeMap<String, Vec<String>>,
    pub emotion_search_terms: BTreeMap<String, Vec<String>>,
}

impl MappingConfig {
    pub fn overrides_for(&self, domain: MappingDomain) -> &BTreeMap<String, Vec<String>> {
        match domain {
            MappingDomain::MovieGenres => &self.movie_genres,
            MappingDomain::CuisineAreas => &self.cuisine_areas,
            MappingDomain::MusicSearch => &self.music_search,
            MappingDomain::EmotionSearchTerms => &self.emotion_search_terms,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8088,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
