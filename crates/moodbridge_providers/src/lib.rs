pub mod edamam;
mod http;
pub mod mealdb;
pub mod spotify;
pub mod tmdb;

pub use edamam::EdamamProvider;
pub use mealdb::MealDbProvider;
pub use spotify::SpotifyProvider;
pub use tmdb::TmdbProvider;

use anyhow::{Context, Result};
use moodbridge_core::config::ProvidersConfig;
use moodbridge_core::ContentProvider;
use std::sync::Arc;
use std::time::Duration;

/// Build every provider that has credentials configured.
///
/// Providers without credentials are left out; the assembler then serves
/// stored content only for the types routed to them.
pub fn build_providers(config: &ProvidersConfig) -> Result<Vec<Arc<dyn ContentProvider>>> {
    let timeout = Duration::from_secs(config.timeout_secs.max(1));
    let mut providers: Vec<Arc<dyn ContentProvider>> = Vec::new();

    if let Some(p) = TmdbProvider::from_config(&config.tmdb, timeout).context("Failed to build TMDB client")? {
        providers.push(Arc::new(p));
    }
    if let Some(p) =
        SpotifyProvider::from_config(&config.spotify, timeout).context("Failed to build Spotify client")?
    {
        providers.push(Arc::new(p));
    }
    if let Some(p) =
        MealDbProvider::from_config(&config.mealdb, timeout).context("Failed to build TheMealDB client")?
    {
        providers.push(Arc::new(p));
    }
    if let Some(p) =
        EdamamProvider::from_config(&config.edamam, timeout).context("Failed to build Edamam client")?
    {
        providers.push(Arc::new(p));
    }

    let names: Vec<&str> = providers.iter().map(|p| p.kind().as_str()).collect();
    if names.is_empty() {
        tracing::info!("No content providers configured; serving stored content only");
    } else {
        tracing::info!(
            "Content providers enabled: {} (timeout {}s)",
            names.join(", "),
            timeout.as_secs()
        );
    }
    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodbridge_core::ProviderKind;

    #[test]
    fn test_default_config_enables_mealdb_only() {
        let providers = build_providers(&ProvidersConfig::default()).unwrap();
        let kinds: Vec<ProviderKind> = providers.iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec![ProviderKind::MealDb]);
    }

    #[test]
    fn test_credentials_enable_providers() {
        let mut config = ProvidersConfig::default();
        config.tmdb.api_key = Some("k".into());
        config.spotify.client_id = Some("id".into());
        config.spotify.client_secret = Some("secret".into());
        config.mealdb.enabled = false;

        let providers = build_providers(&config).unwrap();
        let kinds: Vec<ProviderKind> = providers.iter().map(|p| p.kind()).collect();
        assert_eq!(kinds, vec![ProviderKind::Tmdb, ProviderKind::Spotify]);
    }
}
