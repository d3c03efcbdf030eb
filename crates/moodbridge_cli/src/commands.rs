use anyhow::{Context, Result};
use moodbridge_core::{normalize, ContentType, Error, MappingDomain, MoodPair, MoodbridgeConfig};
use moodbridge_gateway::GatewayServer;
use moodbridge_mapping::CategoryMapper;
use moodbridge_providers::build_providers;
use moodbridge_selector::{Assembler, Recommendations, Resolver};
use moodbridge_store::SqliteContentStore;
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

const NOTHING_FOUND: &str = "No recommendations found for this transition";

async fn open_store(config: &MoodbridgeConfig) -> Result<SqliteContentStore> {
    SqliteContentStore::with_max_connections(&config.store.db_path, config.store.max_connections)
        .await
        .with_context(|| format!("Failed to open content store at {}", config.store.db_path))
}

/// Wire store, mapper and providers into an assembler. Mapping errors are fatal here.
async fn build_assembler(config: &MoodbridgeConfig) -> Result<Assembler> {
    let mapper = CategoryMapper::load(&config.mapping).context("Invalid mapping configuration")?;
    let store = open_store(config).await?;
    let providers = build_providers(&config.providers)?;

    let registry: Vec<String> = config
        .recommend
        .type_names()
        .into_iter()
        .map(String::from)
        .collect();
    tracing::info!("Registry: {}", registry.join(", "));

    Ok(Assembler::new(
        config.recommend.types.clone(),
        Arc::new(mapper),
        Resolver::new(Arc::new(store), config.store.candidate_pool),
    )
    .with_providers(providers)
    .with_max_fetch_categories(config.recommend.max_fetch_categories))
}

pub async fn recommend(
    config: &MoodbridgeConfig,
    from: Option<String>,
    to: Option<String>,
    types: Vec<String>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let source = from.unwrap_or_else(|| config.recommend.default_source.clone());
    let target = to.unwrap_or_else(|| config.recommend.default_target.clone());
    let limit = limit.unwrap_or(config.recommend.per_type_limit);
    let pair = normalize(&source, &target)?;

    let assembler = build_assembler(config).await?;
    let types: Vec<ContentType> = types.iter().map(|t| ContentType::new(t)).collect();
    let requested = if types.is_empty() {
        None
    } else {
        Some(types.as_slice())
    };

    let results = assembler
        .recommendations_for_transition(&source, &target, requested, limit)
        .await
        .map_err(|e| {
            if matches!(e, Error::StorageUnavailable(_)) {
                tracing::error!("{:#}", anyhow::Error::from(e));
                return anyhow::anyhow!("content store unavailable");
            }
            anyhow::Error::from(e)
        })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print!("{}", render_recommendations(&pair, &results));
    }
    Ok(())
}

pub fn categories(
    config: &MoodbridgeConfig,
    from: &str,
    to: &str,
    domain: Option<MappingDomain>,
) -> Result<()> {
    let mapper = CategoryMapper::load(&config.mapping).context("Invalid mapping configuration")?;
    let pair = normalize(from, to)?;
    let domains = match domain {
        Some(d) => vec![d],
        None => MappingDomain::ALL.to_vec(),
    };
    print!("{}", render_categories(&mapper, &pair, &domains));
    Ok(())
}

pub async fn seed(config: &MoodbridgeConfig, file: &Path) -> Result<()> {
    let store = open_store(config).await?;
    let inserted = store.import_seed_file(file).await?;
    let total = store.count(None).await?;
    println!(
        "Imported {} recommendations into {} ({} total)",
        inserted, config.store.db_path, total
    );
    Ok(())
}

pub async fn serve(config: &MoodbridgeConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.gateway.host.clone());
    let port = port.unwrap_or(config.gateway.port);
    let assembler = build_assembler(config).await?;
    GatewayServer::new(Arc::new(assembler), &config.recommend, &host, port)
        .serve()
        .await
}

// ============================================================================
// Text rendering
// ============================================================================

fn render_recommendations(pair: &MoodPair, results: &Recommendations) -> String {
    let mut out = String::new();
    if results.values().all(Vec::is_empty) {
        let _ = writeln!(out, "{}", NOTHING_FOUND);
        return out;
    }

    let _ = writeln!(out, "{} -> {} ({})", pair.source, pair.target, pair.key);
    for (content_type, records) in results {
        let _ = writeln!(out, "\n[{}]", content_type);
        if records.is_empty() {
            let _ = writeln!(out, "  (nothing yet)");
            continue;
        }
        for (i, record) in records.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, record.title);
            if !record.description.is_empty() {
                let _ = writeln!(out, "     {}", record.description);
            }
            if !record.link.is_empty() {
                let _ = writeln!(out, "     {}", record.link);
            }
        }
    }
    out
}

fn render_categories(mapper: &CategoryMapper, pair: &MoodPair, domains: &[MappingDomain]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", pair.key);
    for domain in domains {
        let categories = mapper.categories_for_pair(pair, *domain);
        let fallback = categories.as_slice() == mapper.default_for(*domain);
        let values: Vec<&str> = categories.iter().map(|c| c.value()).collect();
        let _ = writeln!(
            out,
            "  {}{}: {}",
            domain,
            if fallback { " (default)" } else { "" },
            values.join(", ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use moodbridge_core::{EmotionLabel, EmotionRole, RecommendationRecord};

    fn record(title: &str, link: &str) -> RecommendationRecord {
        RecommendationRecord {
            title: title.to_string(),
            description: String::new(),
            content_type: ContentType::new("music"),
            source_emotion: EmotionLabel::parse("sad", EmotionRole::Source).unwrap(),
            target_emotion: EmotionLabel::parse("happy", EmotionRole::Target).unwrap(),
            content: String::new(),
            image_url: String::new(),
            link: link.to_string(),
            external_id: None,
            external_source: None,
        }
    }

    #[test]
    fn test_render_empty_results() {
        let pair = normalize("sad", "happy").unwrap();
        let mut results = Recommendations::new();
        results.insert(ContentType::new("music"), vec![]);
        results.insert(ContentType::new("movies"), vec![]);
        assert_eq!(
            render_recommendations(&pair, &results),
            "No recommendations found for this transition\n"
        );
    }

    #[test]
    fn test_render_groups_by_type() {
        let pair = normalize("sad", "happy").unwrap();
        let mut results = Recommendations::new();
        results.insert(
            ContentType::new("music"),
            vec![record("Lovely Day", "https://open.spotify.com/track/x")],
        );
        results.insert(ContentType::new("movies"), vec![]);

        let text = render_recommendations(&pair, &results);
        assert!(text.starts_with("sad -> happy (sad_to_happy)"));
        assert!(text.contains("[music]\n  1. Lovely Day\n     https://open.spotify.com/track/x"));
        assert!(text.contains("[movies]\n  (nothing yet)"));
    }

    #[test]
    fn test_render_categories_marks_default() {
        let mapper = CategoryMapper::builtin().unwrap();
        let pair = normalize("angry", "unicorn").unwrap();
        let text = render_categories(&mapper, &pair, &[MappingDomain::MovieGenres]);
        assert!(text.contains("movie_genres (default): comedy, drama, family"));

        let pair = normalize("angry", "calm").unwrap();
        let text = render_categories(&mapper, &pair, &[MappingDomain::MovieGenres]);
        assert!(text.contains("movie_genres: documentary, family, animation, music"));
    }
}
