//! Raw payloads returned by third-party content providers.
//!
//! Field names mirror each provider's JSON so the HTTP clients can decode
//! straight into these types. Everything optional on the provider side is
//! optional here too; formatting decides how to render the gaps.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Tmdb,
    Spotify,
    MealDb,
    Edamam,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Tmdb => "tmdb",
            ProviderKind::Spotify => "spotify",
            ProviderKind::MealDb => "mealdb",
            ProviderKind::Edamam => "edamam",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tmdb" => Ok(ProviderKind::Tmdb),
            "spotify" => Ok(ProviderKind::Spotify),
            "mealdb" | "themealdb" => Ok(ProviderKind::MealDb),
            "edamam" => Ok(ProviderKind::Edamam),
            other => Err(format!("unknown provider '{}'", other)),
        }
    }
}

// ============================================================================
// TMDB
// ============================================================================

/// One entry of `/discover/movie` `results`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

// ============================================================================
// Spotify
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotifyTrack {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub album: Option<SpotifyAlbum>,
    #[serde(default)]
    pub external_urls: Option<SpotifyExternalUrls>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotifyArtist {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotifyExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

// ============================================================================
// TheMealDB
// ============================================================================

/// TheMealDB keeps ingredients in flat `strIngredient1..20` / `strMeasure1..20`
/// columns; those land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealDbMeal {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal", default)]
    pub name: Option<String>,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(rename = "strSource", default)]
    pub source_url: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub youtube_url: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl MealDbMeal {
    pub const MAX_INGREDIENTS: usize = 20;

    /// Non-empty `(ingredient, measure)` pairs in column order.
    pub fn ingredients(&self) -> Vec<(String, String)> {
        (1..=Self::MAX_INGREDIENTS)
            .filter_map(|i| {
                let ingredient = self.extra_str(&format!("strIngredient{}", i))?;
                let measure = self
                    .extra_str(&format!("strMeasure{}", i))
                    .unwrap_or_default();
                Some((ingredient, measure))
            })
            .collect()
    }

    fn extra_str(&self, key: &str) -> Option<String> {
        self.extra
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

// ============================================================================
// Edamam
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdamamRecipe {
    pub uri: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(rename = "ingredientLines", default)]
    pub ingredient_lines: Vec<String>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(rename = "yield", default)]
    pub servings: Option<f64>,
    #[serde(rename = "cuisineType", default)]
    pub cuisine_type: Vec<String>,
    #[serde(rename = "dietLabels", default)]
    pub diet_labels: Vec<String>,
    #[serde(rename = "totalTime", default)]
    pub total_time: Option<f64>,
}

impl EdamamRecipe {
    /// Edamam URIs look like `http://www.edamam.com/ontologies/edamam.owl#recipe_<hash>`.
    pub fn recipe_id(&self) -> &str {
        self.uri.rsplit('#').next().unwrap_or(&self.uri)
    }
}

// ============================================================================
// Tagged union
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", content = "item", rename_all = "lowercase")]
pub enum RawItem {
    Tmdb(TmdbMovie),
    Spotify(SpotifyTrack),
    MealDb(MealDbMeal),
    Edamam(EdamamRecipe),
}

impl RawItem {
    pub fn provider(&self) -> ProviderKind {
        match self {
            RawItem::Tmdb(_) => ProviderKind::Tmdb,
            RawItem::Spotify(_) => ProviderKind::Spotify,
            RawItem::MealDb(_) => ProviderKind::MealDb,
            RawItem::Edamam(_) => ProviderKind::Edamam,
        }
    }

    /// Provider-side identifier, used for de-duplication.
    pub fn external_id(&self) -> String {
        match self {
            RawItem::Tmdb(m) => m.id.to_string(),
            RawItem::Spotify(t) => t.id.clone(),
            RawItem::MealDb(m) => m.id.clone(),
            RawItem::Edamam(r) => r.recipe_id().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_roundtrip() {
        for kind in [
            ProviderKind::Tmdb,
            ProviderKind::Spotify,
            ProviderKind::MealDb,
            ProviderKind::Edamam,
        ] {
            assert_eq!(kind.as_str().parse::<ProviderKind>(), Ok(kind));
        }
        assert_eq!("TheMealDB".parse::<ProviderKind>(), Ok(ProviderKind::MealDb));
        assert!("netflix".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_mealdb_ingredients_skip_blanks() {
        let json = r#"{
            "idMeal": "52772",
            "strMeal": "Teriyaki Chicken Casserole",
            "strIngredient1": "soy sauce",
            "strMeasure1": "3/4 cup",
            "strIngredient2": "",
            "strMeasure2": " ",
            "strIngredient3": "water",
            "strMeasure3": null,
            "strIngredient4": null
        }"#;
        let meal: MealDbMeal = serde_json::from_str(json).unwrap();
        assert_eq!(meal.name.as_deref(), Some("Teriyaki Chicken Casserole"));
        assert_eq!(
            meal.ingredients(),
            vec![
                ("soy sauce".to_string(), "3/4 cup".to_string()),
                ("water".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_edamam_recipe_id() {
        let recipe = EdamamRecipe {
            uri: "http://www.edamam.com/ontologies/edamam.owl#recipe_abc123".into(),
            ..Default::default()
        };
        assert_eq!(recipe.recipe_id(), "recipe_abc123");
        assert_eq!(RawItem::Edamam(recipe).external_id(), "recipe_abc123");
    }

    #[test]
    fn test_tmdb_nulls_tolerated() {
        let movie: TmdbMovie =
            serde_json::from_str(r#"{"id": 7, "title": null, "poster_path": null}"#).unwrap();
        assert_eq!(movie.id, 7);
        assert!(movie.title.is_none());
        assert!(movie.genre_ids.is_empty());
    }
}
