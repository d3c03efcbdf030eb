//! Provider-facing categories produced by the transition mapper.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// TMDB movie genres. The numeric ids are TMDB's own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieGenre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Family,
    Fantasy,
    History,
    Horror,
    Music,
    Mystery,
    Romance,
    ScienceFiction,
    Thriller,
    War,
    Western,
}

impl MovieGenre {
    pub const ALL: [MovieGenre; 18] = [
        Self::Action,
        Self::Adventure,
        Self::Animation,
        Self::Comedy,
        Self::Crime,
        Self::Documentary,
        Self::Drama,
        Self::Family,
        Self::Fantasy,
        Self::History,
        Self::Horror,
        Self::Music,
        Self::Mystery,
        Self::Romance,
        Self::ScienceFiction,
        Self::Thriller,
        Self::War,
        Self::Western,
    ];

    pub fn tmdb_id(&self) -> u32 {
        match self {
            Self::Action => 28,
            Self::Adventure => 12,
            Self::Animation => 16,
            Self::Comedy => 35,
            Self::Crime => 80,
            Self::Documentary => 99,
            Self::Drama => 18,
            Self::Family => 10751,
            Self::Fantasy => 14,
            Self::History => 36,
            Self::Horror => 27,
            Self::Music => 10402,
            Self::Mystery => 9648,
            Self::Romance => 10749,
            Self::ScienceFiction => 878,
            Self::Thriller => 53,
            Self::War => 10752,
            Self::Western => 37,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Adventure => "adventure",
            Self::Animation => "animation",
            Self::Comedy => "comedy",
            Self::Crime => "crime",
            Self::Documentary => "documentary",
            Self::Drama => "drama",
            Self::Family => "family",
            Self::Fantasy => "fantasy",
            Self::History => "history",
            Self::Horror => "horror",
            Self::Music => "music",
            Self::Mystery => "mystery",
            Self::Romance => "romance",
            Self::ScienceFiction => "science_fiction",
            Self::Thriller => "thriller",
            Self::War => "war",
            Self::Western => "western",
        }
    }

    /// Human-readable form used in synthesized descriptions.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ScienceFiction => "science fiction",
            other => other.as_str(),
        }
    }
}

impl FromStr for MovieGenre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == wanted || (wanted == "sci_fi" && *g == Self::ScienceFiction))
            .ok_or_else(|| format!("unknown movie genre '{}'", s))
    }
}

impl fmt::Display for MovieGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selector handed to a content provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Category {
    Genre(MovieGenre),
    CuisineArea(String),
    SearchTerm(String),
}

impl Category {
    /// The bare value, without the kind tag.
    pub fn value(&self) -> &str {
        match self {
            Category::Genre(g) => g.as_str(),
            Category::CuisineArea(area) => area,
            Category::SearchTerm(term) => term,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Category::Genre(g) => g.display_name().to_string(),
            Category::CuisineArea(area) => area.clone(),
            Category::SearchTerm(term) => term.clone(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Genre(g) => write!(f, "genre:{}", g),
            Category::CuisineArea(area) => write!(f, "area:{}", area),
            Category::SearchTerm(term) => write!(f, "search:{}", term),
        }
    }
}

/// Independent mapping tables. All but `EmotionSearchTerms` are keyed by
/// transition key; that one is keyed by a single (target) emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingDomain {
    MovieGenres,
    CuisineAreas,
    MusicSearch,
    EmotionSearchTerms,
}

impl MappingDomain {
    pub const ALL: [MappingDomain; 4] = [
        Self::MovieGenres,
        Self::CuisineAreas,
        Self::MusicSearch,
        Self::EmotionSearchTerms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MovieGenres => "movie_genres",
            Self::CuisineAreas => "cuisine_areas",
            Self::MusicSearch => "music_search",
            Self::EmotionSearchTerms => "emotion_search_terms",
        }
    }

    /// Build a category of this domain's kind from a configured name.
    pub fn parse_category(&self, raw: &str) -> Result<Category, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(format!("empty category in {}", self.as_str()));
        }
        match self {
            Self::MovieGenres => trimmed.parse().map(Category::Genre),
            Self::CuisineAreas => Ok(Category::CuisineArea(trimmed.to_string())),
            Self::MusicSearch | Self::EmotionSearchTerms => {
                Ok(Category::SearchTerm(trimmed.to_string()))
            }
        }
    }
}

impl fmt::Display for MappingDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappingDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| format!("unknown mapping domain '{}'", s))
    }
}
