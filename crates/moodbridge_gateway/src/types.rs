use moodbridge_core::RecommendationRecord;
use moodbridge_selector::Recommendations;
use serde::{Deserialize, Serialize};

/// Query string of `GET /recommendations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    /// Comma-separated content types, e.g. `music,movies`. Absent means every registered type.
    #[serde(default, rename = "type")]
    pub types: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl RecommendationQuery {
    pub fn type_list(&self) -> Option<Vec<String>> {
        let raw = self.types.as_deref()?;
        let list: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if list.is_empty() {
            None
        } else {
            Some(list)
        }
    }
}

/// Query string of `GET /recommendations/{type}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeQuery {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsResponse {
    pub source_emotion: String,
    pub target_emotion: String,
    pub transition: String,
    pub results: Recommendations,
    /// True when no type produced anything.
    pub empty: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordsResponse {
    pub records: Vec<RecommendationRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
