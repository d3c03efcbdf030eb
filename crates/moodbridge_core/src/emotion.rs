//! Mood pair normalization.
//!
//! Emotion labels are free-form tokens. The only guarantees are that a label is
//! non-empty, trimmed and lower-cased, so it can be used directly as a map key.

use crate::error::{EmotionRole, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized emotion identifier (`happy`, `sad`, `anxious`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmotionLabel(String);

impl EmotionLabel {
    /// Trim and lower-case `raw`. Blank input is rejected for the given role.
    pub fn parse(raw: &str, role: EmotionRole) -> Result<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(Error::MissingEmotion { role });
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmotionLabel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value, EmotionRole::Source)
    }
}

impl From<EmotionLabel> for String {
    fn from(label: EmotionLabel) -> Self {
        label.0
    }
}

/// `"{source}_to_{target}"`, the key every transition-keyed mapping table uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TransitionKey(String);

impl TransitionKey {
    pub fn new(source: &EmotionLabel, target: &EmotionLabel) -> Self {
        Self(format!("{}_to_{}", source.as_str(), target.as_str()))
    }

    /// Wrap an already-formed key, e.g. from a config table. The key is only
    /// trimmed and lower-cased; it is not split back into labels.
    pub fn from_raw(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A normalized (source, target) pair together with its transition key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MoodPair {
    pub source: EmotionLabel,
    pub target: EmotionLabel,
    pub key: TransitionKey,
}

impl MoodPair {
    pub fn new(source: EmotionLabel, target: EmotionLabel) -> Self {
        let key = TransitionKey::new(&source, &target);
        Self { source, target, key }
    }
}

/// Normalize a raw (source, target) pair.
///
/// Callers that want a fallback emotion must substitute it before calling;
/// blank input is always an error here.
pub fn normalize(source: &str, target: &str) -> Result<MoodPair> {
    let source = EmotionLabel::parse(source, EmotionRole::Source)?;
    let target = EmotionLabel::parse(target, EmotionRole::Target)?;
    Ok(MoodPair::new(source, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        let pair = normalize("  Sad ", "HAPPY\n").unwrap();
        assert_eq!(pair.source.as_str(), "sad");
        assert_eq!(pair.target.as_str(), "happy");
        assert_eq!(pair.key.as_str(), "sad_to_happy");
    }

    #[test]
    fn test_unknown_labels_are_accepted() {
        let pair = normalize("angry", "Unicorn").unwrap();
        assert_eq!(pair.key.as_str(), "angry_to_unicorn");
    }

    #[test]
    fn test_empty_source_is_missing() {
        let err = normalize("   ", "happy").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingEmotion {
                role: EmotionRole::Source
            }
        ));
    }

    #[test]
    fn test_empty_target_is_missing() {
        let err = normalize("sad", "").unwrap_err();
        assert!(matches!(
            err,
            Error::MissingEmotion {
                role: EmotionRole::Target
            }
        ));
    }

    #[test]
    fn test_label_deserialize_normalizes() {
        let label: EmotionLabel = serde_json::from_str(r#"" Calm ""#).unwrap();
        assert_eq!(label.as_str(), "calm");
        assert!(serde_json::from_str::<EmotionLabel>(r#""  ""#).is_err());
    }

    #[test]
    fn test_transition_key_from_raw() {
        assert_eq!(TransitionKey::from_raw(" Angry_To_Calm ").as_str(), "angry_to_calm");
    }
}
