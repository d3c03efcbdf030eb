use crate::provider::ProviderKind;
use std::fmt;

/// Which side of a transition an emotion label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionRole {
    Source,
    Target,
}

impl fmt::Display for EmotionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmotionRole::Source => f.write_str("source"),
            EmotionRole::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing {role} emotion")]
    MissingEmotion { role: EmotionRole },

    #[error("limit must be greater than zero (got {0})")]
    InvalidLimit(usize),

    /// The content store could not be reached. Never retried by the selector.
    #[error("content store unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),

    #[error("{provider} request timed out")]
    ProviderTimeout { provider: ProviderKind },

    #[error("{provider} unavailable: {reason}")]
    ProviderUnavailable {
        provider: ProviderKind,
        reason: String,
    },

    /// Raised once while loading configuration or mapping tables.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Provider failures degrade to empty results instead of reaching the caller.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Error::ProviderTimeout { .. } | Error::ProviderUnavailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
