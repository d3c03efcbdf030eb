//! Shared HTTP plumbing for provider clients.
//!
//! Every request carries the client-wide timeout. Nothing here retries: a
//! timeout or a non-2xx answer is reported once and the caller degrades.

use anyhow::Result;
use moodbridge_core::{Error, ProviderKind};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("moodbridge/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Send `request` and decode a JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: ProviderKind,
    request: RequestBuilder,
) -> moodbridge_core::Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::ProviderUnavailable {
            provider,
            reason: format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            ),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| transport_error(provider, e))
}

fn transport_error(provider: ProviderKind, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        tracing::debug!("{} request timed out: {}", provider, e);
        Error::ProviderTimeout { provider }
    } else if e.is_decode() {
        Error::ProviderUnavailable {
            provider,
            reason: format!("malformed response: {}", e),
        }
    } else {
        Error::ProviderUnavailable {
            provider,
            reason: e.to_string(),
        }
    }
}
