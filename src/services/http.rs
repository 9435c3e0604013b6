use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;

use crate::core::config::DEFAULT_USER_AGENT;
use crate::{MapError, Result};

/// Shared async HTTP client for every outgoing request
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .timeout(std::time::Duration::from_secs(30))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
        .expect("failed to build reqwest async client")
});

/// GETs `url` and decodes a JSON body. Non-2xx answers become
/// [`MapError::HttpStatus`] so callers can tell them apart from transport errors.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
    url: &str,
) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        log::warn!("HTTP {} from {}", status, url);
        return Err(MapError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}
