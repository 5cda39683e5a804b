pub mod interface;
pub mod naver;
pub mod related;
pub mod wire;

use crate::error::{CoreError, CoreResult};
use url::Url;

pub(crate) fn parse_base_url(raw: &str) -> CoreResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| CoreError::Config(format!("invalid endpoint url {:?}: {}", raw, e)))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(CoreError::Config(format!(
            "endpoint must be http or https: {}",
            raw
        )));
    }
    Ok(url)
}

/// Reads the body of a 2xx response; any other status is an upstream failure.
pub(crate) async fn read_success_body(response: reqwest::Response, what: &str) -> CoreResult<String> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(CoreError::UpstreamUnavailable(format!(
            "{} returned {}: {}",
            what, status, error_text
        )));
    }
    Ok(response.text().await?)
}
