use crate::error::FetchError;
use reqwest::blocking::Client;
use tracing::debug;

const USER_AGENT: &str = concat!("breach-lens/", env!("CARGO_PKG_VERSION"));

/// One GET, body as text. Timeouts are left to the transport defaults.
pub fn get_text(source_id: &str, url: &str) -> Result<String, FetchError> {
    let network = |reason: String| FetchError::Network {
        source_id: source_id.to_string(),
        reason,
    };

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| network(format!("failed building HTTP client: {}", e)))?;

    debug!("GET {} for source '{}'", url, source_id);
    let response = client
        .get(url)
        .send()
        .map_err(|e| network(format!("request to {} failed: {}", url, e)))?;

    ensure_success(source_id, response.status().as_u16())?;

    response
        .text()
        .map_err(|e| network(format!("failed reading response body from {}: {}", url, e)))
}

pub(crate) fn ensure_success(source_id: &str, status: u16) -> Result<(), FetchError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(FetchError::Status {
            source_id: source_id.to_string(),
            status,
        })
    }
}
