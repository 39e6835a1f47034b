//! HTTP transport seam for the cheat-sheet host.
//!
//! Documents live at `{base_url}/{category_id}.{extension}`. Discovery issues
//! a status-only probe against that URL; loads fetch the body through a
//! size-capped stream read. All timeouts live here — the store above enforces
//! none of its own.
use crate::config::Config;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_DOCUMENT_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Errors from the transport layer.
///
/// [`ContentError::HttpStatus`] is the "document does not exist" signal; every
/// other variant is a transport failure. The store maps the two cases to
/// different placeholder documents.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("invalid UTF-8 in response")]
    InvalidUtf8,
}

/// Builds the document URL for a category. Trailing slashes on the base are
/// tolerated.
pub(crate) fn sheet_url(base_url: &str, category_id: &str, extension: &str) -> String {
    format!(
        "{}/{}.{}",
        base_url.trim_end_matches('/'),
        category_id,
        extension
    )
}

/// Checks whether a category's document exists on the host.
///
/// Only the response status matters; the body is discarded. `Ok(true)` on
/// 2xx, `Ok(false)` on any other status, `Err` only when the request itself
/// could not complete.
pub(crate) async fn probe(
    client: &reqwest::Client,
    config: &Config,
    category_id: &str,
) -> Result<bool, ContentError> {
    let url = sheet_url(&config.base_url, category_id, &config.extension);

    let response = tokio::time::timeout(PROBE_TIMEOUT, client.get(&url).send())
        .await
        .map_err(|_| ContentError::Timeout)?
        .map_err(ContentError::Network)?;

    Ok(response.status().is_success())
}

/// Fetches a category's document body.
///
/// Requires a 2xx status; the body is read as a size-capped stream and
/// validated as UTF-8.
pub(crate) async fn fetch_document(
    client: &reqwest::Client,
    config: &Config,
    category_id: &str,
) -> Result<String, ContentError> {
    let url = sheet_url(&config.base_url, category_id, &config.extension);

    let response = tokio::time::timeout(FETCH_TIMEOUT, client.get(&url).send())
        .await
        .map_err(|_| ContentError::Timeout)?
        .map_err(ContentError::Network)?;

    if !response.status().is_success() {
        return Err(ContentError::HttpStatus(response.status().as_u16()));
    }

    read_limited_text(response, MAX_DOCUMENT_SIZE).await
}

/// Placeholder document written in place of content when the host reported
/// the document missing (non-2xx).
pub(crate) fn not_found_placeholder(category_id: &str) -> String {
    format!("# {} Cheat Sheet\n\nContent not found.", category_id)
}

/// Placeholder document written in place of content when the fetch itself
/// failed (network, timeout, oversized or malformed body).
pub(crate) fn failure_placeholder(category_id: &str) -> String {
    format!("# Error\n\nFailed to load content for {}.", category_id)
}

async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, ContentError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ContentError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ContentError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ContentError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| ContentError::InvalidUtf8)
}
