//! Feed retrieval over HTTP.
//!
//! One GET per call, bounded by the client's timeout, never retried.

mod basic;
mod client;
mod error;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;
pub use error::FetchError;

use bytes::Bytes;
use reqwest::Url;
use tracing::debug;

/// Issues a single GET for `url` and returns the response body.
///
/// # Errors
///
/// Any non-2xx status, timeout or connection problem is a [`FetchError`].
#[tracing::instrument(skip_all, fields(url = %url))]
pub async fn fetch_bytes<C: HttpClient + ?Sized>(
    client: &C,
    url: &Url,
) -> Result<Bytes, FetchError> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.clone());

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let bytes = resp.bytes().await?;
    debug!(bytes = bytes.len(), %status, "Feed bytes received");
    Ok(bytes)
}
