//! Transport failures.

use reqwest::StatusCode;

/// A feed request that produced no usable body.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The connection could not be established
    #[error("could not connect: {0}")]
    Connect(#[source] reqwest::Error),

    /// The upstream answered with a non-2xx status
    #[error("upstream returned HTTP {0}")]
    Status(StatusCode),

    /// Any other failure while sending the request or reading the body
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err)
        } else if err.is_connect() {
            FetchError::Connect(err)
        } else {
            FetchError::Request(err)
        }
    }
}
