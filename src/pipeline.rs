//! One request's worth of work: fetch, decode, extract, rank.
//!
//! Nothing is cached or shared between runs; each call owns its feed and
//! candidate list.

use std::sync::Arc;

use chrono::Utc;
use prost::DecodeError;
use tracing::{debug, warn};

use crate::arrivals::extract_arrivals;
use crate::config::Config;
use crate::fetch::{FetchError, HttpClient, fetch_bytes};
use crate::parser::parse_feed;
use crate::rank::rank;

/// Coarse failure category, used to pick the rendered response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Decode,
    Unexpected,
}

/// Errors that can end a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Network error, timeout or non-2xx response
    #[error("transport failure: {0}")]
    Transport(#[from] FetchError),

    /// Payload was not a valid feed
    #[error("decode failure: {0}")]
    Decode(#[from] DecodeError),

    /// Anything else, e.g. the run panicked or was aborted
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Transport(_) => FailureKind::Transport,
            PipelineError::Decode(_) => FailureKind::Decode,
            PipelineError::Unexpected(_) => FailureKind::Unexpected,
        }
    }
}

/// The arrivals pipeline for one configured stop.
pub struct Pipeline {
    client: Arc<dyn HttpClient>,
    config: Arc<Config>,
}

impl Pipeline {
    pub fn new(client: Arc<dyn HttpClient>, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs against the wall clock.
    pub async fn run(&self) -> Result<Vec<u32>, PipelineError> {
        self.run_at(Utc::now().timestamp()).await
    }

    /// Runs with `now` as the reference time, in POSIX seconds.
    #[tracing::instrument(skip(self), fields(stop_id = %self.config.stop_id))]
    pub async fn run_at(&self, now: i64) -> Result<Vec<u32>, PipelineError> {
        let bytes = fetch_bytes(self.client.as_ref(), &self.config.feed_url).await?;
        from_bytes(&bytes, &self.config, now)
    }

    /// Like [`run`](Self::run), but transport and decode failures degrade to
    /// an empty result. Only unexpected failures are returned as errors.
    pub async fn arrivals(&self) -> Result<Vec<u32>, PipelineError> {
        degrade(self.run().await)
    }
}

/// Decodes, extracts and ranks a feed already in memory.
pub fn from_bytes(bytes: &[u8], config: &Config, now: i64) -> Result<Vec<u32>, PipelineError> {
    let feed = parse_feed(bytes)?;
    let candidates = extract_arrivals(&feed, &config.stop_filter(), now);
    let ranked = rank(candidates, config.max_trains);

    debug!(arrivals = ?ranked, "Arrivals ranked");
    Ok(ranked)
}

/// Maps transient upstream failures to "no trains this round".
pub fn degrade(outcome: Result<Vec<u32>, PipelineError>) -> Result<Vec<u32>, PipelineError> {
    match outcome {
        Err(e) if e.kind() != FailureKind::Unexpected => {
            warn!(error = %e, kind = ?e.kind(), "Feed unavailable, reporting no trains");
            Ok(Vec::new())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
    use crate::gtfs_rt::{FeedEntity, FeedHeader, FeedMessage, TripUpdate};
    use prost::Message;
    use reqwest::{StatusCode, Url};
    use std::num::NonZeroUsize;

    const NOW: i64 = 1_700_000_000;

    fn config() -> Config {
        Config::new(Url::parse("http://localhost/feed").unwrap(), "G33N")
    }

    fn feed_with_arrivals(offsets: &[i64]) -> Vec<u8> {
        let entity = offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| FeedEntity {
                id: i.to_string(),
                trip_update: Some(TripUpdate {
                    stop_time_update: vec![StopTimeUpdate {
                        stop_id: Some("G33N".to_string()),
                        arrival: Some(StopTimeEvent {
                            time: Some(NOW + offset),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
                ..Default::default()
            })
            .collect();

        FeedMessage {
            header: FeedHeader {
                gtfs_realtime_version: "2.0".to_string(),
                ..Default::default()
            },
            entity,
        }
        .encode_to_vec()
    }

    #[test]
    fn from_bytes_ranks_and_truncates() {
        let bytes = feed_with_arrivals(&[720, 180, 2700, 60, 420]);
        assert_eq!(from_bytes(&bytes, &config(), NOW).unwrap(), vec![1, 3, 7]);
    }

    #[test]
    fn from_bytes_respects_max_trains() {
        let bytes = feed_with_arrivals(&[720, 180, 2700, 60, 420]);
        let config = config().with_max_trains(NonZeroUsize::new(1).unwrap());
        assert_eq!(from_bytes(&bytes, &config, NOW).unwrap(), vec![1]);
    }

    #[test]
    fn from_bytes_reports_decode_failure() {
        let err = from_bytes(&[0xFF, 0xFE, 0x00, 0x01], &config(), NOW).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Decode);
    }

    #[test]
    fn degrade_turns_transport_failure_into_empty() {
        let outcome = Err(PipelineError::Transport(FetchError::Status(
            StatusCode::NOT_FOUND,
        )));
        assert_eq!(degrade(outcome).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn degrade_keeps_unexpected_failure() {
        let outcome = Err(PipelineError::Unexpected("boom".to_string()));
        let err = degrade(outcome).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Unexpected);
    }

    #[test]
    fn degrade_passes_success_through() {
        assert_eq!(degrade(Ok(vec![2, 4])).unwrap(), vec![2, 4]);
    }
}
