//! Process-wide configuration.
//!
//! Read once at startup from flags, environment and `.env`, validated into an
//! immutable [`Config`], then handed to the pipeline explicitly.

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::arrivals::StopFilter;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient};

/// MTA NYCT feed carrying the G line.
pub const DEFAULT_FEED_URL: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-g";

/// Bedford-Nostrand Avs, Court Square bound.
pub const DEFAULT_STOP_ID: &str = "G33N";

pub const DEFAULT_LABEL: &str = "G to COURT SQ";

const DEFAULT_MAX_TRAINS: NonZeroUsize = NonZeroUsize::new(3).unwrap();
const DEFAULT_HORIZON_SECS: u64 = 3600;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors raised while validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid feed URL {url}: {message}")]
    FeedUrl { url: String, message: String },

    #[error("stop id must not be empty")]
    EmptyStopId,

    #[error("max trains must be a positive integer")]
    ZeroMaxTrains,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("arrivals path {0:?} must start with '/' and must not be /health")]
    ArrivalsPath(String),

    #[error("invalid API key header name {0:?}")]
    ApiKeyHeader(String),

    #[error("API key contains characters not allowed in an HTTP header")]
    ApiKeyValue,

    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Command-line and environment surface for [`Config`].
#[derive(Debug, Clone, clap::Args)]
pub struct ConfigArgs {
    /// GTFS-Realtime trip updates feed URL
    #[arg(long, env = "NEXT_TRAIN_FEED_URL", default_value = DEFAULT_FEED_URL)]
    pub feed_url: String,

    /// Stop identifier to report arrivals for (exact match)
    #[arg(long, env = "NEXT_TRAIN_STOP_ID", default_value = DEFAULT_STOP_ID)]
    pub stop_id: String,

    /// Human-readable prefix of every response line
    #[arg(long, env = "NEXT_TRAIN_LABEL", default_value = DEFAULT_LABEL)]
    pub label: String,

    /// Maximum number of arrivals displayed
    #[arg(long, env = "NEXT_TRAIN_MAX_TRAINS", default_value_t = DEFAULT_MAX_TRAINS.get())]
    pub max_trains: usize,

    /// Predictions further ahead than this many seconds are dropped
    #[arg(long, env = "NEXT_TRAIN_HORIZON_SECS", default_value_t = DEFAULT_HORIZON_SECS)]
    pub horizon_secs: u64,

    /// Feed request timeout in seconds
    #[arg(long, env = "NEXT_TRAIN_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Route serving the plain-text arrivals line
    #[arg(long, env = "NEXT_TRAIN_ARRIVALS_PATH", default_value = "/g-trains")]
    pub arrivals_path: String,

    /// Address the HTTP service listens on
    #[arg(long, env = "NEXT_TRAIN_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Optional API key sent with every feed request
    #[arg(long, env = "NEXT_TRAIN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Header carrying the API key
    #[arg(long, env = "NEXT_TRAIN_API_KEY_HEADER", default_value = "x-api-key")]
    pub api_key_header: String,
}

/// Validated, immutable configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: Url,
    pub stop_id: String,
    pub label: String,
    pub max_trains: NonZeroUsize,
    /// Look-ahead window; later predictions are treated as noise
    pub horizon: Duration,
    pub fetch_timeout: Duration,
    pub arrivals_path: String,
    pub bind: SocketAddr,
    pub api_key: Option<String>,
    pub api_key_header: String,
}

impl Config {
    /// Create a config for `feed_url` and `stop_id` with default settings.
    pub fn new(feed_url: Url, stop_id: impl Into<String>) -> Self {
        Self {
            feed_url,
            stop_id: stop_id.into(),
            label: DEFAULT_LABEL.to_string(),
            max_trains: DEFAULT_MAX_TRAINS,
            horizon: Duration::from_secs(DEFAULT_HORIZON_SECS),
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            arrivals_path: "/g-trains".to_string(),
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            api_key: None,
            api_key_header: "x-api-key".to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_max_trains(mut self, max_trains: NonZeroUsize) -> Self {
        self.max_trains = max_trains;
        self
    }

    pub fn with_horizon(mut self, horizon: Duration) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_arrivals_path(mut self, path: impl Into<String>) -> Self {
        self.arrivals_path = path.into();
        self
    }

    /// Validates raw arguments into a config.
    pub fn from_args(args: ConfigArgs) -> Result<Self, ConfigError> {
        let feed_url = Url::parse(&args.feed_url).map_err(|e| ConfigError::FeedUrl {
            url: args.feed_url.clone(),
            message: e.to_string(),
        })?;

        if args.stop_id.trim().is_empty() {
            return Err(ConfigError::EmptyStopId);
        }
        let max_trains = NonZeroUsize::new(args.max_trains).ok_or(ConfigError::ZeroMaxTrains)?;
        if args.horizon_secs == 0 {
            return Err(ConfigError::ZeroDuration("horizon"));
        }
        if args.timeout_secs == 0 {
            return Err(ConfigError::ZeroDuration("timeout"));
        }
        if !args.arrivals_path.starts_with('/') || args.arrivals_path == "/health" {
            return Err(ConfigError::ArrivalsPath(args.arrivals_path));
        }

        Ok(Self {
            feed_url,
            stop_id: args.stop_id,
            label: args.label,
            max_trains,
            horizon: Duration::from_secs(args.horizon_secs),
            fetch_timeout: Duration::from_secs(args.timeout_secs),
            arrivals_path: args.arrivals_path,
            bind: args.bind,
            api_key: args.api_key.filter(|k| !k.is_empty()),
            api_key_header: args.api_key_header,
        })
    }

    /// Extraction settings derived from this config.
    pub fn stop_filter(&self) -> StopFilter {
        StopFilter {
            stop_id: self.stop_id.clone(),
            horizon_secs: i64::try_from(self.horizon.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Builds the feed client: timeout applied, API key injected when set.
    pub fn http_client(&self) -> Result<Arc<dyn HttpClient>, ConfigError> {
        let basic = BasicClient::with_timeout(self.fetch_timeout)?;
        let client: Arc<dyn HttpClient> = match &self.api_key {
            Some(key) => Arc::new(ApiKey::new(basic, &self.api_key_header, key)?),
            None => Arc::new(basic),
        };
        Ok(client)
    }
}
