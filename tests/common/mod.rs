//! Shared fixtures: feed builders and a local stand-in for the agency endpoint.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderMap, StatusCode},
    routing::get,
};
use next_train::config::Config;
use next_train::gtfs_rt::trip_descriptor::ScheduleRelationship as TripStatus;
use next_train::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};
use next_train::gtfs_rt::{FeedEntity, FeedHeader, FeedMessage, TripDescriptor, TripUpdate};
use next_train::pipeline::Pipeline;
use next_train::web::{AppState, create_router};
use prost::Message;
use reqwest::Url;
use tokio::net::TcpListener;

pub const STOP: &str = "G33N";
pub const LABEL: &str = "G to COURT SQ";

/// One trip calling at `stop` `offset` seconds after `now`.
pub fn trip(
    id: &str,
    stop: &str,
    now: i64,
    offset: i64,
    status: Option<TripStatus>,
) -> FeedEntity {
    FeedEntity {
        id: id.to_string(),
        trip_update: Some(TripUpdate {
            trip: TripDescriptor {
                trip_id: Some(id.to_string()),
                route_id: Some("G".to_string()),
                schedule_relationship: status.map(|s| s as i32),
                ..Default::default()
            },
            stop_time_update: vec![StopTimeUpdate {
                stop_id: Some(stop.to_string()),
                arrival: Some(StopTimeEvent {
                    time: Some(now + offset),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn encode(entity: Vec<FeedEntity>) -> Vec<u8> {
    FeedMessage {
        header: FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            ..Default::default()
        },
        entity,
    }
    .encode_to_vec()
}

/// Binds an ephemeral port and serves `router` in the background.
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Stand-in for the agency feed endpoint.
///
/// - `/feed` returns `feed`
/// - `/broken` returns 500
/// - `/garbage` returns bytes that are not a feed
/// - `/slow` answers after five seconds
/// - `/keyed` requires `x-api-key: secret`
pub fn upstream(feed: Vec<u8>) -> Router {
    let feed = Arc::new(feed);
    let slow_feed = Arc::clone(&feed);
    let keyed_feed = Arc::clone(&feed);

    Router::new()
        .route(
            "/feed",
            get(move || {
                let body = feed.as_ref().clone();
                async move { body }
            }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream down") }),
        )
        .route("/garbage", get(|| async { vec![0xFFu8, 0xFE, 0x00, 0x01] }))
        .route(
            "/slow",
            get(move || {
                let body = slow_feed.as_ref().clone();
                async move {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    body
                }
            }),
        )
        .route(
            "/keyed",
            get(move |headers: HeaderMap| {
                let body = keyed_feed.as_ref().clone();
                async move {
                    let authorized = headers
                        .get("x-api-key")
                        .and_then(|v| v.to_str().ok())
                        .is_some_and(|v| v == "secret");
                    if authorized {
                        (StatusCode::OK, body)
                    } else {
                        (StatusCode::FORBIDDEN, Vec::new())
                    }
                }
            }),
        )
}

pub fn config_for(url: &str) -> Config {
    Config::new(Url::parse(url).unwrap(), STOP)
        .with_label(LABEL)
        .with_fetch_timeout(Duration::from_millis(500))
}

/// Serves the arrivals service for `config` and returns its base URL.
pub async fn spawn_service(config: Config) -> String {
    let config = Arc::new(config);
    let client = config.http_client().unwrap();
    spawn_pipeline(Pipeline::new(client, config)).await
}

pub async fn spawn_pipeline(pipeline: Pipeline) -> String {
    let addr = spawn(create_router(AppState::new(pipeline))).await;
    format!("http://{addr}")
}
