//! Protobuf decoder for GTFS Realtime feeds.

use prost::{DecodeError, Message};

use crate::gtfs_rt::FeedMessage;

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the bytes are not valid protobuf for a
/// `FeedMessage` (truncated, malformed, or wrong wire types).
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage, DecodeError> {
    FeedMessage::decode(bytes)
}
