//! Arrival extraction for a single stop.
//!
//! Every stop time update passes through a fixed chain of checks; the first
//! failing check names the [`Skip`] reason and the update is dropped. Updates
//! that pass become a whole-minute offset from `now`.

use tracing::debug;

use crate::gtfs_rt::FeedMessage;
use crate::gtfs_rt::trip_descriptor::ScheduleRelationship as TripStatus;
use crate::gtfs_rt::trip_update::stop_time_update::ScheduleRelationship as StopStatus;
use crate::gtfs_rt::trip_update::{StopTimeEvent, StopTimeUpdate};

/// Which stop to report and how far ahead to look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopFilter {
    pub stop_id: String,
    /// Predictions more than this many seconds away are dropped.
    pub horizon_secs: i64,
}

/// Why a stop time update produced no arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// Update is for a different stop
    OtherStop,
    /// Vehicle will not stop here
    Skipped,
    /// Neither arrival nor departure carries a usable time
    NoTime,
    /// Effective time is now or in the past
    Departed,
    /// Effective time lies beyond the horizon
    BeyondHorizon,
}

#[derive(Debug, Default)]
struct SkipTally {
    no_trip_update: usize,
    canceled_trips: usize,
    other_stop: usize,
    skipped: usize,
    no_time: usize,
    departed: usize,
    beyond_horizon: usize,
}

impl SkipTally {
    fn record(&mut self, reason: Skip) {
        match reason {
            Skip::OtherStop => self.other_stop += 1,
            Skip::Skipped => self.skipped += 1,
            Skip::NoTime => self.no_time += 1,
            Skip::Departed => self.departed += 1,
            Skip::BeyondHorizon => self.beyond_horizon += 1,
        }
    }
}

/// Collects minutes-until-arrival at `filter.stop_id` across the whole feed.
///
/// Entities without a trip update and canceled trips contribute nothing. The
/// result is in feed order; ranking is a separate step.
pub fn extract_arrivals(feed: &FeedMessage, filter: &StopFilter, now: i64) -> Vec<u32> {
    let mut arrivals = Vec::new();
    let mut tally = SkipTally::default();

    for entity in &feed.entity {
        let Some(trip_update) = &entity.trip_update else {
            tally.no_trip_update += 1;
            continue;
        };

        // Absent or unrecognised status decodes as SCHEDULED.
        if trip_update.trip.schedule_relationship() == TripStatus::Canceled {
            tally.canceled_trips += 1;
            continue;
        }

        for update in &trip_update.stop_time_update {
            match classify(update, filter, now) {
                Ok(minutes) => arrivals.push(minutes),
                Err(reason) => tally.record(reason),
            }
        }
    }

    debug!(
        stop_id = %filter.stop_id,
        entities = feed.entity.len(),
        arrivals = arrivals.len(),
        no_trip_update = tally.no_trip_update,
        canceled_trips = tally.canceled_trips,
        other_stop = tally.other_stop,
        skipped = tally.skipped,
        no_time = tally.no_time,
        departed = tally.departed,
        beyond_horizon = tally.beyond_horizon,
        "Arrivals extracted"
    );

    arrivals
}

/// Runs one stop time update through the filter chain.
pub fn classify(update: &StopTimeUpdate, filter: &StopFilter, now: i64) -> Result<u32, Skip> {
    if update.stop_id.as_deref() != Some(filter.stop_id.as_str()) {
        return Err(Skip::OtherStop);
    }

    if update.schedule_relationship() == StopStatus::Skipped {
        return Err(Skip::Skipped);
    }

    let time = effective_time(update).ok_or(Skip::NoTime)?;
    let delta = time.saturating_sub(now);

    if delta <= 0 {
        return Err(Skip::Departed);
    }
    if delta > filter.horizon_secs {
        return Err(Skip::BeyondHorizon);
    }

    Ok(round_minutes(delta))
}

/// Arrival time if set, else departure time.
///
/// A time of zero counts as unset: feeds that zero-fill instead of omitting
/// the field would otherwise report a train at the epoch.
pub fn effective_time(update: &StopTimeUpdate) -> Option<i64> {
    event_time(update.arrival.as_ref()).or_else(|| event_time(update.departure.as_ref()))
}

fn event_time(event: Option<&StopTimeEvent>) -> Option<i64> {
    event.and_then(|e| e.time).filter(|&t| t != 0)
}

/// Rounds a positive number of seconds to the nearest minute, halves up.
fn round_minutes(secs: i64) -> u32 {
    u32::try_from(secs.saturating_add(30) / 60).unwrap_or(u32::MAX)
}
