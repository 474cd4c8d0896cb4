//! Plain-text rendering of ranked arrivals.
//!
//! The output is consumed by simple always-poll displays, so every outcome,
//! failures included, renders as a single `<label>: ...` line.

use crate::pipeline::{FailureKind, PipelineError};

/// `"<label>: 1m 3m 7m"`, or `"<label>: no trains"` when empty.
pub fn render_arrivals(label: &str, minutes: &[u32]) -> String {
    if minutes.is_empty() {
        return format!("{label}: no trains");
    }

    let times: Vec<String> = minutes.iter().map(|m| format!("{m}m")).collect();
    format!("{label}: {}", times.join(" "))
}

pub fn render_error(label: &str) -> String {
    format!("{label}: error")
}

/// Renders a pipeline outcome.
///
/// Transport and decode failures mean "no data this round" and render as an
/// empty board; anything unexpected renders as an error line.
pub fn render_board(label: &str, outcome: &Result<Vec<u32>, PipelineError>) -> String {
    match outcome {
        Ok(minutes) => render_arrivals(label, minutes),
        Err(e) => match e.kind() {
            FailureKind::Transport | FailureKind::Decode => render_arrivals(label, &[]),
            FailureKind::Unexpected => render_error(label),
        },
    }
}
