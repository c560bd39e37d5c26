//! Signal extraction from runtime events

use registrator_api::Event;

/// Returned when an event carries no usable signal
pub const INVALID_SIGNAL: i32 = -1;

const SIGNAL_ATTRIBUTE: &str = "signal";

/// Signal number carried by a `kill` event, or [`INVALID_SIGNAL`]
pub fn signal_from_event(event: &Event) -> i32 {
    event
        .actor
        .attributes
        .get(SIGNAL_ATTRIBUTE)
        .and_then(|value| value.parse::<i32>().ok())
        .unwrap_or(INVALID_SIGNAL)
}
