pub const EVENTS_COUNTER: &str = "streamhook_events_total";

/// Counts one handled webhook. `event` is the Raisely event type (or
/// `"unknown"`), `outcome` is `forwarded`, a rejection reason, or an error
/// class.
pub fn record_event(event: &str, outcome: &'static str) {
    ::metrics::counter!(
        EVENTS_COUNTER,
        "event" => event.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
