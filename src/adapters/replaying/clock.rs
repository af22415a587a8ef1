//! Replaying adapter for the `Clock` port.

use chrono::{DateTime, Utc};

use crate::ports::Clock;

/// A clock frozen at the moment a cassette was recorded.
///
/// Replaying with the recording's "now" makes `{since}`/`{until}` expand to
/// the same dates they had during recording.
pub struct ReplayingClock {
    recorded_at: DateTime<Utc>,
}

impl ReplayingClock {
    /// Creates a clock that always reports `recorded_at`.
    #[must_use]
    pub fn new(recorded_at: DateTime<Utc>) -> Self {
        Self { recorded_at }
    }
}

impl Clock for ReplayingClock {
    fn now(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
