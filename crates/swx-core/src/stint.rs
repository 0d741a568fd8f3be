//! Stints - derived intervals of continuous activity.

use chrono::Duration;
use serde::Serialize;

use crate::time::TimePoint;

/// A period during which one activity was in progress.
///
/// Stints are computed from the log on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stint {
    /// The activity name. Empty for periods of inactivity.
    pub activity: String,

    /// When the stint started, after clipping to any query bound.
    pub start: TimePoint,

    /// Length of the stint. Never negative.
    #[serde(serialize_with = "serialize_duration_secs", rename = "duration_secs")]
    pub duration: Duration,

    /// True if the activity is still in progress.
    pub ongoing: bool,
}

impl Stint {
    /// When the stint ended (or the query bound or "now", if clipped or ongoing).
    pub fn end(&self) -> TimePoint {
        self.start + self.duration
    }
}

fn serialize_duration_secs<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(duration.num_seconds())
}
