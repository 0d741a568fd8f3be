//! Time points, timestamp formatting and the wall clock.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// A point in time. Stored in UTC; formatted and parsed in local time.
pub type TimePoint = DateTime<Utc>;

/// Errors converting between time points and timestamps.
#[derive(Debug, Error)]
pub enum TimeFormatError {
    /// The strftime pattern contains an unrecognised specifier.
    #[error("invalid time format pattern: {pattern}")]
    InvalidPattern { pattern: String },
    /// The timestamp does not match the pattern.
    #[error("could not parse timestamp {stamp:?}")]
    Parse {
        stamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// The timestamp names a local time skipped by a DST transition.
    #[error("timestamp {stamp:?} does not exist in the local time zone")]
    NonexistentLocalTime { stamp: String },
}

/// A validated strftime pattern used for every timestamp in the log.
#[derive(Debug, Clone)]
pub struct TimeFormat {
    pattern: String,
    stamp_len: usize,
}

impl TimeFormat {
    /// Validates `pattern` and measures the width of a formatted timestamp.
    pub fn new(pattern: impl Into<String>) -> Result<Self, TimeFormatError> {
        let pattern = pattern.into();
        if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
            return Err(TimeFormatError::InvalidPattern { pattern });
        }
        let mut format = Self {
            pattern,
            stamp_len: 0,
        };
        format.stamp_len = format.format(Utc::now()).len();
        Ok(format)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Byte length of a formatted timestamp.
    pub const fn stamp_len(&self) -> usize {
        self.stamp_len
    }

    /// Formats `time` in local time.
    pub fn format(&self, time: TimePoint) -> String {
        let mut out = String::new();
        // The pattern was validated in `new`, so writing cannot fail.
        let _ = write!(
            out,
            "{}",
            time.with_timezone(&Local).format(&self.pattern)
        );
        out
    }

    /// Parses a local-time timestamp.
    ///
    /// Ambiguous local times (DST fall-back) resolve to the earlier instant.
    pub fn parse(&self, stamp: &str) -> Result<TimePoint, TimeFormatError> {
        let naive = NaiveDateTime::parse_from_str(stamp, &self.pattern).map_err(|source| {
            TimeFormatError::Parse {
                stamp: stamp.to_string(),
                source,
            }
        })?;
        match Local.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
            LocalResult::None => Err(TimeFormatError::NonexistentLocalTime {
                stamp: stamp.to_string(),
            }),
        }
    }
}

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> TimePoint;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimePoint {
        Utc::now()
    }
}

/// A clock stuck at a single instant. Useful for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub TimePoint);

impl Clock for FixedClock {
    fn now(&self) -> TimePoint {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> TimePoint {
        (**self).now()
    }
}
