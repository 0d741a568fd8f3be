use std::io;

use swx_core::{TimeFormatError, TimePoint};
use thiserror::Error;

/// Errors reading, validating or writing the activity log.
///
/// Every error aborts the current operation. The log file on disk is left as
/// it was before the operation started.
#[derive(Debug, Error)]
pub enum LogError {
    /// A line of the log file could not be parsed.
    #[error("error parsing the time log at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The timestamp on a line of the log file is invalid.
    #[error("error parsing the time log at line {line}")]
    Timestamp {
        line: usize,
        #[source]
        source: TimeFormatError,
    },

    /// A line of the log file is dated earlier than the line before it.
    #[error("time log entries out of order at line {line}")]
    OrderViolation { line: usize },

    /// The final entry of the log file is dated after the current time.
    #[error("the final entry in the time log is future-dated; future-dated entries are not supported")]
    FutureDated,

    /// A new entry was dated after the current time.
    #[error("entry must not be future-dated: {time} is after {now}")]
    FutureDatedEntry { time: TimePoint, now: TimePoint },

    /// A new entry was dated before the entry it would follow.
    #[error("entry at {time} would precede the previous entry at {previous}")]
    EntryBeforePrevious { time: TimePoint, previous: TimePoint },

    /// An activity name cannot be stored on a single log line.
    #[error("invalid activity name {name:?}: activity names must not contain line breaks")]
    InvalidActivity { name: String },

    /// Reading or replacing the log file failed.
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: io::Error,
    },
}

impl LogError {
    pub(crate) fn io(context: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::Io { context, source }
    }
}
