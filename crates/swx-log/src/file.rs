//! The on-disk log file.
//!
//! # Format
//!
//! UTF-8 text, one entry per line: `<timestamp> <activity>`, or a bare
//! `<timestamp>` for the inactive sentinel. Every timestamp has the width of a
//! sample time point formatted with the configured pattern; the rest of the
//! line, trimmed, is the activity name.
//!
//! # Atomicity
//!
//! The file is never edited in place. [`LogFile::write`] writes the whole log
//! to a temporary file in the same directory and renames it over the log. A
//! crash before the rename leaves the original untouched.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use swx_core::{EventStore, TimeFormat, TimePoint};
use tempfile::NamedTempFile;

use crate::error::LogError;

#[derive(Debug)]
pub(crate) struct LogFile {
    path: PathBuf,
    format: TimeFormat,
}

impl LogFile {
    pub(crate) const fn new(path: PathBuf, format: TimeFormat) -> Self {
        Self { path, format }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) const fn format(&self) -> &TimeFormat {
        &self.format
    }

    /// Fills `store` from the log file. A missing file is an empty log.
    ///
    /// `store` must be empty. On error it is left partially filled and the
    /// caller is expected to discard it.
    pub(crate) fn read_into(&self, store: &mut EventStore, now: TimePoint) -> Result<(), LogError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(LogError::io("failed to read time log")(e)),
        };

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;
            let (activity, time) = self.parse_line(line, line_number)?;
            if store.last().is_some_and(|last| time < last.time) {
                return Err(LogError::OrderViolation { line: line_number });
            }
            store.push(activity, time);
        }

        if store.last().is_some_and(|last| last.time > now) {
            return Err(LogError::FutureDated);
        }
        Ok(())
    }

    /// Replaces the log file with the contents of `store`.
    pub(crate) fn write(&self, store: &EventStore) -> Result<(), LogError> {
        let mut content = String::new();
        for (activity, time) in store.iter() {
            content.push_str(&self.format.format(time));
            if !activity.is_empty() {
                content.push(' ');
                content.push_str(activity);
            }
            content.push('\n');
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Created readable and writable by the owner only; deleted on drop
        // unless persisted.
        let mut temp = NamedTempFile::new_in(dir).map_err(LogError::io("error opening temp file"))?;
        temp.write_all(content.as_bytes())
            .map_err(LogError::io("error writing temp file"))?;
        temp.as_file()
            .sync_all()
            .map_err(LogError::io("error syncing temp file"))?;
        temp.persist(&self.path)
            .map_err(|e| LogError::io("error renaming temp file")(e.error))?;
        Ok(())
    }

    fn parse_line<'a>(&self, line: &'a str, line_number: usize) -> Result<(&'a str, TimePoint), LogError> {
        let width = self.format.stamp_len();
        if line.len() < width {
            return Err(LogError::Parse {
                line: line_number,
                reason: format!("expected a timestamp of {width} characters"),
            });
        }
        let Some((stamp, rest)) = line.split_at_checked(width) else {
            return Err(LogError::Parse {
                line: line_number,
                reason: "timestamp is not valid text".to_string(),
            });
        };
        let time = self
            .format
            .parse(stamp)
            .map_err(|source| LogError::Timestamp {
                line: line_number,
                source,
            })?;
        Ok((rest.trim(), time))
    }
}
