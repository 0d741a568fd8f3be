//! Storage layer for the swx activity log.
//!
//! [`TimeLog`] keeps an in-memory cache of a flat, chronological log file and
//! exposes the operations the command layer needs: appending and amending
//! entries, renaming activities, and querying stints and recent history.
//!
//! # Consistency
//!
//! Every mutation runs in a transaction. The cache is loaded on entry and, on
//! success, the whole log is written to a temporary file and atomically
//! renamed over the original. If anything fails before that rename the cache
//! is marked stale and the next call reloads the file, which has not changed.
//! A mutation therefore either takes full effect on disk or none at all.
//!
//! # Concurrency
//!
//! A `TimeLog` is used from one thread at a time and offers no protection
//! against another process editing the same file. Callers sharing a log file
//! across processes must serialize access themselves.

mod error;
mod file;
mod query;
mod transaction;

use std::path::{Path, PathBuf};

use swx_core::{ActivityFilter, Clock, EventStore, Stint, SystemClock, TimeFormat, TimePoint};
use tracing::debug;

pub use error::LogError;

use crate::file::LogFile;
use crate::transaction::Transaction;

/// A cached, transactional view of an activity log file.
#[derive(Debug)]
pub struct TimeLog<C = SystemClock> {
    file: LogFile,
    clock: C,
    store: EventStore,
    loaded: bool,
}

impl TimeLog<SystemClock> {
    /// Opens the log at `path`, reading it lazily on first use.
    pub fn new(path: impl Into<PathBuf>, format: TimeFormat) -> Self {
        Self::with_clock(path, format, SystemClock)
    }
}

impl<C: Clock> TimeLog<C> {
    /// Opens the log at `path` using `clock` as the source of "now".
    pub fn with_clock(path: impl Into<PathBuf>, format: TimeFormat, clock: C) -> Self {
        Self {
            file: LogFile::new(path.into(), format),
            clock,
            store: EventStore::new(),
            loaded: false,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub const fn format(&self) -> &TimeFormat {
        self.file.format()
    }

    /// The current time according to this log's clock.
    pub fn now(&self) -> TimePoint {
        self.clock.now()
    }

    /// Records a switch to `activity` (empty for inactive) at `time`.
    ///
    /// Switching to the activity already in progress changes nothing.
    /// Surrounding whitespace is trimmed from `activity`.
    pub fn append_entry(&mut self, activity: &str, time: TimePoint) -> Result<(), LogError> {
        let activity = checked_activity(activity)?;
        self.transact(|store, now| {
            check_not_future(time, now)?;
            if let Some(last) = store.last() {
                check_not_before(time, last.time)?;
            }
            store.push(activity, time);
            Ok(())
        })
    }

    /// Replaces the newest entry with `activity` at `time`.
    ///
    /// Returns the activity of the replaced entry, or an empty string if the
    /// log was empty (in which case nothing is recorded).
    pub fn amend_last(&mut self, activity: &str, time: TimePoint) -> Result<String, LogError> {
        let activity = checked_activity(activity)?;
        self.transact(|store, now| {
            check_not_future(time, now)?;
            let Some(replaced) = store.pop() else {
                return Ok(String::new());
            };
            if let Some(previous) = store.last() {
                check_not_before(time, previous.time)?;
            }
            store.push(activity, time);
            Ok(replaced)
        })
    }

    /// Rewrites every activity name through `filter.replace(name, new_name)`.
    ///
    /// Entries whose new name repeats the activity of the entry before them are
    /// dropped. Returns the number of entries whose name changed.
    pub fn rename_activity(
        &mut self,
        filter: &(impl ActivityFilter + ?Sized),
        new_name: &str,
    ) -> Result<usize, LogError> {
        self.transact(|store, _now| {
            let total = store.len();
            let mut amended = 0;
            let mut written = 0;
            for read in 0..total {
                let entry = store.entries()[read];
                let old_name = store.activity_of(&entry);
                let replaced = filter.replace(old_name, new_name);
                let renamed = checked_activity(&replaced)?.to_string();
                if renamed != old_name {
                    amended += 1;
                }
                if store.put_at(&renamed, entry.time, written) {
                    written += 1;
                }
            }
            store.truncate(written);
            debug!(amended, dropped = total - written, "renamed activities");
            Ok(amended)
        })
    }

    /// Returns the stints of activities selected by `filter`.
    ///
    /// With `begin`, the stint in progress at `begin` is included and clipped
    /// to start there. With `end`, stints are clipped to finish by `end`.
    pub fn get_stints(
        &mut self,
        filter: &(impl ActivityFilter + ?Sized),
        begin: Option<TimePoint>,
        end: Option<TimePoint>,
    ) -> Result<Vec<Stint>, LogError> {
        self.load()?;
        Ok(query::stints(
            &self.store,
            filter,
            begin,
            end,
            self.clock.now(),
        ))
    }

    /// Returns the newest named activity selected by `filter`.
    pub fn last_activity_to_match(
        &mut self,
        filter: &(impl ActivityFilter + ?Sized),
    ) -> Result<Option<String>, LogError> {
        self.load()?;
        Ok(query::last_activity_to_match(&self.store, filter))
    }

    /// Returns up to `n` distinct recent activities, newest first.
    pub fn last_activities(&mut self, n: usize) -> Result<Vec<String>, LogError> {
        self.load()?;
        Ok(query::last_activities(&self.store, n))
    }

    /// Returns the time of the entry `ago` places back (0 is the newest), or
    /// `None` if the log has no such entry.
    pub fn last_entry_time(&mut self, ago: usize) -> Result<Option<TimePoint>, LogError> {
        self.load()?;
        Ok(query::last_entry_time(&self.store, ago))
    }

    /// Returns true if an activity is currently in progress.
    pub fn is_active(&mut self) -> Result<bool, LogError> {
        self.load()?;
        Ok(query::is_active(&self.store))
    }

    /// Returns true if any entry names `activity`.
    pub fn has_activity(&mut self, activity: &str) -> Result<bool, LogError> {
        self.load()?;
        Ok(self.store.registry().contains(activity))
    }

    /// Returns the loaded store.
    pub fn store(&mut self) -> Result<&EventStore, LogError> {
        self.load()?;
        Ok(&self.store)
    }

    fn transact<T>(
        &mut self,
        mutate: impl FnOnce(&mut EventStore, TimePoint) -> Result<T, LogError>,
    ) -> Result<T, LogError> {
        let now = self.clock.now();
        let mut transaction = Transaction::begin(self)?;
        let value = mutate(transaction.store(), now)?;
        transaction.commit()?;
        Ok(value)
    }

    fn load(&mut self) -> Result<(), LogError> {
        if self.loaded {
            return Ok(());
        }
        self.store.clear();
        self.file.read_into(&mut self.store, self.clock.now())?;
        self.store.debug_assert_valid();
        self.loaded = true;
        debug!(
            path = %self.file.path().display(),
            entries = self.store.len(),
            "loaded time log"
        );
        Ok(())
    }

    fn save(&self) -> Result<(), LogError> {
        self.store.debug_assert_valid();
        self.file.write(&self.store)?;
        debug!(
            path = %self.file.path().display(),
            entries = self.store.len(),
            "saved time log"
        );
        Ok(())
    }

    const fn mark_stale(&mut self) {
        self.loaded = false;
    }
}

/// Trims `activity` to the name a reload of the log would produce.
fn checked_activity(activity: &str) -> Result<&str, LogError> {
    if activity.contains(['\n', '\r']) {
        return Err(LogError::InvalidActivity {
            name: activity.to_string(),
        });
    }
    Ok(activity.trim())
}

fn check_not_future(time: TimePoint, now: TimePoint) -> Result<(), LogError> {
    if time > now {
        return Err(LogError::FutureDatedEntry { time, now });
    }
    Ok(())
}

fn check_not_before(time: TimePoint, previous: TimePoint) -> Result<(), LogError> {
    if time < previous {
        return Err(LogError::EntryBeforePrevious { time, previous });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    use chrono::Duration;
    use swx_core::{AnyActivityFilter, ExactActivityFilter, RegexActivityFilter};

    const PATTERN: &str = "%Y-%m-%dT%H:%M";

    /// A clock that tests can move forward.
    struct TestClock(Cell<TimePoint>);

    impl Clock for TestClock {
        fn now(&self) -> TimePoint {
            self.0.get()
        }
    }

    fn format() -> TimeFormat {
        TimeFormat::new(PATTERN).unwrap()
    }

    fn at(stamp: &str) -> TimePoint {
        format().parse(&format!("2024-01-15T{stamp}")).unwrap()
    }

    fn open(dir: &Path, now: &str) -> TimeLog<TestClock> {
        TimeLog::with_clock(dir.join("log"), format(), TestClock(Cell::new(at(now))))
    }

    fn contents(log: &mut TimeLog<TestClock>) -> Vec<(String, TimePoint)> {
        log.store()
            .unwrap()
            .iter()
            .map(|(name, time)| (name.to_string(), time))
            .collect()
    }

    fn workday(log: &mut TimeLog<TestClock>) {
        log.append_entry("work", at("09:00")).unwrap();
        log.append_entry("lunch", at("12:00")).unwrap();
        log.append_entry("work", at("13:00")).unwrap();
    }

    #[test]
    fn append_persists_to_disk() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        let content = std::fs::read_to_string(temp.path().join("log")).unwrap();
        assert_eq!(
            content,
            "2024-01-15T09:00 work\n2024-01-15T12:00 lunch\n2024-01-15T13:00 work\n"
        );

        let mut reopened = open(temp.path(), "15:00");
        assert_eq!(contents(&mut reopened), contents(&mut log));
    }

    #[test]
    fn append_same_activity_is_a_no_op() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        log.append_entry("work", at("14:00")).unwrap();
        assert_eq!(log.store().unwrap().len(), 3);
        assert_eq!(log.last_entry_time(0).unwrap(), Some(at("13:00")));
    }

    #[test]
    fn append_at_same_time_as_previous_is_accepted() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        log.append_entry("", at("13:00")).unwrap();
        assert_eq!(log.store().unwrap().len(), 4);
    }

    #[test]
    fn future_dated_append_is_rejected_and_rolled_back() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        let err = log.append_entry("late", at("16:00")).unwrap_err();
        assert!(matches!(err, LogError::FutureDatedEntry { .. }), "{err:?}");
        assert_eq!(log.store().unwrap().len(), 3);
        assert!(!log.has_activity("late").unwrap());
    }

    #[test]
    fn append_before_previous_entry_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        let err = log.append_entry("early", at("10:00")).unwrap_err();
        assert!(matches!(err, LogError::EntryBeforePrevious { .. }), "{err:?}");
        assert_eq!(log.store().unwrap().len(), 3);
    }

    #[test]
    fn amend_last_replaces_newest_entry() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        log.append_entry("A", at("09:00")).unwrap();
        log.append_entry("B", at("10:00")).unwrap();

        let replaced = log.amend_last("C", at("11:00")).unwrap();
        assert_eq!(replaced, "B");
        assert_eq!(
            contents(&mut log),
            vec![("A".to_string(), at("09:00")), ("C".to_string(), at("11:00"))]
        );
        assert!(!log.has_activity("B").unwrap());

        let mut reopened = open(temp.path(), "15:00");
        assert_eq!(contents(&mut reopened), contents(&mut log));
    }

    #[test]
    fn amend_last_to_previous_activity_merges() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        log.append_entry("A", at("09:00")).unwrap();
        log.append_entry("B", at("10:00")).unwrap();

        assert_eq!(log.amend_last("A", at("10:00")).unwrap(), "B");
        assert_eq!(contents(&mut log), vec![("A".to_string(), at("09:00"))]);
    }

    #[test]
    fn amend_last_on_empty_log_returns_empty() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        assert_eq!(log.amend_last("A", at("09:00")).unwrap(), "");
        assert!(log.store().unwrap().is_empty());
    }

    #[test]
    fn amend_last_before_preceding_entry_is_rolled_back() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        log.append_entry("A", at("09:00")).unwrap();
        log.append_entry("B", at("10:00")).unwrap();

        let err = log.amend_last("C", at("08:00")).unwrap_err();
        assert!(matches!(err, LogError::EntryBeforePrevious { .. }), "{err:?}");
        // The pop performed before the failure must not be visible.
        assert_eq!(
            contents(&mut log),
            vec![("A".to_string(), at("09:00")), ("B".to_string(), at("10:00"))]
        );
    }

    #[test]
    fn rename_changes_matching_entries() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        let amended = log
            .rename_activity(&ExactActivityFilter::new("lunch"), "break")
            .unwrap();
        assert_eq!(amended, 1);
        assert_eq!(log.last_activities(5).unwrap(), vec!["work", "break", "work"]);
        assert!(!log.has_activity("lunch").unwrap());

        let content = std::fs::read_to_string(temp.path().join("log")).unwrap();
        assert!(content.contains("12:00 break"));
    }

    #[test]
    fn rename_collapses_new_adjacent_duplicates() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        let amended = log
            .rename_activity(&ExactActivityFilter::new("lunch"), "work")
            .unwrap();
        assert_eq!(amended, 1);
        assert_eq!(contents(&mut log), vec![("work".to_string(), at("09:00"))]);
        log.store().unwrap().validate().unwrap();
        assert_eq!(log.store().unwrap().registry().references("work"), 1);
    }

    #[test]
    fn rename_with_regex_substitutes_partially() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        log.append_entry("client-a design", at("09:00")).unwrap();
        log.append_entry("admin", at("10:00")).unwrap();
        log.append_entry("client-a review", at("11:00")).unwrap();

        let filter = RegexActivityFilter::new("^client-a").unwrap();
        assert_eq!(log.rename_activity(&filter, "client-b").unwrap(), 2);
        assert_eq!(
            log.last_activities(3).unwrap(),
            vec!["client-b review", "admin", "client-b design"]
        );
    }

    #[test]
    fn rename_without_matches_changes_nothing() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        let before = contents(&mut log);
        let amended = log
            .rename_activity(&ExactActivityFilter::new("missing"), "x")
            .unwrap();
        assert_eq!(amended, 0);
        assert_eq!(contents(&mut log), before);
    }

    #[test]
    fn activity_with_line_break_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("log");
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);
        let before = std::fs::read_to_string(&path).unwrap();

        let err = log.append_entry("a\nb", at("14:00")).unwrap_err();
        assert!(matches!(err, LogError::InvalidActivity { .. }), "{err:?}");
        let err = log.amend_last("a\r\nb", at("14:00")).unwrap_err();
        assert!(matches!(err, LogError::InvalidActivity { .. }), "{err:?}");
        let err = log
            .rename_activity(&ExactActivityFilter::new("lunch"), "late\nlunch")
            .unwrap_err();
        assert!(matches!(err, LogError::InvalidActivity { .. }), "{err:?}");

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
        let mut reopened = open(temp.path(), "15:00");
        assert_eq!(contents(&mut reopened), contents(&mut log));
        assert!(log.has_activity("lunch").unwrap());
    }

    #[test]
    fn stored_names_match_a_reload() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        log.append_entry("  standup ", at("09:00")).unwrap();
        log.append_entry("work meeting", at("10:00")).unwrap();
        log.amend_last("work meeting\t", at("10:00")).unwrap();

        let filter = RegexActivityFilter::new("work").unwrap();
        assert_eq!(log.rename_activity(&filter, "").unwrap(), 1);
        assert!(log.has_activity("standup").unwrap());
        assert!(log.has_activity("meeting").unwrap());
        assert!(!log.has_activity(" meeting").unwrap());

        let mut reopened = open(temp.path(), "15:00");
        assert_eq!(contents(&mut reopened), contents(&mut log));
    }

    #[test]
    fn stints_through_time_log() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        let stints = log.get_stints(&AnyActivityFilter, None, None).unwrap();
        let durations: Vec<_> = stints.iter().map(|s| s.duration).collect();
        assert_eq!(
            durations,
            vec![Duration::hours(3), Duration::hours(1), Duration::hours(2)]
        );
        assert!(stints[2].ongoing);

        let clipped = log
            .get_stints(&AnyActivityFilter, Some(at("11:00")), None)
            .unwrap();
        assert_eq!(clipped[0].start, at("11:00"));
        assert_eq!(clipped[0].duration, Duration::hours(1));
    }

    #[test]
    fn is_active_and_has_activity() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        assert!(!log.is_active().unwrap());

        workday(&mut log);
        assert!(log.is_active().unwrap());
        assert!(log.has_activity("lunch").unwrap());
        assert!(!log.has_activity("dinner").unwrap());

        log.append_entry("", at("14:00")).unwrap();
        assert!(!log.is_active().unwrap());
    }

    #[test]
    fn panic_inside_transaction_leaves_cache_stale() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<(), LogError> = log.transact(|store, _| {
                store.pop();
                store.push("half-done", at("14:00"));
                panic!("interrupted");
            });
        }));
        assert!(result.is_err());
        assert!(!log.has_activity("half-done").unwrap());
        assert_eq!(log.store().unwrap().len(), 3);
    }

    #[test]
    fn external_edit_after_rollback_is_picked_up() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        let _ = log.append_entry("late", at("16:00"));
        std::fs::write(temp.path().join("log"), "2024-01-15T08:00 edited\n").unwrap();
        assert_eq!(log.last_activities(1).unwrap(), vec!["edited"]);
    }

    #[test]
    fn corrupt_file_fails_every_operation_without_modifying_it() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("log");
        let corrupt = "2024-01-15T10:00 b\n2024-01-15T09:00 a\n";
        std::fs::write(&path, corrupt).unwrap();

        let mut log = open(temp.path(), "15:00");
        let err = log.append_entry("c", at("11:00")).unwrap_err();
        assert!(matches!(err, LogError::OrderViolation { line: 2 }), "{err:?}");
        assert!(log.is_active().is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), corrupt);
    }

    #[test]
    fn clock_moving_forward_extends_ongoing_stint() {
        let temp = tempfile::tempdir().unwrap();
        let mut log = open(temp.path(), "15:00");
        workday(&mut log);

        log.clock.0.set(at("16:00"));
        let stints = log.get_stints(&AnyActivityFilter, None, None).unwrap();
        assert_eq!(stints[2].duration, Duration::hours(3));
    }
}
