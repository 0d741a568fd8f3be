//! Read-only queries over a loaded event store.

use swx_core::{ActivityFilter, EventStore, Stint, TimePoint};

/// Returns up to `n` recent activities, newest first.
///
/// Inactive entries are skipped, and an activity is not repeated while it
/// equals the most recently collected one.
pub(crate) fn last_activities(store: &EventStore, n: usize) -> Vec<String> {
    let mut collected: Vec<String> = Vec::new();
    for (activity, _) in store.iter().rev() {
        if collected.len() == n {
            break;
        }
        if !activity.is_empty() && collected.last().is_none_or(|last| last != activity) {
            collected.push(activity.to_string());
        }
    }
    collected
}

/// Returns the time of the entry `ago` places from the end (0 is the newest).
pub(crate) fn last_entry_time(store: &EventStore, ago: usize) -> Option<TimePoint> {
    store.entries().iter().rev().nth(ago).map(|entry| entry.time)
}

/// Returns true if the newest entry names an activity.
pub(crate) fn is_active(store: &EventStore) -> bool {
    store
        .last()
        .is_some_and(|last| !store.activity_of(last).is_empty())
}

/// Finds the entry in progress at `time`.
///
/// This is the greatest index whose time does not exceed `time`, so among
/// entries sharing a time the last one wins. Returns `None` if `time` precedes
/// every entry.
pub(crate) fn find_just_before(store: &EventStore, time: TimePoint) -> Option<usize> {
    store
        .entries()
        .partition_point(|entry| entry.time <= time)
        .checked_sub(1)
}

/// Computes the stints of activities selected by `filter`, clipped to
/// `[begin, end)` where given.
pub(crate) fn stints(
    store: &EventStore,
    filter: &(impl ActivityFilter + ?Sized),
    begin: Option<TimePoint>,
    end: Option<TimePoint>,
    now: TimePoint,
) -> Vec<Stint> {
    let entries = store.entries();
    let first = begin.map_or(0, |begin| find_just_before(store, begin).unwrap_or(0));

    let mut stints = Vec::new();
    for (index, entry) in entries.iter().enumerate().skip(first) {
        if end.is_some_and(|end| entry.time >= end) {
            break;
        }
        let activity = store.activity_of(entry);
        if !filter.matches(activity) {
            continue;
        }

        let start = begin.map_or(entry.time, |begin| entry.time.max(begin));
        let next = entries.get(index + 1);
        let mut stop = next.map_or_else(|| now.max(start), |next| next.time);
        let mut clipped = false;
        if let Some(end) = end {
            if stop > end {
                stop = end;
                clipped = true;
            }
        }
        let stop = stop.max(start);

        stints.push(Stint {
            activity: activity.to_string(),
            start,
            duration: stop - start,
            ongoing: next.is_none() && !clipped && !activity.is_empty(),
        });
    }
    stints
}

/// Returns the newest named activity selected by `filter`.
pub(crate) fn last_activity_to_match(
    store: &EventStore,
    filter: &(impl ActivityFilter + ?Sized),
) -> Option<String> {
    store
        .iter()
        .rev()
        .map(|(activity, _)| activity)
        .find(|activity| !activity.is_empty() && filter.matches(activity))
        .map(str::to_string)
}
