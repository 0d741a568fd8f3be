//! Status commands for showing the current and recent activities.

use std::io::Write;

use anyhow::Result;
use swx_core::Clock;
use swx_log::TimeLog;

use crate::commands::util::format_duration;

/// Shows the activity in progress and how long it has been running.
pub fn current<W: Write, C: Clock>(writer: &mut W, log: &mut TimeLog<C>) -> Result<()> {
    if !log.is_active()? {
        writeln!(writer, "Inactive")?;
        return Ok(());
    }

    let activity = log.last_activities(1)?.into_iter().next().unwrap_or_default();
    let since = log.last_entry_time(0)?.unwrap_or_else(|| log.now());
    let elapsed = log.now() - since;
    writeln!(
        writer,
        "{activity} (since {}, {})",
        log.format().format(since),
        format_duration(elapsed)
    )?;
    Ok(())
}

/// Lists up to `count` recent activities, newest first.
pub fn recent<W: Write, C: Clock>(writer: &mut W, log: &mut TimeLog<C>, count: usize) -> Result<()> {
    let activities = log.last_activities(count)?;
    if activities.is_empty() {
        writeln!(writer, "No activity recorded.")?;
        return Ok(());
    }
    for activity in activities {
        writeln!(writer, "{activity}")?;
    }
    Ok(())
}
