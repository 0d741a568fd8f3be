//! Rename command for rewriting activity names across the log.

use std::io::Write;

use anyhow::{Context, Result};
use swx_core::{ActivityFilter, Clock, ExactActivityFilter, RegexActivityFilter};
use swx_log::TimeLog;

/// Runs the rename command.
pub fn run<W: Write, C: Clock>(
    writer: &mut W,
    log: &mut TimeLog<C>,
    old: &str,
    new: &str,
    regex: bool,
) -> Result<()> {
    let old = old.trim();
    let new = new.trim();
    let filter: Box<dyn ActivityFilter> = if regex {
        Box::new(
            RegexActivityFilter::new(old)
                .with_context(|| format!("invalid regular expression: {old}"))?,
        )
    } else {
        if !log.has_activity(old)? {
            anyhow::bail!("no such activity: {old:?}");
        }
        Box::new(ExactActivityFilter::new(old))
    };

    let amended = log.rename_activity(filter.as_ref(), new)?;
    let noun = if amended == 1 { "entry" } else { "entries" };
    writeln!(writer, "Renamed {amended} {noun}")?;
    Ok(())
}
