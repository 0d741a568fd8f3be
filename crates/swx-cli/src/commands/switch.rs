//! Switch command for recording a change of activity.

use std::io::Write;

use anyhow::{Context, Result};
use swx_core::{Clock, RegexActivityFilter};
use swx_log::TimeLog;

use crate::Config;
use crate::cli::SwitchArgs;
use crate::commands::util::{activity_name, parse_time};

pub fn run<W: Write, C: Clock>(
    writer: &mut W,
    log: &mut TimeLog<C>,
    config: &Config,
    args: &SwitchArgs,
) -> Result<()> {
    let now = log.now();
    let time = match &args.at {
        Some(at) => parse_time(at, log.format(), &config.short_time_format, now)?,
        None => now,
    };

    let mut activity = activity_name(&args.activity);
    if args.regex {
        let filter = RegexActivityFilter::new(&activity)
            .with_context(|| format!("invalid regular expression: {activity}"))?;
        activity = log
            .last_activity_to_match(&filter)?
            .with_context(|| format!("no activity matches {activity:?}"))?;
    } else if !activity.is_empty() && !args.create && !log.has_activity(&activity)? {
        anyhow::bail!("no such activity: {activity:?}. Use --create to start a new activity.");
    }

    let stamp = log.format().format(time);
    if args.amend {
        let replaced = log.amend_last(&activity, time)?;
        tracing::debug!(%replaced, %activity, "amended last entry");
        match (replaced.is_empty(), activity.is_empty()) {
            (_, true) => writeln!(writer, "Amended last entry to inactive at {stamp}")?,
            (true, false) => writeln!(writer, "Amended last entry to {activity} at {stamp}")?,
            (false, false) => writeln!(writer, "Amended {replaced} to {activity} at {stamp}")?,
        }
    } else {
        log.append_entry(&activity, time)?;
        if activity.is_empty() {
            writeln!(writer, "Stopped at {stamp}")?;
        } else {
            writeln!(writer, "Switched to {activity} at {stamp}")?;
        }
    }

    Ok(())
}
