//! Print command for listing stints.

use std::io::Write;

use anyhow::{Context, Result};
use swx_core::{
    ActivityFilter, AnyActivityFilter, Clock, ExactActivityFilter, RegexActivityFilter, Stint,
};
use swx_log::TimeLog;

use crate::Config;
use crate::cli::PrintArgs;
use crate::commands::util::{activity_name, format_duration, parse_time};

pub fn run<W: Write, C: Clock>(
    writer: &mut W,
    log: &mut TimeLog<C>,
    config: &Config,
    args: &PrintArgs,
) -> Result<()> {
    let now = log.now();
    let begin = args
        .begin
        .as_deref()
        .map(|s| parse_time(s, log.format(), &config.short_time_format, now))
        .transpose()?;
    let end = args
        .end
        .as_deref()
        .map(|s| parse_time(s, log.format(), &config.short_time_format, now))
        .transpose()?;

    let activity = activity_name(&args.activity);
    let filter: Box<dyn ActivityFilter> = if activity.is_empty() {
        Box::new(AnyActivityFilter)
    } else if args.regex {
        Box::new(
            RegexActivityFilter::new(&activity)
                .with_context(|| format!("invalid regular expression: {activity}"))?,
        )
    } else {
        Box::new(ExactActivityFilter::new(activity))
    };

    let stints: Vec<Stint> = log
        .get_stints(filter.as_ref(), begin, end)?
        .into_iter()
        .filter(|stint| !stint.activity.is_empty())
        .collect();

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&stints)?)?;
        return Ok(());
    }

    if stints.is_empty() {
        writeln!(writer, "No activity recorded.")?;
        return Ok(());
    }

    let format = log.format();
    for stint in &stints {
        writeln!(
            writer,
            "{} {} {:>7} {}{}",
            format.format(stint.start),
            format.format(stint.end()),
            format_duration(stint.duration),
            stint.activity,
            if stint.ongoing { " *" } else { "" }
        )?;
    }

    Ok(())
}
