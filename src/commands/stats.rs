use anyhow::{Result, bail};
use colored::Colorize;
use fitlog::{MonthKey, TimeRangeStats, aggregate, stats::week_start};
use itertools::Itertools;

use crate::{
    cli::{StatsArgs, StatsView},
    commands::{Env, OutputFmt, emit, log::print_record, today},
};

const MAX_BAR: usize = 40;

fn bar_width() -> usize {
    // label column + count column take roughly 16 characters
    term_size::dimensions()
        .map(|(w, _)| w.saturating_sub(16).clamp(10, MAX_BAR))
        .unwrap_or(MAX_BAR)
}

/// Total, then one bar per body part (most trained first), then the records.
fn print_range(title: &str, stats: &TimeRangeStats, with_records: bool) {
    println!("\n{}", title.bold().cyan());
    println!("  训练了{}次", stats.total_sessions.to_string().bold());

    let widest = stats.parts.values().copied().max().unwrap_or(0);
    let width = bar_width();
    for (part, count) in stats
        .parts
        .iter()
        .sorted_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)))
    {
        let len = if widest == 0 { 0 } else { (count * width).div_ceil(widest) };
        println!("  {:<4} {} {}", part.to_string(), "█".repeat(len).green(), count);
    }

    if with_records && !stats.records.is_empty() {
        println!();
        for r in &stats.records {
            print_record(r);
        }
    }
}

pub async fn handle(args: StatsArgs, env: &Env) -> Result<()> {
    let mut source = env.source().await?;
    let records = source.list(None, None).await?;

    let today = args.today.unwrap_or_else(today);
    let stats = aggregate(&records, today);

    if let (Some(year), Some(month)) = (args.year, args.month) {
        let Some(key) = MonthKey::new(year, month) else {
            bail!("month must be between 1 and 12");
        };
        match stats.month(year, month) {
            Some(m) => emit(env.fmt, m, || print_range(&key.to_string(), m, true))?,
            None if env.fmt == OutputFmt::Json => emit(env.fmt, &TimeRangeStats::default(), || {})?,
            None => println!("{} no records in {}", "info:".blue().bold(), key),
        }
        return Ok(());
    }

    match args.view {
        StatsView::Week => {
            let title = format!("本周 (since {})", week_start(today).format("%Y-%m-%d"));
            emit(env.fmt, &stats.current_week, || {
                print_range(&title, &stats.current_week, true)
            })?;
        }
        StatsView::Month => {
            let title = format!("本月 {}", MonthKey::of(today));
            emit(env.fmt, &stats.current_month, || {
                print_range(&title, &stats.current_month, true)
            })?;
        }
        StatsView::History => {
            emit(env.fmt, &stats.monthly, || {
                if stats.monthly.is_empty() {
                    println!("{}", "(no records)".dimmed());
                }
                for (key, month) in stats.months_newest_first() {
                    print_range(&key.to_string(), month, false);
                }
            })?;
        }
    }

    Ok(())
}
