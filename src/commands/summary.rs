//! The `summary` command: the dashboard figures in text form.

use crate::aggregate::{to_f64, DashboardSummary};
use crate::animation::{Animator, FrameClock, SystemClock};
use crate::api::Mode;
use crate::args::SummaryArgs;
use crate::commands::{format_value, open, Out};
use crate::model::{Category, Unit};
use crate::{Config, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;
use tracing::trace;

/// What the dashboard counters end on after animating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Counted {
    pub year_to_date: f64,
    pub goal_percent: Option<f64>,
    pub frames: u64,
}

/// Computes the dashboard summary as of `today`.
///
/// With `args.animate` the year-to-date counter and goal ring are driven to their targets on the
/// configured frame interval before the summary is returned, and each frame is traced.
pub async fn summary(
    config: Config,
    mode: Mode,
    args: SummaryArgs,
    today: NaiveDate,
) -> Result<Out<DashboardSummary>> {
    let repo = open(&config, mode).await?;
    let snapshot = repo.snapshot();
    let summary = DashboardSummary::compute(
        &snapshot,
        today,
        args.year.unwrap_or_else(|| today.year()),
        args.category,
        args.months.unwrap_or_else(|| config.trend_months()),
        args.goal,
    );

    let mut message = render(&summary);
    if args.animate {
        let counted = animate(&config, &summary, &SystemClock::new()).await;
        let _ = writeln!(message, "Animated over {} frames", counted.frames);
    }
    Ok(Out::new(message, summary))
}

/// Counts the year-to-date figure and goal ring up from zero.
pub(crate) async fn animate(
    config: &Config,
    summary: &DashboardSummary,
    clock: &impl FrameClock,
) -> Counted {
    let mut animator = Animator::new();
    let counter = animator.add_counter(config.counter_duration());
    let ring = animator.add_ring(config.counter_duration(), *config.chart());

    let start = clock.now();
    let _ = animator.set_target(counter, to_f64(summary.year_to_date), start);
    if let Some(goal) = &summary.goal {
        let _ = animator.set_target(ring, goal.percent, start);
    }

    let frames = animator.run(clock, config.frame_interval()).await;
    let year_to_date = animator
        .counter(counter)
        .map(|c| c.displayed())
        .unwrap_or_default();
    let goal_percent = summary
        .goal
        .as_ref()
        .and_then(|_| animator.ring(ring))
        .map(|r| r.percent());
    trace!("Counter settled on {year_to_date}, ring on {goal_percent:?}");
    Counted {
        year_to_date,
        goal_percent,
        frames,
    }
}

fn render(summary: &DashboardSummary) -> String {
    let unit = summary.category.map(|c| c.unit());
    let scope = summary
        .category
        .map(|c| c.label().to_string())
        .unwrap_or_else(|| "All categories".to_string());

    let mut s = String::new();
    let _ = writeln!(s, "Resource distribution as of {}", summary.today);
    let _ = writeln!(s);
    for category in Category::ALL {
        let total = summary.totals.get(&category).copied().unwrap_or_default();
        let count = summary.counts.get(&category).copied().unwrap_or_default();
        let _ = writeln!(
            s,
            "  {:<20} {:>14}  ({count} entries)",
            category.label(),
            format_value(category.unit(), total)
        );
    }
    let _ = writeln!(
        s,
        "  {:<20} {:>14}",
        "Items distributed",
        format_value(Unit::Quantity, summary.items())
    );
    let _ = writeln!(
        s,
        "  {:<20} {:>14}",
        "Dollars of support",
        format_value(Unit::Dollars, summary.dollars())
    );

    let _ = writeln!(s);
    let _ = writeln!(s, "{scope}, {}:", summary.year);
    let shown = |v: Decimal| match unit {
        Some(u) => format_value(u, v),
        None => v.to_string(),
    };
    for (month, value) in summary.months.iter().enumerate() {
        if !value.is_zero() {
            let label = NaiveDate::from_ymd_opt(summary.year, month as u32 + 1, 1)
                .map(|d| d.format("%B").to_string())
                .unwrap_or_default();
            let _ = writeln!(s, "  {label:<12} {:>14}", shown(*value));
        }
    }
    let _ = writeln!(s, "  {:<12} {:>14}", "Year to date", shown(summary.year_to_date));
    let _ = writeln!(s, "  {:<12} {:>14}", "Clients", summary.distinct_clients);
    if let Some(goal) = &summary.goal {
        let _ = writeln!(
            s,
            "  {:<12} {:>13.1}% of {}",
            "Goal",
            goal.percent,
            shown(goal.goal)
        );
    }

    if !summary.trend.is_empty() {
        let _ = writeln!(s);
        let _ = writeln!(s, "Trend:");
        for point in &summary.trend {
            let _ = writeln!(s, "  {:<12} {:>14}", point.label, shown(point.value));
        }
    }
    s
}
