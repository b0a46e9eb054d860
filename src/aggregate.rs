//! Derived, read-only views over a `Snapshot`.
//!
//! Nothing here keeps running totals. Every function walks the entries it is given once and
//! returns an owned value, so an aggregate always matches the snapshot it was computed from.

use crate::model::{Category, Entry, Unit};
use crate::repo::Snapshot;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The sum of each category's value field. Every category is present, empty ones as zero.
pub fn total_by_category(snapshot: &Snapshot) -> BTreeMap<Category, Decimal> {
    Category::ALL
        .into_iter()
        .map(|category| (category, sum(snapshot.entries(category))))
        .collect()
}

/// The number of entries in each category. Every category is present.
pub fn count_by_category(snapshot: &Snapshot) -> BTreeMap<Category, usize> {
    Category::ALL
        .into_iter()
        .map(|category| (category, snapshot.entries(category).len()))
        .collect()
}

/// Twelve buckets, January first, summing the entries dated in `year`. With `None` every category
/// is summed, which mixes quantities and dollars; callers that display the result usually pick a
/// category.
pub fn total_by_month(snapshot: &Snapshot, year: i32, category: Option<Category>) -> [Decimal; 12] {
    let mut months = [Decimal::ZERO; 12];
    for entry in snapshot.select(category) {
        let date = entry.date();
        if date.year() == year {
            months[date.month0() as usize] += entry.value();
        }
    }
    months
}

/// The sum of entries dated from January 1st of `today`'s year through `today`, inclusive.
pub fn year_to_date(snapshot: &Snapshot, today: NaiveDate, category: Option<Category>) -> Decimal {
    snapshot
        .select(category)
        .filter(|e| e.date().year() == today.year() && e.date() <= today)
        .map(Entry::value)
        .sum()
}

/// The longest trend window, one hundred years. Larger windows are shortened to this.
pub const MAX_TREND_MONTHS: u32 = 1200;

/// One month of a trend series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// For example `"Mar 2026"`.
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub value: Decimal,
}

/// The last `window_months` calendar months ending with `today`'s month, oldest first. Months
/// without entries are present with a zero value. Entries dated after `today` in the current month
/// are counted; the window is by month, not by day. Windows over `MAX_TREND_MONTHS` are capped.
pub fn trend(
    snapshot: &Snapshot,
    today: NaiveDate,
    window_months: u32,
    category: Option<Category>,
) -> Vec<TrendPoint> {
    if window_months == 0 {
        return Vec::new();
    }
    let window_months = window_months.min(MAX_TREND_MONTHS);
    let last = month_index(today);
    let first = last - i64::from(window_months) + 1;

    let mut buckets = vec![Decimal::ZERO; window_months as usize];
    for entry in snapshot.select(category) {
        let index = month_index(entry.date());
        if (first..=last).contains(&index) {
            buckets[(index - first) as usize] += entry.value();
        }
    }

    buckets
        .into_iter()
        .enumerate()
        .map(|(offset, value)| {
            let index = first + offset as i64;
            let year = index.div_euclid(12) as i32;
            let month = index.rem_euclid(12) as u32 + 1;
            TrendPoint {
                label: month_label(year, month),
                year,
                month,
                value,
            }
        })
        .collect()
}

/// The number of distinct clients (or donors) across the selected entries. Names are compared
/// ignoring case and surrounding whitespace.
pub fn distinct_subjects(snapshot: &Snapshot, category: Option<Category>) -> usize {
    snapshot
        .select(category)
        .map(|e| e.subject().trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .len()
}

/// A category's value field grouped by the entries' sub-type (see `Entry::kind_label`), in the
/// order each sub-type first appears.
pub fn breakdown(snapshot: &Snapshot, category: Category) -> Vec<(String, Decimal)> {
    let mut groups: Vec<(String, Decimal)> = Vec::new();
    for entry in snapshot.entries(category) {
        let label = entry.kind_label();
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, total)) => *total += entry.value(),
            None => groups.push((label, entry.value())),
        }
    }
    groups
}

/// How far a year-to-date total is toward a goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub goal: Decimal,
    pub achieved: Decimal,
    /// Unclamped; the ring clamps when it renders.
    pub percent: f64,
}

impl GoalProgress {
    pub fn new(goal: Decimal, achieved: Decimal) -> Self {
        let percent = if goal.is_zero() {
            0.0
        } else {
            to_f64(achieved * Decimal::ONE_HUNDRED / goal)
        };
        Self {
            goal,
            achieved,
            percent,
        }
    }
}

/// Everything the dashboard view reads, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub today: NaiveDate,
    pub year: i32,
    pub category: Option<Category>,
    pub totals: BTreeMap<Category, Decimal>,
    pub counts: BTreeMap<Category, usize>,
    pub months: [Decimal; 12],
    pub year_to_date: Decimal,
    pub trend: Vec<TrendPoint>,
    pub distinct_clients: usize,
    pub goal: Option<GoalProgress>,
}

impl DashboardSummary {
    /// `category` narrows the monthly, year-to-date, trend and client figures. Totals and counts
    /// always cover every category. `goal` is compared with the year-to-date figure.
    pub fn compute(
        snapshot: &Snapshot,
        today: NaiveDate,
        year: i32,
        category: Option<Category>,
        window_months: u32,
        goal: Option<Decimal>,
    ) -> Self {
        let year_to_date = year_to_date(snapshot, today, category);
        Self {
            today,
            year,
            category,
            totals: total_by_category(snapshot),
            counts: count_by_category(snapshot),
            months: total_by_month(snapshot, year, category),
            year_to_date,
            trend: trend(snapshot, today, window_months, category),
            distinct_clients: distinct_subjects(snapshot, category),
            goal: goal.map(|g| GoalProgress::new(g, year_to_date)),
        }
    }

    /// The grand total of the dollar-valued categories.
    pub fn dollars(&self) -> Decimal {
        self.totals
            .iter()
            .filter(|(c, _)| c.unit() == Unit::Dollars)
            .map(|(_, v)| *v)
            .sum()
    }

    /// The grand total of the quantity-valued categories.
    pub fn items(&self) -> Decimal {
        self.totals
            .iter()
            .filter(|(c, _)| c.unit() == Unit::Quantity)
            .map(|(_, v)| *v)
            .sum()
    }
}

fn sum(entries: &[Entry]) -> Decimal {
    entries.iter().map(Entry::value).sum()
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{month:02}/{year}"))
}

pub(crate) fn to_f64(value: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    value.to_f64().unwrap_or(0.0)
}
