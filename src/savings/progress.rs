//! Progress towards the shared savings target and the history of
//! contributions per month.

use std::collections::BTreeMap;

use time::{Date, Month};

use crate::savings::saving::Saving;

/// The target used until the partners set their own.
pub const DEFAULT_TARGET: f64 = 100_000_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GoalProgress {
    /// The sum of every contribution.
    pub current: f64,
    pub target: f64,
    /// How much of the target has been saved, between 0 and 100.
    pub percent: f64,
    /// How much is still needed, never negative.
    pub remaining: f64,
    pub monthly_goal: f64,
    /// Months needed to save `remaining` at `monthly_goal` per month, or zero
    /// when there is no monthly goal.
    pub months_left: u32,
    /// When the target will be reached at `monthly_goal` per month, if there
    /// is a monthly goal.
    pub estimated_completion: Option<Date>,
}

impl GoalProgress {
    /// Work out the progress of `savings` towards `target`.
    ///
    /// A missing or non-positive target falls back to [DEFAULT_TARGET].
    pub fn new(
        savings: &[Saving],
        target: Option<f64>,
        monthly_goal: Option<f64>,
        today: Date,
    ) -> Self {
        let current: f64 = savings.iter().map(|saving| saving.amount).sum();
        let target = target
            .filter(|target| *target > 0.0)
            .unwrap_or(DEFAULT_TARGET);
        let monthly_goal = monthly_goal.unwrap_or(0.0).max(0.0);

        let percent = (current / target * 100.0).clamp(0.0, 100.0);
        let remaining = (target - current).max(0.0);

        let (months_left, estimated_completion) = if monthly_goal > 0.0 {
            let months_left = (remaining / monthly_goal).ceil() as u32;
            (months_left, add_months(today, months_left))
        } else {
            (0, None)
        };

        Self {
            current,
            target,
            percent,
            remaining,
            monthly_goal,
            months_left,
            estimated_completion,
        }
    }
}

/// Move `date` forward by `months` calendar months, keeping the day of the
/// month where possible and otherwise using the last day of the month.
///
/// Returns `None` if the result is past the last supported year.
pub fn add_months(date: Date, months: u32) -> Option<Date> {
    let month_index = date.month() as i64 - 1 + i64::from(months);
    let year = i32::try_from(i64::from(date.year()) + month_index / 12).ok()?;
    let month = Month::try_from((month_index % 12) as u8 + 1).ok()?;

    (1..=date.day())
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())
}

/// The contributions of one calendar month, split by who made them.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyContribution {
    /// The month as "YYYY-MM".
    pub label: String,
    pub mine: f64,
    pub partner: f64,
}

/// Sum `savings` per calendar month, oldest month first, splitting the
/// contributions of `own_email` from the partner's.
pub fn contribution_history(savings: &[Saving], own_email: &str) -> Vec<MonthlyContribution> {
    let mut months: BTreeMap<(i32, u8), (f64, f64)> = BTreeMap::new();

    for saving in savings {
        let key = (saving.date.year(), saving.date.month() as u8);
        let (mine, partner) = months.entry(key).or_default();

        if saving.saver_email.eq_ignore_ascii_case(own_email) {
            *mine += saving.amount;
        } else {
            *partner += saving.amount;
        }
    }

    months
        .into_iter()
        .map(|((year, month), (mine, partner))| MonthlyContribution {
            label: format!("{year}-{month:02}"),
            mine,
            partner,
        })
        .collect()
}
