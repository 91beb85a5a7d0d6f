//! The month or year shown on the expenses page and the date range it covers.

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::Error;

/// Abbreviated month names in calendar order.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Which summary the expenses page shows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Monthly,
    Yearly,
}

impl Tab {
    pub fn as_query_value(self) -> &'static str {
        match self {
            Tab::Monthly => "monthly",
            Tab::Yearly => "yearly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Monthly => "Monthly",
            Tab::Yearly => "Yearly",
        }
    }
}

/// The query string accepted by the expenses page.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub tab: Option<Tab>,
    pub year: Option<i32>,
    /// 1 for January through 12 for December.
    pub month: Option<u8>,
}

/// A half-open range of dates, `start <= date < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

/// The tab, year and month selected on the expenses page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub tab: Tab,
    pub year: i32,
    pub month: Month,
}

impl Period {
    /// Fill in anything missing from `query` with `today`.
    ///
    /// A month outside 1..=12 is ignored.
    pub fn resolve(query: &PeriodQuery, today: Date) -> Self {
        let month = match query.month.map(Month::try_from) {
            Some(Ok(month)) => month,
            Some(Err(_)) => {
                tracing::warn!("Ignoring invalid month {:?} in query", query.month);
                today.month()
            }
            None => today.month(),
        };

        Self {
            tab: query.tab.unwrap_or_default(),
            year: query.year.unwrap_or(today.year()),
            month,
        }
    }

    /// The dates covered by the selected tab.
    pub fn range(&self) -> Result<DateRange, Error> {
        match self.tab {
            Tab::Monthly => month_range(self.year, self.month),
            Tab::Yearly => year_range(self.year),
        }
    }

    /// The query string for the same month with `tab` selected.
    pub fn query_for_tab(&self, tab: Tab) -> String {
        format!(
            "tab={}&year={}&month={}",
            tab.as_query_value(),
            self.year,
            self.month as u8
        )
    }
}

/// The first day of `month` up to, but not including, the first day of the
/// following month.
pub fn month_range(year: i32, month: Month) -> Result<DateRange, Error> {
    let start = first_of_month(year, month)?;
    let end = match month {
        Month::December => first_of_month(year + 1, Month::January)?,
        month => first_of_month(year, month.next())?,
    };

    Ok(DateRange { start, end })
}

/// January 1st of `year` up to, but not including, January 1st of the next year.
pub fn year_range(year: i32) -> Result<DateRange, Error> {
    Ok(DateRange {
        start: first_of_month(year, Month::January)?,
        end: first_of_month(year + 1, Month::January)?,
    })
}

fn first_of_month(year: i32, month: Month) -> Result<Date, Error> {
    Date::from_calendar_date(year, month, 1)
        .map_err(|_| Error::InvalidDate(format!("{year}-{:02}", month as u8)))
}

/// The years offered by the year picker: two years back to one year ahead of
/// `current_year`, plus `selected_year` if it falls outside that window.
pub fn year_options(current_year: i32, selected_year: i32) -> Vec<i32> {
    let mut years: Vec<i32> = (current_year - 2..=current_year + 1).collect();

    if !years.contains(&selected_year) {
        years.push(selected_year);
        years.sort_unstable();
    }

    years
}
