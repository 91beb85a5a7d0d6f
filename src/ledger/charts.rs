//! The yearly income versus expenses chart.

use crate::{
    charts::{BarSeries, PageChart, grouped_bar_chart},
    ledger::aggregation::MonthBucket,
};

pub const INCOME_EXPENSE_CHART_ID: &str = "income-expense-chart";

/// A bar chart with an income and an expense bar for each month of `year`.
pub fn income_expense_chart(year: i32, buckets: &[MonthBucket; 12]) -> PageChart {
    let labels = buckets
        .iter()
        .map(|bucket| bucket.label.to_owned())
        .collect();

    let chart = grouped_bar_chart(
        &format!("Income vs Expenses ({year})"),
        labels,
        vec![
            BarSeries {
                name: "Income",
                color: "#16a34a",
                values: buckets.iter().map(|bucket| bucket.totals.income).collect(),
            },
            BarSeries {
                name: "Expenses",
                color: "#dc2626",
                values: buckets.iter().map(|bucket| bucket.totals.expense).collect(),
            },
        ],
    );

    PageChart::new(INCOME_EXPENSE_CHART_ID, &chart)
}

#[cfg(test)]
mod ledger_chart_tests {
    use crate::ledger::aggregation::monthly_buckets;

    use super::{INCOME_EXPENSE_CHART_ID, income_expense_chart};

    #[test]
    fn chart_is_titled_with_year_and_has_every_month() {
        let chart = income_expense_chart(2025, &monthly_buckets(&[]));

        assert_eq!(chart.id, INCOME_EXPENSE_CHART_ID);
        assert!(chart.options.contains("Income vs Expenses (2025)"));
        assert!(chart.options.contains("\"Jan\""));
        assert!(chart.options.contains("\"Dec\""));
    }
}
