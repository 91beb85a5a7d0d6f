use crate::{
    charts::{BarSeries, PageChart, grouped_bar_chart},
    savings::progress::MonthlyContribution,
};

pub const CONTRIBUTION_CHART_ID: &str = "contribution-chart";

/// Monthly contributions with a bar for each partner.
pub fn contribution_chart(history: &[MonthlyContribution]) -> PageChart {
    let chart = grouped_bar_chart(
        "Contribution History",
        history.iter().map(|month| month.label.clone()).collect(),
        vec![
            BarSeries {
                name: "Me",
                color: "#3b82f6",
                values: history.iter().map(|month| month.mine).collect(),
            },
            BarSeries {
                name: "Partner",
                color: "#f43f5e",
                values: history.iter().map(|month| month.partner).collect(),
            },
        ],
    );

    PageChart::new(CONTRIBUTION_CHART_ID, &chart)
}

#[cfg(test)]
mod savings_chart_tests {
    use crate::savings::progress::MonthlyContribution;

    use super::contribution_chart;

    #[test]
    fn chart_has_both_partners_and_month_labels() {
        let chart = contribution_chart(&[MonthlyContribution {
            label: "2025-02".to_owned(),
            mine: 25.0,
            partner: 50.0,
        }]);

        assert!(chart.options.contains("\"Me\""));
        assert!(chart.options.contains("\"Partner\""));
        assert!(chart.options.contains("\"2025-02\""));
    }
}
