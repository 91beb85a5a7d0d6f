//! Stat cards summarising the selected month or year.

use maud::{Markup, html};

use crate::{
    html::{CARD_STYLE, currency_rounded_with_tooltip},
    ledger::aggregation::Totals,
};

const INCOME_TEXT_STYLE: &str = "text-green-600 dark:text-green-400";
const EXPENSE_TEXT_STYLE: &str = "text-red-600 dark:text-red-400";
const NEUTRAL_TEXT_STYLE: &str = "text-blue-600 dark:text-blue-400";

enum CardValue {
    Currency(f64),
    Percent(f64),
}

struct StatCard {
    label: &'static str,
    value: CardValue,
    text_style: &'static str,
}

fn balance_style(balance: f64) -> &'static str {
    if balance < 0.0 {
        EXPENSE_TEXT_STYLE
    } else {
        NEUTRAL_TEXT_STYLE
    }
}

/// Income, Expenses and Balance for a single month.
pub fn monthly_cards_view(totals: &Totals) -> Markup {
    cards_view(&[
        StatCard {
            label: "Income",
            value: CardValue::Currency(totals.income),
            text_style: INCOME_TEXT_STYLE,
        },
        StatCard {
            label: "Expenses",
            value: CardValue::Currency(totals.expense),
            text_style: EXPENSE_TEXT_STYLE,
        },
        StatCard {
            label: "Balance",
            value: CardValue::Currency(totals.balance()),
            text_style: balance_style(totals.balance()),
        },
    ])
}

/// Totals and the savings rate for a whole year.
pub fn yearly_cards_view(totals: &Totals) -> Markup {
    cards_view(&[
        StatCard {
            label: "Total Income",
            value: CardValue::Currency(totals.income),
            text_style: INCOME_TEXT_STYLE,
        },
        StatCard {
            label: "Total Spent",
            value: CardValue::Currency(totals.expense),
            text_style: EXPENSE_TEXT_STYLE,
        },
        StatCard {
            label: "Net Saved",
            value: CardValue::Currency(totals.balance()),
            text_style: balance_style(totals.balance()),
        },
        StatCard {
            label: "Savings Rate",
            value: CardValue::Percent(totals.savings_rate()),
            text_style: NEUTRAL_TEXT_STYLE,
        },
    ])
}

fn cards_view(cards: &[StatCard]) -> Markup {
    html! {
        section class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4 mb-6"
        {
            @for card in cards {
                div class=(CARD_STYLE) aria-label=(card.label)
                {
                    h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { (card.label) }

                    p class={"mt-2 text-2xl font-bold " (card.text_style)} data-stat=(card.label)
                    {
                        @match card.value {
                            CardValue::Currency(amount) => (currency_rounded_with_tooltip(amount)),
                            CardValue::Percent(percent) => (format!("{percent:.1}%")),
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod cards_tests {
    use scraper::{Html, Selector};

    use crate::ledger::aggregation::Totals;

    use super::{monthly_cards_view, yearly_cards_view};

    fn stat_text(html: &Html, label: &str) -> String {
        let selector = Selector::parse(&format!("[data-stat='{label}']")).unwrap();
        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("no card for {label}"))
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    #[test]
    fn monthly_cards_show_income_expenses_and_balance() {
        let totals = Totals {
            income: 800.0,
            expense: 950.0,
        };

        let html = Html::parse_fragment(&monthly_cards_view(&totals).into_string());

        assert_eq!(stat_text(&html, "Income"), "Rp 800");
        assert_eq!(stat_text(&html, "Expenses"), "Rp 950");
        assert_eq!(stat_text(&html, "Balance"), "-Rp 150");
    }

    #[test]
    fn yearly_cards_show_savings_rate_to_one_decimal() {
        let totals = Totals {
            income: 300.0,
            expense: 200.0,
        };

        let html = Html::parse_fragment(&yearly_cards_view(&totals).into_string());

        assert_eq!(stat_text(&html, "Net Saved"), "Rp 100");
        assert_eq!(stat_text(&html, "Savings Rate"), "33.3%");
    }

    #[test]
    fn savings_rate_without_income_is_zero() {
        let html = Html::parse_fragment(&yearly_cards_view(&Totals::default()).into_string());

        assert_eq!(stat_text(&html, "Savings Rate"), "0.0%");
    }
}
