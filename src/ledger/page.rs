//! The expenses page with its monthly and yearly tabs.

use axum::{
    Extension,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use time::Date;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    backend::Session,
    charts::{ECHARTS_SCRIPT, charts_view, inline_charts_script},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, currency_rounded_with_tooltip,
        rupiah_input_styles,
    },
    ledger::{
        LedgerState,
        aggregation::{Totals, monthly_buckets},
        cards::{monthly_cards_view, yearly_cards_view},
        charts::income_expense_chart,
        form::transaction_form,
        period::{MONTH_LABELS, Period, PeriodQuery, Tab, year_options},
        transaction::{Transaction, TransactionType, get_transactions},
    },
    navigation::{NavBar, View},
    timezone::local_today,
};

/// Item names longer than this many characters are cut short in the history.
const MAX_ITEM_GRAPHEMES: usize = 32;

/// Renders the expenses page for the tab, year and month in the query.
///
/// Missing values default to today's month in the server's timezone.
pub async fn get_expenses_page(
    State(state): State<LedgerState>,
    Extension(session): Extension<Session>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_response(),
    };
    let period = Period::resolve(&query, today);

    let range = match period.range() {
        Ok(range) => range,
        Err(error) => {
            tracing::warn!("Could not build date range for {period:?}: {error}");
            return error.into_response();
        }
    };

    let transactions = match get_transactions(state.store.as_ref(), &session, range).await {
        Ok(transactions) => transactions,
        Err(error) => {
            tracing::error!("Could not get transactions: {error}");
            return error.into_response();
        }
    };

    expenses_page(&session.user.email, &period, today, &transactions).into_response()
}

fn expenses_page(
    user_email: &str,
    period: &Period,
    today: Date,
    transactions: &[Transaction],
) -> Markup {
    let content = html! {
        (NavBar::new(View::Expenses, user_email).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            (ledger_view(period, today, transactions))
        }
    };

    base(
        "Expenses",
        &[
            HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
            rupiah_input_styles(),
        ],
        &content,
    )
}

/// Everything below the navigation bar.
///
/// Requests made from inside the container are synchronised on it, so a
/// newer request aborts an older one that is still in flight.
fn ledger_view(period: &Period, today: Date, transactions: &[Transaction]) -> Markup {
    let totals = Totals::from_transactions(transactions);

    html! {
        div id="ledger" hx-sync="this:replace" class="w-full max-w-5xl"
        {
            h1 class="text-2xl font-bold mb-4" { "Expenses" }

            (period_controls(period, today.year()))

            @match period.tab {
                Tab::Monthly => {
                    (monthly_cards_view(&totals))
                    (transaction_form(period, today))
                    (history_view(period, transactions))
                }
                Tab::Yearly => {
                    (yearly_cards_view(&totals))

                    @let charts = [income_expense_chart(period.year, &monthly_buckets(transactions))];
                    (charts_view(&charts))
                    (inline_charts_script(&charts))
                }
            }
        }
    }
}

fn period_controls(period: &Period, current_year: i32) -> Markup {
    html! {
        form
            id="period-controls"
            hx-get=(endpoints::EXPENSES_VIEW)
            hx-trigger="change"
            hx-target="#ledger"
            hx-select="#ledger"
            hx-swap="outerHTML"
            hx-push-url="true"
            class="flex flex-wrap items-end gap-4 mb-6"
        {
            fieldset
            {
                legend class="sr-only" { "Summary" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for tab in [Tab::Monthly, Tab::Yearly] {
                        @let id = format!("tab-{}", tab.as_query_value());

                        div
                        {
                            input
                                type="radio"
                                name="tab"
                                id=(id)
                                value=(tab.as_query_value())
                                checked[tab == period.tab]
                                class=(FORM_RADIO_INPUT_STYLE);

                            label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (tab.label()) }
                        }
                    }
                }
            }

            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                select id="year" name="year" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for year in year_options(current_year, period.year) {
                        option value=(year) selected[year == period.year] { (year) }
                    }
                }
            }

            @if period.tab == Tab::Monthly {
                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                    select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for (index, label) in MONTH_LABELS.iter().enumerate() {
                            @let month = index as u8 + 1;
                            option value=(month) selected[month == period.month as u8] { (label) }
                        }
                    }
                }
            } @else {
                input type="hidden" name="month" value=(period.month as u8);
            }
        }
    }
}

fn history_view(period: &Period, transactions: &[Transaction]) -> Markup {
    let export_url = format!(
        "{}?year={}&month={}",
        endpoints::EXPORT_API,
        period.year,
        period.month as u8
    );

    html! {
        section class="w-full mb-6"
        {
            div class="flex justify-between items-center mb-4"
            {
                h2 class="text-lg font-semibold" { "History" }

                div class="w-40"
                {
                    button
                        type="button"
                        hx-get=(export_url)
                        hx-swap="none"
                        hx-target-error="#alert-container"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Export CSV"
                    }
                }
            }

            @if transactions.is_empty() {
                p class="text-gray-600 dark:text-gray-400" { "No transactions for this month yet." }
            } @else {
                div class="relative overflow-x-auto shadow-md rounded-lg"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Item" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class={(TABLE_CELL_STYLE) " text-right"} { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (transaction_row(transaction))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn transaction_row(transaction: &Transaction) -> Markup {
    let (sign, amount_style) = match transaction.type_ {
        TransactionType::Income => ("+", "text-green-600 dark:text-green-400"),
        TransactionType::Expense => ("-", "text-red-600 dark:text-red-400"),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.expense_date) }
            td class=(TABLE_CELL_STYLE) title=(transaction.item) { (truncate_item(&transaction.item)) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(CATEGORY_BADGE_STYLE) { (transaction.category) }
            }
            td class={(TABLE_CELL_STYLE) " text-right font-medium " (amount_style)}
            {
                (sign) (currency_rounded_with_tooltip(transaction.amount))
            }
            td class={(TABLE_CELL_STYLE) " text-right"}
            {
                button
                    type="button"
                    hx-delete=(format_endpoint(endpoints::TRANSACTION, transaction.id))
                    hx-confirm="Delete this transaction?"
                    hx-swap="none"
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

/// Cut `item` down to [MAX_ITEM_GRAPHEMES] user-perceived characters,
/// ending with an ellipsis when anything was removed.
fn truncate_item(item: &str) -> String {
    let mut graphemes = item.graphemes(true);
    let kept: String = graphemes.by_ref().take(MAX_ITEM_GRAPHEMES).collect();

    if graphemes.next().is_some() {
        format!("{kept}…")
    } else {
        kept
    }
}

#[cfg(test)]
mod page_tests {
    use std::sync::Arc;

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};
    use serde_json::json;

    use crate::{
        Error,
        backend::Collection,
        endpoints,
        ledger::{
            LedgerState,
            period::{PeriodQuery, Tab},
        },
        test_utils::{MemoryStore, assert_valid_html, parse_html_document, test_session},
    };

    use super::{get_expenses_page, truncate_item};

    fn ledger_state(store: Arc<MemoryStore>) -> LedgerState {
        LedgerState {
            store,
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn seed(store: &MemoryStore, date: &str, item: &str, amount: f64, type_: &str) {
        store.seed(
            Collection::Expenses,
            json!({
                "user_id": "user-1",
                "expense_date": date,
                "item": item,
                "amount": amount,
                "category": if type_ == "Income" { "Salary" } else { "Food" },
                "type": type_,
            }),
        );
    }

    async fn get_page(store: Arc<MemoryStore>, tab: Tab, year: i32, month: u8) -> Html {
        let response = get_expenses_page(
            State(ledger_state(store)),
            Extension(test_session("user-1", "me@example.com")),
            Query(PeriodQuery {
                tab: Some(tab),
                year: Some(year),
                month: Some(month),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        parse_html_document(response).await
    }

    fn select_text(html: &Html, selector: &str) -> Vec<String> {
        html.select(&Selector::parse(selector).unwrap())
            .map(|element| element.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn monthly_tab_lists_month_newest_first() {
        let store = Arc::new(MemoryStore::default());
        seed(&store, "2025-01-05", "Groceries", 200.0, "Expense");
        seed(&store, "2025-01-25", "Salary", 900.0, "Income");
        seed(&store, "2025-02-01", "February rent", 500.0, "Expense");

        let html = get_page(store, Tab::Monthly, 2025, 1).await;

        assert_valid_html(&html);
        let items = select_text(&html, "tbody tr td:nth-child(2)");
        assert_eq!(items, ["Salary", "Groceries"]);
        assert_eq!(select_text(&html, "[data-stat='Balance']"), ["Rp 700"]);
        let delete = html
            .select(&Selector::parse("button[hx-delete]").unwrap())
            .next()
            .expect("want delete button");
        assert_eq!(delete.value().attr("hx-confirm"), Some("Delete this transaction?"));
    }

    #[tokio::test]
    async fn ledger_container_replaces_stale_requests() {
        let html = get_page(Arc::new(MemoryStore::default()), Tab::Monthly, 2025, 1).await;

        let ledger = html
            .select(&Selector::parse("#ledger").unwrap())
            .next()
            .expect("want ledger container");
        assert_eq!(ledger.value().attr("hx-sync"), Some("this:replace"));
        let controls = html
            .select(&Selector::parse("#period-controls").unwrap())
            .next()
            .expect("want period controls");
        assert_eq!(controls.value().attr("hx-get"), Some(endpoints::EXPENSES_VIEW));
    }

    #[tokio::test]
    async fn yearly_tab_shows_chart_and_savings_rate() {
        let store = Arc::new(MemoryStore::default());
        seed(&store, "2025-01-05", "Groceries", 100.0, "Expense");
        seed(&store, "2025-11-25", "Salary", 400.0, "Income");
        seed(&store, "2024-12-31", "Last year", 999.0, "Expense");

        let html = get_page(store, Tab::Yearly, 2025, 1).await;

        assert_eq!(select_text(&html, "[data-stat='Net Saved']"), ["Rp 300"]);
        assert_eq!(select_text(&html, "[data-stat='Savings Rate']"), ["75.0%"]);
        assert!(
            html.select(&Selector::parse("#income-expense-chart").unwrap())
                .next()
                .is_some()
        );
        assert!(
            html.root_element()
                .html()
                .contains("Income vs Expenses (2025)")
        );
        assert!(select_text(&html, "tbody tr").is_empty());
    }

    #[tokio::test]
    async fn year_picker_includes_selected_year() {
        let html = get_page(Arc::new(MemoryStore::default()), Tab::Monthly, 2001, 6).await;

        let selected = select_text(&html, "select#year option[selected]");
        assert_eq!(selected, ["2001"]);
        let month = select_text(&html, "select#month option[selected]");
        assert_eq!(month, ["Jun"]);
    }

    #[tokio::test]
    async fn backend_failure_renders_error_page() {
        let store = Arc::new(MemoryStore::default());
        store.fail_with(Error::Transport("connection refused".to_owned()));

        let response = get_expenses_page(
            State(ledger_state(store)),
            Extension(test_session("user-1", "me@example.com")),
            Query(PeriodQuery::default()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn long_items_are_truncated_by_grapheme() {
        let item = "🇮🇩".repeat(40);

        let truncated = truncate_item(&item);

        assert_eq!(truncated, format!("{}…", "🇮🇩".repeat(32)));
    }

    #[test]
    fn short_items_are_kept() {
        assert_eq!(truncate_item("Nasi goreng"), "Nasi goreng");
    }
}
