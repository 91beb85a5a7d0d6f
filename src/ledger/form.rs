//! The add-transaction form and the endpoints behind it.

use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;
use time::Date;

use crate::{
    backend::Session,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, loading_spinner,
    },
    ledger::{
        LedgerState,
        period::{Period, Tab},
        transaction::{Category, NewTransaction, TransactionInput, TransactionType, create_transaction},
    },
};

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionForm {
    pub type_: TransactionType,
    pub date: String,
    #[serde(default)]
    pub item: String,
    /// Kept as text so that a blank or malformed amount gets a helpful message.
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub category: String,
    /// The year shown on the page when the form was submitted.
    pub year: Option<i32>,
    /// The month shown on the page when the form was submitted.
    pub month: Option<u8>,
}

/// A route handler for creating a new transaction.
///
/// Redirects to the month being viewed on success so that the page is
/// fetched again.
pub async fn create_transaction_endpoint(
    State(state): State<LedgerState>,
    Extension(session): Extension<Session>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let transaction = match NewTransaction::validate(TransactionInput {
        type_: form.type_,
        date: &form.date,
        item: &form.item,
        amount: &form.amount,
        category: &form.category,
    }) {
        Ok(transaction) => transaction,
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = create_transaction(state.store.as_ref(), &session, &transaction).await {
        tracing::error!("could not create transaction: {error}");
        return error.into_alert_response();
    }

    let year = form.year.unwrap_or(transaction.expense_date.year());
    let month = form
        .month
        .unwrap_or(transaction.expense_date.month() as u8);

    (
        HxRedirect(format!(
            "{}?tab={}&year={year}&month={month}",
            endpoints::EXPENSES_VIEW,
            Tab::Monthly.as_query_value(),
        )),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub type_: TransactionType,
}

/// Returns the category select for the transaction type chosen in the form.
pub async fn get_category_select(Query(query): Query<CategoryQuery>) -> Markup {
    category_select(query.type_)
}

/// The category `<select>` listing the categories allowed for `type_`.
pub fn category_select(type_: TransactionType) -> Markup {
    html! {
        select
            name="category"
            id="category"
            required
            class=(FORM_TEXT_INPUT_STYLE)
        {
            @for category in Category::for_type(type_) {
                option value=(category.as_str()) { (category.as_str()) }
            }
        }
    }
}

/// The add-transaction form for the month in `period`.
///
/// The date defaults to `today` when viewing the current month, otherwise to
/// the first of the month being viewed.
pub fn transaction_form(period: &Period, today: Date) -> Markup {
    let default_date = if today.year() == period.year && today.month() == period.month {
        today
    } else {
        Date::from_calendar_date(period.year, period.month, 1).unwrap_or(today)
    };
    let default_type = TransactionType::default();

    html! {
        section class={"w-full mb-6 " (CARD_STYLE)}
        {
            h2 class="text-lg font-semibold mb-4" { "Add Transaction" }

            form
                hx-post=(endpoints::TRANSACTIONS_API)
                hx-target-error="#alert-container"
                hx-disabled-elt="find button[type=submit]"
                class="grid grid-cols-1 md:grid-cols-2 gap-4"
            {
                input type="hidden" name="year" value=(period.year);
                input type="hidden" name="month" value=(period.month as u8);

                fieldset class="space-y-2 md:col-span-2"
                {
                    legend class=(FORM_LABEL_STYLE) { "Transaction type" }

                    div class=(FORM_RADIO_GROUP_STYLE)
                    {
                        @for type_ in TransactionType::ALL {
                            @let id = format!("transaction-type-{}", type_.as_str().to_lowercase());

                            div class="flex items-center gap-3"
                            {
                                input
                                    name="type_"
                                    id=(id)
                                    type="radio"
                                    value=(type_.as_str())
                                    checked[type_ == default_type]
                                    required
                                    hx-get=(endpoints::TRANSACTION_CATEGORIES)
                                    hx-target="#category"
                                    hx-swap="outerHTML"
                                    class=(FORM_RADIO_INPUT_STYLE);

                                label for=(id) class=(FORM_RADIO_LABEL_STYLE) { (type_.as_str()) }
                            }
                        }
                    }
                }

                div
                {
                    label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        name="date"
                        id="date"
                        type="date"
                        value=(default_date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                    (category_select(default_type))
                }

                div
                {
                    label for="item" class=(FORM_LABEL_STYLE) { "Item Name" }

                    input
                        name="item"
                        id="item"
                        type="text"
                        placeholder="e.g. Lunch"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    div class="input-wrapper w-full"
                    {
                        input
                            name="amount"
                            id="amount"
                            type="number"
                            step="any"
                            min="0"
                            placeholder="0"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div class="md:col-span-2"
                {
                    button type="submit" class=(BUTTON_PRIMARY_STYLE)
                    {
                        span class="inline htmx-indicator" { (loading_spinner()) }
                        "Add Transaction"
                    }
                }
            }
        }
    }
}
