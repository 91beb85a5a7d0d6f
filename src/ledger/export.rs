//! Exports a month of transactions as a CSV file.
//!
//! The export button first asks [export_check_endpoint] whether there is
//! anything to export so that an empty month gets an alert instead of an
//! empty file. The browser is then redirected to [export_download_endpoint].

use axum::{
    Extension,
    extract::{Query, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Redirect, Response},
};
use axum_htmx::HxRedirect;
use csv::{Terminator, WriterBuilder};

use crate::{
    Error,
    backend::Session,
    endpoints,
    ledger::{
        LedgerState,
        period::{Period, PeriodQuery, Tab},
        transaction::{Transaction, get_transactions},
    },
    timezone::local_today,
};

const CSV_HEADER: [&str; 5] = ["Date", "Item", "Amount", "Category", "Type"];

/// Render `transactions` as CSV with a header row, one record per line.
pub fn write_csv(transactions: &[Transaction]) -> Result<String, Error> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    for transaction in transactions {
        writer.write_record([
            transaction.expense_date.to_string(),
            transaction.item.clone(),
            // Whole amounts are written without a decimal point, e.g. "5".
            transaction.amount.to_string(),
            transaction.category.clone(),
            transaction.type_.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvError(error.to_string()))
}

/// The download name for the export of `period`'s month, e.g. "expenses-2025-01.csv".
pub fn export_file_name(period: &Period) -> String {
    format!("expenses-{}-{:02}.csv", period.year, period.month as u8)
}

fn monthly_period(query: &PeriodQuery, local_timezone: &str) -> Result<Period, Error> {
    let today = local_today(local_timezone)?;

    Ok(Period {
        tab: Tab::Monthly,
        ..Period::resolve(query, today)
    })
}

async fn get_month(
    state: &LedgerState,
    session: &Session,
    query: &PeriodQuery,
) -> Result<(Period, Vec<Transaction>), Error> {
    let period = monthly_period(query, &state.local_timezone)?;
    let transactions = get_transactions(state.store.as_ref(), session, period.range()?).await?;

    Ok((period, transactions))
}

fn download_url(period: &Period) -> String {
    format!(
        "{}?year={}&month={}",
        endpoints::EXPORT_DOWNLOAD,
        period.year,
        period.month as u8
    )
}

/// Checks that the month has transactions before sending the browser to the
/// CSV download.
pub async fn export_check_endpoint(
    State(state): State<LedgerState>,
    Extension(session): Extension<Session>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    match get_month(&state, &session, &query).await {
        Ok((_, transactions)) if transactions.is_empty() => {
            Error::NothingToExport.into_alert_response()
        }
        Ok((period, _)) => (HxRedirect(download_url(&period)), StatusCode::SEE_OTHER).into_response(),
        Err(error) => {
            tracing::error!("Could not check export: {error}");
            error.into_alert_response()
        }
    }
}

/// Responds with the month's transactions as a CSV attachment.
pub async fn export_download_endpoint(
    State(state): State<LedgerState>,
    Extension(session): Extension<Session>,
    Query(query): Query<PeriodQuery>,
) -> Response {
    let (period, transactions) = match get_month(&state, &session, &query).await {
        Ok(month) => month,
        Err(error) => return error.into_response(),
    };

    if transactions.is_empty() {
        tracing::info!("Nothing to export for {}", export_file_name(&period));
        return Redirect::to(&format!(
            "{}?{}",
            endpoints::EXPENSES_VIEW,
            period.query_for_tab(Tab::Monthly)
        ))
        .into_response();
    }

    let body = match write_csv(&transactions) {
        Ok(body) => body,
        Err(error) => return error.into_response(),
    };

    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export_file_name(&period)),
            ),
        ],
        body,
    )
        .into_response()
}
