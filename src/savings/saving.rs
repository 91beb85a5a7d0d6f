//! Contributions towards the shared savings goal.

use serde::{Deserialize, Deserializer, Serialize};
use time::{Date, OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
    Error,
    backend::{Collection, DataStore, Filter, Select, Session, parse_rows},
    ledger::ISO_DATE,
    savings::connection::{Connection, ConnectionStatus},
};

/// A row in the `marriage_savings` collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Saving {
    pub id: i64,
    /// The day the contribution was made.
    #[serde(deserialize_with = "deserialize_date_prefix")]
    pub date: Date,
    pub amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
    pub user_id: String,
    pub saver_email: String,
}

/// Read the date part of a date or timestamp, e.g. "2025-01-15T10:00:00+00:00".
fn deserialize_date_prefix<'de, D>(deserializer: D) -> Result<Date, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let date_part = text.get(..10).unwrap_or(&text);

    Date::parse(date_part, ISO_DATE).map_err(serde::de::Error::custom)
}

#[derive(Serialize)]
struct SavingRow<'a> {
    date: String,
    amount: f64,
    notes: Option<&'a str>,
    user_id: &'a str,
    saver_email: &'a str,
}

/// Parse a contribution amount.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] unless `amount` is a number greater than zero.
pub fn parse_amount(amount: &str) -> Result<f64, Error> {
    let amount = amount.trim();

    amount
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
        .ok_or_else(|| Error::InvalidAmount(amount.to_owned()))
}

/// Fetch the contributions of both partners, newest first.
pub async fn get_savings(
    store: &dyn DataStore,
    session: &Session,
    connection: &Connection,
) -> Result<Vec<Saving>, Error> {
    let query = Select::from(Collection::MarriageSavings)
        .filter(Filter::any_of(vec![
            Filter::eq_ignore_case("saver_email", &connection.sender_email),
            Filter::eq_ignore_case("saver_email", &connection.receiver_email),
        ]))
        .order_desc("date");

    parse_rows(store.select(session, &query).await?)
}

/// Record a contribution of `amount` made now by the signed-in user.
///
/// # Errors
///
/// Returns [Error::NotConnected] unless `connection` has been accepted.
pub async fn add_saving(
    store: &dyn DataStore,
    session: &Session,
    connection: Option<&Connection>,
    amount: f64,
    note: &str,
) -> Result<(), Error> {
    if !connection.is_some_and(|connection| connection.status == ConnectionStatus::Accepted) {
        return Err(Error::NotConnected);
    }

    let date = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), "now".to_owned()))?;
    let note = note.trim();

    let row = SavingRow {
        date,
        amount,
        notes: (!note.is_empty()).then_some(note),
        user_id: &session.user.id,
        saver_email: &session.user.email,
    };
    let row = serde_json::to_value(row)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    store.insert(session, Collection::MarriageSavings, row).await
}

/// Delete the contribution `id` if the signed-in user made it.
///
/// # Errors
///
/// Returns [Error::DeleteMissingSaving] if there is no such contribution or
/// it belongs to the partner.
pub async fn delete_saving(store: &dyn DataStore, session: &Session, id: i64) -> Result<(), Error> {
    let deleted = store
        .delete(
            session,
            Collection::MarriageSavings,
            &[Filter::eq("id", id), Filter::eq("user_id", &session.user.id)],
        )
        .await?;

    match deleted {
        0 => Err(Error::DeleteMissingSaving),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod saving_tests {
    use serde_json::json;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        Error,
        backend::Collection,
        savings::connection::{Connection, ConnectionStatus},
        test_utils::{MemoryStore, test_session},
    };

    use super::{Saving, add_saving, delete_saving, get_savings, parse_amount};

    fn connection(status: ConnectionStatus) -> Connection {
        Connection {
            id: 1,
            sender_email: "me@example.com".to_owned(),
            receiver_email: "partner@example.com".to_owned(),
            status,
            target_amount: None,
            monthly_goal: None,
        }
    }

    #[test]
    fn timestamp_dates_are_read_as_days() {
        let saving: Saving = serde_json::from_value(json!({
            "id": 1,
            "date": "2025-01-15T10:00:00.123+00:00",
            "amount": 500000,
            "notes": null,
            "user_id": "user-me",
            "saver_email": "me@example.com",
        }))
        .unwrap();

        assert_eq!(saving.date, date!(2025 - 01 - 15));
        assert_eq!(saving.amount, 500_000.0);
        assert_eq!(saving.notes, None);
    }

    #[test]
    fn amount_must_be_positive() {
        assert_eq!(parse_amount(" 250000 "), Ok(250_000.0));
        assert_eq!(parse_amount("0"), Err(Error::InvalidAmount("0".to_owned())));
        assert_eq!(parse_amount(""), Err(Error::InvalidAmount(String::new())));
    }

    #[tokio::test]
    async fn saving_is_recorded_for_user_today() {
        let store = MemoryStore::default();
        let session = test_session("user-me", "me@example.com");

        add_saving(
            &store,
            &session,
            Some(&connection(ConnectionStatus::Accepted)),
            250_000.0,
            "  ",
        )
        .await
        .unwrap();

        let rows = store.rows(Collection::MarriageSavings);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["user_id"], "user-me");
        assert_eq!(rows[0]["saver_email"], "me@example.com");
        assert_eq!(rows[0]["notes"], serde_json::Value::Null);
        let today = OffsetDateTime::now_utc().date().to_string();
        assert!(rows[0]["date"].as_str().unwrap().starts_with(&today));
    }

    #[tokio::test]
    async fn saving_requires_accepted_connection() {
        let store = MemoryStore::default();
        let session = test_session("user-me", "me@example.com");

        for connection in [None, Some(connection(ConnectionStatus::Pending))] {
            assert_eq!(
                add_saving(&store, &session, connection.as_ref(), 1.0, "").await,
                Err(Error::NotConnected)
            );
        }
        assert!(store.rows(Collection::MarriageSavings).is_empty());
    }

    #[tokio::test]
    async fn savings_of_both_partners_are_fetched_newest_first_ignoring_email_case() {
        let store = MemoryStore::default();
        for (date, email) in [
            ("2025-01-01T08:00:00Z", "me@example.com"),
            ("2025-03-01T08:00:00Z", "Partner@Example.com"),
            ("2025-02-01T08:00:00Z", "stranger@example.com"),
        ] {
            store.seed(
                Collection::MarriageSavings,
                json!({
                    "date": date,
                    "amount": 10.0,
                    "user_id": format!("user-{email}"),
                    "saver_email": email,
                }),
            );
        }
        let session = test_session("user-me", "me@example.com");

        let savings = get_savings(&store, &session, &connection(ConnectionStatus::Accepted))
            .await
            .unwrap();

        let emails: Vec<&str> = savings.iter().map(|saving| saving.saver_email.as_str()).collect();
        assert_eq!(emails, ["Partner@Example.com", "me@example.com"]);
    }

    #[tokio::test]
    async fn partner_savings_cannot_be_deleted() {
        let store = MemoryStore::default();
        let id = store.seed(
            Collection::MarriageSavings,
            json!({ "user_id": "user-partner", "saver_email": "partner@example.com" }),
        );
        let session = test_session("user-me", "me@example.com");

        assert_eq!(
            delete_saving(&store, &session, id).await,
            Err(Error::DeleteMissingSaving)
        );
        assert_eq!(store.rows(Collection::MarriageSavings).len(), 1);
    }
}
