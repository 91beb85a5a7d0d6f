//! In-memory stand-ins for the hosted backend.

use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering as AtomicOrdering},
    },
};

use async_trait::async_trait;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    backend::{AuthProvider, AuthUser, Collection, DataStore, Filter, Select, Session},
};

/// A session for `email` that is valid for an hour.
///
/// The expiry is truncated to whole seconds, like the sessions the backend
/// hands out, so that it survives a trip through the session cookie.
pub(crate) fn test_session(user_id: &str, email: &str) -> Session {
    let expires_at = (OffsetDateTime::now_utc() + Duration::hours(1))
        .replace_nanosecond(0)
        .unwrap();

    Session {
        access_token: format!("access-{email}"),
        refresh_token: format!("refresh-{email}"),
        expires_at,
        user: AuthUser {
            id: user_id.to_owned(),
            email: email.to_owned(),
        },
    }
}

/// Accepts any registered email and password pair.
///
/// User IDs are derived from the email, e.g. "user-me@example.com".
#[derive(Default)]
pub(crate) struct FakeAuth {
    users: Mutex<HashMap<String, String>>,
    refresh_fails: AtomicBool,
    pub(crate) sign_out_calls: AtomicUsize,
    pub(crate) refresh_calls: AtomicUsize,
}

pub(crate) const INVALID_CREDENTIALS: &str = "Invalid login credentials";
pub(crate) const ALREADY_REGISTERED: &str = "User already registered";

impl FakeAuth {
    pub(crate) fn with_user(email: &str, password: &str) -> Self {
        let auth = Self::default();
        auth.users
            .lock()
            .unwrap()
            .insert(email.to_owned(), password.to_owned());

        auth
    }

    pub(crate) fn fail_refresh(&self) {
        self.refresh_fails.store(true, AtomicOrdering::SeqCst);
    }

    pub(crate) fn has_user(&self, email: &str) -> bool {
        self.users.lock().unwrap().contains_key(email)
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, Error> {
        match self.users.lock().unwrap().get(email) {
            Some(stored) if stored == password => Ok(test_session(&format!("user-{email}"), email)),
            _ => Err(Error::AuthFailed(INVALID_CREDENTIALS.to_owned())),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), Error> {
        let mut users = self.users.lock().unwrap();

        if users.contains_key(email) {
            return Err(Error::AuthFailed(ALREADY_REGISTERED.to_owned()));
        }

        users.insert(email.to_owned(), password.to_owned());
        Ok(())
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), Error> {
        self.sign_out_calls.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, Error> {
        self.refresh_calls.fetch_add(1, AtomicOrdering::SeqCst);

        if self.refresh_fails.load(AtomicOrdering::SeqCst) {
            return Err(Error::AuthFailed("Invalid Refresh Token".to_owned()));
        }

        let email = refresh_token
            .strip_prefix("refresh-")
            .ok_or_else(|| Error::AuthFailed("Invalid Refresh Token".to_owned()))?;
        let mut session = test_session(&format!("user-{email}"), email);
        session.access_token = format!("refreshed-{email}");

        Ok(session)
    }
}

/// Evaluates [Select] queries against rows held in memory.
pub(crate) struct MemoryStore {
    rows: Mutex<HashMap<Collection, Vec<Value>>>,
    next_id: AtomicI64,
    failure: Mutex<Option<Error>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            failure: Mutex::new(None),
        }
    }
}

impl MemoryStore {
    /// A store with a profile for each email.
    pub(crate) fn with_profiles(emails: &[&str]) -> Self {
        let store = Self::default();
        store.rows.lock().unwrap().insert(
            Collection::Profiles,
            emails
                .iter()
                .map(|email| json!({ "id": format!("user-{email}"), "email": email }))
                .collect(),
        );

        store
    }

    /// Add a row, assigning an ID if it has none, and return the ID.
    pub(crate) fn seed(&self, collection: Collection, mut row: Value) -> i64 {
        let id = match row.get("id").and_then(Value::as_i64) {
            Some(id) => id,
            None => {
                let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
                row["id"] = json!(id);
                id
            }
        };

        self.rows
            .lock()
            .unwrap()
            .entry(collection)
            .or_default()
            .push(row);

        id
    }

    pub(crate) fn rows(&self, collection: Collection) -> Vec<Value> {
        self.rows
            .lock()
            .unwrap()
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Make every following call fail with `error`.
    pub(crate) fn fail_with(&self, error: Error) {
        *self.failure.lock().unwrap() = Some(error);
    }

    fn check_failure(&self) -> Result<(), Error> {
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn column_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    match (left.parse::<f64>(), right.parse::<f64>()) {
        (Ok(left), Ok(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        _ => left.cmp(right),
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, value) => {
            column_text(row, column).is_some_and(|text| compare_text(&text, value).is_eq())
        }
        Filter::EqIgnoreCase(column, value) => {
            column_text(row, column).is_some_and(|text| text.eq_ignore_ascii_case(value))
        }
        Filter::Gte(column, value) => {
            column_text(row, column).is_some_and(|text| compare_text(&text, value).is_ge())
        }
        Filter::Lt(column, value) => {
            column_text(row, column).is_some_and(|text| compare_text(&text, value).is_lt())
        }
        Filter::AnyOf(filters) => filters.iter().any(|filter| matches(row, filter)),
    }
}

fn matches_all(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| matches(row, filter))
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, _session: &Session, query: &Select) -> Result<Vec<Value>, Error> {
        self.check_failure()?;

        let mut rows: Vec<Value> = self
            .rows(query.collection)
            .into_iter()
            .filter(|row| matches_all(row, &query.filters))
            .collect();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_text(
                    &column_text(a, order.column).unwrap_or_default(),
                    &column_text(b, order.column).unwrap_or_default(),
                );

                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(
        &self,
        _session: &Session,
        collection: Collection,
        row: Value,
    ) -> Result<(), Error> {
        self.check_failure()?;
        self.seed(collection, row);

        Ok(())
    }

    async fn update(
        &self,
        _session: &Session,
        collection: Collection,
        filters: &[Filter],
        changes: Value,
    ) -> Result<usize, Error> {
        self.check_failure()?;

        let mut tables = self.rows.lock().unwrap();
        let Some(rows) = tables.get_mut(&collection) else {
            return Ok(0);
        };

        let mut updated = 0;
        for row in rows.iter_mut().filter(|row| matches_all(row, filters)) {
            if let (Value::Object(row), Value::Object(changes)) = (row, &changes) {
                for (key, value) in changes {
                    row.insert(key.clone(), value.clone());
                }
            }
            updated += 1;
        }

        Ok(updated)
    }

    async fn delete(
        &self,
        _session: &Session,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<usize, Error> {
        self.check_failure()?;

        let mut tables = self.rows.lock().unwrap();
        let Some(rows) = tables.get_mut(&collection) else {
            return Ok(0);
        };

        let before = rows.len();
        rows.retain(|row| !matches_all(row, filters));

        Ok(before - rows.len())
    }
}

#[cfg(test)]
mod memory_store_tests {
    use serde_json::json;

    use crate::backend::{Collection, DataStore, Filter, Select};

    use super::{MemoryStore, test_session};

    #[tokio::test]
    async fn select_applies_filters_order_and_limit() {
        let store = MemoryStore::default();
        for (date, amount) in [("2025-01-05", 1), ("2025-02-01", 2), ("2025-01-20", 3)] {
            store.seed(
                Collection::Expenses,
                json!({ "expense_date": date, "amount": amount }),
            );
        }
        let session = test_session("user-1", "me@example.com");
        let query = Select::from(Collection::Expenses)
            .filter(Filter::gte("expense_date", "2025-01-01"))
            .filter(Filter::lt("expense_date", "2025-02-01"))
            .order_desc("expense_date")
            .limit(5);

        let rows = store.select(&session, &query).await.unwrap();

        let amounts: Vec<_> = rows.iter().map(|row| row["amount"].clone()).collect();
        assert_eq!(amounts, vec![json!(3), json!(1)]);
    }

    #[tokio::test]
    async fn delete_counts_removed_rows() {
        let store = MemoryStore::default();
        let id = store.seed(Collection::Expenses, json!({ "user_id": "a" }));
        let session = test_session("a", "a@example.com");

        let deleted = store
            .delete(
                &session,
                Collection::Expenses,
                &[Filter::eq("id", id), Filter::eq("user_id", "b")],
            )
            .await
            .unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(store.rows(Collection::Expenses).len(), 1);
    }
}
