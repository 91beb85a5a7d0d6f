//! Access to the hosted service that owns authentication and persistence.
//!
//! The application never stores user data itself. Every read and write goes
//! through the [AuthProvider] and [DataStore] traits so that handlers can be
//! tested against in-memory fakes.

mod query;
mod supabase;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use time::{Duration, OffsetDateTime};

use crate::Error;

pub use query::{Collection, Filter, Select};
pub use supabase::SupabaseClient;

/// The identity of a signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Opaque user ID (a UUID).
    pub id: String,
    /// The email the user signed up with.
    pub email: String,
}

/// The tokens and user returned by the auth provider after signing in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for the data API.
    pub access_token: String,
    /// Single use token for getting a new access token.
    pub refresh_token: String,
    /// When the access token stops being accepted by the data API.
    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
    /// The signed-in user.
    pub user: AuthUser,
}

/// Access tokens are refreshed this long before they actually expire.
const EXPIRY_LEEWAY: Duration = Duration::seconds(30);

impl Session {
    /// Whether the access token must be refreshed before it can be used at `now`.
    pub fn needs_refresh(&self, now: OffsetDateTime) -> bool {
        now + EXPIRY_LEEWAY >= self.expires_at
    }
}

/// Authenticates users.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Exchange an email and password for a session.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, Error>;

    /// Create a new account. The user must sign in afterwards.
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), Error>;

    /// Revoke the session's refresh token.
    async fn sign_out(&self, session: &Session) -> Result<(), Error>;

    /// Exchange a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> Result<Session, Error>;
}

/// Row level access to the collections listed in [Collection].
///
/// All calls are made on behalf of the user that owns `session`, so the
/// service's access rules apply on top of the filters given here.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Fetch the rows matching `query`.
    async fn select(&self, session: &Session, query: &Select) -> Result<Vec<Value>, Error>;

    /// Insert a single row.
    async fn insert(&self, session: &Session, collection: Collection, row: Value)
    -> Result<(), Error>;

    /// Apply `changes` to the rows matching every filter and return how many
    /// rows were changed.
    async fn update(
        &self,
        session: &Session,
        collection: Collection,
        filters: &[Filter],
        changes: Value,
    ) -> Result<usize, Error>;

    /// Delete the rows matching every filter and return how many rows were
    /// deleted.
    async fn delete(
        &self,
        session: &Session,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<usize, Error>;
}

/// Deserialize rows returned by [DataStore::select].
pub fn parse_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, Error> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|error| Error::InvalidRow(error.to_string()))
        })
        .collect()
}
