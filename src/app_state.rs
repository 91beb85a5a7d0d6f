//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    auth::{DEFAULT_COOKIE_DURATION, SessionEvents},
    backend::{AuthProvider, DataStore},
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,

    /// Signs users in and out.
    pub auth: Arc<dyn AuthProvider>,

    /// Reads and writes transactions, connections and savings.
    pub store: Arc<dyn DataStore>,

    /// Where handlers report sign-ins, sign-outs and token refreshes.
    pub session_events: SessionEvents,
}

impl AppState {
    /// Create a new [AppState] backed by `auth` and `store`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Asia/Jakarta".
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DataStore>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            auth,
            store,
            session_events: SessionEvents::new(),
        }
    }

    /// Set how long session cookies stay valid without activity.
    pub fn with_cookie_duration(mut self, cookie_duration: Duration) -> Self {
        self.cookie_duration = cookie_duration;
        self
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
