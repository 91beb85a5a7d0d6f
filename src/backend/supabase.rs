//! HTTP client for a Supabase project (GoTrue auth and PostgREST data APIs).

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    backend::{AuthProvider, AuthUser, Collection, DataStore, Filter, Select, Session},
};

/// Talks to the hosted backend over HTTPS.
///
/// Requests always carry the project's anonymous API key. Data requests
/// additionally carry the user's access token so that row level security
/// applies.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    /// Create a client for the project at `base_url`, e.g. "https://xyz.supabase.co".
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            anon_key: anon_key.to_owned(),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    fn rest_url(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.as_str())
    }

    fn with_session(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    async fn token_request(&self, grant_type: &str, body: Value) -> Result<Session, Error> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let response = check_auth_response(response).await?;
        let token: TokenResponse = response.json().await?;

        Ok(token.into_session(OffsetDateTime::now_utc()))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    /// Lifetime of the access token in seconds.
    expires_in: i64,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: OffsetDateTime) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: now + Duration::seconds(self.expires_in),
            user: self.user,
        }
    }
}

/// Pull the human readable message out of an error body.
///
/// GoTrue uses `msg` or `error_description`, PostgREST uses `message`.
fn error_message(status: StatusCode, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    let message = parsed.as_ref().and_then(|value| {
        ["msg", "error_description", "message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(Value::as_str))
            .map(str::to_owned)
    });

    message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_owned()
    })
}

async fn check_auth_response(response: Response) -> Result<Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    tracing::warn!("auth request failed with status {status}: {message}");

    Err(Error::AuthFailed(message))
}

async fn check_data_response(response: Response) -> Result<Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    tracing::error!("data request failed with status {status}: {message}");

    if status == StatusCode::UNAUTHORIZED {
        Err(Error::SessionExpired)
    } else {
        Err(Error::Backend(message))
    }
}

fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_query_pair).collect()
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, Error> {
        self.token_request("password", json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), Error> {
        let response = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        check_auth_response(response).await.map(|_| ())
    }

    async fn sign_out(&self, session: &Session) -> Result<(), Error> {
        let response = self
            .with_session(self.http.post(self.auth_url("logout")), session)
            .send()
            .await?;

        check_auth_response(response).await.map(|_| ())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, Error> {
        self.token_request("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }
}

#[async_trait]
impl DataStore for SupabaseClient {
    async fn select(&self, session: &Session, query: &Select) -> Result<Vec<Value>, Error> {
        let request = self
            .http
            .get(self.rest_url(query.collection))
            .query(&query.to_query_pairs());

        let response = self.with_session(request, session).send().await?;
        let response = check_data_response(response).await?;

        Ok(response.json().await?)
    }

    async fn insert(
        &self,
        session: &Session,
        collection: Collection,
        row: Value,
    ) -> Result<(), Error> {
        let request = self
            .http
            .post(self.rest_url(collection))
            .header("Prefer", "return=minimal")
            .json(&row);

        let response = self.with_session(request, session).send().await?;
        check_data_response(response).await.map(|_| ())
    }

    async fn update(
        &self,
        session: &Session,
        collection: Collection,
        filters: &[Filter],
        changes: Value,
    ) -> Result<usize, Error> {
        let request = self
            .http
            .patch(self.rest_url(collection))
            .query(&filter_pairs(filters))
            .header("Prefer", "return=representation")
            .json(&changes);

        let response = self.with_session(request, session).send().await?;
        let rows: Vec<Value> = check_data_response(response).await?.json().await?;

        Ok(rows.len())
    }

    async fn delete(
        &self,
        session: &Session,
        collection: Collection,
        filters: &[Filter],
    ) -> Result<usize, Error> {
        let request = self
            .http
            .delete(self.rest_url(collection))
            .query(&filter_pairs(filters))
            .header("Prefer", "return=representation");

        let response = self.with_session(request, session).send().await?;
        let rows: Vec<Value> = check_data_response(response).await?.json().await?;

        Ok(rows.len())
    }
}

#[cfg(test)]
mod supabase_tests {
    use reqwest::StatusCode;
    use time::{Duration, macros::datetime};

    use super::{SupabaseClient, TokenResponse, error_message};
    use crate::backend::{AuthUser, Collection};

    #[test]
    fn error_message_prefers_auth_message_fields() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;

        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "Invalid login credentials"
        );
    }

    #[test]
    fn error_message_reads_data_api_message() {
        let body = r#"{"code":"23505","message":"duplicate key value"}"#;

        assert_eq!(
            error_message(StatusCode::CONFLICT, body),
            "duplicate key value"
        );
    }

    #[test]
    fn error_message_falls_back_to_status_reason() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>oops</html>"),
            "Bad Gateway"
        );
    }

    #[test]
    fn token_response_expiry_is_relative_to_now() {
        let now = datetime!(2025-03-01 08:00 UTC);
        let token = TokenResponse {
            access_token: "a".to_owned(),
            refresh_token: "r".to_owned(),
            expires_in: 3600,
            user: AuthUser {
                id: "u".to_owned(),
                email: "me@example.com".to_owned(),
            },
        };

        let session = token.into_session(now);

        assert_eq!(session.expires_at, now + Duration::hours(1));
    }

    #[test]
    fn urls_are_built_from_trimmed_base_url() {
        let client = SupabaseClient::new("https://project.supabase.co/", "key");

        assert_eq!(
            client.auth_url("signup"),
            "https://project.supabase.co/auth/v1/signup"
        );
        assert_eq!(
            client.rest_url(Collection::MarriageSavings),
            "https://project.supabase.co/rest/v1/marriage_savings"
        );
    }
}
