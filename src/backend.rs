/// Backend client: auth (GoTrue) and the `snippets` table (PostgREST)
///
/// [`Backend`] is the seam the relay and the popup talk to. [`SupabaseClient`]
/// is the HTTP implementation; it persists the session through a
/// [`CredentialStore`] and does no retrying, batching or caching.
use crate::config::Config;
use crate::credentials::{CredentialStore, SESSION_KEY, load_json, save_json};
use crate::error::{AuthError, DataError};
use crate::pkce::CHALLENGE_METHOD;
use crate::session::{Session, TokenPair, User, redact, unix_now};
use crate::snippet::{NewSnippet, Snippet};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use std::future::Future;
use url::Url;

const SNIPPETS_TABLE: &str = "snippets";

pub trait Backend {
    /// The persisted session, refreshed when it has expired
    fn current_session(&self) -> impl Future<Output = Result<Option<Session>, AuthError>>;

    /// Install tokens obtained elsewhere as the active session
    fn set_session(&self, tokens: &TokenPair) -> impl Future<Output = Result<Session, AuthError>>;

    /// Trade an authorization code plus PKCE verifier for a session
    fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
    ) -> impl Future<Output = Result<Session, AuthError>>;

    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>>;

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        challenge: &str,
    ) -> Result<String, AuthError>;

    fn list_snippets(
        &self,
        session: &Session,
    ) -> impl Future<Output = Result<Vec<Snippet>, DataError>>;

    fn insert_snippet(
        &self,
        session: &Session,
        snippet: &NewSnippet,
    ) -> impl Future<Output = Result<Snippet, DataError>>;

    fn delete_snippet(
        &self,
        session: &Session,
        id: &str,
    ) -> impl Future<Output = Result<(), DataError>>;
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self, now_secs: i64) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at: self
                .expires_at
                .or_else(|| self.expires_in.map(|secs| now_secs + secs)),
            user: self.user,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SupabaseClient<S> {
    http: Client,
    base_url: String,
    anon_key: String,
    store: S,
}

impl<S: CredentialStore> SupabaseClient<S> {
    pub fn new(config: &Config, store: S) -> Self {
        SupabaseClient {
            http: Client::new(),
            base_url: config.supabase_url().to_string(),
            anon_key: config.supabase_anon_key().to_string(),
            store,
        }
    }

    fn auth_endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn table_url(&self, params: &[(&str, &str)]) -> Result<Url, String> {
        let endpoint = format!("{}/rest/v1/{}", self.base_url, SNIPPETS_TABLE);
        Url::parse_with_params(&endpoint, params).map_err(|e| e.to_string())
    }

    fn with_headers(&self, builder: RequestBuilder, access_token: Option<&str>) -> RequestBuilder {
        let builder = builder.header("apikey", &self.anon_key);
        match access_token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn token_request(&self, grant_type: &str, body: Value) -> Result<Session, AuthError> {
        let url = Url::parse_with_params(&self.auth_endpoint("token"), &[("grant_type", grant_type)])
            .map_err(|e| AuthError::InvalidUrl(e.to_string()))?;

        log::debug!("Requesting session with grant_type={}", grant_type);

        let response = self
            .with_headers(self.http.post(url), None)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            return Err(AuthError::ExchangeRejected(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ExchangeRejected(format!("Unreadable session: {}", e)))?;

        Ok(token.into_session(unix_now()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        self.token_request("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn fetch_user(&self, access_token: &str) -> Result<User, AuthError> {
        let response = self
            .with_headers(self.http.get(self.auth_endpoint("user")), Some(access_token))
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let message = error_message(response).await;
            log::warn!("Access token rejected: {}", message);
            return Err(AuthError::InvalidSession);
        }

        response
            .json()
            .await
            .map_err(|_| AuthError::InvalidSession)
    }

    async fn persist(&self, session: &Session) -> Result<(), AuthError> {
        save_json(&self.store, SESSION_KEY, session).await
    }

    async fn clear(&self) -> Result<(), AuthError> {
        self.store.remove(SESSION_KEY).await
    }
}

impl<S: CredentialStore> Backend for SupabaseClient<S> {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        let Some(session) = load_json::<_, Session>(&self.store, SESSION_KEY).await? else {
            return Ok(None);
        };

        if !session.is_expired(unix_now()) {
            return Ok(Some(session));
        }

        log::info!("Session expired, refreshing");
        match self.refresh(&session.refresh_token).await {
            Ok(refreshed) => {
                self.persist(&refreshed).await?;
                Ok(Some(refreshed))
            }
            Err(AuthError::Network(e)) => Err(AuthError::Network(e)),
            Err(e) => {
                log::warn!("Refresh failed, signing out locally: {}", e);
                self.clear().await?;
                Ok(None)
            }
        }
    }

    async fn set_session(&self, tokens: &TokenPair) -> Result<Session, AuthError> {
        log::debug!("Setting session from token {}", redact(&tokens.access_token));

        let expires_at = jwt_expiry(&tokens.access_token);
        let expired = expires_at.is_some_and(|at| unix_now() >= at);

        let session = if expired {
            self.refresh(&tokens.refresh_token).await?
        } else {
            let user = self.fetch_user(&tokens.access_token).await?;
            Session {
                access_token: tokens.access_token.clone(),
                refresh_token: tokens.refresh_token.clone(),
                token_type: "bearer".to_string(),
                expires_at,
                user,
            }
        };

        self.persist(&session).await?;
        Ok(session)
    }

    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<Session, AuthError> {
        let session = self
            .token_request(
                "pkce",
                json!({ "auth_code": code, "code_verifier": verifier }),
            )
            .await?;

        self.persist(&session).await?;
        log::info!("Session established for user {}", session.user.id);
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(session) = load_json::<_, Session>(&self.store, SESSION_KEY).await? {
            let result = self
                .with_headers(
                    self.http.post(self.auth_endpoint("logout")),
                    Some(&session.access_token),
                )
                .send()
                .await;

            if let Err(e) = result {
                log::warn!("Logout request failed, clearing local session anyway: {}", e);
            }
        }

        self.clear().await
    }

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        challenge: &str,
    ) -> Result<String, AuthError> {
        Url::parse_with_params(
            &self.auth_endpoint("authorize"),
            &[
                ("provider", provider),
                ("redirect_to", redirect_to),
                ("code_challenge", challenge),
                ("code_challenge_method", CHALLENGE_METHOD),
            ],
        )
        .map(String::from)
        .map_err(|e| AuthError::InvalidUrl(e.to_string()))
    }

    async fn list_snippets(&self, session: &Session) -> Result<Vec<Snippet>, DataError> {
        let owner = format!("eq.{}", session.user.id);
        let url = self
            .table_url(&[
                ("select", "*"),
                ("user_id", owner.as_str()),
                ("order", "created_at.desc"),
            ])
            .map_err(DataError::Query)?;

        let response = self
            .with_headers(self.http.get(url), Some(&session.access_token))
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DataError::Query(error_message(response).await));
        }

        response
            .json()
            .await
            .map_err(|e| DataError::Query(e.to_string()))
    }

    async fn insert_snippet(&self, session: &Session, snippet: &NewSnippet) -> Result<Snippet, DataError> {
        let url = self.table_url(&[("select", "*")]).map_err(DataError::Insert)?;

        let response = self
            .with_headers(self.http.post(url), Some(&session.access_token))
            .header("Prefer", "return=representation")
            .json(snippet)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DataError::Insert(error_message(response).await));
        }

        let rows: Vec<Snippet> = response
            .json()
            .await
            .map_err(|e| DataError::Insert(e.to_string()))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DataError::Insert("no row returned".to_string()))
    }

    async fn delete_snippet(&self, session: &Session, id: &str) -> Result<(), DataError> {
        let filter = format!("eq.{}", id);
        let url = self
            .table_url(&[("id", filter.as_str())])
            .map_err(DataError::Delete)?;

        let response = self
            .with_headers(self.http.delete(url), Some(&session.access_token))
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DataError::Delete(error_message(response).await));
        }

        Ok(())
    }
}

/// Best human-readable message from an error response
async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    message_from_body(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

fn message_from_body(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(message) = value.get(key).and_then(Value::as_str) {
                return Some(message.to_string());
            }
        }
    }

    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `exp` claim of a JWT, without verifying it
fn jwt_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_i64()
}
