/// Token relay: runs the interactive OAuth flow for the popup
///
/// One login at a time. The relay owns a [`LoginGate`]; a second request while
/// a flow is open, whether another login or a token install, is turned away
/// with [`AuthError::LoginInProgress`] and never reaches the backend, so it
/// can't overwrite the session the first one writes.
///
/// Redirect handling, in order:
/// 1. `error` / `error_description` from the provider → [`AuthError::Provider`]
/// 2. `code` in the query or fragment → PKCE exchange
/// 3. `access_token` + `refresh_token` in the fragment or query → installed as-is
/// 4. anything else → [`AuthError::MissingCode`]
use crate::backend::Backend;
use crate::error::AuthError;
use crate::pkce::Pkce;
use crate::session::{Session, TokenPair};
use std::cell::Cell;
use std::collections::HashMap;
use std::future::Future;
use url::Url;
use url::form_urlencoded;

/// The browser's interactive web auth view (`chrome.identity`)
pub trait WebAuthFlow {
    /// Redirect URI owned by this extension instance
    fn redirect_url(&self) -> String;

    /// Open `url` and resolve with the URL the view redirected to
    fn launch(&self, url: &str) -> impl Future<Output = Result<String, AuthError>>;
}

/// What a redirect carried back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    Code(String),
    Tokens(TokenPair),
}

pub fn parse_redirect(redirect: &str) -> Result<RedirectOutcome, AuthError> {
    let url = Url::parse(redirect).map_err(|e| AuthError::InvalidUrl(e.to_string()))?;

    let mut params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    if let Some(fragment) = url.fragment() {
        for (key, value) in form_urlencoded::parse(fragment.as_bytes()).into_owned() {
            params.entry(key).or_insert(value);
        }
    }

    let param = |key: &str| params.get(key).filter(|v| !v.is_empty()).cloned();

    if let Some(error) = param("error_description").or_else(|| param("error")) {
        return Err(AuthError::Provider(error));
    }

    if let Some(code) = param("code") {
        return Ok(RedirectOutcome::Code(code));
    }

    match (param("access_token"), param("refresh_token")) {
        (Some(access_token), Some(refresh_token)) => Ok(RedirectOutcome::Tokens(TokenPair {
            access_token,
            refresh_token,
        })),
        _ => Err(AuthError::MissingCode),
    }
}

/// Single-flight guard for login attempts
#[derive(Debug, Default)]
pub struct LoginGate {
    busy: Cell<bool>,
}

/// Held for the duration of one attempt; releases the gate on drop
#[derive(Debug)]
pub struct LoginPermit<'a> {
    gate: &'a LoginGate,
}

impl LoginGate {
    pub fn try_acquire(&self) -> Result<LoginPermit<'_>, AuthError> {
        if self.busy.replace(true) {
            return Err(AuthError::LoginInProgress);
        }
        Ok(LoginPermit { gate: self })
    }

    #[cfg(test)]
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }
}

impl Drop for LoginPermit<'_> {
    fn drop(&mut self) {
        self.gate.busy.set(false);
    }
}

pub struct TokenRelay<B, W> {
    backend: B,
    web_auth: W,
    provider: String,
    gate: LoginGate,
}

impl<B: Backend, W: WebAuthFlow> TokenRelay<B, W> {
    pub fn new(backend: B, web_auth: W, provider: impl Into<String>) -> Self {
        TokenRelay {
            backend,
            web_auth,
            provider: provider.into(),
            gate: LoginGate::default(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Install tokens obtained outside the web auth view (website cookies,
    /// magic links) under the same gate as an interactive login
    pub async fn install_tokens(&self, tokens: &TokenPair) -> Result<Session, AuthError> {
        let _permit = self.gate.try_acquire().inspect_err(|_| {
            log::warn!("Token install requested while a login is in flight");
        })?;

        self.backend.set_session(tokens).await
    }

    /// Run one interactive login and persist the resulting session
    pub async fn login(&self) -> Result<Session, AuthError> {
        let _permit = self.gate.try_acquire().inspect_err(|_| {
            log::warn!("Login requested while another is in flight");
        })?;

        let pkce = Pkce::generate()?;
        let redirect_url = self.web_auth.redirect_url();
        let auth_url = self
            .backend
            .authorize_url(&self.provider, &redirect_url, pkce.challenge())?;

        log::info!("Starting {} login, redirect {}", self.provider, redirect_url);

        let redirected = self.web_auth.launch(&auth_url).await.inspect_err(|e| {
            log::error!("Web auth flow failed: {}", e);
        })?;

        let session = match parse_redirect(&redirected)? {
            RedirectOutcome::Code(code) => {
                log::debug!("Exchanging authorization code");
                self.backend.exchange_code(&code, pkce.verifier()).await
            }
            RedirectOutcome::Tokens(tokens) => {
                log::debug!("Redirect carried tokens, installing them");
                self.backend.set_session(&tokens).await
            }
        };

        match &session {
            Ok(session) => log::info!("Login complete for user {}", session.user.id),
            Err(e) => log::error!("Login failed: {}", e),
        }
        session
    }
}
