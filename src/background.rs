/// Background service worker: message handling and process state
///
/// [`BackgroundState`] is everything the worker keeps between messages: the
/// token relay (with its login gate) and the set of open popup ports. The JS
/// glue owns one [`Background`] and routes every `chrome.runtime` event to it.
use crate::backend::{Backend, SupabaseClient};
use crate::config::Config;
use crate::credentials::ChromeStorage;
use crate::error::AuthError;
use crate::messages::{Reply, Request, to_js};
use crate::relay::{RedirectOutcome, TokenRelay, WebAuthFlow, parse_redirect};
use crate::session::{Session, TokenPair, redact};
use serde::Deserialize;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// Cookie the website stores the access token in
pub const ACCESS_COOKIE: &str = "snippet-organizer-token";

/// Cookie the website stores the refresh token in
pub const REFRESH_COOKIE: &str = "snippet-organizer-refresh";

#[wasm_bindgen(module = "/js/chrome.js")]
extern "C" {
    fn getRedirectURL() -> String;

    #[wasm_bindgen(catch)]
    async fn launchWebAuthFlow(url: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn getCookies(url: &str) -> Result<JsValue, JsValue>;
}

/// `chrome.identity`
#[derive(Clone, Copy, Debug, Default)]
pub struct ChromeIdentity;

impl WebAuthFlow for ChromeIdentity {
    fn redirect_url(&self) -> String {
        getRedirectURL()
    }

    async fn launch(&self, url: &str) -> Result<String, AuthError> {
        match launchWebAuthFlow(url).await {
            Ok(redirect) => redirect
                .as_string()
                .filter(|r| !r.is_empty())
                .ok_or(AuthError::Cancelled),
            Err(e) => {
                // chrome.runtime.lastError: closed window or denied consent
                log::warn!("Web auth flow ended without redirect: {:?}", e);
                Err(AuthError::Cancelled)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

/// Source of the website's cookies (`chrome.cookies`)
pub trait CookieJar {
    fn cookies(&self, url: &str) -> impl Future<Output = Result<Vec<Cookie>, AuthError>>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ChromeCookies;

impl CookieJar for ChromeCookies {
    async fn cookies(&self, url: &str) -> Result<Vec<Cookie>, AuthError> {
        let cookies = getCookies(url).await.map_err(|e| {
            log::error!("Cookie API unavailable: {:?}", e);
            AuthError::TokensUnavailable(
                "Cookie API not available. Please reload the extension.".to_string(),
            )
        })?;

        serde_wasm_bindgen::from_value(cookies)
            .map_err(|e| AuthError::TokensUnavailable(format!("Unreadable cookies: {}", e)))
    }
}

/// Pick the website's token pair out of its cookies
pub fn tokens_from_cookies(cookies: &[Cookie]) -> Result<TokenPair, AuthError> {
    let find = |name: &str| cookies.iter().find(|c| c.name == name && !c.value.is_empty());

    let access = find(ACCESS_COOKIE).ok_or_else(|| {
        AuthError::TokensUnavailable("No auth tokens found. Please log in on the website.".to_string())
    })?;
    let refresh = find(REFRESH_COOKIE)
        .ok_or_else(|| AuthError::TokensUnavailable("Refresh token not found".to_string()))?;

    Ok(TokenPair {
        access_token: access.value.clone(),
        refresh_token: refresh.value.clone(),
    })
}

pub struct BackgroundState<B, W, C> {
    relay: TokenRelay<B, W>,
    cookies: C,
    connections: RefCell<HashSet<u32>>,
    next_connection: Cell<u32>,
}

impl<B: Backend, W: WebAuthFlow, C: CookieJar> BackgroundState<B, W, C> {
    pub fn new(relay: TokenRelay<B, W>, cookies: C) -> Self {
        BackgroundState {
            relay,
            cookies,
            connections: RefCell::new(HashSet::new()),
            next_connection: Cell::new(0),
        }
    }

    /// Both requests answer with the session they installed
    pub async fn handle(&self, request: Request) -> Reply<Session> {
        log::debug!("Message received: {:?}", request);

        match request {
            Request::InitiateLogin => Reply::from_result(self.relay.login().await),
            Request::GetTokens { domain } => Reply::from_result(self.website_login(&domain).await),
        }
    }

    async fn website_login(&self, domain: &str) -> Result<Session, AuthError> {
        let tokens = self.website_tokens(domain).await?;
        self.relay.install_tokens(&tokens).await
    }

    async fn website_tokens(&self, domain: &str) -> Result<TokenPair, AuthError> {
        log::info!("Getting cookies for URL: {}", domain);
        let cookies = self.cookies.cookies(domain).await?;
        let tokens = tokens_from_cookies(&cookies).inspect_err(|e| log::warn!("{}", e))?;
        log::debug!(
            "Found website tokens: access {}, refresh {}",
            redact(&tokens.access_token),
            redact(&tokens.refresh_token)
        );
        Ok(tokens)
    }

    /// Magic-link redirects land on the extension's redirect URL outside any
    /// interactive flow; install their tokens. Ignored while a login runs.
    pub async fn handle_navigation(&self, url: &str, redirect_url: &str) -> Option<Result<Session, AuthError>> {
        if !url.starts_with(redirect_url) {
            return None;
        }

        let Ok(RedirectOutcome::Tokens(tokens)) = parse_redirect(url) else {
            return None;
        };

        log::info!("Processing auth redirect");
        match self.relay.install_tokens(&tokens).await {
            Err(AuthError::LoginInProgress) => {
                log::debug!("Login in progress, leaving the redirect to it");
                None
            }
            result => Some(result),
        }
    }

    pub fn connection_opened(&self) -> u32 {
        let id = self.next_connection.get().wrapping_add(1);
        self.next_connection.set(id);
        self.connections.borrow_mut().insert(id);
        log::debug!("New connection established: {}", id);
        id
    }

    pub fn connection_closed(&self, id: u32) {
        if self.connections.borrow_mut().remove(&id) {
            log::debug!("Connection closed: {}", id);
        }
    }

    pub fn active_connections(&self) -> usize {
        self.connections.borrow().len()
    }
}

type ChromeState = BackgroundState<SupabaseClient<ChromeStorage>, ChromeIdentity, ChromeCookies>;

/// Handle the JS glue keeps for the worker's lifetime
#[wasm_bindgen]
pub struct Background {
    state: Rc<ChromeState>,
    redirect_url: String,
    wake_lock: RefCell<Option<JsValue>>,
}

#[wasm_bindgen]
impl Background {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Background {
        let config = Config::from_build_env();
        let backend = SupabaseClient::new(&config, ChromeStorage);
        let relay = TokenRelay::new(backend, ChromeIdentity, config.oauth_provider());
        let redirect_url = ChromeIdentity.redirect_url();

        log::info!("Background worker ready, redirect URL {}", redirect_url);

        Background {
            state: Rc::new(BackgroundState::new(relay, ChromeCookies)),
            redirect_url,
            wake_lock: RefCell::new(None),
        }
    }

    /// Answer a `chrome.runtime` message; resolves with `{data}` or `{error}`
    pub fn handle_message(&self, message: JsValue) -> js_sys::Promise {
        let state = self.state.clone();
        future_to_promise(async move {
            let reply = match serde_wasm_bindgen::from_value::<Request>(message) {
                Ok(request) => state.handle(request).await,
                Err(e) => {
                    log::warn!("Unknown message: {}", e);
                    Reply::Error(format!("Unknown message: {}", e))
                }
            };
            to_js(&reply)
        })
    }

    pub fn handle_navigation(&self, url: String) -> js_sys::Promise {
        let state = self.state.clone();
        let redirect_url = self.redirect_url.clone();
        future_to_promise(async move {
            match state.handle_navigation(&url, &redirect_url).await {
                Some(Ok(session)) => log::info!("Session set from redirect for {}", session.user.id),
                Some(Err(e)) => log::error!("Error setting session: {}", e),
                None => {}
            }
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn connection_opened(&self) -> u32 {
        self.state.connection_opened()
    }

    pub fn connection_closed(&self, id: u32) {
        self.state.connection_closed(id);
    }

    /// Open popup ports; the glue drops the wake lock at zero
    pub fn active_connections(&self) -> usize {
        self.state.active_connections()
    }

    /// Swap in a new wake lock, handing back the previous one to release
    pub fn replace_wake_lock(&self, lock: JsValue) -> JsValue {
        self.wake_lock
            .replace(Some(lock))
            .unwrap_or(JsValue::UNDEFINED)
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::new()
    }
}
