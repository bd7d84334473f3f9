/// In-memory fakes shared by the unit tests
use crate::backend::Backend;
use crate::credentials::{CredentialStore, SESSION_KEY, load_json, save_json};
use crate::error::{AuthError, DataError};
use crate::operations::sort_newest_first;
use crate::relay::WebAuthFlow;
use crate::session::{Session, TokenPair, User};
use crate::snippet::{NewSnippet, Snippet};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use serde_json::Value;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

pub const REDIRECT_URL: &str = "https://extension-id.chromiumapp.org/";

pub fn create_test_session(user_id: &str) -> Session {
    Session {
        access_token: format!("access-{}", user_id),
        refresh_token: format!("refresh-{}", user_id),
        token_type: "bearer".to_string(),
        expires_at: None,
        user: User {
            id: user_id.to_string(),
            email: None,
        },
    }
}

/// In-memory store for tests
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentials {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }
}

impl CredentialStore for MemoryCredentials {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Default)]
struct BackendState {
    store: MemoryCredentials,
    codes: RefCell<HashMap<String, String>>,
    tokens: RefCell<HashMap<String, String>>,
    snippets: RefCell<Vec<Snippet>>,
    next_id: Cell<u32>,
    network_calls: Cell<usize>,
    last_verifier: RefCell<Option<String>>,
    fail_inserts: Cell<bool>,
}

/// Backend double: auth against known codes/tokens, a `Vec` as the table
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Rc<BackendState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_code(&self, code: &str, user_id: &str) {
        self.state
            .codes
            .borrow_mut()
            .insert(code.to_string(), user_id.to_string());
    }

    pub fn allow_tokens(&self, access_token: &str, user_id: &str) {
        self.state
            .tokens
            .borrow_mut()
            .insert(access_token.to_string(), user_id.to_string());
    }

    pub fn fail_inserts(&self) {
        self.state.fail_inserts.set(true);
    }

    pub fn seed(&self, snippet: Snippet) {
        self.state.snippets.borrow_mut().push(snippet);
    }

    pub fn network_calls(&self) -> usize {
        self.state.network_calls.get()
    }

    pub fn last_verifier(&self) -> Option<String> {
        self.state.last_verifier.borrow().clone()
    }

    pub async fn stored_session(&self) -> Option<Session> {
        load_json(&self.state.store, SESSION_KEY).await.ok().flatten()
    }

    fn call(&self) {
        self.state.network_calls.set(self.state.network_calls.get() + 1);
    }

    async fn install(&self, session: Session) -> Result<Session, AuthError> {
        save_json(&self.state.store, SESSION_KEY, &session).await?;
        Ok(session)
    }
}

impl Backend for FakeBackend {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        load_json(&self.state.store, SESSION_KEY).await
    }

    async fn set_session(&self, tokens: &TokenPair) -> Result<Session, AuthError> {
        self.call();
        let user_id = self
            .state
            .tokens
            .borrow()
            .get(&tokens.access_token)
            .cloned()
            .ok_or(AuthError::InvalidSession)?;

        let mut session = create_test_session(&user_id);
        session.access_token = tokens.access_token.clone();
        session.refresh_token = tokens.refresh_token.clone();
        self.install(session).await
    }

    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<Session, AuthError> {
        self.call();
        *self.state.last_verifier.borrow_mut() = Some(verifier.to_string());

        let user_id = self.state.codes.borrow().get(code).cloned();
        match user_id {
            Some(user_id) => self.install(create_test_session(&user_id)).await,
            None => Err(AuthError::ExchangeRejected("invalid authorization code".to_string())),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.state.store.remove(SESSION_KEY).await
    }

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        challenge: &str,
    ) -> Result<String, AuthError> {
        Url::parse_with_params(
            "https://backend.test/auth/v1/authorize",
            &[
                ("provider", provider),
                ("redirect_to", redirect_to),
                ("code_challenge", challenge),
            ],
        )
        .map(String::from)
        .map_err(|e| AuthError::InvalidUrl(e.to_string()))
    }

    async fn list_snippets(&self, session: &Session) -> Result<Vec<Snippet>, DataError> {
        self.call();
        let owned: Vec<Snippet> = self
            .state
            .snippets
            .borrow()
            .iter()
            .filter(|s| s.user_id == session.user.id)
            .cloned()
            .collect();
        Ok(sort_newest_first(&owned))
    }

    async fn insert_snippet(&self, _session: &Session, snippet: &NewSnippet) -> Result<Snippet, DataError> {
        self.call();
        if self.state.fail_inserts.get() {
            return Err(DataError::Insert("permission denied".to_string()));
        }

        let n = self.state.next_id.get() + 1;
        self.state.next_id.set(n);
        let timestamp = format!("2030-01-01T00:00:{:02}+00:00", n);

        let row = Snippet {
            id: format!("snippet-{}", n),
            user_id: snippet.user_id.clone(),
            title: snippet.title.clone(),
            code: snippet.code.clone(),
            language: snippet.language.clone(),
            tags: snippet.tags.clone(),
            notes: snippet.notes.clone(),
            is_public: Some(snippet.is_public),
            slug: snippet.slug.clone(),
            views: Some(0),
            created_at: timestamp.clone(),
            updated_at: timestamp,
        };
        self.state.snippets.borrow_mut().push(row.clone());
        Ok(row)
    }

    async fn delete_snippet(&self, _session: &Session, id: &str) -> Result<(), DataError> {
        self.call();
        self.state.snippets.borrow_mut().retain(|s| s.id != id);
        Ok(())
    }
}

/// Web auth view double that redirects to a fixed URL (or fails)
pub struct FakeWebAuth {
    outcome: Result<String, AuthError>,
    launched: RefCell<Vec<String>>,
}

impl FakeWebAuth {
    pub fn new(outcome: Result<String, AuthError>) -> Self {
        FakeWebAuth {
            outcome,
            launched: RefCell::new(Vec::new()),
        }
    }

    pub fn launched_urls(&self) -> Vec<String> {
        self.launched.borrow().clone()
    }
}

impl WebAuthFlow for FakeWebAuth {
    fn redirect_url(&self) -> String {
        REDIRECT_URL.to_string()
    }

    async fn launch(&self, url: &str) -> Result<String, AuthError> {
        self.launched.borrow_mut().push(url.to_string());
        // The real view stays open for a while; give other tasks a turn
        tokio::task::yield_now().await;
        self.outcome.clone()
    }
}

/// Canned HTTP responder on localhost, for driving the real client
///
/// Each route pairs a request-line prefix (`"POST /auth/v1/token?grant_type=pkce"`)
/// with a status and JSON body; anything else gets a 404.
pub struct StubServer {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start(routes: Vec<(&'static str, u16, Value)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await;
                let line = request.lines().next().unwrap_or_default().to_string();
                seen.lock().unwrap().push(request);

                let (status, body) = routes
                    .iter()
                    .find(|(prefix, _, _)| line.starts_with(prefix))
                    .map(|(_, status, body)| (*status, body.to_string()))
                    .unwrap_or((404, r#"{"message":"no route"}"#.to_string()));
                let response = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        StubServer { url, requests }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw requests seen so far (request line, headers, body)
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn received(&self, prefix: &str) -> bool {
        self.requests().iter().any(|r| r.starts_with(prefix))
    }
}

/// Base URL nothing listens on
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    format!("http://{}", listener.local_addr().unwrap())
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = socket.read(&mut buf).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&data[..end]).to_lowercase();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if data.len() >= end + 4 + length {
            break;
        }
    }

    String::from_utf8_lossy(&data).into_owned()
}
