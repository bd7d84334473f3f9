/// Error taxonomy for the popup and the background worker
use thiserror::Error;

/// Login, session and token failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Login was cancelled")]
    Cancelled,
    #[error("A login is already in progress")]
    LoginInProgress,
    #[error("Missing code in redirect URL")]
    MissingCode,
    #[error("Sign-in provider returned an error: {0}")]
    Provider(String),
    #[error("Session exchange failed: {0}")]
    ExchangeRejected(String),
    #[error("Session is invalid or expired")]
    InvalidSession,
    #[error("{0}")]
    TokensUnavailable(String),
    /// Error text relayed back from the background worker
    #[error("{0}")]
    Relay(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Could not generate a login challenge: {0}")]
    Random(String),
}

/// Snippet table failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("Sign in to manage snippets")]
    NotSignedIn,
    #[error("Failed to load snippets: {0}")]
    Query(String),
    #[error("Failed to save snippet: {0}")]
    Insert(String),
    #[error("Failed to delete snippet: {0}")]
    Delete(String),
    #[error("Network error: {0}")]
    Network(String),
}

/// Client-side form checks
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Code is required")]
    EmptyCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummarizeError {
    #[error("AI summaries are not configured")]
    NotConfigured,
    #[error("Summary request failed: {0}")]
    Request(String),
    #[error("Summary service returned an unexpected response")]
    UnexpectedResponse,
}

/// Anything the popup can surface inline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}
