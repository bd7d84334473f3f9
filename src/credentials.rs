/// Key-value persistence for session tokens and preferences
///
/// [`ChromeStorage`] is the real store (`chrome.storage.local` through the JS
/// bridge). Values are JSON strings.
use crate::error::AuthError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use wasm_bindgen::prelude::*;

/// Storage key of the persisted session
pub const SESSION_KEY: &str = "snippet-organizer.session";

/// Storage key of the light/dark preference
pub const THEME_KEY: &str = "snippet-organizer.theme";

#[wasm_bindgen(module = "/js/chrome.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeStorage(key: &str) -> Result<(), JsValue>;
}

pub trait CredentialStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, AuthError>>;
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), AuthError>>;
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), AuthError>>;
}

/// Read and decode a JSON value; undecodable data counts as absent
pub async fn load_json<S, T>(store: &S, key: &str) -> Result<Option<T>, AuthError>
where
    S: CredentialStore,
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            log::warn!("Discarding unreadable value under {}: {}", key, e);
            Ok(None)
        }
    }
}

pub async fn save_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), AuthError>
where
    S: CredentialStore,
    T: Serialize,
{
    let raw = serde_json::to_string(value).map_err(|e| AuthError::Storage(e.to_string()))?;
    store.set(key, &raw).await
}

/// `chrome.storage.local`
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChromeStorage;

impl CredentialStore for ChromeStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let value = getStorage(key)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to get storage: {:?}", e)))?;

        if value.is_null() || value.is_undefined() {
            Ok(None)
        } else {
            Ok(value.as_string())
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        setStorage(key, value)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to save storage: {:?}", e)))
    }

    async fn remove(&self, key: &str) -> Result<(), AuthError> {
        removeStorage(key)
            .await
            .map_err(|e| AuthError::Storage(format!("Failed to clear storage: {:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Session, User};
    use crate::testing::MemoryCredentials;

    fn create_test_session() -> Session {
        Session {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_at: Some(1_700_000_000),
            user: User {
                id: "user-1".to_string(),
                email: None,
            },
        }
    }

    #[tokio::test]
    async fn test_get_set_remove() {
        let store = MemoryCredentials::new();

        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.remove("k").await.unwrap();
        assert!(!store.contains("k"));
    }

    #[tokio::test]
    async fn test_json_round_trip_session() {
        let store = MemoryCredentials::new();
        let session = create_test_session();

        save_json(&store, SESSION_KEY, &session).await.unwrap();
        let loaded: Option<Session> = load_json(&store, SESSION_KEY).await.unwrap();

        assert_eq!(loaded, Some(session));
    }

    #[tokio::test]
    async fn test_unreadable_json_is_absent() {
        let store = MemoryCredentials::new();
        store.set(SESSION_KEY, "{not json").await.unwrap();

        let loaded: Option<Session> = load_json(&store, SESSION_KEY).await.unwrap();

        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_clones_share_values() {
        let store = MemoryCredentials::new();
        let other = store.clone();

        store.set(THEME_KEY, "\"dark\"").await.unwrap();

        assert!(other.contains(THEME_KEY));
    }
}
