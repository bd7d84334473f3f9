/// Popup ↔ background message protocol
///
/// Requests travel as `{"type": "initiate_login"}` or
/// `{"type": "get_tokens", "domain": "..."}`; every reply is either
/// `{"data": ...}` or `{"error": "..."}`.
use crate::error::AuthError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/chrome.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn sendMessage(message: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Run the interactive OAuth flow
    InitiateLogin,
    /// Sign in with the website's token cookies for `domain`
    GetTokens { domain: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply<T> {
    Data(T),
    Error(String),
}

impl<T> Reply<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Reply::Data(data),
            Err(e) => Reply::Error(e.to_string()),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            Reply::Data(data) => Ok(data),
            Reply::Error(message) => Err(message),
        }
    }
}

/// Plain JS objects (not `Map`s) so `chrome.runtime` can clone them
pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Send a request to the background worker and decode its reply
pub async fn send<T: DeserializeOwned>(request: &Request) -> Result<T, AuthError> {
    let message = to_js(request).map_err(|e| AuthError::Relay(format!("{:?}", e)))?;

    let response = sendMessage(message)
        .await
        .map_err(|e| AuthError::Relay(format!("Background worker unavailable: {:?}", e)))?;

    if response.is_null() || response.is_undefined() {
        return Err(AuthError::Relay("No response from background worker".to_string()));
    }

    let reply: Reply<T> = serde_wasm_bindgen::from_value(response)
        .map_err(|e| AuthError::Relay(format!("Unreadable reply: {}", e)))?;

    reply.into_result().map_err(AuthError::Relay)
}
