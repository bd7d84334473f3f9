/// Session and identity types issued by the backend's auth service
use serde::{Deserialize, Serialize};

/// Seconds before the real expiry at which a token is treated as expired
pub const EXPIRY_MARGIN_SECS: i64 = 30;

/// The signed-in identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Access/refresh tokens plus the identity they belong to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Unix seconds; `None` when the backend didn't say
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl Session {
    pub fn is_expired(&self, now_secs: i64) -> bool {
        self.expires_at
            .map(|at| now_secs + EXPIRY_MARGIN_SECS >= at)
            .unwrap_or(false)
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// A bare token pair, as found in cookies or an implicit-flow redirect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Token prefix safe to put in a log line
pub fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(10).collect();
    format!("{}...", prefix)
}

/// Current unix time in seconds
pub fn unix_now() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Date::now() / 1000.0) as i64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_session(expires_at: Option<i64>) -> Session {
        Session {
            access_token: "access-abcdefghijklmnop".to_string(),
            refresh_token: "refresh-123".to_string(),
            token_type: "bearer".to_string(),
            expires_at,
            user: User {
                id: "user-1".to_string(),
                email: Some("dev@example.com".to_string()),
            },
        }
    }

    #[test]
    fn test_expiry_with_margin() {
        let session = create_test_session(Some(1_000));

        assert!(!session.is_expired(900));
        assert!(session.is_expired(970));
        assert!(session.is_expired(2_000));
    }

    #[test]
    fn test_unknown_expiry_never_expires() {
        let session = create_test_session(None);
        assert!(!session.is_expired(i64::MAX - EXPIRY_MARGIN_SECS));
    }

    #[test]
    fn test_deserialize_backend_session() {
        let json = r#"{
            "access_token": "a",
            "refresh_token": "r",
            "expires_at": 1700000000,
            "expires_in": 3600,
            "user": {"id": "u-1", "email": "x@y.z", "role": "authenticated"}
        }"#;

        let session: Session = serde_json::from_str(json).unwrap();

        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.expires_at, Some(1_700_000_000));
        assert_eq!(session.user_id(), "u-1");
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("access-abcdefghijklmnop"), "access-abc...");
        assert_eq!(redact("short"), "short...");
    }
}
