/// PKCE verifier/challenge pair (RFC 7636, S256)
use crate::error::AuthError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Value of `code_challenge_method` sent to the backend
pub const CHALLENGE_METHOD: &str = "s256";

const VERIFIER_BYTES: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pkce {
    verifier: String,
    challenge: String,
}

impl Pkce {
    /// Fresh random verifier (43 URL-safe characters) and its challenge
    pub fn generate() -> Result<Self, AuthError> {
        let mut bytes = [0u8; VERIFIER_BYTES];
        getrandom::getrandom(&mut bytes).map_err(|e| AuthError::Random(e.to_string()))?;
        Ok(Self::from_verifier(URL_SAFE_NO_PAD.encode(bytes)))
    }

    pub fn from_verifier(verifier: String) -> Self {
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Pkce {
            verifier,
            challenge,
        }
    }

    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}
