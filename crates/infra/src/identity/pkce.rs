//! PKCE (Proof Key for Code Exchange) for the installed-app OAuth flow
//!
//! Implements RFC 7636 with the S256 method.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;
use sha2::{Digest, Sha256};

/// 32 random bytes, base64url encoded (43 characters).
fn random_token() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen()).collect();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// BASE64URL(SHA256(ASCII(verifier)))
pub fn code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Verifier, challenge and CSRF state for one authorization request
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// Kept secret until the code exchange
    pub code_verifier: String,
    /// Sent in the authorization request
    pub code_challenge: String,
    /// Must come back unchanged on the callback
    pub state: String,
}

impl PkceChallenge {
    pub fn generate() -> Self {
        let code_verifier = random_token();
        let code_challenge = code_challenge(&code_verifier);
        Self { code_verifier, code_challenge, state: random_token() }
    }

    pub fn method(&self) -> &'static str {
        "S256"
    }
}
