//! Domain Services
//!
//! Compact HS256 token codec:
//! `base64url(header) "." base64url(claims) "." base64url(HMAC-SHA256(secret, header "." claims))`

use platform::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};
use thiserror::Error;

use crate::domain::entity::session_token::Claims;

/// Fixed JOSE header; tokens carrying any other header are rejected.
const HEADER_JSON: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Error)]
pub enum TokenCodecError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature does not verify")]
    BadSignature,

    #[error("claims could not be serialized: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Sign `claims` with `secret`
pub fn encode_token(claims: &Claims, secret: &[u8]) -> Result<String, TokenCodecError> {
    let header = to_base64url(HEADER_JSON.as_bytes());
    let payload = to_base64url(&serde_json::to_vec(claims)?);

    let signing_input = format!("{header}.{payload}");
    let signature = hmac_sha256(secret, signing_input.as_bytes());

    Ok(format!("{signing_input}.{}", to_base64url(&signature)))
}

/// Verify the signature of `token` with `secret` and return its claims.
///
/// Expiry and type are not checked here.
pub fn decode_token(token: &str, secret: &[u8]) -> Result<Claims, TokenCodecError> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenCodecError::Malformed);
    };

    let signature = from_base64url(signature).map_err(|_| TokenCodecError::Malformed)?;
    let signing_input = &token[..header.len() + 1 + payload.len()];

    if !verify_hmac_sha256(secret, signing_input.as_bytes(), &signature) {
        return Err(TokenCodecError::BadSignature);
    }

    let header = from_base64url(header).map_err(|_| TokenCodecError::Malformed)?;
    if header != HEADER_JSON.as_bytes() {
        return Err(TokenCodecError::Malformed);
    }

    let payload = from_base64url(payload).map_err(|_| TokenCodecError::Malformed)?;
    serde_json::from_slice(&payload).map_err(|_| TokenCodecError::Malformed)
}
