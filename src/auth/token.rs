//! JWT helpers
//!
//! Only the `exp` claim is read; signatures are the provider's concern.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AuthError;

/// Decode base64url (URL-safe base64 without padding)
fn base64_decode_url(input: &str) -> std::result::Result<Vec<u8>, String> {
    use base64::{Engine as _, engine::general_purpose};

    general_purpose::URL_SAFE_NO_PAD
        .decode(input.trim_end_matches('='))
        .map_err(|e| e.to_string())
}

/// Read the expiration time from a JWT's payload.
pub fn expiry_from_jwt(token: &str) -> std::result::Result<DateTime<Utc>, AuthError> {
    #[derive(Deserialize)]
    struct JwtPayload {
        exp: i64, // Unix timestamp
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(AuthError::InvalidToken("expected three segments".to_string()));
    }

    let payload_bytes = base64_decode_url(parts[1])
        .map_err(|e| AuthError::InvalidToken(format!("payload is not base64url: {}", e)))?;

    let payload: JwtPayload = serde_json::from_slice(&payload_bytes)
        .map_err(|e| AuthError::InvalidToken(format!("payload has no exp claim: {}", e)))?;

    DateTime::from_timestamp(payload.exp, 0)
        .ok_or_else(|| AuthError::InvalidToken("exp is out of range".to_string()))
}

/// Build an unsigned JWT carrying only `exp`, for tests.
#[cfg(test)]
pub fn fake_jwt(expires_at: DateTime<Utc>) -> String {
    use base64::{Engine as _, engine::general_purpose};

    let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
    let payload =
        general_purpose::URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, expires_at.timestamp()));
    format!("{}.{}.sig", header, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_roundtrip() {
        let exp = DateTime::from_timestamp(1_900_000_000, 0).unwrap();
        assert_eq!(expiry_from_jwt(&fake_jwt(exp)).unwrap(), exp);
    }

    #[test]
    fn test_trailing_padding_is_tolerated() {
        let token = "e30.eyJleHAiOjF9.sig";
        assert_eq!(expiry_from_jwt(token).unwrap().timestamp(), 1);
        assert!(expiry_from_jwt("e30.eyJleHAiOjF9==.sig").is_ok());
    }

    #[test]
    fn test_wrong_segment_count() {
        assert!(matches!(
            expiry_from_jwt("abc.def"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_missing_exp() {
        assert!(expiry_from_jwt("e30.e30.sig").is_err());
    }
}
