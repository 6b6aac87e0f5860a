//! Informational token payload extraction.
//!
//! The AniBlog API embeds the signed-in identity in the token's payload
//! segment as a nested `payload` claim. The client performs no signature
//! verification; the token is trusted because it was obtained directly from
//! the server's auth response, and decoding is purely informational.

use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;

use crate::api::ApiError;
use crate::models::User;

#[derive(Debug, Deserialize)]
struct Claims {
    payload: User,
}

/// Extract the user identity from a three-segment signed token.
///
/// Fails with [`ApiError::MalformedToken`] if the token does not have three
/// segments or the payload segment is not base64url-encoded JSON carrying a
/// `payload` claim.
pub fn decode_user(token: &str) -> Result<User, ApiError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => {
            return Err(ApiError::MalformedToken(
                "expected three token segments".to_string(),
            ))
        }
    };

    // Tokens are normally unpadded base64url, but some issuers pad
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .map_err(|e| ApiError::MalformedToken(format!("payload is not base64url: {e}")))?;

    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::MalformedToken(format!("payload is not valid claims JSON: {e}")))?;

    Ok(claims.payload)
}
