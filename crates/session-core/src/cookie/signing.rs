//! Cookie value encoding and HMAC-SHA256 signing

use base64::{
    engine::general_purpose::{STANDARD, STANDARD_NO_PAD},
    Engine,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::SessionError;

type HmacSha256 = Hmac<Sha256>;

/// JSON-encode the value, then base64 it so it is cookie-safe.
pub fn encode_value(value: &str) -> Result<String, SessionError> {
    let json = serde_json::to_string(value)?;
    Ok(STANDARD.encode(json))
}

pub fn decode_value(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded).ok()?;
    serde_json::from_slice::<String>(&bytes).ok()
}

/// Append `.` and the unpadded base64 HMAC of `value`.
pub fn sign(value: &str, secret: &str) -> Result<String, SessionError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SessionError::CookieError(format!("HMAC error: {}", e)))?;
    mac.update(value.as_bytes());

    let signature = STANDARD_NO_PAD.encode(mac.finalize().into_bytes());
    Ok(format!("{}.{}", value, signature))
}

/// Return the original value when the signature matches `secret`.
pub fn unsign(signed: &str, secret: &str) -> Option<String> {
    let (value, signature) = signed.rsplit_once('.')?;
    let signature = STANDARD_NO_PAD.decode(signature).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(value.as_bytes());
    mac.verify_slice(&signature).ok()?;

    Some(value.to_string())
}
