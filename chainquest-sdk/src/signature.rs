//! Signature algorithm and verification for Kwala webhooks.
//!
//! Every webhook delivered by the Kwala workflow service carries an
//! HMAC-SHA256 of the raw request body, hex-encoded:
//!
//! ```text
//! x-kwala-signature: hex(HMAC-SHA256(raw_body, webhook_secret))
//! ```
//!
//! The signature covers the exact bytes on the wire, so verification always
//! runs on the raw body, never on re-serialized JSON.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Header name for the HMAC signature.
pub const SIGNATURE_HEADER: &str = "x-kwala-signature";

/// Header name for the optional upstream delivery id.
pub const EVENT_ID_HEADER: &str = "x-kwala-event-id";

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid signature")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

// ---------------------------------------------------------------------------
// SignedPayload — body signing
// ---------------------------------------------------------------------------

/// A webhook body serialized once, with the signature computed over those
/// exact bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    pub json: String,
    pub signature: Box<[u8]>,
}

impl SignedPayload {
    /// Serialize `body` to JSON and sign it with `key`.
    pub fn new<T: Serialize>(body: &T, key: &[u8]) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(body)?;
        let signature = ring::hmac::sign(
            &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
            json.as_bytes(),
        );
        Ok(Self {
            json,
            signature: signature.as_ref().to_owned().into_boxed_slice(),
        })
    }

    /// Format the `x-kwala-signature` header value.
    pub fn to_header(&self) -> String {
        hex::encode(&self.signature)
    }
}

/// Compute the hex `x-kwala-signature` value for a raw body.
pub fn sign_body(body: &[u8], key: &[u8]) -> String {
    let tag = ring::hmac::sign(&ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key), body);
    hex::encode(tag.as_ref())
}

/// Verify a hex `x-kwala-signature` value against the raw body.
///
/// The tag comparison is constant-time (delegated to `ring::hmac::verify`).
pub fn verify_body(body: &[u8], header_value: &str, key: &[u8]) -> Result<(), SignatureError> {
    let signature = hex::decode(header_value.trim()).map_err(|_| SignatureError::InvalidHex)?;
    ring::hmac::verify(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
        body,
        &signature,
    )?;
    Ok(())
}

/// Verify and deserialize an incoming webhook.
///
/// * `header_value` – value of the `x-kwala-signature` request header.
/// * `body` – raw request body bytes.
/// * `key` – the webhook secret shared with the Kwala workspace.
pub fn verify_webhook<T: DeserializeOwned>(
    header_value: &str,
    body: &[u8],
    key: &[u8],
) -> Result<T, SignatureError> {
    verify_body(body, header_value, key)?;
    Ok(serde_json::from_slice(body)?)
}

/// Hex SHA-256 of a raw body.
///
/// Used as the fallback idempotency key when a delivery carries no event id,
/// so byte-identical redeliveries still collapse onto one event. Two distinct
/// deliveries with identical bodies collapse too; senders that repeat a body
/// on purpose must send an event id.
pub fn body_digest(body: &[u8]) -> String {
    let digest = ring::digest::digest(&ring::digest::SHA256, body);
    hex::encode(digest.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"kwala-test-secret";

    #[test]
    fn test_signed_body_verifies() {
        let body = br#"{"tokenId":"7","oldLevel":1,"newLevel":2}"#;
        let header = sign_body(body, SECRET);
        assert_eq!(header.len(), 64);
        assert!(verify_body(body, &header, SECRET).is_ok());
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let signed = br#"{"tokenId":"7","oldLevel":1,"newLevel":2}"#;
        let tampered = br#"{"tokenId":"7","oldLevel":1,"newLevel":9}"#;
        let header = sign_body(signed, SECRET);
        assert!(matches!(
            verify_body(tampered, &header, SECRET),
            Err(SignatureError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let body = br#"{"player":"0x01"}"#;
        let header = sign_body(body, b"other-secret");
        assert!(verify_body(body, &header, SECRET).is_err());
    }

    #[test]
    fn test_non_hex_header_is_rejected() {
        let body = br#"{}"#;
        assert!(matches!(
            verify_body(body, "not-hex!", SECRET),
            Err(SignatureError::InvalidHex)
        ));
    }

    #[test]
    fn test_uppercase_hex_is_accepted() {
        let body = br#"{"questId":"daily_login"}"#;
        let header = sign_body(body, SECRET).to_uppercase();
        assert!(verify_body(body, &header, SECRET).is_ok());
    }

    #[test]
    fn test_signed_payload_matches_raw_signing() {
        #[derive(Serialize)]
        struct Ping {
            n: u32,
        }
        let signed = SignedPayload::new(&Ping { n: 3 }, SECRET).unwrap();
        assert_eq!(signed.json, r#"{"n":3}"#);
        assert_eq!(signed.to_header(), sign_body(signed.json.as_bytes(), SECRET));
    }

    #[test]
    fn test_verify_webhook_parses_after_verification() {
        let body = br#"{"n":5}"#;
        let header = sign_body(body, SECRET);
        let value: serde_json::Value = verify_webhook(&header, body, SECRET).unwrap();
        assert_eq!(value["n"], 5);
    }

    #[test]
    fn test_body_digest_is_stable() {
        assert_eq!(body_digest(b"abc"), body_digest(b"abc"));
        assert_ne!(body_digest(b"abc"), body_digest(b"abd"));
        assert_eq!(
            body_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
