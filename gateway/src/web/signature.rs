//! Webhook signature verification.
//!
//! The processor signs webhook deliveries with an HMAC-SHA256 hex digest of
//! the raw request body, keyed by the merchant's private key, carried in the
//! `x-openpay-signature` header.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook signature against the raw request body.
///
/// Returns `true` only when the header matches the expected digest.
pub fn verify_event_signature(signing_key: &str, payload: &[u8], signature: &str) -> bool {
    if signing_key.is_empty() || signature.is_empty() {
        warn!(
            has_signing_key = !signing_key.is_empty(),
            has_signature = !signature.is_empty(),
            "event_signature_missing_fields"
        );
        return false;
    }

    let mut mac = match HmacSha256::new_from_slice(signing_key.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("event_signature_invalid_key");
            return false;
        }
    };

    mac.update(payload);

    let expected = hex::encode(mac.finalize().into_bytes());

    // Constant-time comparison to prevent timing attacks
    let valid = constant_time_compare(&expected, &signature.to_lowercase());

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            "event_signature_mismatch"
        );
    }

    valid
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Check whether signature verification is enabled (a key is configured).
pub fn is_signature_verification_enabled(signing_key: &str) -> bool {
    !signing_key.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(key: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_signature_valid() {
        let key = "sk_test_key";
        let payload = br#"{"type":"charge.succeeded","id":"tr_1"}"#;
        let signature = sign(key, payload);

        assert!(verify_event_signature(key, payload, &signature));
    }

    #[test]
    fn test_verify_signature_is_case_insensitive_on_hex() {
        let key = "sk_test_key";
        let payload = b"body";
        let signature = sign(key, payload).to_uppercase();

        assert!(verify_event_signature(key, payload, &signature));
    }

    #[test]
    fn test_verify_signature_rejects_wrong_body() {
        let key = "sk_test_key";
        let signature = sign(key, b"original body");

        assert!(!verify_event_signature(key, b"tampered body", &signature));
    }

    #[test]
    fn test_verify_signature_rejects_wrong_key() {
        let signature = sign("key-a", b"body");
        assert!(!verify_event_signature("key-b", b"body", &signature));
    }

    #[test]
    fn test_verify_signature_missing_fields() {
        assert!(!verify_event_signature("", b"body", "sig"));
        assert!(!verify_event_signature("key", b"body", ""));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }

    #[test]
    fn test_is_signature_verification_enabled() {
        assert!(!is_signature_verification_enabled(""));
        assert!(!is_signature_verification_enabled("   "));
        assert!(is_signature_verification_enabled("key123"));
    }
}
