//! Verification of the `Stripe-Signature` webhook header.
//!
//! The header looks like `t=1718000000,v1=5257a869...,v0=6ffbb59b...`. The signed payload is `"{t}.{raw body}"`,
//! HMAC-SHA256'd with the endpoint's webhook secret and hex encoded. Stripe may send several `v1` entries while a
//! secret is being rolled, so any one of them matching is enough.
use std::time::Duration;

use chrono::Utc;
use hmac::{digest::KeyInit, Hmac, Mac};
use log::*;
use payrecon_common::Secret;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookSignatureError {
    #[error("No webhook secret is configured")]
    MissingSecret,
    #[error("The signature header is malformed: {0}")]
    MalformedHeader(String),
    #[error("The signature timestamp is outside the tolerance window")]
    TimestampOutOfRange,
    #[error("No signature matches the payload")]
    SignatureMismatch,
    #[error("The webhook secret cannot be used as an HMAC key: {0}")]
    InvalidKey(String),
}

#[derive(Clone)]
pub struct WebhookVerifier {
    secret: Secret<String>,
    tolerance: Duration,
}

impl WebhookVerifier {
    pub fn new(secret: Secret<String>, tolerance: Duration) -> Self {
        Self { secret, tolerance }
    }

    /// Verifies `header` against `payload` using the current time.
    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), WebhookSignatureError> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    pub fn verify_at(&self, payload: &[u8], header: &str, now: i64) -> Result<(), WebhookSignatureError> {
        if self.secret.is_empty() {
            return Err(WebhookSignatureError::MissingSecret);
        }
        let (timestamp, signatures) = parse_header(header)?;
        let drift = now.abs_diff(timestamp);
        if drift > self.tolerance.as_secs() {
            debug!("🔐️ Signature timestamp {timestamp} is {drift}s away from now");
            return Err(WebhookSignatureError::TimestampOutOfRange);
        }
        let expected = compute_signature(self.secret.reveal(), timestamp, payload)?;
        let matched = signatures
            .iter()
            .filter_map(|s| hex::decode(s).ok())
            .any(|candidate| bool::from(candidate.as_slice().ct_eq(expected.as_slice())));
        if matched {
            Ok(())
        } else {
            Err(WebhookSignatureError::SignatureMismatch)
        }
    }
}

fn parse_header(header: &str) -> Result<(i64, Vec<&str>), WebhookSignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                let t = value
                    .parse::<i64>()
                    .map_err(|_| WebhookSignatureError::MalformedHeader(format!("Invalid timestamp '{value}'")))?;
                timestamp = Some(t);
            },
            "v1" => signatures.push(value),
            _ => {},
        }
    }
    let timestamp = timestamp.ok_or_else(|| WebhookSignatureError::MalformedHeader("No timestamp".into()))?;
    if signatures.is_empty() {
        return Err(WebhookSignatureError::MalformedHeader("No v1 signature".into()));
    }
    Ok((timestamp, signatures))
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookSignatureError> {
    let mut mac = <HmacSha256 as KeyInit>::new_from_slice(secret.as_bytes())
        .map_err(|e| WebhookSignatureError::InvalidKey(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Builds a valid `Stripe-Signature` header value for `payload`. Useful for signing test requests.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> Result<String, WebhookSignatureError> {
    let sig = hex::encode(compute_signature(secret, timestamp, payload)?);
    Ok(format!("t={timestamp},v1={sig}"))
}

#[cfg(test)]
mod test {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const NOW: i64 = 1_718_000_000;

    fn verifier() -> WebhookVerifier {
        WebhookVerifier::new(Secret::new(SECRET.to_string()), Duration::from_secs(300))
    }

    #[test]
    fn valid_signature() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = signature_header(SECRET, NOW, payload).unwrap();
        assert!(verifier().verify_at(payload, &header, NOW + 10).is_ok());
    }

    #[test]
    fn any_v1_may_match() {
        let payload = br#"{"id":"evt_1"}"#;
        let good = signature_header(SECRET, NOW, payload).unwrap();
        let good_sig = good.split_once("v1=").map(|(_, s)| s).unwrap();
        let header = format!("t={NOW},v1={},v0=abc,v1={good_sig}", "00".repeat(32));
        assert!(verifier().verify_at(payload, &header, NOW).is_ok());
    }

    #[test]
    fn tampered_payload() {
        let header = signature_header(SECRET, NOW, b"original").unwrap();
        let err = verifier().verify_at(b"tampered", &header, NOW).unwrap_err();
        assert_eq!(err, WebhookSignatureError::SignatureMismatch);
    }

    #[test]
    fn wrong_secret() {
        let header = signature_header("whsec_other", NOW, b"payload").unwrap();
        let err = verifier().verify_at(b"payload", &header, NOW).unwrap_err();
        assert_eq!(err, WebhookSignatureError::SignatureMismatch);
    }

    #[test]
    fn stale_timestamp() {
        let header = signature_header(SECRET, NOW, b"payload").unwrap();
        let err = verifier().verify_at(b"payload", &header, NOW + 301).unwrap_err();
        assert_eq!(err, WebhookSignatureError::TimestampOutOfRange);
        let err = verifier().verify_at(b"payload", &header, NOW - 301).unwrap_err();
        assert_eq!(err, WebhookSignatureError::TimestampOutOfRange);
    }

    #[test]
    fn malformed_headers() {
        let v = verifier();
        assert!(matches!(v.verify_at(b"p", "", NOW), Err(WebhookSignatureError::MalformedHeader(_))));
        assert!(matches!(v.verify_at(b"p", "v1=abcd", NOW), Err(WebhookSignatureError::MalformedHeader(_))));
        assert!(matches!(v.verify_at(b"p", "t=abc,v1=abcd", NOW), Err(WebhookSignatureError::MalformedHeader(_))));
        assert!(matches!(v.verify_at(b"p", &format!("t={NOW}"), NOW), Err(WebhookSignatureError::MalformedHeader(_))));
        assert_eq!(v.verify_at(b"p", &format!("t={NOW},v1=zz"), NOW), Err(WebhookSignatureError::SignatureMismatch));
    }

    #[test]
    fn keys_of_any_length_sign() {
        let long = "x".repeat(1024);
        for secret in ["", "k", long.as_str()] {
            let header = signature_header(secret, NOW, b"payload").unwrap();
            assert!(header.starts_with(&format!("t={NOW},v1=")));
            assert_eq!(header.len(), format!("t={NOW},v1=").len() + 64);
        }
    }

    #[test]
    fn missing_secret_rejects_everything() {
        let v = WebhookVerifier::new(Secret::default(), Duration::from_secs(300));
        let header = signature_header("", NOW, b"p").unwrap();
        assert_eq!(v.verify_at(b"p", &header, NOW), Err(WebhookSignatureError::MissingSecret));
    }
}
