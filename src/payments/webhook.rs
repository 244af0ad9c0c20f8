use std::collections::HashMap;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Reject payloads whose timestamp is further than this from now.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,

    #[error("timestamp outside tolerance window")]
    Expired,

    #[error("signature mismatch")]
    Mismatch,
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: EventObject,
}

#[derive(Debug, Deserialize)]
pub struct EventObject {
    pub id: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>`) against the
/// shared endpoint secret. The signed message is `"{t}.{payload}"`.
pub fn verify_signature(
    secret: &str,
    header: &str,
    payload: &[u8],
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp: Option<i64> = None;
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse().map_err(|_| SignatureError::Malformed)?);
            }
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
    if candidates.is_empty() {
        return Err(SignatureError::Malformed);
    }

    if (now - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    let expected = sign(secret, timestamp, payload);
    if candidates.iter().any(|c| constant_time_eq(c, &expected)) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Hex HMAC-SHA256 over `"{timestamp}.{payload}"`.
pub fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const PAYLOAD: &[u8] = br#"{"type":"checkout.session.completed"}"#;

    fn header_for(timestamp: i64) -> String {
        format!("t={},v1={}", timestamp, sign(SECRET, timestamp, PAYLOAD))
    }

    #[test]
    fn valid_signature_passes() {
        let header = header_for(1_700_000_000);
        assert!(
            verify_signature(SECRET, &header, PAYLOAD, 1_700_000_010, 300).is_ok()
        );
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let header = header_for(1_700_000_000);
        let result =
            verify_signature(SECRET, &header, b"{\"other\":1}", 1_700_000_010, 300);
        assert!(matches!(result, Err(SignatureError::Mismatch)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let header = format!(
            "t=1700000000,v1={}",
            sign("whsec_other", 1_700_000_000, PAYLOAD)
        );
        let result = verify_signature(SECRET, &header, PAYLOAD, 1_700_000_010, 300);
        assert!(matches!(result, Err(SignatureError::Mismatch)));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let header = header_for(1_700_000_000);
        let result = verify_signature(SECRET, &header, PAYLOAD, 1_700_001_000, 300);
        assert!(matches!(result, Err(SignatureError::Expired)));
    }

    #[test]
    fn header_without_signature_part_is_malformed() {
        let result =
            verify_signature(SECRET, "t=1700000000", PAYLOAD, 1_700_000_000, 300);
        assert!(matches!(result, Err(SignatureError::Malformed)));
    }

    #[test]
    fn event_payload_parses_metadata() {
        let body = br#"{
            "type": "checkout.session.completed",
            "data": {"object": {"id": "cs_123", "metadata": {"order_id": "abc"}}}
        }"#;
        let event: WebhookEvent = serde_json::from_slice(body).unwrap();
        assert_eq!(event.event_type, CHECKOUT_SESSION_COMPLETED);
        assert_eq!(event.data.object.id, "cs_123");
        assert_eq!(
            event.data.object.metadata.get("order_id").map(String::as_str),
            Some("abc")
        );
    }
}
