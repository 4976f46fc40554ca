//! Webhook signature verification and event parsing
//!
//! Header format: `Stripe-Signature: t=<unix>,v1=<hex hmac>[,v1=...]`.
//! The signed payload is `"<t>.<raw body>"`, HMAC-SHA256 keyed with the
//! endpoint secret.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

use crate::application::ports::GatewayEvent;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Missing signature header")]
    MissingHeader,

    #[error("Malformed signature header")]
    MalformedHeader,

    #[error("No signature matches the payload")]
    Mismatch,

    #[error("Timestamp outside tolerance ({age_secs}s)")]
    Expired { age_secs: i64 },

    #[error("Invalid event payload: {0}")]
    InvalidPayload(String),

    #[error("Webhook secret is not configured")]
    SecretNotConfigured,
}

pub struct WebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    /// Verify `header` against `payload` and parse the event.
    pub fn construct_event(
        &self,
        payload: &[u8],
        header: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<GatewayEvent, SignatureError> {
        let header = header.ok_or(SignatureError::MissingHeader)?;
        self.verify(payload, header, now)?;
        parse_event(payload)
    }

    pub fn verify(
        &self,
        payload: &[u8],
        header: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        // An empty HMAC key is still a valid key, so anyone could sign
        if self.secret.is_empty() {
            return Err(SignatureError::SecretNotConfigured);
        }
        let (timestamp, signatures) = parse_header(header)?;

        let age_secs = now.timestamp() - timestamp;
        if age_secs.abs() > self.tolerance_secs {
            return Err(SignatureError::Expired { age_secs });
        }

        for candidate in signatures {
            let Ok(expected) = hex::decode(candidate) else {
                continue;
            };
            // Constant-time comparison
            if self.mac(timestamp, payload)?.verify_slice(&expected).is_ok() {
                return Ok(());
            }
        }
        Err(SignatureError::Mismatch)
    }

    /// Header value for `payload` signed at `timestamp`
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> Result<String, SignatureError> {
        let mac = self.mac(timestamp, payload)?;
        Ok(format!(
            "t={},v1={}",
            timestamp,
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    fn mac(&self, timestamp: i64, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
        if self.secret.is_empty() {
            return Err(SignatureError::SecretNotConfigured);
        }
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SignatureError::MalformedHeader)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }
}

fn parse_header(header: &str) -> Result<(i64, Vec<&str>), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => {
                timestamp = Some(
                    value
                        .parse::<i64>()
                        .map_err(|_| SignatureError::MalformedHeader)?,
                )
            }
            "v1" => signatures.push(value),
            _ => {}
        }
    }
    match timestamp {
        Some(t) if !signatures.is_empty() => Ok((t, signatures)),
        _ => Err(SignatureError::MalformedHeader),
    }
}

// ── Event payload ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: RawData,
}

#[derive(Debug, Deserialize)]
struct RawData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawCheckoutSession {
    id: String,
    #[serde(default)]
    payment_intent: Option<String>,
    #[serde(default)]
    metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    booking_id: Option<String>,
    #[serde(default)]
    payment_id: Option<String>,
}

/// Strictly parse a verified event body. Unknown event types parse to
/// [`GatewayEvent::Unknown`].
pub fn parse_event(payload: &[u8]) -> Result<GatewayEvent, SignatureError> {
    let raw: RawEvent = serde_json::from_slice(payload)
        .map_err(|e| SignatureError::InvalidPayload(e.to_string()))?;

    match raw.event_type.as_str() {
        "checkout.session.completed" => {
            let session: RawCheckoutSession = serde_json::from_value(raw.data.object)
                .map_err(|e| SignatureError::InvalidPayload(e.to_string()))?;
            Ok(GatewayEvent::CheckoutCompleted {
                session_id: session.id,
                payment_id: parse_id(session.metadata.payment_id)?,
                booking_id: parse_id(session.metadata.booking_id)?,
                payment_intent: session.payment_intent,
            })
        }
        _ => Ok(GatewayEvent::Unknown {
            event_type: raw.event_type,
        }),
    }
}

fn parse_id(value: Option<String>) -> Result<Option<i32>, SignatureError> {
    value
        .map(|v| {
            v.trim()
                .parse::<i32>()
                .map_err(|_| SignatureError::InvalidPayload(format!("non-numeric id '{}'", v)))
        })
        .transpose()
}
