//! Provider webhook signature verification.
//!
//! Recomputes the HMAC-SHA256 signature over the raw, byte-exact request
//! body and compares it to the signature header in constant time. Any JSON
//! re-serialization before verification would break the signature, so the
//! verifier is the first thing that touches the payload.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::errors::WebhookError;
use super::provider_event::ProviderEvent;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components of the provider's signature header.
///
/// Format: `t=<timestamp>,v1=<signature>[,v0=<legacy>]`; unknown pairs are
/// ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// v1 signature (HMAC-SHA256).
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses a signature header string.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` if the header format is invalid.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(
                        value
                            .parse()
                            .map_err(|_| WebhookError::ParseError("invalid timestamp".to_string()))?,
                    );
                }
                "v1" => {
                    v1_signature = Some(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {
                    // Ignore unknown fields (v0, future schemes)
                }
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        let v1_signature = v1_signature
            .ok_or_else(|| WebhookError::ParseError("missing v1 signature".to_string()))?;

        Ok(SignatureHeader {
            timestamp,
            v1_signature,
        })
    }
}

/// Verifier for provider webhook signatures.
#[derive(Clone)]
pub struct WebhookVerifier {
    /// Shared signing secret from the provider dashboard.
    secret: SecretString,
}

impl WebhookVerifier {
    /// Creates a new verifier with the given shared secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the signature over the raw body and parses the event.
    ///
    /// # Errors
    ///
    /// - `ParseError` - malformed header or JSON payload
    /// - `TimestampOutOfRange` / `InvalidTimestamp` - event outside the
    ///   delivery window
    /// - `InvalidSignature` - recomputed signature does not match
    pub fn verify_and_parse(
        &self,
        raw_body: &[u8],
        signature_header: &str,
    ) -> Result<ProviderEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp)?;

        let expected = self.compute_signature(header.timestamp, raw_body);
        if !constant_time_eq(&expected, &header.v1_signature) {
            return Err(WebhookError::InvalidSignature);
        }

        // Only now is the payload trusted enough to parse.
        let event: ProviderEvent = serde_json::from_slice(raw_body)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        Ok(event)
    }

    /// Validates that the timestamp is within the delivery window.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > MAX_EVENT_AGE_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        Ok(())
    }

    /// Computes HMAC-SHA256 over `"{timestamp}.{raw_body}"`.
    fn compute_signature(&self, timestamp: i64, raw_body: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(raw_body);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Constant-time byte comparison; length mismatch short-circuits, which
/// leaks only the signature length (public anyway).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a hex signature for test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("{}.", timestamp).as_bytes());
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}
