//! # Webhook signatures
//!
//! Payment processors sign every webhook delivery with an HMAC over the raw request body, keyed by a secret shared
//! with the gateway. The hex-encoded digest is sent in a provider-specific header:
//!
//! | Processor     | Header              | Digest        |
//! |---------------|---------------------|---------------|
//! | BTCPay Server | `BTCPay-Sig`        | HMAC-SHA256, optionally prefixed with `sha256=` |
//! | NowPayments   | `x-nowpayments-sig` | HMAC-SHA512   |
//!
//! Signatures are compared in constant time.
use std::fmt::Display;

use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha512};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    HmacSha256,
    HmacSha512,
}

impl SignatureScheme {
    fn prefix(&self) -> &'static str {
        match self {
            Self::HmacSha256 => "sha256=",
            Self::HmacSha512 => "sha512=",
        }
    }
}

impl Display for SignatureScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HmacSha256 => f.write_str("HMAC-SHA256"),
            Self::HmacSha512 => f.write_str("HMAC-SHA512"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookSignatureError {
    #[error("No signature was provided")]
    MissingSignature,
    #[error("The signature is not valid hex")]
    MalformedSignature,
    #[error("The signature does not match the payload")]
    InvalidSignature,
    #[error("The webhook secret cannot be used as an HMAC key")]
    InvalidKey,
}

/// Calculates the hex-encoded HMAC of `payload`.
pub fn calculate_signature(
    scheme: SignatureScheme,
    secret: &str,
    payload: &[u8],
) -> Result<String, WebhookSignatureError> {
    let digest = match scheme {
        SignatureScheme::HmacSha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| WebhookSignatureError::InvalidKey)?;
            mac.update(payload);
            hex::encode(mac.finalize().into_bytes())
        },
        SignatureScheme::HmacSha512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).map_err(|_| WebhookSignatureError::InvalidKey)?;
            mac.update(payload);
            hex::encode(mac.finalize().into_bytes())
        },
    };
    Ok(digest)
}

/// Checks `signature` (hex, case-insensitive) against the HMAC of `payload`.
pub fn verify_signature(
    scheme: SignatureScheme,
    secret: &str,
    payload: &[u8],
    signature: &str,
) -> Result<(), WebhookSignatureError> {
    let signature = signature.trim();
    let signature = signature.strip_prefix(scheme.prefix()).unwrap_or(signature);
    if signature.is_empty() {
        return Err(WebhookSignatureError::MissingSignature);
    }
    let expected = hex::decode(signature).map_err(|_| WebhookSignatureError::MalformedSignature)?;
    let verified = match scheme {
        SignatureScheme::HmacSha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| WebhookSignatureError::InvalidKey)?;
            mac.update(payload);
            mac.verify_slice(&expected)
        },
        SignatureScheme::HmacSha512 => {
            let mut mac = Hmac::<Sha512>::new_from_slice(secret.as_bytes()).map_err(|_| WebhookSignatureError::InvalidKey)?;
            mac.update(payload);
            mac.verify_slice(&expected)
        },
    };
    verified.map_err(|_| WebhookSignatureError::InvalidSignature)
}
