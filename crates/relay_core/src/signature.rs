//! Webhook signature verification.
//!
//! The hosting provider signs every delivery with an HMAC over the exact
//! request body, keyed by a shared secret, and sends the lowercase hex digest
//! in a request header. Verification recomputes the digest over the raw bytes
//! and compares it against the received header value in constant time.
//!
//! Whether the header carries a bare digest (`3f2a...`) or a scheme-prefixed
//! one (`sha1=3f2a...`) is a [`SignatureFormat`] chosen once in configuration
//! and applied to the expected value before comparison. Mixing the two can
//! never match.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;

/// Errors raised while computing a signature or parsing a scheme setting.
///
/// Verification itself never returns these; [`verify_signature`] folds every
/// failure into a `false` result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The HMAC primitive rejected the key.
    #[error("Failed to initialize {algorithm} with the configured secret")]
    InvalidKey { algorithm: SignatureAlgorithm },

    /// A configuration value did not name a known algorithm.
    #[error("Unknown signature algorithm: {0}")]
    UnknownAlgorithm(String),

    /// A configuration value did not name a known header format.
    #[error("Unknown signature format: {0}")]
    UnknownFormat(String),
}

/// Keyed hash used to sign webhook bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureAlgorithm {
    /// HMAC-SHA1, the scheme used by Vercel deployment webhooks.
    #[default]
    HmacSha1,

    /// HMAC-SHA256.
    HmacSha256,
}

impl SignatureAlgorithm {
    /// Scheme label used in prefixed headers (`sha1=<hex>`).
    pub fn prefix(&self) -> &'static str {
        match self {
            SignatureAlgorithm::HmacSha1 => "sha1",
            SignatureAlgorithm::HmacSha256 => "sha256",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureAlgorithm::HmacSha1 => write!(f, "HMAC-SHA1"),
            SignatureAlgorithm::HmacSha256 => write!(f, "HMAC-SHA256"),
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" | "hmac-sha1" => Ok(SignatureAlgorithm::HmacSha1),
            "sha256" | "hmac-sha256" => Ok(SignatureAlgorithm::HmacSha256),
            other => Err(SignatureError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// Shape of the signature header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignatureFormat {
    /// The header is the hex digest only.
    #[default]
    BareHex,

    /// The header is `<scheme>=<hex digest>`, e.g. `sha1=3f2a...`.
    Prefixed,
}

impl FromStr for SignatureFormat {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bare" | "hex" => Ok(SignatureFormat::BareHex),
            "prefixed" => Ok(SignatureFormat::Prefixed),
            other => Err(SignatureError::UnknownFormat(other.to_string())),
        }
    }
}

/// The full signing convention expected from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignatureScheme {
    pub algorithm: SignatureAlgorithm,
    pub format: SignatureFormat,
}

impl SignatureScheme {
    pub fn new(algorithm: SignatureAlgorithm, format: SignatureFormat) -> Self {
        Self { algorithm, format }
    }

    /// Renders a hex digest the way the provider puts it in the header.
    fn render(&self, hex_digest: String) -> String {
        match self.format {
            SignatureFormat::BareHex => hex_digest,
            SignatureFormat::Prefixed => format!("{}={}", self.algorithm.prefix(), hex_digest),
        }
    }
}

/// Computes the lowercase hex HMAC of `body`.
fn hex_digest(
    body: &[u8],
    secret: &SecretString,
    algorithm: SignatureAlgorithm,
) -> Result<String, SignatureError> {
    let key = secret.expose_secret().as_bytes();
    let digest = match algorithm {
        SignatureAlgorithm::HmacSha1 => {
            let mut mac = Hmac::<Sha1>::new_from_slice(key)
                .map_err(|_| SignatureError::InvalidKey { algorithm })?;
            mac.update(body);
            hex::encode(mac.finalize().into_bytes())
        }
        SignatureAlgorithm::HmacSha256 => {
            let mut mac = Hmac::<Sha256>::new_from_slice(key)
                .map_err(|_| SignatureError::InvalidKey { algorithm })?;
            mac.update(body);
            hex::encode(mac.finalize().into_bytes())
        }
    };
    Ok(digest)
}

/// Computes the signature header value a legitimate sender would attach to
/// `body`.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidKey`] if the HMAC primitive rejects the
/// secret.
pub fn compute_signature(
    body: &[u8],
    secret: &SecretString,
    scheme: &SignatureScheme,
) -> Result<String, SignatureError> {
    hex_digest(body, secret, scheme.algorithm).map(|digest| scheme.render(digest))
}

/// Returns `true` when `received` is the signature of `body` under `secret`.
///
/// `body` must be the bytes exactly as received. A missing header, a value of
/// the wrong length, a mismatching digest, or a failure inside the HMAC
/// primitive all yield `false`. Equal-length values are compared in constant
/// time.
pub fn verify_signature(
    body: &[u8],
    received: Option<&str>,
    secret: &SecretString,
    scheme: &SignatureScheme,
) -> bool {
    let Some(received) = received else {
        return false;
    };

    let expected = match compute_signature(body, secret, scheme) {
        Ok(expected) => expected,
        Err(e) => {
            tracing::error!(error = %e, "Failed to compute webhook signature");
            return false;
        }
    };

    let received = received.as_bytes();
    let expected = expected.as_bytes();

    // ct_eq is only meaningful for equal-length inputs.
    if received.len() != expected.len() {
        return false;
    }

    received.ct_eq(expected).into()
}
