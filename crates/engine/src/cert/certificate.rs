use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use thiserror::Error;
use x509_parser::prelude::{FromDer, X509Certificate};

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("certificate input is empty")]
    Empty,

    #[error("malformed certificate DER: {0}")]
    Der(String),

    #[error("trailing data after certificate")]
    TrailingData,

    #[error("malformed PEM block: {0}")]
    Pem(String),
}

/// A parsed X.509 certificate, immutable once constructed.
///
/// The fields trust composition needs (names, validity) are extracted once at
/// parse time so queries never touch the DER again. Equality and hashing are
/// by certificate content: two handles to byte-identical DER compare equal no
/// matter where they were loaded from.
pub struct Certificate {
    der: Vec<u8>,
    subject: Vec<u8>,
    issuer: Vec<u8>,
    subject_display: String,
    not_before: i64,
    not_after: i64,
}

/// Shared-ownership certificate handle. Anchor sets and trust sources clone
/// handles instead of copying certificate bytes.
pub type CertHandle = Arc<Certificate>;

impl Certificate {
    /// Parse exactly one DER-encoded certificate. Trailing bytes are
    /// rejected; use [`decode_certificates`](super::decode_certificates) for
    /// concatenated input.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        if der.is_empty() {
            return Err(CertificateError::Empty);
        }
        let (rem, parsed) =
            X509Certificate::from_der(der).map_err(|e| CertificateError::Der(e.to_string()))?;
        if !rem.is_empty() {
            return Err(CertificateError::TrailingData);
        }
        Ok(Certificate {
            subject: parsed.subject().as_raw().to_vec(),
            issuer: parsed.issuer().as_raw().to_vec(),
            subject_display: parsed.subject().to_string(),
            not_before: parsed.validity().not_before.timestamp(),
            not_after: parsed.validity().not_after.timestamp(),
            der: der.to_vec(),
        })
    }

    /// The full certificate DER.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// Raw DER of the subject name, as it appears in the certificate.
    pub fn raw_subject(&self) -> &[u8] {
        &self.subject
    }

    /// Raw DER of the issuer name. Issuer lookups match this against anchor
    /// subjects byte-for-byte; no name normalization is applied.
    pub fn raw_issuer(&self) -> &[u8] {
        &self.issuer
    }

    /// Human-readable subject, for diagnostics and enumeration UIs.
    pub fn subject_display(&self) -> &str {
        &self.subject_display
    }

    /// Start of the validity period, unix seconds.
    pub fn not_before(&self) -> i64 {
        self.not_before
    }

    /// End of the validity period, unix seconds.
    pub fn not_after(&self) -> i64 {
        self.not_after
    }

    /// SHA-256 digest of the DER. Keys the constraint override map.
    pub fn sha256_fingerprint(&self) -> [u8; 32] {
        Sha256::digest(&self.der).into()
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl Hash for Certificate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.der.hash(state);
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject_display)
            .field("sha256", &hex::encode(self.sha256_fingerprint()))
            .finish()
    }
}
