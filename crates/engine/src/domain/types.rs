// crates/engine/src/domain/types.rs

use crate::cert::CertHandle;

/// Per-source trust classification for a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustVerdict {
    /// The source holds no record of the certificate.
    NotPresent,
    /// The source explicitly refuses the certificate as a root.
    Distrusted,
    /// The certificate may serve as a chain-validation root.
    TrustAnchor,
}

impl TrustVerdict {
    pub fn is_trust_anchor(self) -> bool {
        matches!(self, TrustVerdict::TrustAnchor)
    }
}

/// A certificate together with the trust a platform source assigns to it.
/// Returned by enumeration surfaces such as
/// [`PlatformTrustStore::all_certificates`](super::source::PlatformTrustStore::all_certificates).
#[derive(Debug, Clone)]
pub struct CertWithTrust {
    pub certificate: CertHandle,
    pub verdict: TrustVerdict,
}
