// crates/engine/src/domain/source.rs

use crate::cert::{CertHandle, Certificate};

use super::types::{CertWithTrust, TrustVerdict};

/// A queryable trust source.
///
/// Implementations are built once and never mutated afterwards, so queries
/// from any number of threads need no locking; the `Send + Sync` bound
/// encodes that contract. Queries are total: they classify, they do not fail.
pub trait TrustSource: Send + Sync {
    /// Trust classification for `cert` in this source.
    fn get_trust(&self, cert: &Certificate) -> TrustVerdict;

    /// Certificates in this source whose subject matches `cert`'s issuer,
    /// for issuer chasing during chain building.
    fn issuers_of(&self, cert: &Certificate) -> Vec<CertHandle>;
}

/// A trust source backed by platform-native configuration.
///
/// Adds the enumeration surface administration UIs need on top of the plain
/// query contract.
pub trait PlatformTrustStore: TrustSource {
    /// Every certificate the platform tracks, with its trust flags. Empty
    /// when the platform does not support enumeration.
    fn all_certificates(&self) -> Vec<CertWithTrust>;
}
