// crates/engine/src/domain/anchors.rs

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::cert::{CertHandle, Certificate};

use super::source::TrustSource;
use super::types::TrustVerdict;

/// An in-memory set of trust anchors.
///
/// Sets are populated at startup and treated as immutable afterwards; anchors
/// are never removed. Membership is by certificate content, so the same root
/// loaded from two places occupies one slot.
#[derive(Debug, Default)]
pub struct AnchorSet {
    anchors: HashSet<CertHandle>,
    // Raw subject DER -> anchors carrying that subject, for issuer chasing.
    by_subject: HashMap<Vec<u8>, Vec<CertHandle>>,
}

impl AnchorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-content membership test.
    pub fn contains(&self, cert: &Certificate) -> bool {
        self.anchors.contains(cert)
    }

    /// Insert `cert` as a trust anchor. Inserting a certificate that is
    /// already present is a no-op.
    pub fn add_anchor(&mut self, cert: CertHandle) {
        self.add_anchor_if_absent(cert);
    }

    /// Insert `cert` unless an identical anchor is already present. Returns
    /// whether the insertion happened.
    pub fn add_anchor_if_absent(&mut self, cert: CertHandle) -> bool {
        if self.anchors.contains(cert.as_ref()) {
            return false;
        }
        self.by_subject
            .entry(cert.raw_subject().to_vec())
            .or_default()
            .push(Arc::clone(&cert));
        self.anchors.insert(cert)
    }

    /// Trust-anchor for members, not-present for everything else. A plain
    /// anchor set never distrusts.
    pub fn get_trust(&self, cert: &Certificate) -> TrustVerdict {
        if self.contains(cert) {
            TrustVerdict::TrustAnchor
        } else {
            TrustVerdict::NotPresent
        }
    }

    /// Anchors whose subject name equals `cert`'s issuer name, byte for byte.
    pub fn issuers_of(&self, cert: &Certificate) -> Vec<CertHandle> {
        self.by_subject
            .get(cert.raw_issuer())
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Iterate over the anchors; order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = &CertHandle> {
        self.anchors.iter()
    }
}

impl TrustSource for AnchorSet {
    fn get_trust(&self, cert: &Certificate) -> TrustVerdict {
        AnchorSet::get_trust(self, cert)
    }

    fn issuers_of(&self, cert: &Certificate) -> Vec<CertHandle> {
        AnchorSet::issuers_of(self, cert)
    }
}
