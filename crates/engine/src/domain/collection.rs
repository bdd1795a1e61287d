// crates/engine/src/domain/collection.rs

use std::sync::Arc;

use crate::cert::{CertHandle, Certificate};

use super::source::TrustSource;
use super::types::TrustVerdict;

/// An ordered aggregation of trust sources, itself queryable as one source.
///
/// Sources are held through shared ownership, so a collection keeps every
/// source it references alive. Order never changes a trust verdict; it only
/// fixes the order issuer lookups consult the sources in.
#[derive(Default)]
pub struct TrustSourceCollection {
    sources: Vec<Arc<dyn TrustSource>>,
}

impl TrustSourceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source. Collections are wired up before the first query and
    /// not changed afterwards.
    pub fn add_source(&mut self, source: Arc<dyn TrustSource>) {
        self.sources.push(source);
    }

    /// Trust-anchor if any source reports trust-anchor, else not-present.
    ///
    /// No precedence rule is needed: distrust is resolved inside individual
    /// sources before it can reach this layer.
    pub fn get_trust(&self, cert: &Certificate) -> TrustVerdict {
        for source in &self.sources {
            if source.get_trust(cert).is_trust_anchor() {
                return TrustVerdict::TrustAnchor;
            }
        }
        TrustVerdict::NotPresent
    }

    /// Issuers found across all sources, concatenated in source order. No
    /// deduplication; a root present in two sources appears twice.
    pub fn issuers_of(&self, cert: &Certificate) -> Vec<CertHandle> {
        let mut issuers = Vec::new();
        for source in &self.sources {
            issuers.extend(source.issuers_of(cert));
        }
        issuers
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl TrustSource for TrustSourceCollection {
    fn get_trust(&self, cert: &Certificate) -> TrustVerdict {
        TrustSourceCollection::get_trust(self, cert)
    }

    fn issuers_of(&self, cert: &Certificate) -> Vec<CertHandle> {
        TrustSourceCollection::issuers_of(self, cert)
    }
}
