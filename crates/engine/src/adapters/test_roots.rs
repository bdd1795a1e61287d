// adapters/test_roots.rs

//! Extra PEM trust roots for test images.
//!
//! Only compiled behind the `test-roots` feature. The store exists when
//! `ANCHOR_ENGINE_TEST_ROOTS` points at a readable PEM bundle; it then joins
//! both facade collections, so its roots are trusted and report as locally
//! trusted, never as curated roots.

use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::warn;

use crate::cert::{decode_certificates, CertHandle, Certificate};
use crate::domain::anchors::AnchorSet;
use crate::domain::source::TrustSource;
use crate::domain::types::TrustVerdict;

/// Names a PEM bundle of extra roots to trust in test environments.
pub const TEST_ROOTS_ENV: &str = "ANCHOR_ENGINE_TEST_ROOTS";

/// Anchors loaded from a test-image PEM bundle.
#[derive(Debug)]
pub struct ExtraRootsStore {
    anchors: AnchorSet,
}

impl ExtraRootsStore {
    /// Load from `path`. None when the file cannot be read; a readable file
    /// that parses to zero certificates still yields an (empty) store.
    pub fn load(path: &Path) -> Option<Self> {
        let bytes = std::fs::read(path).ok()?;
        let decoded = decode_certificates(&bytes);
        for failure in &decoded.rejected {
            warn!(
                path = %path.display(),
                index = failure.index,
                "skipping unparsable test root: {}", failure.error
            );
        }
        let mut anchors = AnchorSet::new();
        for cert in decoded.certificates {
            anchors.add_anchor_if_absent(cert);
        }
        Some(ExtraRootsStore { anchors })
    }

    pub fn anchors(&self) -> &AnchorSet {
        &self.anchors
    }
}

impl TrustSource for ExtraRootsStore {
    fn get_trust(&self, cert: &Certificate) -> TrustVerdict {
        self.anchors.get_trust(cert)
    }

    fn issuers_of(&self, cert: &Certificate) -> Vec<CertHandle> {
        self.anchors.issuers_of(cert)
    }
}

// The environment is read once per process; every facade built afterwards
// shares the same store. Never torn down, like the platform singleton.
static EXTRA_ROOTS: Lazy<Option<Arc<ExtraRootsStore>>> = Lazy::new(|| {
    let path = std::env::var(TEST_ROOTS_ENV).ok()?;
    if path.is_empty() {
        return None;
    }
    ExtraRootsStore::load(Path::new(&path)).map(Arc::new)
});

/// The process-wide extra-roots store, when one is configured.
pub fn extra_roots_store() -> Option<Arc<ExtraRootsStore>> {
    EXTRA_ROOTS.clone()
}
