// crates/engine/src/domain/system.rs

//! The composite system trust-store facade.

use std::collections::HashSet;
use std::sync::Arc;

use crate::cert::Certificate;

use super::anchors::AnchorSet;
use super::collection::TrustSourceCollection;
use super::root_program::{CertConstraint, RootProgramStore};
use super::source::PlatformTrustStore;

/// Combines the curated root program with platform-native trust behind one
/// query surface.
///
/// Both internal collections are wired at construction and never change, so
/// concurrent queries need no locking. Construction never fails: a platform
/// source that loaded nothing simply contributes no local trust. A platform
/// source that fills caches lazily may answer early queries conservatively;
/// such a source is responsible for its own synchronization.
pub struct SystemTrustStore {
    root_program: Arc<RootProgramStore>,
    platform: Option<Arc<dyn PlatformTrustStore>>,
    // Every source: answers general chain-validation trust queries.
    trust_store: TrustSourceCollection,
    // Every source except the curated root program. Kept separate so curated
    // roots never report as locally trusted.
    local_trust: TrustSourceCollection,
}

impl SystemTrustStore {
    /// Wire the facade from the curated source and an optional
    /// platform-native source.
    pub fn new(
        root_program: RootProgramStore,
        platform: Option<Arc<dyn PlatformTrustStore>>,
    ) -> Self {
        let root_program = Arc::new(root_program);
        let mut trust_store = TrustSourceCollection::new();
        let mut local_trust = TrustSourceCollection::new();

        #[cfg(feature = "test-roots")]
        if let Some(extra) = crate::adapters::test_roots::extra_roots_store() {
            trust_store.add_source(extra.clone());
            local_trust.add_source(extra);
        }

        if let Some(platform) = &platform {
            trust_store.add_source(platform.clone());
            local_trust.add_source(platform.clone());
        }

        trust_store.add_source(root_program.clone());

        SystemTrustStore {
            root_program,
            platform,
            trust_store,
            local_trust,
        }
    }

    /// A facade that trusts the curated root program only.
    pub fn curated_only(root_program: RootProgramStore) -> Self {
        Self::new(root_program, None)
    }

    /// A facade over the curated root program plus this platform's shared
    /// default trust source.
    #[cfg(feature = "platform-unix")]
    pub fn with_platform_roots(root_program: RootProgramStore) -> Self {
        Self::new(
            root_program,
            Some(crate::adapters::unix::global_platform_store()),
        )
    }

    /// The general trust collection used for chain-validation decisions.
    pub fn trust_store(&self) -> &TrustSourceCollection {
        &self.trust_store
    }

    /// Whether `cert` is a curated (standard) root. Local or administrator
    /// additions never make this true.
    pub fn is_known_root(&self, cert: &Certificate) -> bool {
        self.root_program.contains(cert)
    }

    /// Whether trust for `cert` derives from local or platform configuration.
    /// Evaluated against the collection that excludes the curated root
    /// program, so a curated root answers false unless the platform also
    /// carries it.
    pub fn is_locally_trusted_root(&self, cert: &Certificate) -> bool {
        self.local_trust.get_trust(cert).is_trust_anchor()
    }

    /// Version of the curated root-program data.
    pub fn root_program_version(&self) -> i64 {
        self.root_program.version()
    }

    /// Constraint records the root program attaches to `cert`; empty when
    /// unconstrained.
    pub fn constraints_for(&self, cert: &Certificate) -> &[CertConstraint] {
        self.root_program.constraints_for(cert)
    }

    /// EU Trusted List anchors carried alongside the TLS roots.
    pub fn eutl_trust_store(&self) -> &AnchorSet {
        self.root_program.eutl_anchors()
    }

    /// Trust-anchor identifiers across the curated TLS anchors.
    pub fn trust_anchor_ids(&self) -> &HashSet<Vec<u8>> {
        self.root_program.trust_anchor_ids()
    }

    /// The configured platform source, when any. Gives callers access to
    /// platform-specific surfaces such as certificate enumeration.
    pub fn platform_trust_store(&self) -> Option<&dyn PlatformTrustStore> {
        self.platform.as_deref()
    }
}
