// crates/engine/src/lib.rs

//! Public facade for the anchor engine.
//! Composes curated root-program trust with platform-native trust and
//! re-exports the types embedders need.

pub mod adapters;
pub mod cert;
pub mod domain;

/// Build the default system trust store for this platform: the curated root
/// program plus whichever platform source the build selected.
pub fn system_trust_store(root_program: RootProgramStore) -> SystemTrustStore {
    #[cfg(not(feature = "platform-unix"))]
    {
        return SystemTrustStore::curated_only(root_program);
    }
    #[cfg(feature = "platform-unix")]
    {
        SystemTrustStore::with_platform_roots(root_program)
    }
}

/// Build a system trust store that trusts the curated root program only,
/// regardless of platform configuration.
pub fn curated_trust_store(root_program: RootProgramStore) -> SystemTrustStore {
    SystemTrustStore::curated_only(root_program)
}

// Re-exports for convenience
pub use cert::{
    decode_certificates, CertHandle, Certificate, CertificateError, DecodeFailure, DecodedBundle,
};
pub use domain::anchors::AnchorSet;
pub use domain::collection::TrustSourceCollection;
pub use domain::error::{EngineError, EngineResult};
pub use domain::root_program::{
    parse_constraints_override, CertConstraint, ConstraintOverrideMap, DottedVersion,
    RootProgramStore, RootStoreAnchor, RootStoreData,
};
pub use domain::source::{PlatformTrustStore, TrustSource};
pub use domain::system::SystemTrustStore;
pub use domain::types::{CertWithTrust, TrustVerdict};

#[cfg(feature = "platform-unix")]
pub use adapters::unix::{
    global_platform_store, warm_up_platform_store, BundleSearchPaths, UnixTrustStore,
    CERT_DIR_ENV, CERT_FILE_ENV,
};

#[cfg(feature = "test-roots")]
pub use adapters::test_roots::{extra_roots_store, ExtraRootsStore, TEST_ROOTS_ENV};
