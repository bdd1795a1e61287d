// tests/system_store_tests.rs

mod common;

use std::sync::Arc;

use anchor_engine as ae;
use anchor_engine::PlatformTrustStore;

#[test]
fn trust_matrix_across_sources() {
    common::init_tracing();
    let curated_a = common::make_ca("Curated Root A");
    let curated_b = common::make_ca("Curated Root B");
    let local = common::make_ca("Local Root C");
    let unknown = common::make_ca("Unknown Root");

    let data = common::root_store_data(&[&curated_a, &curated_b], 5);
    let platform = Arc::new(common::FakePlatformStore::with_anchors(&[&local]));
    let store = ae::SystemTrustStore::new(ae::RootProgramStore::new(&data), Some(platform));

    // Curated-only certificates: known, trusted, not locally trusted.
    for ca in [&curated_a, &curated_b] {
        let cert = common::handle(ca);
        assert!(store.is_known_root(&cert));
        assert!(!store.is_locally_trusted_root(&cert));
        assert_eq!(
            store.trust_store().get_trust(&cert),
            ae::TrustVerdict::TrustAnchor
        );
    }

    // Platform-only certificates: unknown, trusted, locally trusted.
    let local_cert = common::handle(&local);
    assert!(!store.is_known_root(&local_cert));
    assert!(store.is_locally_trusted_root(&local_cert));
    assert_eq!(
        store.trust_store().get_trust(&local_cert),
        ae::TrustVerdict::TrustAnchor
    );

    // Certificates in neither source.
    let unknown_cert = common::handle(&unknown);
    assert!(!store.is_known_root(&unknown_cert));
    assert!(!store.is_locally_trusted_root(&unknown_cert));
    assert_eq!(
        store.trust_store().get_trust(&unknown_cert),
        ae::TrustVerdict::NotPresent
    );

    assert_eq!(store.root_program_version(), 5);
}

#[test]
fn collections_wire_every_source_once() {
    let curated = common::make_ca("Wired Curated Root");
    let local = common::make_ca("Wired Local Root");
    let data = common::root_store_data(&[&curated], 1);

    let with_platform = ae::SystemTrustStore::new(
        ae::RootProgramStore::new(&data),
        Some(Arc::new(common::FakePlatformStore::with_anchors(&[&local]))),
    );
    assert_eq!(with_platform.trust_store().len(), 2);
    assert!(with_platform.platform_trust_store().is_some());

    let curated_only = ae::SystemTrustStore::curated_only(ae::RootProgramStore::new(&data));
    assert_eq!(curated_only.trust_store().len(), 1);
}

#[test]
fn certificate_in_both_sources_is_known_and_locally_trusted() {
    let shared = common::make_ca("Shared Everywhere Root");
    let data = common::root_store_data(&[&shared], 1);
    let platform = Arc::new(common::FakePlatformStore::with_anchors(&[&shared]));
    let store = ae::SystemTrustStore::new(ae::RootProgramStore::new(&data), Some(platform));

    let cert = common::handle(&shared);
    assert!(store.is_known_root(&cert));
    assert!(store.is_locally_trusted_root(&cert));
}

#[test]
fn version_passthrough_accepts_zero_and_negative() {
    for version in [5i64, 0, -3] {
        let data = common::root_store_data(&[], version);
        let store = ae::SystemTrustStore::curated_only(ae::RootProgramStore::new(&data));
        assert_eq!(store.root_program_version(), version);
    }
}

#[test]
fn curated_only_store_has_no_platform_surface() {
    let curated = common::make_ca("Lonely Curated Root");
    let data = common::root_store_data(&[&curated], 1);
    let store = ae::SystemTrustStore::curated_only(ae::RootProgramStore::new(&data));

    assert!(store.platform_trust_store().is_none());
    assert!(!store.is_locally_trusted_root(&common::handle(&curated)));
    assert!(store.is_known_root(&common::handle(&curated)));
}

#[test]
fn platform_surface_exposes_enumeration() {
    let local = common::make_ca("Enumerable Local Root");
    let platform = Arc::new(common::FakePlatformStore::with_anchors(&[&local]));
    let data = common::root_store_data(&[], 1);
    let store = ae::SystemTrustStore::new(ae::RootProgramStore::new(&data), Some(platform));

    let listed = store
        .platform_trust_store()
        .expect("platform source")
        .all_certificates();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].verdict, ae::TrustVerdict::TrustAnchor);
    assert_eq!(listed[0].certificate.der(), common::handle(&local).der());
}

#[test]
fn issuer_lookup_unions_across_sources_in_order() {
    let curated = common::make_ca("Shared Issuer CN");
    let local = common::make_ca("Shared Issuer CN");
    let leaf_der = common::make_leaf_der("Issued Leaf", &curated);
    let leaf = ae::Certificate::from_der(&leaf_der).expect("leaf");

    let data = common::root_store_data(&[&curated], 1);
    let platform = Arc::new(common::FakePlatformStore::with_anchors(&[&local]));
    let store = ae::SystemTrustStore::new(ae::RootProgramStore::new(&data), Some(platform));

    // Platform sources are consulted before the root program; both match the
    // leaf's issuer name and no deduplication is applied.
    let issuers = store.trust_store().issuers_of(&leaf);
    assert_eq!(issuers.len(), 2);
    assert_eq!(issuers[0].der(), common::handle(&local).der());
    assert_eq!(issuers[1].der(), common::handle(&curated).der());
}

#[test]
fn default_construction_helpers_compose() {
    let curated = common::make_ca("Helper Curated Root");
    let data = common::root_store_data(&[&curated], 11);

    let store = ae::curated_trust_store(ae::RootProgramStore::new(&data));
    assert!(store.is_known_root(&common::handle(&curated)));
    assert_eq!(store.root_program_version(), 11);
    assert!(store.platform_trust_store().is_none());
}
