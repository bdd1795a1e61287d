// tests/common/mod.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa};

use anchor_engine as ae;

/// A generated self-signed CA. The PEM is serialized exactly once, so every
/// handle derived from it sees identical certificate bytes.
pub struct TestCa {
    pub pem: String,
    cert: rcgen::Certificate,
}

/// Generate a self-signed CA certificate with the given common name.
pub fn make_ca(cn: &str) -> TestCa {
    let mut params = CertificateParams::new(vec![]);
    params.distinguished_name.push(DnType::CommonName, cn);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let cert = rcgen::Certificate::from_params(params).expect("generate ca");
    let pem = cert.serialize_pem().expect("serialize ca");
    TestCa { pem, cert }
}

/// Parse a generated CA into an engine certificate handle.
pub fn handle(ca: &TestCa) -> ae::CertHandle {
    let decoded = ae::decode_certificates(ca.pem.as_bytes());
    assert_eq!(
        decoded.certificates.len(),
        1,
        "test CA should decode to one certificate"
    );
    Arc::clone(&decoded.certificates[0])
}

/// DER for a leaf certificate issued by `issuer`.
pub fn make_leaf_der(cn: &str, issuer: &TestCa) -> Vec<u8> {
    let mut params = CertificateParams::new(vec![]);
    params.distinguished_name.push(DnType::CommonName, cn);
    let leaf = rcgen::Certificate::from_params(params).expect("generate leaf");
    leaf.serialize_der_with_signer(&issuer.cert).expect("sign leaf")
}

/// Write a PEM bundle concatenating `cas` into `dir/name`.
pub fn write_bundle(dir: &Path, name: &str, cas: &[&TestCa]) -> PathBuf {
    let path = dir.join(name);
    let mut pem = String::new();
    for ca in cas {
        pem.push_str(&ca.pem);
    }
    std::fs::write(&path, pem).expect("write bundle");
    path
}

/// Root-program data over `cas`, unconstrained, at `version`.
pub fn root_store_data(cas: &[&TestCa], version: i64) -> ae::RootStoreData {
    let anchors = cas
        .iter()
        .map(|ca| ae::RootStoreAnchor::new(handle(ca)))
        .collect();
    ae::RootStoreData::new(anchors, version)
}

/// A platform source with fixed anchors and a working enumeration surface.
#[derive(Default)]
pub struct FakePlatformStore {
    anchors: ae::AnchorSet,
}

impl FakePlatformStore {
    pub fn with_anchors(cas: &[&TestCa]) -> Self {
        let mut anchors = ae::AnchorSet::new();
        for ca in cas {
            anchors.add_anchor(handle(ca));
        }
        FakePlatformStore { anchors }
    }
}

impl ae::TrustSource for FakePlatformStore {
    fn get_trust(&self, cert: &ae::Certificate) -> ae::TrustVerdict {
        self.anchors.get_trust(cert)
    }

    fn issuers_of(&self, cert: &ae::Certificate) -> Vec<ae::CertHandle> {
        self.anchors.issuers_of(cert)
    }
}

impl ae::PlatformTrustStore for FakePlatformStore {
    fn all_certificates(&self) -> Vec<ae::CertWithTrust> {
        self.anchors
            .iter()
            .map(|cert| ae::CertWithTrust {
                certificate: Arc::clone(cert),
                verdict: ae::TrustVerdict::TrustAnchor,
            })
            .collect()
    }
}

/// Install a test subscriber so engine diagnostics show up under `RUST_LOG`.
/// Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
