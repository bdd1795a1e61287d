// crates/engine/src/domain/root_program.rs

//! The curated root-program trust source: a versioned anchor set shipped with
//! the product, plus per-anchor constraint metadata.
//!
//! Constraints are carried and exposed for callers to apply during chain
//! validation; this crate never enforces them itself.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cert::{decode_certificates, CertHandle, Certificate};

use super::anchors::AnchorSet;
use super::error::{EngineError, EngineResult};
use super::source::TrustSource;
use super::types::TrustVerdict;

/// A dotted version such as `131.0.6778.1`, parsed into numeric components.
/// Ordering is component-wise with missing components read as zero, so
/// `10.2` sorts above `9.20` and `121` compares equal to `121.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DottedVersion(Vec<u32>);

impl DottedVersion {
    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        for i in 0..len {
            let a = self.0.get(i).copied().unwrap_or(0);
            let b = other.0.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality must agree with `cmp`, so it cannot be derived.
impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DottedVersion {}

impl FromStr for DottedVersion {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(EngineError::Config("empty version string".into()));
        }
        let mut components = Vec::new();
        for part in s.split('.') {
            let n: u32 = part
                .parse()
                .map_err(|_| EngineError::Config(format!("invalid dotted version: {s:?}")))?;
            components.push(n);
        }
        Ok(DottedVersion(components))
    }
}

impl TryFrom<String> for DottedVersion {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DottedVersion> for String {
    fn from(v: DottedVersion) -> String {
        v.to_string()
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// One constraint record attached to a root-program anchor.
///
/// Every field is optional metadata for the caller to enforce; an empty
/// record constrains nothing. A certificate carrying several records is
/// acceptable if any one of them is satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertConstraint {
    /// Embedded SCTs must be timestamped at or before this time (unix seconds).
    pub sct_not_after: Option<i64>,
    /// All SCTs must be timestamped after this time (unix seconds).
    pub sct_all_after: Option<i64>,
    pub min_version: Option<DottedVersion>,
    pub max_version_exclusive: Option<DottedVersion>,
    pub permitted_dns_names: Vec<String>,
}

/// One anchor in the curated root-program data.
#[derive(Debug, Clone)]
pub struct RootStoreAnchor {
    pub certificate: CertHandle,
    pub constraints: Vec<CertConstraint>,
    /// The anchor belongs to the EU Trusted List set, not the TLS set.
    pub eutl: bool,
    pub enforce_anchor_expiry: bool,
    pub enforce_anchor_constraints: bool,
    /// Binary trust-anchor identifier; empty when the anchor has none.
    pub trust_anchor_id: Vec<u8>,
}

impl RootStoreAnchor {
    /// An unconstrained TLS anchor.
    pub fn new(certificate: CertHandle) -> Self {
        RootStoreAnchor {
            certificate,
            constraints: Vec::new(),
            eutl: false,
            enforce_anchor_expiry: false,
            enforce_anchor_constraints: false,
            trust_anchor_id: Vec::new(),
        }
    }
}

/// The versioned curated root-program data, loaded once at startup and handed
/// to [`RootProgramStore`].
#[derive(Debug, Clone)]
pub struct RootStoreData {
    anchors: Vec<RootStoreAnchor>,
    version: i64,
}

impl RootStoreData {
    /// The version is reported exactly as supplied; zero and negative values
    /// are accepted and passed through.
    pub fn new(anchors: Vec<RootStoreAnchor>, version: i64) -> Self {
        RootStoreData { anchors, version }
    }

    /// Parse root-program data from its JSON manifest form.
    ///
    /// Unlike the tolerant bundle loaders, a manifest anchor whose
    /// certificate fails to parse is an error: curated data is expected to be
    /// well-formed, and silently dropping an anchor would ship less trust
    /// than the manifest describes.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let manifest: RootStoreManifest = serde_json::from_str(json)?;
        let mut anchors = Vec::with_capacity(manifest.anchors.len());
        for (i, entry) in manifest.anchors.into_iter().enumerate() {
            let decoded = decode_certificates(entry.certificate.as_bytes());
            if let Some(failure) = decoded.rejected.into_iter().next() {
                warn!("root store manifest anchor {i}: {}", failure.error);
                return Err(failure.error.into());
            }
            let mut certs = decoded.certificates.into_iter();
            let certificate = match (certs.next(), certs.next()) {
                (Some(cert), None) => cert,
                (None, _) => {
                    return Err(EngineError::Config(format!(
                        "manifest anchor {i}: no certificate in entry"
                    )));
                }
                (Some(_), Some(_)) => {
                    return Err(EngineError::Config(format!(
                        "manifest anchor {i}: expected exactly one certificate"
                    )));
                }
            };
            let trust_anchor_id = match entry.trust_anchor_id {
                Some(id) if !id.is_empty() => hex::decode(&id).map_err(|e| {
                    EngineError::Config(format!("manifest anchor {i}: bad trust_anchor_id: {e}"))
                })?,
                _ => Vec::new(),
            };
            anchors.push(RootStoreAnchor {
                certificate,
                constraints: entry.constraints,
                eutl: entry.eutl,
                enforce_anchor_expiry: entry.enforce_anchor_expiry,
                enforce_anchor_constraints: entry.enforce_anchor_constraints,
                trust_anchor_id,
            });
        }
        Ok(RootStoreData::new(anchors, manifest.version))
    }

    /// Read and parse a JSON manifest from `path`.
    pub fn load_json(path: impl AsRef<Path>) -> EngineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn anchors(&self) -> &[RootStoreAnchor] {
        &self.anchors
    }

    pub fn version(&self) -> i64 {
        self.version
    }
}

#[derive(Deserialize)]
struct RootStoreManifest {
    version: i64,
    #[serde(default)]
    anchors: Vec<ManifestAnchor>,
}

#[derive(Deserialize)]
struct ManifestAnchor {
    /// PEM-armored certificate.
    certificate: String,
    #[serde(default)]
    constraints: Vec<CertConstraint>,
    #[serde(default)]
    eutl: bool,
    #[serde(default)]
    enforce_anchor_expiry: bool,
    #[serde(default)]
    enforce_anchor_constraints: bool,
    /// Hex-encoded trust-anchor identifier.
    #[serde(default)]
    trust_anchor_id: Option<String>,
}

/// Replacement constraints keyed by certificate SHA-256 fingerprint. An entry
/// fully shadows the base constraints for that certificate.
pub type ConstraintOverrideMap = HashMap<[u8; 32], Vec<CertConstraint>>;

/// Parse the constraint-override syntax accepted by testing command-line
/// switches.
///
/// The base unit is `hash[,hash]*:key=value[,key=value]*`; multiple units are
/// joined with `+`. Hashes are hex SHA-256 certificate fingerprints.
/// Recognized keys:
///
///   * `sctnotafter=<unix seconds>`
///   * `sctallafter=<unix seconds>`
///   * `minversion=<dotted version>`
///   * `maxversionexclusive=<dotted version>`
///   * `dns=<name>` (repeatable)
///
/// Listing a hash in several units appends one constraint record per unit.
/// Malformed pieces are logged and skipped; parsing never fails.
pub fn parse_constraints_override(spec: &str) -> ConstraintOverrideMap {
    let mut overrides = ConstraintOverrideMap::new();
    for unit in spec.split('+').filter(|u| !u.is_empty()) {
        let (hashes, values) = match unit.split_once(':') {
            Some(parts) => parts,
            None => {
                warn!(unit, "constraint override unit has no ':', skipping");
                continue;
            }
        };
        let constraint = parse_constraint_values(values);
        for hash in hashes.split(',').filter(|h| !h.is_empty()) {
            match parse_sha256_hex(hash) {
                Some(fingerprint) => {
                    overrides
                        .entry(fingerprint)
                        .or_default()
                        .push(constraint.clone());
                }
                None => {
                    warn!(hash, "constraint override hash is not a SHA-256 hex digest, skipping");
                }
            }
        }
    }
    overrides
}

fn parse_sha256_hex(s: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(s).ok()?;
    bytes.try_into().ok()
}

fn parse_constraint_values(values: &str) -> CertConstraint {
    let mut constraint = CertConstraint::default();
    for piece in values.split(',').filter(|p| !p.is_empty()) {
        let (key, value) = match piece.split_once('=') {
            Some(parts) => parts,
            None => {
                warn!(piece, "constraint override piece has no '=', skipping");
                continue;
            }
        };
        match key {
            "sctnotafter" => match value.parse::<i64>() {
                Ok(secs) => constraint.sct_not_after = Some(secs),
                Err(_) => warn!(value, "bad sctnotafter, skipping"),
            },
            "sctallafter" => match value.parse::<i64>() {
                Ok(secs) => constraint.sct_all_after = Some(secs),
                Err(_) => warn!(value, "bad sctallafter, skipping"),
            },
            "minversion" => match value.parse::<DottedVersion>() {
                Ok(version) => constraint.min_version = Some(version),
                Err(_) => warn!(value, "bad minversion, skipping"),
            },
            "maxversionexclusive" => match value.parse::<DottedVersion>() {
                Ok(version) => constraint.max_version_exclusive = Some(version),
                Err(_) => warn!(value, "bad maxversionexclusive, skipping"),
            },
            "dns" => constraint.permitted_dns_names.push(value.to_string()),
            _ => warn!(key, "unrecognized constraint override key, skipping"),
        }
    }
    constraint
}

/// The curated root program as a queryable trust source.
///
/// TLS anchors answer trust queries; EU Trusted List anchors are carried
/// alongside without participating in TLS trust. Constraint lookups consult
/// the override map before the data's own records.
#[derive(Debug)]
pub struct RootProgramStore {
    tls_anchors: AnchorSet,
    eutl_anchors: AnchorSet,
    // Populated only for anchors that carry at least one constraint record.
    constraints: HashMap<CertHandle, Vec<CertConstraint>>,
    override_constraints: ConstraintOverrideMap,
    trust_anchor_ids: HashSet<Vec<u8>>,
    version: i64,
}

impl RootProgramStore {
    pub fn new(data: &RootStoreData) -> Self {
        Self::with_overrides(data, ConstraintOverrideMap::new())
    }

    /// Build the store with testing-time constraint overrides applied on top
    /// of `data`'s own constraint records.
    pub fn with_overrides(data: &RootStoreData, override_constraints: ConstraintOverrideMap) -> Self {
        let mut tls_anchors = AnchorSet::new();
        let mut eutl_anchors = AnchorSet::new();
        let mut constraints: HashMap<CertHandle, Vec<CertConstraint>> = HashMap::new();
        let mut trust_anchor_ids = HashSet::new();

        for anchor in data.anchors() {
            if anchor.eutl {
                eutl_anchors.add_anchor(Arc::clone(&anchor.certificate));
                continue;
            }
            tls_anchors.add_anchor(Arc::clone(&anchor.certificate));
            if !anchor.constraints.is_empty() {
                constraints.insert(Arc::clone(&anchor.certificate), anchor.constraints.clone());
            }
            if !anchor.trust_anchor_id.is_empty() {
                trust_anchor_ids.insert(anchor.trust_anchor_id.clone());
            }
        }

        RootProgramStore {
            tls_anchors,
            eutl_anchors,
            constraints,
            override_constraints,
            trust_anchor_ids,
            version: data.version(),
        }
    }

    /// Whether `cert` is one of the curated TLS anchors. This is the
    /// authoritative "standard root" answer and is independent of any local
    /// or platform trust.
    pub fn contains(&self, cert: &Certificate) -> bool {
        self.tls_anchors.contains(cert)
    }

    /// Version of the curated data set.
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Constraint records for `cert`; empty when unconstrained. An override
    /// entry matching the certificate's fingerprint shadows the base records
    /// entirely, whether or not the certificate is an anchor here.
    pub fn constraints_for(&self, cert: &Certificate) -> &[CertConstraint] {
        if !self.override_constraints.is_empty() {
            if let Some(records) = self.override_constraints.get(&cert.sha256_fingerprint()) {
                return records;
            }
        }
        self.constraints.get(cert).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Anchors from the EU Trusted List set.
    pub fn eutl_anchors(&self) -> &AnchorSet {
        &self.eutl_anchors
    }

    /// The non-empty trust-anchor identifiers across the TLS anchors.
    pub fn trust_anchor_ids(&self) -> &HashSet<Vec<u8>> {
        &self.trust_anchor_ids
    }
}

impl TrustSource for RootProgramStore {
    fn get_trust(&self, cert: &Certificate) -> TrustVerdict {
        self.tls_anchors.get_trust(cert)
    }

    fn issuers_of(&self, cert: &Certificate) -> Vec<CertHandle> {
        self.tls_anchors.issuers_of(cert)
    }
}
