// adapters/unix.rs

//! Unix platform trust source: system CA bundle discovery.
//!
//! Follows the conventional OpenSSL-style search: an ordered list of
//! well-known bundle files where the first usable file wins, then an ordered
//! list of certificate directories where the first directory yielding a
//! certificate wins but every file inside it is scanned. `SSL_CERT_FILE` and
//! `SSL_CERT_DIR` replace the built-in candidate lists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, error, warn};

use crate::cert::{decode_certificates, CertHandle, Certificate};
use crate::domain::anchors::AnchorSet;
use crate::domain::source::{PlatformTrustStore, TrustSource};
use crate::domain::types::{CertWithTrust, TrustVerdict};

/// Well-known single-file CA bundles. The first readable file yielding at
/// least one certificate wins.
const ROOT_CERT_FILES: [&str; 6] = [
    "/etc/ssl/certs/ca-certificates.crt", // Debian/Ubuntu/Gentoo etc.
    "/etc/pki/tls/certs/ca-bundle.crt",   // Fedora/RHEL 6
    "/etc/ssl/ca-bundle.pem",             // OpenSUSE
    "/etc/pki/tls/cacert.pem",            // OpenELEC
    "/etc/pki/ca-trust/extracted/pem/tls-ca-bundle.pem", // CentOS/RHEL 7
    "/etc/ssl/cert.pem",                  // Alpine Linux
];

/// Well-known certificate directories, scanned recursively. Scanning stops
/// once a directory has yielded at least one certificate.
const ROOT_CERT_DIRS: [&str; 3] = [
    "/etc/ssl/certs",               // SLES10/SLES11
    "/etc/pki/tls/certs",           // Fedora/RHEL
    "/system/etc/security/cacerts", // Android
];

/// Replaces the bundle-file candidate list with a single path.
pub const CERT_FILE_ENV: &str = "SSL_CERT_FILE";

/// Replaces the directory candidate list; entries are colon-separated.
pub const CERT_DIR_ENV: &str = "SSL_CERT_DIR";

/// Resolved candidate lists for bundle discovery. Built from the environment
/// in production; constructible directly for tests.
#[derive(Debug, Clone)]
pub struct BundleSearchPaths {
    pub files: Vec<PathBuf>,
    pub dirs: Vec<PathBuf>,
}

impl BundleSearchPaths {
    /// The built-in per-distribution candidate lists.
    pub fn built_in() -> Self {
        BundleSearchPaths {
            files: ROOT_CERT_FILES.iter().map(PathBuf::from).collect(),
            dirs: ROOT_CERT_DIRS.iter().map(PathBuf::from).collect(),
        }
    }

    /// Built-in candidates with environment overrides applied.
    ///
    /// A set, non-empty `SSL_CERT_FILE` replaces the whole file list. A set,
    /// non-empty `SSL_CERT_DIR` replaces the directory list with its
    /// colon-separated entries, whitespace trimmed and empty entries dropped;
    /// a value of only separators therefore overrides the list to nothing.
    pub fn from_env() -> Self {
        let mut paths = Self::built_in();
        if let Some(file) = env_non_empty(CERT_FILE_ENV) {
            paths.files = vec![PathBuf::from(file)];
        }
        if let Some(dirs) = env_non_empty(CERT_DIR_ENV) {
            paths.dirs = dirs
                .split(':')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        paths
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// Trust source over the system CA bundle. Anchors are loaded once at
/// construction; queries are read-only afterwards.
#[derive(Debug)]
pub struct UnixTrustStore {
    anchors: AnchorSet,
}

impl UnixTrustStore {
    /// Load from the default search paths with environment overrides.
    pub fn new() -> Self {
        Self::with_search_paths(&BundleSearchPaths::from_env())
    }

    /// Load from explicit candidate lists.
    ///
    /// Never fails: a system yielding no certificates produces an empty
    /// source whose queries all answer not-present. That outcome is reported
    /// once at error level, since every TLS connection is about to fail.
    pub fn with_search_paths(paths: &BundleSearchPaths) -> Self {
        let mut anchors = AnchorSet::new();

        let mut file_ok = false;
        for file in &paths.files {
            let bytes = match std::fs::read(file) {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!(path = %file.display(), "skipping bundle candidate: {e}");
                    continue;
                }
            };
            if add_certificates_from_bytes(&bytes, file, &mut anchors) {
                file_ok = true;
                break; // First usable bundle file wins.
            }
        }

        let mut dir_ok = false;
        for dir in &paths.dirs {
            for file in regular_files_under(dir) {
                let bytes = match std::fs::read(&file) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        debug!(path = %file.display(), "skipping unreadable file: {e}");
                        continue;
                    }
                };
                if add_certificates_from_bytes(&bytes, &file, &mut anchors) {
                    dir_ok = true;
                }
            }
            if dir_ok {
                break; // Later directories are alternatives, not additions.
            }
        }

        if !file_ok && !dir_ok {
            error!(
                "no CA certificates were found; try the {CERT_FILE_ENV} or {CERT_DIR_ENV} \
                 environment variables"
            );
        }

        UnixTrustStore { anchors }
    }

    /// The loaded anchor set.
    pub fn anchors(&self) -> &AnchorSet {
        &self.anchors
    }
}

impl TrustSource for UnixTrustStore {
    fn get_trust(&self, cert: &Certificate) -> TrustVerdict {
        self.anchors.get_trust(cert)
    }

    fn issuers_of(&self, cert: &Certificate) -> Vec<CertHandle> {
        self.anchors.issuers_of(cert)
    }
}

impl PlatformTrustStore for UnixTrustStore {
    // System bundle roots are not user-added; there is nothing to enumerate.
    fn all_certificates(&self) -> Vec<CertWithTrust> {
        Vec::new()
    }
}

/// Decode `bytes` and add every parsed certificate as an anchor, skipping
/// certificates already present. Returns whether the bytes yielded at least
/// one parseable certificate, counting duplicates as parsed.
fn add_certificates_from_bytes(bytes: &[u8], origin: &Path, anchors: &mut AnchorSet) -> bool {
    let decoded = decode_certificates(bytes);
    for failure in &decoded.rejected {
        warn!(
            path = %origin.display(),
            index = failure.index,
            "skipping unparsable certificate: {}", failure.error
        );
    }
    let parsed_any = !decoded.certificates.is_empty();
    for cert in decoded.certificates {
        anchors.add_anchor_if_absent(cert);
    }
    parsed_any
}

/// Regular files under `dir`, recursively, in sorted order. Empty when the
/// directory is missing or cannot be enumerated.
fn regular_files_under(dir: &Path) -> Vec<PathBuf> {
    // The directory name is literal text, not pattern syntax; escape it
    // before appending the wildcards.
    let prefix = match dir.to_str() {
        Some(prefix) => glob::Pattern::escape(prefix),
        None => {
            debug!(path = %dir.display(), "skipping non-UTF-8 directory path");
            return Vec::new();
        }
    };
    let pattern = format!("{}/**/*", prefix.trim_end_matches('/'));
    let entries = match glob::glob(&pattern) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %dir.display(), "skipping unmatchable directory: {e}");
            return Vec::new();
        }
    };
    entries
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect()
}

// Process-wide store shared by every facade built with platform defaults.
// Never torn down: trust queries may run right up to process exit, and the
// system bundle does not change within a process lifetime.
static GLOBAL_UNIX_STORE: Lazy<Arc<UnixTrustStore>> =
    Lazy::new(|| Arc::new(UnixTrustStore::new()));

/// The process-wide Unix trust store, built on first use.
pub fn global_platform_store() -> Arc<UnixTrustStore> {
    Arc::clone(&GLOBAL_UNIX_STORE)
}

/// Build the process-wide store ahead of time so the first facade does not
/// pay the bundle scan inline. Callers may `tokio::spawn` this to get a
/// pollable handle; queries issued before warm-up completes simply build the
/// store on first touch instead.
pub async fn warm_up_platform_store() {
    if Lazy::get(&GLOBAL_UNIX_STORE).is_some() {
        return;
    }
    match tokio::runtime::Handle::try_current() {
        // Bundle scanning is blocking file I/O; keep it off the async threads.
        Ok(handle) => {
            let _ = handle
                .spawn_blocking(|| {
                    Lazy::force(&GLOBAL_UNIX_STORE);
                })
                .await;
        }
        // Polled outside a tokio runtime: build inline.
        Err(_) => {
            Lazy::force(&GLOBAL_UNIX_STORE);
        }
    }
}
