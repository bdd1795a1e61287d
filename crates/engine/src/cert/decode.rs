// crates/engine/src/cert/decode.rs

use std::sync::Arc;

use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::{FromDer, X509Certificate};

use super::certificate::{CertHandle, Certificate, CertificateError};

const PEM_MARKER: &[u8] = b"-----BEGIN ";
const PEM_CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Outcome of decoding a byte blob that may hold several certificates.
///
/// Rejected items never abort the rest of the batch, and an input that yields
/// zero certificates is not an error here; callers decide what an empty
/// result means for them.
#[derive(Debug, Default)]
pub struct DecodedBundle {
    pub certificates: Vec<CertHandle>,
    pub rejected: Vec<DecodeFailure>,
}

/// A single item within a bundle that failed to decode.
#[derive(Debug)]
pub struct DecodeFailure {
    /// Zero-based index of the item within its input blob.
    pub index: usize,
    pub error: CertificateError,
}

/// Decode `bytes` as either a PEM bundle or concatenated DER certificates.
///
/// Input containing a PEM armor line is walked block by block; blocks whose
/// label is not `CERTIFICATE` are ignored, and a block that fails to parse is
/// rejected while scanning resumes at the next armor line. Anything else is
/// treated as one or more DER certificates laid end to end.
pub fn decode_certificates(bytes: &[u8]) -> DecodedBundle {
    if looks_like_pem(bytes) {
        decode_pem(bytes)
    } else {
        decode_der_sequence(bytes)
    }
}

fn looks_like_pem(bytes: &[u8]) -> bool {
    find_pem_marker(bytes).is_some()
}

fn find_pem_marker(bytes: &[u8]) -> Option<usize> {
    bytes.windows(PEM_MARKER.len()).position(|w| w == PEM_MARKER)
}

fn decode_pem(bytes: &[u8]) -> DecodedBundle {
    let mut bundle = DecodedBundle::default();
    let mut input = bytes;
    let mut index = 0usize;
    while let Some(start) = find_pem_marker(input) {
        input = &input[start..];
        match parse_x509_pem(input) {
            Ok((rem, pem)) => {
                if pem.label == PEM_CERTIFICATE_LABEL {
                    match Certificate::from_der(&pem.contents) {
                        Ok(cert) => bundle.certificates.push(Arc::new(cert)),
                        Err(error) => bundle.rejected.push(DecodeFailure { index, error }),
                    }
                }
                input = rem;
            }
            Err(e) => {
                bundle.rejected.push(DecodeFailure {
                    index,
                    error: CertificateError::Pem(e.to_string()),
                });
                // A bad block is not fatal to the file: resume at the next
                // armor line.
                input = &input[PEM_MARKER.len()..];
            }
        }
        index += 1;
    }
    bundle
}

fn decode_der_sequence(bytes: &[u8]) -> DecodedBundle {
    let mut bundle = DecodedBundle::default();
    let mut input = bytes;
    let mut index = 0usize;
    while !input.is_empty() {
        match X509Certificate::from_der(input) {
            Ok((rem, _)) => {
                let consumed = input.len() - rem.len();
                match Certificate::from_der(&input[..consumed]) {
                    Ok(cert) => bundle.certificates.push(Arc::new(cert)),
                    Err(error) => bundle.rejected.push(DecodeFailure { index, error }),
                }
                input = rem;
            }
            Err(e) => {
                // DER gives no way to find the next certificate boundary.
                bundle.rejected.push(DecodeFailure {
                    index,
                    error: CertificateError::Der(e.to_string()),
                });
                break;
            }
        }
        index += 1;
    }
    bundle
}
