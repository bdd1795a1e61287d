//! Certificate material: parsed handles and bundle decoding.

mod certificate;
mod decode;

pub use certificate::{CertHandle, Certificate, CertificateError};
pub use decode::{decode_certificates, DecodeFailure, DecodedBundle};
