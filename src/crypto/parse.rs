//!
//! Parse cryptographic keys for use with the signer and verifier
//!

use super::{AlgorithmName, SigningKey, VerifyingKey};
use const_oid::{
    db::{
        rfc5912::{ID_EC_PUBLIC_KEY, SECP_256_R_1, SECP_384_R_1},
        rfc8410::ID_ED_25519,
    },
    ObjectIdentifier,
};
use miette::Diagnostic;
use pkcs8::{
    spki::AlgorithmIdentifierRef, Document, PrivateKeyInfo, SecretDocument,
    SubjectPublicKeyInfoRef,
};
use thiserror::Error;

/// Key parsing error
#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    /// Malformed DER structure
    #[error(transparent)]
    Der(#[from] pkcs8::der::Error),

    /// Key rejected
    #[error(transparent)]
    KeyRejected(#[from] ring::error::KeyRejected),

    /// Malformed key
    #[error("Malformed key")]
    MalformedKey,

    /// Malformed PKCS#8 document
    #[error(transparent)]
    Pkcs8(#[from] pkcs8::Error),

    /// Unknown algorithm name
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Unknown key type
    #[error("Unknown key type")]
    UnknownKeyType,

    /// Key belongs to a different algorithm (or curve) than requested
    #[error("Key is meant for {actual} but {expected} was requested")]
    WrongCurve {
        /// Requested algorithm
        expected: AlgorithmName,

        /// Algorithm of the key
        actual: AlgorithmName,
    },
}

fn detect_algorithm(algorithm: &AlgorithmIdentifierRef<'_>) -> Result<AlgorithmName, Error> {
    if algorithm.oid == ID_ED_25519 {
        return Ok(AlgorithmName::Ed25519);
    } else if algorithm.oid != ID_EC_PUBLIC_KEY {
        return Err(Error::UnknownKeyType);
    }

    let curve: ObjectIdentifier = algorithm
        .parameters_oid()
        .map_err(|_| Error::MalformedKey)?;

    if curve == SECP_256_R_1 {
        Ok(AlgorithmName::EcdsaP256Sha256)
    } else if curve == SECP_384_R_1 {
        Ok(AlgorithmName::EcdsaP384Sha384)
    } else {
        Err(Error::UnknownKeyType)
    }
}

pub(super) fn ensure_algorithm(
    expected: AlgorithmName,
    actual: AlgorithmName,
) -> Result<(), Error> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::WrongCurve { expected, actual })
    }
}

/// Parse a public key from its SPKI PEM form
///
/// Currently supported algorithms:
///
/// - ECDSA (P-256, P-384)
/// - Ed25519
#[inline]
pub fn public_key(pem: &str) -> Result<VerifyingKey, Error> {
    let (_pem_tag, document) = Document::from_pem(pem)?;
    let spki: SubjectPublicKeyInfoRef<'_> = document.decode_msg()?;

    let algorithm = detect_algorithm(&spki.algorithm)?;
    let raw_bytes = spki
        .subject_public_key
        .as_bytes()
        .ok_or(Error::MalformedKey)?;

    VerifyingKey::from_bytes(algorithm, raw_bytes)
}

/// Parse a private key from its PKCS#8 DER form
#[inline]
pub fn private_key_der(der: &[u8]) -> Result<SigningKey, Error> {
    let private_key_raw = PrivateKeyInfo::try_from(der)?;
    let algorithm = detect_algorithm(&private_key_raw.algorithm)?;

    SigningKey::from_detected_pkcs8(algorithm, der)
}

/// Parse a private key from its PKCS#8 PEM form.
/// This function uses constant-time PEM decoding and zeroizes any temporary allocations.
///
/// Currently supported algorithms:
///
/// - ECDSA (P-256, P-384)
/// - Ed25519
#[inline]
pub fn private_key(pem: &str) -> Result<SigningKey, Error> {
    let (_tag_line, document) = SecretDocument::from_pem(pem)?;
    private_key_der(document.as_bytes())
}
