//!
//! Signing and verification algorithms
//!
//! The engine only talks to the [`SigningAlgorithm`] and [`VerifyingAlgorithm`] traits.
//! New algorithms can be added by implementing them, no changes to the signer or verifier required.
//!

use crate::BoxError;
use ring::signature::{self as ring_signature, VerificationAlgorithm};
use std::{fmt, str::FromStr};

mod sign;
mod verify;

pub mod parse;

pub use self::sign::SigningKey;
pub use self::verify::VerifyingKey;

/// Algorithm identified by a stable name
///
/// The name is what ends up in the `alg` signature parameter
pub trait Algorithm {
    /// Name of the algorithm
    fn name(&self) -> &str;
}

/// Algorithm bound to a private key
pub trait SigningAlgorithm: Algorithm {
    /// Sign the message and return the raw signature
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, BoxError>;
}

/// Algorithm bound to a public key
pub trait VerifyingAlgorithm: Algorithm {
    /// Check the signature of the message
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool;
}

impl<T> Algorithm for &T
where
    T: Algorithm + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T> SigningAlgorithm for &T
where
    T: SigningAlgorithm + ?Sized,
{
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, BoxError> {
        (**self).sign(msg)
    }
}

impl<T> VerifyingAlgorithm for &T
where
    T: VerifyingAlgorithm + ?Sized,
{
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        (**self).verify(msg, signature)
    }
}

/// Algorithms supported out of the box
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AlgorithmName {
    /// ECDSA over the P-256 curve with SHA-256 (`ecdsa-p256-sha256`)
    EcdsaP256Sha256,

    /// ECDSA over the P-384 curve with SHA-384 (`ecdsa-p384-sha384`)
    EcdsaP384Sha384,

    /// EdDSA over Curve25519 (`ed25519`)
    Ed25519,
}

impl AlgorithmName {
    /// Registered name of the algorithm
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EcdsaP256Sha256 => "ecdsa-p256-sha256",
            Self::EcdsaP384Sha384 => "ecdsa-p384-sha384",
            Self::Ed25519 => "ed25519",
        }
    }

    fn verification_algorithm(self) -> &'static dyn VerificationAlgorithm {
        match self {
            Self::EcdsaP256Sha256 => &ring_signature::ECDSA_P256_SHA256_ASN1,
            Self::EcdsaP384Sha384 => &ring_signature::ECDSA_P384_SHA384_ASN1,
            Self::Ed25519 => &ring_signature::ED25519,
        }
    }
}

impl fmt::Display for AlgorithmName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmName {
    type Err = parse::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::EcdsaP256Sha256, Self::EcdsaP384Sha384, Self::Ed25519]
            .into_iter()
            .find(|algorithm| algorithm.as_str() == s)
            .ok_or_else(|| parse::Error::UnknownAlgorithm(s.to_string()))
    }
}
