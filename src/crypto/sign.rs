use super::{
    parse::{self, ensure_algorithm},
    Algorithm, AlgorithmName, SigningAlgorithm, VerifyingKey,
};
use crate::BoxError;
use ring::{
    rand::SystemRandom,
    signature::{
        EcdsaKeyPair, Ed25519KeyPair, KeyPair as _, ECDSA_P256_SHA256_ASN1_SIGNING,
        ECDSA_P384_SHA384_ASN1_SIGNING,
    },
};

#[derive(Debug)]
enum KeyPair {
    EcdsaP256Sha256(EcdsaKeyPair),
    EcdsaP384Sha384(EcdsaKeyPair),
    Ed25519(Ed25519KeyPair),
}

/// Private key bound to its algorithm at construction
#[derive(Debug)]
pub struct SigningKey {
    key: KeyPair,
}

impl SigningKey {
    /// Construct the key pair for an already detected algorithm
    pub(super) fn from_detected_pkcs8(
        algorithm: AlgorithmName,
        der: &[u8],
    ) -> Result<Self, parse::Error> {
        let key = match algorithm {
            AlgorithmName::EcdsaP256Sha256 => KeyPair::EcdsaP256Sha256(EcdsaKeyPair::from_pkcs8(
                &ECDSA_P256_SHA256_ASN1_SIGNING,
                der,
                &SystemRandom::new(),
            )?),
            AlgorithmName::EcdsaP384Sha384 => KeyPair::EcdsaP384Sha384(EcdsaKeyPair::from_pkcs8(
                &ECDSA_P384_SHA384_ASN1_SIGNING,
                der,
                &SystemRandom::new(),
            )?),
            AlgorithmName::Ed25519 => {
                KeyPair::Ed25519(Ed25519KeyPair::from_pkcs8_maybe_unchecked(der)?)
            }
        };

        Ok(Self { key })
    }

    /// Parse a PKCS#8 PEM private key, rejecting keys not meant for the algorithm
    pub fn from_pkcs8_pem(algorithm: AlgorithmName, pem: &str) -> Result<Self, parse::Error> {
        let key = parse::private_key(pem)?;
        ensure_algorithm(algorithm, key.algorithm())?;

        Ok(key)
    }

    /// Parse a PKCS#8 DER private key, rejecting keys not meant for the algorithm
    pub fn from_pkcs8_der(algorithm: AlgorithmName, der: &[u8]) -> Result<Self, parse::Error> {
        let key = parse::private_key_der(der)?;
        ensure_algorithm(algorithm, key.algorithm())?;

        Ok(key)
    }

    /// Algorithm the key is bound to
    #[must_use]
    pub fn algorithm(&self) -> AlgorithmName {
        match self.key {
            KeyPair::EcdsaP256Sha256(..) => AlgorithmName::EcdsaP256Sha256,
            KeyPair::EcdsaP384Sha384(..) => AlgorithmName::EcdsaP384Sha384,
            KeyPair::Ed25519(..) => AlgorithmName::Ed25519,
        }
    }

    /// Verifying key corresponding to this key
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        let public_key = match self.key {
            KeyPair::EcdsaP256Sha256(ref key) | KeyPair::EcdsaP384Sha384(ref key) => {
                key.public_key().as_ref()
            }
            KeyPair::Ed25519(ref key) => key.public_key().as_ref(),
        };

        VerifyingKey::from_trusted_bytes(self.algorithm(), public_key.to_vec())
    }
}

impl Algorithm for SigningKey {
    fn name(&self) -> &str {
        self.algorithm().as_str()
    }
}

impl SigningAlgorithm for SigningKey {
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>, BoxError> {
        let signature = match self.key {
            KeyPair::EcdsaP256Sha256(ref key) | KeyPair::EcdsaP384Sha384(ref key) => {
                key.sign(&SystemRandom::new(), msg)?
            }
            KeyPair::Ed25519(ref key) => key.sign(msg),
        };

        Ok(signature.as_ref().to_vec())
    }
}
