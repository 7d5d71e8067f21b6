use super::{
    parse::{self, ensure_algorithm},
    Algorithm, AlgorithmName, VerifyingAlgorithm,
};
use ring::signature::UnparsedPublicKey;

/// Leading byte of an uncompressed SEC1 curve point
const UNCOMPRESSED_POINT: u8 = 0x04;

/// Public key bound to an algorithm
#[derive(Clone, Debug)]
pub struct VerifyingKey {
    algorithm: AlgorithmName,
    key: UnparsedPublicKey<Vec<u8>>,
}

impl VerifyingKey {
    /// Construct a verifying key from its raw bytes
    ///
    /// - ECDSA P-256: 65 byte uncompressed curve point
    /// - ECDSA P-384: 97 byte uncompressed curve point
    /// - Ed25519: 32 byte public key
    ///
    /// Bytes of the wrong length or point encoding are rejected as [`parse::Error::MalformedKey`]
    pub fn from_bytes(
        algorithm: AlgorithmName,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<Self, parse::Error> {
        let bytes = bytes.into();
        let well_formed = match algorithm {
            AlgorithmName::EcdsaP256Sha256 => {
                bytes.len() == 65 && bytes[0] == UNCOMPRESSED_POINT
            }
            AlgorithmName::EcdsaP384Sha384 => {
                bytes.len() == 97 && bytes[0] == UNCOMPRESSED_POINT
            }
            AlgorithmName::Ed25519 => bytes.len() == 32,
        };

        if !well_formed {
            return Err(parse::Error::MalformedKey);
        }

        Ok(Self::from_trusted_bytes(algorithm, bytes))
    }

    pub(super) fn from_trusted_bytes(algorithm: AlgorithmName, bytes: Vec<u8>) -> Self {
        Self {
            algorithm,
            key: UnparsedPublicKey::new(algorithm.verification_algorithm(), bytes),
        }
    }

    /// Parse an SPKI PEM public key, rejecting keys not meant for the algorithm
    pub fn from_spki_pem(algorithm: AlgorithmName, pem: &str) -> Result<Self, parse::Error> {
        let key = parse::public_key(pem)?;
        ensure_algorithm(algorithm, key.algorithm())?;

        Ok(key)
    }

    /// Algorithm the key is bound to
    #[must_use]
    pub fn algorithm(&self) -> AlgorithmName {
        self.algorithm
    }

    /// Raw bytes of the key, in the form [`Self::from_bytes`] accepts
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.key.as_ref()
    }
}

impl Algorithm for VerifyingKey {
    fn name(&self) -> &str {
        self.algorithm.as_str()
    }
}

impl VerifyingAlgorithm for VerifyingKey {
    fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        self.key.verify(msg, signature).is_ok()
    }
}
