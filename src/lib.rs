//!
//! HTTP Message Signatures
//!
//! Implementation of the signing and verification engine of [RFC 9421](https://www.rfc-editor.org/rfc/rfc9421).
//! Only supports asymmetric signing schemes (aka. no HMAC and such)
//!

#![forbid(rust_2018_idioms, unsafe_code)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use http::HeaderName;

pub use crate::{
    crypto::{
        Algorithm, AlgorithmName, SigningAlgorithm, SigningKey, VerifyingAlgorithm, VerifyingKey,
    },
    error::Error,
    message::{HttpMessage, ResponseMessage},
    parameters::{Expiry, SignatureParameter, ValidationError},
    signature_base::SignatureBase,
    signer::{HttpSigner, SignatureConfig},
    verifier::{HttpVerifier, SelectionPolicy, VerifiedSignature},
};
pub use ring;
pub use sfv;

pub mod component;
pub mod crypto;
pub mod header;
pub mod message;
pub mod parameters;
pub mod signature_base;
pub mod signer;
pub mod verifier;

mod error;
mod util;

/// Boxed error type used at the algorithm extension seam
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type Result<T, E = Error> = std::result::Result<T, E>;

/// `Signature` header
pub static SIGNATURE: HeaderName = HeaderName::from_static("signature");

/// `Signature-Input` header
pub static SIGNATURE_INPUT: HeaderName = HeaderName::from_static("signature-input");

/// `Content-Digest` header
pub static CONTENT_DIGEST: HeaderName = HeaderName::from_static("content-digest");
