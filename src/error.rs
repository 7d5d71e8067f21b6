#![allow(missing_docs)]

use crate::{
    parameters::ValidationError, signer::HttpSignerBuilderError,
    verifier::HttpVerifierBuilderError, BoxError,
};
use http::header::{InvalidHeaderName, InvalidHeaderValue, ToStrError};
use miette::Diagnostic;
use thiserror::Error;

fn join<T>(items: &[T]) -> String
where
    T: ToString,
{
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Signature declares algorithm \"{declared}\" but the key is bound to \"{expected}\"")]
    AlgorithmMismatch { declared: String, expected: String },

    #[error("Duplicate component: {0}")]
    DuplicateComponent(String),

    #[error("Structured field has no members")]
    EmptyField,

    #[error(transparent)]
    HttpHeaderToStr(#[from] ToStrError),

    #[error("Integer {0} exceeds the structured field range")]
    IntegerOutOfRange(i64),

    #[error(transparent)]
    InvalidHeaderName(#[from] InvalidHeaderName),

    #[error(transparent)]
    InvalidHeaderValue(#[from] InvalidHeaderValue),

    #[error("Invalid structured field key: {0:?}")]
    InvalidKey(String),

    #[error("Invalid signature label: {0:?}")]
    InvalidLabel(String),

    #[error("Invalid signature parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid @query-param component: {0}")]
    InvalidQueryParam(String),

    #[error("Invalid signature header")]
    InvalidSignatureHeader,

    #[error("Invalid structured field string: {0:?}")]
    InvalidString(String),

    #[error(transparent)]
    Key(#[from] crate::crypto::parse::Error),

    #[error("Key ID {0:?} is not allowed")]
    KeyIdNotAllowed(Option<String>),

    #[error("Signature/Signature-Input header missing")]
    MissingSignatureHeader,

    #[error("Missing URI component: {0}")]
    MissingUriComponent(&'static str),

    #[error("Query param \"{0}\" has a multiline value")]
    MultilineQueryParamValue(String),

    #[error("Query param \"{0}\" has multiple values")]
    MultipleQueryParamValues(String),

    #[error("Multiple signatures found: {}", .0.join(", "))]
    MultipleSignatures(Vec<String>),

    #[error("Query param \"{0}\" not found")]
    QueryParamNotFound(String),

    #[error("Failed to generate random bytes")]
    Random(#[from] ring::error::Unspecified),

    #[error(transparent)]
    Sfv(#[from] sfv::Error),

    #[error("Signature label not specified")]
    SigLabelNotSpecified,

    #[error("Signature mismatch")]
    SignatureMismatch,

    #[error("Signature \"{0}\" not found")]
    SignatureNotFound(String),

    #[error("\"@signature-params\" can't be a covered component")]
    SignatureParamsCovered,

    #[error(transparent)]
    SignerBuilder(#[from] HttpSignerBuilderError),

    #[error("Failed to sign the signature base")]
    Signing(#[source] BoxError),

    #[error("Requests do not support @status")]
    StatusOnRequest,

    #[error("Unknown derived component: {0}")]
    UnknownDerivedComponent(String),

    #[error("Parameter \"{0}\" has to be resolved first")]
    UnresolvedParameter(&'static str),

    #[error("Unsupported signature parameter: {0}")]
    UnsupportedParameter(String),

    #[error("Signature parameters failed validation: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    VerifierBuilder(#[from] HttpVerifierBuilderError),
}
