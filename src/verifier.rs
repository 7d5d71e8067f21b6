//!
//! Verification of HTTP message signatures
//!

use crate::{
    crypto::{Algorithm, VerifyingAlgorithm},
    error::Error,
    header::{self, SignatureInput},
    message::HttpMessage,
    parameters::{SignatureParameter, ValidationError},
    signature_base, util, Result,
};
use derive_builder::Builder;
use http::Request;
use std::{
    collections::HashSet,
    time::{Duration, SystemTime},
};
use tracing::{debug, instrument};

/// Which of the signatures attached to a message gets verified
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Exactly one signature has to be present
    #[default]
    OnlyOne,

    /// The first signature in header order
    First,

    /// The signature with this label
    Label(String),
}

impl SelectionPolicy {
    /// Select a label out of the labels present on the message
    pub fn select<'a>(&'a self, labels: &'a [String]) -> Result<&'a str> {
        match self {
            Self::Label(label) if label.is_empty() => Err(Error::SigLabelNotSpecified),
            Self::Label(label) => Ok(label.as_str()),
            Self::First => labels
                .first()
                .map(String::as_str)
                .ok_or(Error::MissingSignatureHeader),
            Self::OnlyOne => match labels {
                [] => Err(Error::MissingSignatureHeader),
                [label] => Ok(label.as_str()),
                labels => Err(Error::MultipleSignatures(labels.to_vec())),
            },
        }
    }
}

/// Metadata of a successfully verified signature
#[derive(Clone, Debug, PartialEq)]
pub struct VerifiedSignature {
    input: SignatureInput,
}

impl VerifiedSignature {
    /// Label of the signature
    #[must_use]
    pub fn label(&self) -> &str {
        &self.input.label
    }

    /// Covered components, in signing order
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.input.components
    }

    /// Signature parameters as they were signed
    #[must_use]
    pub fn parameters(&self) -> &[SignatureParameter] {
        &self.input.parameters
    }

    /// Declared algorithm
    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.input.alg()
    }

    /// Key identifier
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.input.key_id()
    }

    /// Nonce
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.input.nonce()
    }

    /// Application-specific tag
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.input.tag()
    }

    /// Return the parsed `Signature-Input` entry
    #[must_use]
    pub fn into_input(self) -> SignatureInput {
        self.input
    }
}

/// HTTP message signature verifier
#[derive(Builder, Clone, Debug)]
#[builder(pattern = "owned", build_fn(validate = "Self::validate"))]
pub struct HttpVerifier<K> {
    /// Key (and with it the algorithm) the signatures are checked against
    key: K,

    /// Which signature to verify
    #[builder(default)]
    policy: SelectionPolicy,

    /// Allowed clock skew for `created` timestamps in the future
    #[builder(default)]
    created_tolerance: Duration,

    /// Allowed clock skew for `expires` timestamps in the past
    #[builder(default)]
    expires_tolerance: Duration,

    /// Key IDs a signature has to declare, if restricted
    #[builder(default, setter(custom))]
    allowed_key_ids: Option<HashSet<String>>,
}

impl<K> HttpVerifierBuilder<K> {
    /// Only accept signatures declaring one of these key IDs
    #[must_use]
    pub fn allowed_key_ids<I, S>(mut self, key_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_key_ids = Some(Some(key_ids.into_iter().map(Into::into).collect()));
        self
    }

    fn validate(&self) -> Result<(), String> {
        if let Some(SelectionPolicy::Label(ref label)) = self.policy {
            if label.is_empty() {
                return Err(Error::SigLabelNotSpecified.to_string());
            }
            if util::key(label).is_err() {
                return Err(Error::InvalidLabel(label.clone()).to_string());
            }
        }

        Ok(())
    }
}

impl<K> HttpVerifier<K>
where
    K: VerifyingAlgorithm,
{
    /// Start building a verifier
    #[must_use]
    pub fn builder() -> HttpVerifierBuilder<K> {
        HttpVerifierBuilder::default()
    }

    fn check_key_id(&self, input: &SignatureInput) -> Result<()> {
        let Some(ref allowed) = self.allowed_key_ids else {
            return Ok(());
        };

        match input.key_id() {
            Some(key_id) if allowed.contains(key_id) => Ok(()),
            key_id => Err(Error::KeyIdNotAllowed(key_id.map(ToString::to_string))),
        }
    }

    fn with_tolerances(&self, parameters: &[SignatureParameter]) -> Vec<SignatureParameter> {
        parameters
            .iter()
            .cloned()
            .map(|param| match param {
                SignatureParameter::Created { .. } => param.with_tolerance(self.created_tolerance),
                SignatureParameter::Expires { .. } => param.with_tolerance(self.expires_tolerance),
                param => param,
            })
            .collect()
    }

    /// Verify a signature of the message
    ///
    /// The signature base is always rebuilt from the message itself
    #[instrument(skip_all)]
    pub fn verify<M>(&self, msg: &M) -> Result<VerifiedSignature>
    where
        M: HttpMessage + ?Sized,
    {
        let headers = msg.headers();
        let labels = header::labels(headers)?;
        let label = self.policy.select(&labels)?;
        debug!(label, "selected signature");

        let input = header::signature_input_for(headers, label)?;
        let signature = header::signature_for(headers, label)?;

        if let Some(alg) = input.alg() {
            if alg != self.key.name() {
                return Err(Error::AlgorithmMismatch {
                    declared: alg.to_string(),
                    expected: self.key.name().to_string(),
                });
            }
        }
        self.check_key_id(&input)?;

        let parameters = self.with_tolerances(&input.parameters);
        let now = SystemTime::now();
        let violations = parameters
            .iter()
            .filter_map(|param| param.validate_at(now).err())
            .collect::<Vec<ValidationError>>();

        if !violations.is_empty() {
            return Err(Error::Validation(violations));
        }

        let base = signature_base::build(msg, &input.components, &parameters)?;
        if !self.key.verify(base.serialise()?.as_bytes(), &signature) {
            return Err(Error::SignatureMismatch);
        }

        Ok(VerifiedSignature { input })
    }

    /// Verify a signature of an HTTP request
    pub fn verify_request<B>(&self, request: &Request<B>) -> Result<VerifiedSignature> {
        self.verify(request)
    }
}
