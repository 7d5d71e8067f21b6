//!
//! Signing of HTTP messages
//!

use crate::{
    component::{is_derived, DerivedComponent},
    crypto::{Algorithm, SigningAlgorithm},
    error::Error,
    header::{SignatureHeader, SignatureInput},
    message::HttpMessage,
    parameters::{Expiry, SignatureParameter},
    signature_base::{self, SignatureBase},
    util::{self, canonical_header_name},
    Result, SIGNATURE, SIGNATURE_INPUT,
};
use derive_builder::Builder;
use http::{header::CONTENT_LENGTH, HeaderValue, Request};
use std::time::{Duration, SystemTime};
use tracing::{debug, instrument};

/// Components and parameters covered by a signature
///
/// Immutable once built. Use [`SignatureConfig::builder`] to construct one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignatureConfig {
    components: Vec<String>,
    parameters: Vec<SignatureParameter>,
}

impl SignatureConfig {
    /// Construct a configuration from a verbatim component list
    ///
    /// The components are taken as-is (duplicates are rejected when signing).
    /// Parameters are deduplicated by name.
    #[must_use]
    pub fn new<I, S>(components: I, parameters: Vec<SignatureParameter>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = SignatureConfigBuilder::default();
        for param in parameters {
            builder = builder.parameter(param);
        }

        Self {
            components: components.into_iter().map(Into::into).collect(),
            parameters: builder.config.parameters,
        }
    }

    /// Start building a configuration
    #[must_use]
    pub fn builder() -> SignatureConfigBuilder {
        SignatureConfigBuilder::default()
    }

    /// Covered components, in signing order
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Signature parameters, in signing order
    #[must_use]
    pub fn parameters(&self) -> &[SignatureParameter] {
        &self.parameters
    }
}

/// Fluent builder for [`SignatureConfig`]
///
/// Adding a component twice keeps the first occurrence.
/// Adding a parameter twice replaces the earlier occurrence in place.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct SignatureConfigBuilder {
    config: SignatureConfig,
}

impl SignatureConfigBuilder {
    /// Cover a component
    ///
    /// Header names are canonicalised (`content-type` -> `Content-Type`)
    pub fn component(mut self, identifier: &str) -> Self {
        let identifier = if is_derived(identifier) {
            identifier.to_string()
        } else {
            canonical_header_name(identifier)
        };

        if !self.config.components.contains(&identifier) {
            self.config.components.push(identifier);
        }

        self
    }

    fn derived(self, component: &DerivedComponent) -> Result<Self> {
        Ok(self.component(&component.identifier()?))
    }

    /// Cover `@method`
    pub fn method(self) -> Self {
        self.component("@method")
    }

    /// Cover `@target-uri`
    pub fn target_uri(self) -> Self {
        self.component("@target-uri")
    }

    /// Cover `@authority`
    pub fn authority(self) -> Self {
        self.component("@authority")
    }

    /// Cover `@scheme`
    pub fn scheme(self) -> Self {
        self.component("@scheme")
    }

    /// Cover `@request-target`
    pub fn request_target(self) -> Self {
        self.component("@request-target")
    }

    /// Cover `@path`
    pub fn path(self) -> Self {
        self.component("@path")
    }

    /// Cover `@query`
    pub fn query(self) -> Self {
        self.component("@query")
    }

    /// Cover a single query parameter (`@query-param;name="..."`)
    ///
    /// Fails if the name can't be represented as a structured field string
    pub fn query_param(self, name: &str) -> Result<Self> {
        self.derived(&DerivedComponent::QueryParam(name.to_string()))
    }

    /// Cover `@status` (responses only)
    pub fn status(self) -> Self {
        self.component("@status")
    }

    /// Cover a header
    pub fn header(self, name: &str) -> Self {
        self.component(name)
    }

    /// Cover multiple headers
    pub fn headers<'a, I>(self, names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        names.into_iter().fold(self, Self::header)
    }

    /// Cover the `Content-Length` and `Content-Digest` headers
    ///
    /// The digest itself has to be computed by the caller
    pub fn sign_body(self) -> Self {
        self.headers([CONTENT_LENGTH.as_str(), crate::CONTENT_DIGEST.as_str()])
    }

    /// Add a parameter, replacing an earlier parameter of the same name
    pub fn parameter(mut self, param: SignatureParameter) -> Self {
        let parameters = &mut self.config.parameters;
        if let Some(existing) = parameters
            .iter_mut()
            .find(|existing| existing.name() == param.name())
        {
            *existing = param;
        } else {
            parameters.push(param);
        }

        self
    }

    /// Add `created`, set to the moment of signing
    pub fn created(self) -> Self {
        self.parameter(SignatureParameter::Created {
            time: None,
            tolerance: Duration::ZERO,
        })
    }

    /// Add `created` with a fixed timestamp
    pub fn created_at(self, time: SystemTime) -> Self {
        self.parameter(SignatureParameter::Created {
            time: Some(time),
            tolerance: Duration::ZERO,
        })
    }

    /// Add `expires` with a fixed timestamp
    pub fn expires_at(self, time: SystemTime) -> Self {
        self.parameter(SignatureParameter::Expires {
            expiry: Expiry::At(time),
            tolerance: Duration::ZERO,
        })
    }

    /// Add `expires`, set relative to the moment of signing
    pub fn expires_in(self, duration: Duration) -> Self {
        self.parameter(SignatureParameter::Expires {
            expiry: Expiry::After(duration),
            tolerance: Duration::ZERO,
        })
    }

    /// Add a random `nonce`, freshly generated for every signature
    pub fn nonce(self) -> Self {
        self.parameter(SignatureParameter::Nonce(String::new()))
    }

    /// Add a caller-provided `nonce`
    pub fn custom_nonce(self, nonce: impl Into<String>) -> Self {
        self.parameter(SignatureParameter::Nonce(nonce.into()))
    }

    /// Add `alg`, filled with the name of the signing algorithm
    pub fn alg(self) -> Self {
        self.parameter(SignatureParameter::Alg(String::new()))
    }

    /// Add `alg` with a caller-provided value
    pub fn custom_alg(self, alg: impl Into<String>) -> Self {
        self.parameter(SignatureParameter::Alg(alg.into()))
    }

    /// Add `keyid`
    pub fn key_id(self, key_id: impl Into<String>) -> Self {
        self.parameter(SignatureParameter::KeyId(key_id.into()))
    }

    /// Add `tag`
    pub fn tag(self, tag: impl Into<String>) -> Self {
        self.parameter(SignatureParameter::Tag(tag.into()))
    }

    /// Freeze the configuration
    pub fn build(self) -> SignatureConfig {
        self.config
    }
}

/// HTTP message signer
#[derive(Builder, Clone, Debug)]
#[builder(pattern = "owned", build_fn(validate = "Self::validate"))]
pub struct HttpSigner<K> {
    /// Key (and with it the algorithm) the signatures are created with
    key: K,

    /// Label of the signatures
    #[builder(setter(into))]
    label: String,

    /// Covered components and parameters
    #[builder(default)]
    config: SignatureConfig,
}

impl<K> HttpSignerBuilder<K> {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref label) = self.label {
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

impl<K> HttpSigner<K>
where
    K: SigningAlgorithm,
{
    /// Start building a signer
    #[must_use]
    pub fn builder() -> HttpSignerBuilder<K> {
        HttpSignerBuilder::default()
    }

    /// Label of the signatures
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Covered components and parameters
    #[must_use]
    pub fn config(&self) -> &SignatureConfig {
        &self.config
    }

    /// Build the signature base this signer would sign for the message
    ///
    /// Lazily computed parameters are resolved once, so the base and the `Signature-Input` entry agree
    pub fn signature_base<M>(&self, msg: &M) -> Result<SignatureBase>
    where
        M: HttpMessage + ?Sized,
    {
        let now = SystemTime::now();
        let parameters = self
            .config
            .parameters
            .iter()
            .map(|param| match param {
                SignatureParameter::Alg(alg) if alg.is_empty() => {
                    Ok(SignatureParameter::Alg(self.key.name().to_string()))
                }
                param => param.resolve_at(now),
            })
            .collect::<Result<Vec<_>>>()?;

        signature_base::build(msg, &self.config.components, &parameters)
    }

    /// Sign the message
    ///
    /// Appends one `Signature` and one `Signature-Input` line.
    /// On error the message is left untouched.
    #[instrument(skip_all, fields(label = %self.label))]
    pub fn sign<M>(&self, msg: &mut M) -> Result<()>
    where
        M: HttpMessage + ?Sized,
    {
        let base = self.signature_base(msg)?;
        let serialised = base.serialise()?;
        debug!(components = base.components().count(), "built signature base");

        let signature = self
            .key
            .sign(serialised.as_bytes())
            .map_err(Error::Signing)?;

        let signature_value = HeaderValue::try_from(SignatureHeader {
            label: &self.label,
            signature: &signature,
        })?;
        let input = SignatureInput::new(self.label.clone(), base.signature_params().clone())?;
        let input_value = HeaderValue::try_from(&input)?;

        let headers = msg.headers_mut();
        headers.append(SIGNATURE.clone(), signature_value);
        headers.append(SIGNATURE_INPUT.clone(), input_value);

        Ok(())
    }

    /// Sign an HTTP request
    pub fn sign_request<B>(&self, request: &mut Request<B>) -> Result<()> {
        self.sign(request)
    }
}

#[cfg(test)]
mod test {
    use super::SignatureConfig;
    use crate::parameters::SignatureParameter;

    #[test]
    fn components_are_canonicalised_and_deduplicated() {
        let config = SignatureConfig::builder()
            .method()
            .header("content-type")
            .sign_body()
            .header("CONTENT-LENGTH")
            .method()
            .query_param("pet")
            .unwrap()
            .build();

        assert_eq!(
            config.components(),
            [
                "@method",
                "Content-Type",
                "Content-Length",
                "Content-Digest",
                r#"@query-param;name="pet""#,
            ]
        );
    }

    #[test]
    fn parameters_are_replaced_in_place() {
        let config = SignatureConfig::builder()
            .key_id("first")
            .created()
            .alg()
            .key_id("second")
            .custom_alg("ecdsa-p384-sha384")
            .build();

        assert_eq!(
            config.parameters(),
            [
                SignatureParameter::KeyId("second".into()),
                SignatureParameter::Created {
                    time: None,
                    tolerance: std::time::Duration::ZERO,
                },
                SignatureParameter::Alg("ecdsa-p384-sha384".into()),
            ]
        );
    }

    #[test]
    fn verbatim_components() {
        let config = SignatureConfig::new(
            ["@method", "@method"],
            vec![
                SignatureParameter::Tag("a".into()),
                SignatureParameter::Tag("b".into()),
            ],
        );

        assert_eq!(config.components(), ["@method", "@method"]);
        assert_eq!(config.parameters(), [SignatureParameter::Tag("b".into())]);
    }
}
