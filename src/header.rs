//!
//! `Signature` and `Signature-Input` header handling
//!

use crate::{
    error::Error, parameters::SignatureParameter, util, Result, SIGNATURE, SIGNATURE_INPUT,
};
use http::{HeaderMap, HeaderName, HeaderValue};
use sfv::{BareItem, Dictionary, InnerList, Item, ListEntry, Parser};

/// Entry of the `Signature` header
pub struct SignatureHeader<'a> {
    /// Label of the signature
    pub label: &'a str,

    /// Raw signature bytes
    pub signature: &'a [u8],
}

impl TryFrom<SignatureHeader<'_>> for HeaderValue {
    type Error = Error;

    fn try_from(value: SignatureHeader<'_>) -> Result<Self, Self::Error> {
        let mut dictionary = Dictionary::new();
        dictionary.insert(
            util::key(value.label).map_err(|_| Error::InvalidLabel(value.label.to_string()))?,
            ListEntry::Item(Item::new(BareItem::ByteSequence(value.signature.to_vec()))),
        );

        let serialised = util::serialise_dictionary(&dictionary)?;
        HeaderValue::from_str(&serialised).map_err(Error::from)
    }
}

/// Entry of the `Signature-Input` header
#[derive(Clone, Debug, PartialEq)]
pub struct SignatureInput {
    /// Label of the signature
    pub label: String,

    /// Covered components, in signing order
    pub components: Vec<String>,

    /// Signature parameters, in signing order
    pub parameters: Vec<SignatureParameter>,

    signature_params: InnerList,
}

impl SignatureInput {
    /// Interpret the inner list of a `Signature-Input` member
    pub fn new(label: impl Into<String>, signature_params: InnerList) -> Result<Self> {
        let components = signature_params
            .items
            .iter()
            .map(|item| {
                item.bare_item
                    .as_string()
                    .map(|identifier| identifier.as_str().to_string())
                    .ok_or(Error::InvalidSignatureHeader)
            })
            .collect::<Result<Vec<_>>>()?;

        let parameters = signature_params
            .params
            .iter()
            .map(|(name, value)| SignatureParameter::from_sfv(name.as_str(), value))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            label: label.into(),
            components,
            parameters,
            signature_params,
        })
    }

    fn string_param(&self, name: &str) -> Option<&str> {
        self.signature_params
            .params
            .get(name)
            .and_then(BareItem::as_string)
            .map(|value| value.as_str())
    }

    /// Declared algorithm
    #[must_use]
    pub fn alg(&self) -> Option<&str> {
        self.string_param("alg")
    }

    /// Key identifier
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.string_param("keyid")
    }

    /// Nonce
    #[must_use]
    pub fn nonce(&self) -> Option<&str> {
        self.string_param("nonce")
    }

    /// Application-specific tag
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.string_param("tag")
    }

    /// Raw value of the entry, as it was signed
    #[must_use]
    pub fn signature_params(&self) -> &InnerList {
        &self.signature_params
    }
}

impl TryFrom<&SignatureInput> for HeaderValue {
    type Error = Error;

    fn try_from(value: &SignatureInput) -> Result<Self, Self::Error> {
        let mut dictionary = Dictionary::new();
        dictionary.insert(
            util::key(&value.label).map_err(|_| Error::InvalidLabel(value.label.clone()))?,
            ListEntry::InnerList(value.signature_params.clone()),
        );

        let serialised = util::serialise_dictionary(&dictionary)?;
        HeaderValue::from_str(&serialised).map_err(Error::from)
    }
}

/// Parse every line of a dictionary header and merge them into one
///
/// Later duplicates overwrite earlier members in place
fn merged_dictionary(headers: &HeaderMap, name: &HeaderName) -> Result<Dictionary> {
    let mut merged = Dictionary::new();
    for value in headers.get_all(name) {
        merged.extend(Parser::new(value.to_str()?).parse_dictionary()?);
    }

    Ok(merged)
}

/// Labels of all the signatures attached to the message, in header order
pub fn labels(headers: &HeaderMap) -> Result<Vec<String>> {
    Ok(merged_dictionary(headers, &SIGNATURE)?
        .into_keys()
        .map(|label| label.as_str().to_string())
        .collect())
}

/// Raw signature bytes for the label
pub fn signature_for(headers: &HeaderMap, label: &str) -> Result<Vec<u8>> {
    let mut signatures = merged_dictionary(headers, &SIGNATURE)?;
    match signatures.shift_remove(label) {
        Some(ListEntry::Item(Item {
            bare_item: BareItem::ByteSequence(signature),
            ..
        })) => Ok(signature),
        Some(..) => Err(Error::InvalidSignatureHeader),
        None => Err(Error::SignatureNotFound(label.to_string())),
    }
}

/// Covered components and parameters of the signature with the label
pub fn signature_input_for(headers: &HeaderMap, label: &str) -> Result<SignatureInput> {
    let mut inputs = merged_dictionary(headers, &SIGNATURE_INPUT)?;
    match inputs.shift_remove(label) {
        Some(ListEntry::InnerList(signature_params)) => {
            SignatureInput::new(label, signature_params)
        }
        Some(ListEntry::Item(..)) => Err(Error::InvalidSignatureHeader),
        None => Err(Error::SignatureNotFound(label.to_string())),
    }
}
