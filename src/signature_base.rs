//!
//! Construction of the signature base
//!

use crate::{
    component, error::Error, message::HttpMessage, parameters::SignatureParameter, util, Result,
};
use sfv::{BareItem, InnerList, Item, Parameters};
use std::{collections::HashSet, time::SystemTime};

const SIGNATURE_PARAMS: &str = "@signature-params";

/// Canonical representation of the covered components and parameters of a signature
///
/// Constructed fresh for every sign and verify operation
#[derive(Clone, Debug, PartialEq)]
pub struct SignatureBase {
    lines: Vec<(String, String)>,
    signature_params: InnerList,
}

impl SignatureBase {
    /// Identifiers of the covered components, in signing order
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|(identifier, _value)| identifier.as_str())
    }

    /// Value of a covered component
    #[must_use]
    pub fn value(&self, identifier: &str) -> Option<&str> {
        self.lines
            .iter()
            .find(|(name, _value)| name == identifier)
            .map(|(_name, value)| value.as_str())
    }

    /// Value of the `@signature-params` line, usable as a `Signature-Input` entry
    #[must_use]
    pub fn signature_params(&self) -> &InnerList {
        &self.signature_params
    }

    /// Serialise into the exact string that gets signed
    pub fn serialise(&self) -> Result<String> {
        let mut base = String::new();
        for (identifier, value) in &self.lines {
            base.push_str(identifier);
            base.push_str(": ");
            base.push_str(value);
            base.push('\n');
        }

        base.push_str(SIGNATURE_PARAMS);
        base.push_str(": ");
        base.push_str(&util::serialise_inner_list(&self.signature_params)?);

        Ok(base)
    }
}

/// Build the signature base of a message
///
/// - Components are resolved in the given order
/// - Derived components have to be resolvable, absent headers are skipped
/// - Parameters still lacking a value are resolved against the current time
/// - Parameters with an empty value are left out
pub fn build<M, I, S>(
    msg: &M,
    components: I,
    parameters: &[SignatureParameter],
) -> Result<SignatureBase>
where
    M: HttpMessage + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut lines = Vec::new();
    let mut signature_params = InnerList::with_params(Vec::new(), Parameters::new());

    for identifier in components {
        let identifier = identifier.as_ref();
        if !seen.insert(identifier.to_string()) {
            return Err(Error::DuplicateComponent(identifier.to_string()));
        }

        let Some(value) = component::resolve(identifier, msg)? else {
            continue;
        };

        signature_params
            .items
            .push(Item::new(util::string(identifier)?));
        lines.push((identifier.to_string(), value));
    }

    let now = SystemTime::now();
    for param in parameters {
        let value = param.resolve_at(now)?.value()?;
        if matches!(value, BareItem::String(ref string) if string.as_str().is_empty()) {
            continue;
        }

        signature_params.params.insert(util::key(param.name())?, value);
    }

    Ok(SignatureBase {
        lines,
        signature_params,
    })
}
