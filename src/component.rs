//!
//! Resolution of message components into their signature base values
//!

use crate::{error::Error, message::HttpMessage, util, Result};
use http::{header::HOST, uri::Scheme, HeaderName};
use sfv::BareItem;
use tracing::debug;

const METHOD: &str = "@method";
const TARGET_URI: &str = "@target-uri";
const AUTHORITY: &str = "@authority";
const SCHEME: &str = "@scheme";
const REQUEST_TARGET: &str = "@request-target";
const PATH: &str = "@path";
const QUERY: &str = "@query";
const QUERY_PARAM: &str = "@query-param";
const STATUS: &str = "@status";
const SIGNATURE_PARAMS: &str = "@signature-params";

/// Component derived from message metadata instead of a header
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DerivedComponent {
    /// `@method`
    Method,

    /// `@target-uri`
    TargetUri,

    /// `@authority`
    Authority,

    /// `@scheme`
    Scheme,

    /// `@request-target`
    RequestTarget,

    /// `@path`
    Path,

    /// `@query`
    Query,

    /// `@query-param;name="..."`
    QueryParam(String),

    /// `@status`
    Status,

    /// `@signature-params`
    SignatureParams,
}

impl DerivedComponent {
    /// Parse a derived component identifier (including the leading `@`)
    pub fn parse(identifier: &str) -> Result<Self> {
        let component = match identifier {
            METHOD => Self::Method,
            TARGET_URI => Self::TargetUri,
            AUTHORITY => Self::Authority,
            SCHEME => Self::Scheme,
            REQUEST_TARGET => Self::RequestTarget,
            PATH => Self::Path,
            QUERY => Self::Query,
            STATUS => Self::Status,
            SIGNATURE_PARAMS => Self::SignatureParams,
            other => {
                let param = match other.strip_prefix(QUERY_PARAM) {
                    Some("") => "",
                    Some(rest) if rest.starts_with(';') => &rest[1..],
                    _ => return Err(Error::UnknownDerivedComponent(identifier.to_string())),
                };

                match util::parse_parameter(param) {
                    Ok((key, BareItem::String(name))) if key.as_str() == "name" => {
                        Self::QueryParam(name.as_str().to_string())
                    }
                    _ => return Err(Error::InvalidQueryParam(identifier.to_string())),
                }
            }
        };

        Ok(component)
    }

    /// Identifier of the component as it appears in the signature base
    pub fn identifier(&self) -> Result<String> {
        let identifier = match self {
            Self::Method => METHOD.into(),
            Self::TargetUri => TARGET_URI.into(),
            Self::Authority => AUTHORITY.into(),
            Self::Scheme => SCHEME.into(),
            Self::RequestTarget => REQUEST_TARGET.into(),
            Self::Path => PATH.into(),
            Self::Query => QUERY.into(),
            Self::QueryParam(name) => {
                let param = util::serialise_parameter("name", util::string(name)?)?;
                format!("{QUERY_PARAM};{param}")
            }
            Self::Status => STATUS.into(),
            Self::SignatureParams => SIGNATURE_PARAMS.into(),
        };

        Ok(identifier)
    }
}

/// Whether the identifier names a derived component
#[must_use]
pub fn is_derived(identifier: &str) -> bool {
    identifier.starts_with('@')
}

fn default_port(scheme: Option<&str>) -> Option<u16> {
    match scheme {
        Some(scheme) if scheme == Scheme::HTTP.as_str() => Some(80),
        Some(scheme) if scheme == Scheme::HTTPS.as_str() => Some(443),
        _ => None,
    }
}

fn authority<M>(msg: &M) -> Result<String>
where
    M: HttpMessage + ?Sized,
{
    let uri = msg.uri();
    let raw = match uri.authority() {
        Some(authority) => authority.as_str().to_string(),
        None => msg
            .headers()
            .get(HOST)
            .ok_or(Error::MissingUriComponent("authority"))?
            .to_str()?
            .trim()
            .to_string(),
    };

    let raw = raw.rsplit_once('@').map_or(raw.as_str(), |(_userinfo, host)| host);
    let authority = match raw.rsplit_once(':') {
        Some((host, port)) => {
            let is_default = port
                .parse::<u16>()
                .ok()
                .is_some_and(|port| Some(port) == default_port(uri.scheme_str()));

            if is_default {
                host
            } else {
                raw
            }
        }
        _ => raw,
    };

    Ok(authority.to_ascii_lowercase())
}

fn query_param<M>(name: &str, msg: &M) -> Result<String>
where
    M: HttpMessage + ?Sized,
{
    let query = msg.uri().query().unwrap_or_default();
    let mut values = form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _value)| key == name)
        .map(|(_key, value)| value);

    let value = values
        .next()
        .ok_or_else(|| Error::QueryParamNotFound(name.to_string()))?;

    if values.next().is_some() {
        return Err(Error::MultipleQueryParamValues(name.to_string()));
    }

    if value.contains(['\r', '\n']) {
        return Err(Error::MultilineQueryParamValue(name.to_string()));
    }

    Ok(value.into_owned())
}

fn resolve_derived<M>(component: &DerivedComponent, msg: &M) -> Result<String>
where
    M: HttpMessage + ?Sized,
{
    let uri = msg.uri();
    let value = match component {
        DerivedComponent::Method => msg.method().as_str().to_string(),
        DerivedComponent::TargetUri => {
            if uri.scheme().is_none() {
                return Err(Error::MissingUriComponent("scheme"));
            }

            uri.to_string()
        }
        DerivedComponent::Authority => authority(msg)?,
        DerivedComponent::Scheme => uri
            .scheme_str()
            .ok_or(Error::MissingUriComponent("scheme"))?
            .to_ascii_lowercase(),
        DerivedComponent::RequestTarget => {
            let target = uri
                .path_and_query()
                .map_or_else(|| uri.path(), |path_and_query| path_and_query.as_str());

            format!("{} {target}", msg.method())
        }
        DerivedComponent::Path => {
            let path = uri.path();
            if path.is_empty() {
                "/".into()
            } else {
                path.to_string()
            }
        }
        DerivedComponent::Query => uri.query().unwrap_or_default().to_string(),
        DerivedComponent::QueryParam(name) => query_param(name, msg)?,
        DerivedComponent::Status => msg.status()?.as_u16().to_string(),
        DerivedComponent::SignatureParams => return Err(Error::SignatureParamsCovered),
    };

    Ok(value)
}

fn resolve_header<M>(name: &str, msg: &M) -> Result<Option<String>>
where
    M: HttpMessage + ?Sized,
{
    let name = HeaderName::from_bytes(name.as_bytes())?;
    let mut values = msg.headers().get_all(&name).iter().peekable();
    if values.peek().is_none() {
        return Ok(None);
    }

    let values = values
        .map(|value| value.to_str().map(str::trim))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(values.join(", ")))
}

/// Resolve the value of a component from the message
///
/// Derived components (prefixed with `@`) must be resolvable, otherwise an error is returned.
/// Headers absent from the message resolve to `None`.
/// Multiple lines of the same header are joined with `", "`.
pub fn resolve<M>(identifier: &str, msg: &M) -> Result<Option<String>>
where
    M: HttpMessage + ?Sized,
{
    if is_derived(identifier) {
        let component = DerivedComponent::parse(identifier)?;
        return resolve_derived(&component, msg).map(Some);
    }

    let value = resolve_header(identifier, msg)?;
    if value.is_none() {
        debug!(header = identifier, "header not present on message");
    }

    Ok(value)
}
