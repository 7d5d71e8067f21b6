//!
//! Signature parameters
//!
//! Metadata attached to the `@signature-params` line, like the creation timestamp or the key ID
//!

use crate::{
    error::Error,
    util::{self, UnixTimestampExt},
    Result,
};
use miette::Diagnostic;
use ring::rand::{SecureRandom, SystemRandom};
use sfv::BareItem;
use std::{
    str::FromStr,
    time::{Duration, SystemTime},
};
use thiserror::Error;

/// Amount of random bytes in a generated nonce
const NONCE_LENGTH: usize = 128;

const CREATED: &str = "created";
const EXPIRES: &str = "expires";
const NONCE: &str = "nonce";
const ALG: &str = "alg";
const KEY_ID: &str = "keyid";
const TAG: &str = "tag";

/// Point in time a signature expires at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiry {
    /// Fixed point in time
    At(SystemTime),

    /// Relative to the moment the signature is created
    After(Duration),
}

/// Violated signature parameter constraint
#[derive(Clone, Debug, Diagnostic, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// `created` lies in the future (beyond the tolerance)
    #[error("Signature is not yet valid (created={0})")]
    NotYetValid(i64),

    /// `expires` lies in the past (beyond the tolerance)
    #[error("Signature has expired (expires={0})")]
    Expired(i64),

    /// Parameter without a value
    #[error("Parameter \"{0}\" has no value")]
    EmptyValue(&'static str),
}

/// Signature parameter
///
/// Tolerances are only consulted during verification and never end up in the signature base
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignatureParameter {
    /// Creation time, `None` means "now" at signing time
    Created {
        /// Timestamp of creation
        time: Option<SystemTime>,

        /// Allowed clock skew into the future
        tolerance: Duration,
    },

    /// Expiration time
    Expires {
        /// Timestamp of expiration
        expiry: Expiry,

        /// Allowed clock skew into the past
        tolerance: Duration,
    },

    /// Anti-replay token, an empty nonce is replaced with a random one at signing time
    Nonce(String),

    /// Declared algorithm
    Alg(String),

    /// Key identifier
    KeyId(String),

    /// Application-specific tag
    Tag(String),
}

fn generate_nonce() -> Result<String> {
    let mut buf = [0; NONCE_LENGTH];
    SystemRandom::new().fill(&mut buf)?;

    Ok(base64_simd::STANDARD.encode_to_string(buf))
}

impl SignatureParameter {
    /// Name of the parameter
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => CREATED,
            Self::Expires { .. } => EXPIRES,
            Self::Nonce(..) => NONCE,
            Self::Alg(..) => ALG,
            Self::KeyId(..) => KEY_ID,
            Self::Tag(..) => TAG,
        }
    }

    /// Replace the tolerance of time-based parameters
    #[must_use]
    pub fn with_tolerance(self, tolerance: Duration) -> Self {
        match self {
            Self::Created { time, .. } => Self::Created { time, tolerance },
            Self::Expires { expiry, .. } => Self::Expires { expiry, tolerance },
            other => other,
        }
    }

    /// Fill in every lazily computed value, using `now` as the current time
    ///
    /// Resolving an already resolved parameter returns it unchanged
    pub fn resolve_at(&self, now: SystemTime) -> Result<Self> {
        let resolved = match self {
            Self::Created {
                time: None,
                tolerance,
            } => Self::Created {
                time: Some(now),
                tolerance: *tolerance,
            },
            Self::Expires {
                expiry: Expiry::After(duration),
                tolerance,
            } => Self::Expires {
                expiry: Expiry::At(now + *duration),
                tolerance: *tolerance,
            },
            Self::Nonce(nonce) if nonce.is_empty() => Self::Nonce(generate_nonce()?),
            other => other.clone(),
        };

        Ok(resolved)
    }

    /// Fill in every lazily computed value
    pub fn resolve(&self) -> Result<Self> {
        self.resolve_at(SystemTime::now())
    }

    /// Structured field value of the parameter
    ///
    /// Values computed at signing time have to be filled in with [`Self::resolve_at`] first
    pub fn value(&self) -> Result<BareItem> {
        match self {
            Self::Created {
                time: Some(time),
                ..
            }
            | Self::Expires {
                expiry: Expiry::At(time),
                ..
            } => util::integer(time.to_unix_timestamp()),
            Self::Created { time: None, .. }
            | Self::Expires {
                expiry: Expiry::After(..),
                ..
            } => Err(Error::UnresolvedParameter(self.name())),
            Self::Nonce(value) if value.is_empty() => Err(Error::UnresolvedParameter(NONCE)),
            Self::Nonce(value) | Self::Alg(value) | Self::KeyId(value) | Self::Tag(value) => {
                util::string(value)
            }
        }
    }

    /// Canonical `name=value` text of the parameter
    pub fn serialise(&self) -> Result<String> {
        util::serialise_parameter(self.name(), self.value()?)
    }

    /// Validate the parameter against the given point in time
    pub fn validate_at(&self, now: SystemTime) -> Result<(), ValidationError> {
        match self {
            Self::Created {
                time: Some(created),
                tolerance,
            } => {
                if *created > now + *tolerance {
                    return Err(ValidationError::NotYetValid(created.to_unix_timestamp()));
                }
            }
            Self::Expires {
                expiry: Expiry::At(expires),
                tolerance,
            } => {
                if now > *expires + *tolerance {
                    return Err(ValidationError::Expired(expires.to_unix_timestamp()));
                }
            }
            Self::Created { time: None, .. }
            | Self::Expires {
                expiry: Expiry::After(..),
                ..
            } => {}
            Self::Nonce(value) | Self::Alg(value) | Self::KeyId(value) | Self::Tag(value) => {
                if value.is_empty() {
                    return Err(ValidationError::EmptyValue(self.name()));
                }
            }
        }

        Ok(())
    }

    /// Validate the parameter against the current time
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_at(SystemTime::now())
    }

    /// Construct a parameter from its structured field representation
    ///
    /// Tolerances are initialised to zero
    pub fn from_sfv(name: &str, value: &BareItem) -> Result<Self> {
        let invalid = || Error::InvalidParameter(name.to_string());
        let string = || {
            value
                .as_string()
                .map(|string| string.as_str().to_string())
                .ok_or_else(invalid)
        };
        let timestamp = || {
            value
                .as_integer()
                .map(|integer| SystemTime::from_unix_timestamp(integer.into()))
                .ok_or_else(invalid)
        };

        let param = match name {
            CREATED => Self::Created {
                time: Some(timestamp()?),
                tolerance: Duration::ZERO,
            },
            EXPIRES => Self::Expires {
                expiry: Expiry::At(timestamp()?),
                tolerance: Duration::ZERO,
            },
            NONCE => Self::Nonce(string()?),
            ALG => Self::Alg(string()?),
            KEY_ID => Self::KeyId(string()?),
            TAG => Self::Tag(string()?),
            other => return Err(Error::UnsupportedParameter(other.to_string())),
        };

        Ok(param)
    }
}

impl FromStr for SignatureParameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, value) = util::parse_parameter(s)?;
        Self::from_sfv(name.as_str(), &value)
    }
}
