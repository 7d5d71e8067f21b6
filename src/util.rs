use crate::{error::Error, Result};
use sfv::{BareItem, Dictionary, InnerList, Item, Key, ListEntry, Parser, SerializeValue};
use std::time::{Duration, SystemTime};

/// Largest magnitude a structured field integer can hold
const INTEGER_MAX: i64 = 999_999_999_999_999;

pub trait UnixTimestampExt {
    fn from_unix_timestamp(timestamp: i64) -> Self;
    fn to_unix_timestamp(&self) -> i64;
}

impl UnixTimestampExt for SystemTime {
    fn from_unix_timestamp(timestamp: i64) -> Self {
        let duration = Duration::from_secs(timestamp.unsigned_abs());
        if timestamp.is_negative() {
            SystemTime::UNIX_EPOCH - duration
        } else {
            SystemTime::UNIX_EPOCH + duration
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn to_unix_timestamp(&self) -> i64 {
        match self.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(duration) => duration.as_secs() as i64,
            Err(err) => -(err.duration().as_secs() as i64),
        }
    }
}

/// Canonicalise a header name into its standard casing (`content-digest` -> `Content-Digest`)
pub fn canonical_header_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut upper = true;

    for ch in name.trim().chars() {
        if upper {
            canonical.push(ch.to_ascii_uppercase());
        } else {
            canonical.push(ch.to_ascii_lowercase());
        }
        upper = ch == '-';
    }

    canonical
}

/// Structured field key, fails for anything outside of `[a-z*][a-z0-9_.*-]*`
pub fn key(name: &str) -> Result<Key> {
    Key::from_string(name.to_string()).map_err(|_| Error::InvalidKey(name.to_string()))
}

/// Structured field integer
pub fn integer(value: i64) -> Result<BareItem> {
    if !(-INTEGER_MAX..=INTEGER_MAX).contains(&value) {
        return Err(Error::IntegerOutOfRange(value));
    }

    Ok(BareItem::Integer(sfv::Integer::constant(value)))
}

/// Structured field string, fails for anything outside of printable ASCII
pub fn string(value: &str) -> Result<BareItem> {
    let string = sfv::StringRef::from_str(value)
        .map_err(|_| Error::InvalidString(value.to_string()))?;

    Ok(BareItem::String(string.to_owned()))
}

pub fn serialise_dictionary(dictionary: &Dictionary) -> Result<String> {
    dictionary.serialize_value().map_err(|_| Error::EmptyField)
}

pub fn serialise_inner_list(inner_list: &InnerList) -> Result<String> {
    vec![ListEntry::InnerList(inner_list.clone())]
        .serialize_value()
        .map_err(|_| Error::EmptyField)
}

/// Serialise a single `key=value` parameter
pub fn serialise_parameter(name: &str, value: BareItem) -> Result<String> {
    let mut dictionary = Dictionary::new();
    dictionary.insert(key(name)?, ListEntry::Item(Item::new(value)));

    serialise_dictionary(&dictionary)
}

/// Parse a single `key=value` parameter
pub fn parse_parameter(input: &str) -> Result<(Key, BareItem)> {
    let invalid = || Error::InvalidParameter(input.to_string());
    let mut dictionary = Parser::new(input)
        .parse_dictionary()
        .map_err(|_| invalid())?;
    if dictionary.len() != 1 {
        return Err(invalid());
    }

    match dictionary.pop() {
        Some((name, ListEntry::Item(Item { bare_item, params }))) if params.is_empty() => {
            Ok((name, bare_item))
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod test {
    use super::{
        canonical_header_name, integer, key, parse_parameter, serialise_parameter, string,
        UnixTimestampExt,
    };
    use crate::Error;
    use std::time::SystemTime;

    #[test]
    fn canonicalises_header_names() {
        assert_eq!(canonical_header_name("content-digest"), "Content-Digest");
        assert_eq!(canonical_header_name("CONTENT-LENGTH"), "Content-Length");
        assert_eq!(canonical_header_name("x-custom-header"), "X-Custom-Header");
        assert_eq!(canonical_header_name("host"), "Host");
    }

    #[test]
    fn unix_timestamps() {
        let time = SystemTime::from_unix_timestamp(1_618_884_475);
        assert_eq!(time.to_unix_timestamp(), 1_618_884_475);

        let before_epoch = SystemTime::from_unix_timestamp(-60);
        assert_eq!(before_epoch.to_unix_timestamp(), -60);
    }

    #[test]
    fn structured_field_limits() {
        assert!(key("sig1").is_ok());
        assert!(matches!(key("Sig1"), Err(Error::InvalidKey(..))));
        assert!(matches!(key("sig 1"), Err(Error::InvalidKey(..))));

        assert!(integer(999_999_999_999_999).is_ok());
        assert!(matches!(
            integer(1_000_000_000_000_000),
            Err(Error::IntegerOutOfRange(..))
        ));

        assert!(string("printable \"ascii\"").is_ok());
        assert!(matches!(string("clé"), Err(Error::InvalidString(..))));
        assert!(matches!(string("line\nbreak"), Err(Error::InvalidString(..))));
    }

    #[test]
    fn single_parameters() {
        let (name, value) = parse_parameter(r#"keyid="test-key""#).unwrap();
        assert_eq!(name.as_str(), "keyid");
        assert_eq!(
            serialise_parameter(name.as_str(), value).unwrap(),
            r#"keyid="test-key""#
        );

        assert!(matches!(
            parse_parameter("created=1, keyid=\"a\""),
            Err(Error::InvalidParameter(..))
        ));
        assert!(matches!(
            parse_parameter("name=(\"a\")"),
            Err(Error::InvalidParameter(..))
        ));
        assert!(matches!(
            parse_parameter("created=1;extra"),
            Err(Error::InvalidParameter(..))
        ));
    }
}
