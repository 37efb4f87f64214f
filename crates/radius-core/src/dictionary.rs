//! RADIUS dictionary model and loader.
//!
//! Dictionaries are line-oriented text files shared between RADIUS peers so
//! both sides agree on attribute codes and value encodings:
//!
//! ```text
//! ATTRIBUTE   User-Name        1   text
//! ATTRIBUTE   NAS-IP-Address   4   ipaddr
//! VALUE       Framed-Protocol  PPP 1
//! VENDOR      Somevendor       10
//! BEGIN-VENDOR Somevendor
//! ATTRIBUTE   Somevendor-Name  1   text
//! END-VENDOR
//! ```
//!
//! A [`Dictionary`] is parsed once, then shared read-only; every later
//! encode/decode decision in the crate consults it. Lookups are linear
//! scans, which is fine at the few hundred entries real dictionaries have.

use crate::error::RadiusError;
use std::fs;
use std::path::Path;
use tracing::warn;

const COMMENT_PREFIX: char = '#';

/// Data types an `ATTRIBUTE` line may declare, per RFC 2865 and RFC 8044.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// UTF-8 text (RFC 8044 `text`).
    Text,
    /// Opaque byte sequence (RFC 8044 `string`, FreeRADIUS `octets`).
    Octets,
    /// Unsigned 32-bit integer.
    Integer,
    /// Unsigned 64-bit integer.
    Integer64,
    /// Unsigned 32-bit seconds since the Unix epoch (RFC 8044 `time`).
    Time,
    /// 4 address bytes.
    Ipv4Addr,
    /// Reserved byte, prefix-length byte, 4 address bytes.
    Ipv4Prefix,
    /// 16 address bytes.
    Ipv6Addr,
    /// Reserved byte, prefix-length byte, 16 address bytes.
    Ipv6Prefix,
    /// 8 opaque bytes (RFC 8044 `ifid`).
    InterfaceId,
}

impl AttributeKind {
    /// Map a dictionary type token to its kind. `ipaddr` is the legacy
    /// spelling of `ipv4addr` and both are accepted.
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "text" => Some(AttributeKind::Text),
            "string" => Some(AttributeKind::Octets),
            "integer" => Some(AttributeKind::Integer),
            "integer64" => Some(AttributeKind::Integer64),
            "time" => Some(AttributeKind::Time),
            "ipaddr" | "ipv4addr" => Some(AttributeKind::Ipv4Addr),
            "ipv4prefix" => Some(AttributeKind::Ipv4Prefix),
            "ipv6addr" => Some(AttributeKind::Ipv6Addr),
            "ipv6prefix" => Some(AttributeKind::Ipv6Prefix),
            "ifid" => Some(AttributeKind::InterfaceId),
            _ => None,
        }
    }
}

/// An `ATTRIBUTE` entry: name, numeric code and declared data type, scoped
/// to the vendor namespace that was active when the line was read (empty
/// string for the base namespace).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryAttribute {
    name: String,
    vendor_name: String,
    code: u8,
    kind: AttributeKind,
}

impl DictionaryAttribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vendor_name(&self) -> &str {
        &self.vendor_name
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }
}

/// A `VALUE` entry: a named constant for an enumerated attribute, such as
/// `Framed-Protocol PPP 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryValue {
    attribute_name: String,
    name: String,
    vendor_name: String,
    value: String,
}

impl DictionaryValue {
    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vendor_name(&self) -> &str {
        &self.vendor_name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A `VENDOR` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryVendor {
    name: String,
    id: u8,
}

impl DictionaryVendor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u8 {
        self.id
    }
}

/// Parsed dictionary: attribute, value and vendor tables in file order.
///
/// Immutable once constructed. The first matching entry wins on every
/// lookup, mirroring how stock RADIUS daemons resolve duplicate lines.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dictionary {
    attributes: Vec<DictionaryAttribute>,
    values: Vec<DictionaryValue>,
    vendors: Vec<DictionaryVendor>,
}

impl Dictionary {
    /// Load a dictionary from a file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Dictionary, RadiusError> {
        let content = fs::read_to_string(path)?;
        Self::from_source(&content)
    }

    /// Parse a dictionary from in-memory text.
    ///
    /// Blank lines and lines starting with `#` are skipped, as is any line
    /// whose first token is not a recognized directive. An `ATTRIBUTE` line
    /// with an unsupported type token is dropped with a warning; a numeric
    /// field that does not parse as a decimal u8 aborts the whole load.
    pub fn from_source(content: &str) -> Result<Dictionary, RadiusError> {
        let mut dictionary = Dictionary::default();
        // Vendor namespace for subsequent ATTRIBUTE/VALUE lines; empty
        // outside BEGIN-VENDOR/END-VENDOR brackets.
        let mut active_vendor = String::new();

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens[0] {
                "ATTRIBUTE" => dictionary.parse_attribute(&tokens, &active_vendor, line_number)?,
                "VALUE" => dictionary.parse_value(&tokens, &active_vendor, line_number)?,
                "VENDOR" => dictionary.parse_vendor(&tokens, line_number)?,
                "BEGIN-VENDOR" => {
                    let name = tokens.get(1).ok_or_else(|| RadiusError::DictionaryParseError {
                        line: line_number,
                        reason: "BEGIN-VENDOR requires a vendor name".to_string(),
                    })?;
                    active_vendor = (*name).to_string();
                }
                "END-VENDOR" => active_vendor.clear(),
                _ => continue,
            }
        }

        Ok(dictionary)
    }

    /// All `ATTRIBUTE` entries in file order.
    pub fn attributes(&self) -> &[DictionaryAttribute] {
        &self.attributes
    }

    /// All `VALUE` entries in file order.
    pub fn values(&self) -> &[DictionaryValue] {
        &self.values
    }

    /// All `VENDOR` entries in file order.
    pub fn vendors(&self) -> &[DictionaryVendor] {
        &self.vendors
    }

    /// Look up an attribute by name.
    pub fn attribute_by_name(&self, name: &str) -> Option<&DictionaryAttribute> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    /// Look up an attribute by numeric code.
    pub fn attribute_by_code(&self, code: u8) -> Option<&DictionaryAttribute> {
        self.attributes.iter().find(|attribute| attribute.code == code)
    }

    /// Look up a named value by its attribute name and value name.
    pub fn value_by_attribute_and_name(
        &self,
        attribute_name: &str,
        value_name: &str,
    ) -> Option<&DictionaryValue> {
        self.values
            .iter()
            .find(|value| value.attribute_name == attribute_name && value.name == value_name)
    }

    fn parse_attribute(
        &mut self,
        tokens: &[&str],
        active_vendor: &str,
        line_number: usize,
    ) -> Result<(), RadiusError> {
        let [_, name, code, kind] = tokens else {
            return Err(RadiusError::DictionaryParseError {
                line: line_number,
                reason: format!("ATTRIBUTE requires name, code and type, got {} tokens", tokens.len()),
            });
        };

        let code = parse_decimal_u8(code, line_number)?;
        let Some(kind) = AttributeKind::from_token(kind) else {
            warn!(line = line_number, kind = *kind, "skipping ATTRIBUTE with unsupported type token");
            return Ok(());
        };

        self.attributes.push(DictionaryAttribute {
            name: (*name).to_string(),
            vendor_name: active_vendor.to_string(),
            code,
            kind,
        });
        Ok(())
    }

    fn parse_value(
        &mut self,
        tokens: &[&str],
        active_vendor: &str,
        line_number: usize,
    ) -> Result<(), RadiusError> {
        let [_, attribute_name, name, value] = tokens else {
            return Err(RadiusError::DictionaryParseError {
                line: line_number,
                reason: format!(
                    "VALUE requires attribute name, value name and literal, got {} tokens",
                    tokens.len()
                ),
            });
        };

        self.values.push(DictionaryValue {
            attribute_name: (*attribute_name).to_string(),
            name: (*name).to_string(),
            vendor_name: active_vendor.to_string(),
            value: (*value).to_string(),
        });
        Ok(())
    }

    fn parse_vendor(&mut self, tokens: &[&str], line_number: usize) -> Result<(), RadiusError> {
        let [_, name, id] = tokens else {
            return Err(RadiusError::DictionaryParseError {
                line: line_number,
                reason: format!("VENDOR requires name and id, got {} tokens", tokens.len()),
            });
        };

        let id = parse_decimal_u8(id, line_number)?;
        self.vendors.push(DictionaryVendor {
            name: (*name).to_string(),
            id,
        });
        Ok(())
    }
}

fn parse_decimal_u8(token: &str, line_number: usize) -> Result<u8, RadiusError> {
    token.parse::<u8>().map_err(|_| RadiusError::DictionaryParseError {
        line: line_number,
        reason: format!("expected a decimal number in 0..=255, got {token:?}"),
    })
}
