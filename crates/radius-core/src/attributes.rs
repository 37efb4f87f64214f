//! Typed attribute carrier.
//!
//! A [`RadiusAttribute`] is an id, its dictionary name, and the value bytes
//! already in wire form for the declared data type. Construction always goes
//! through a [`Dictionary`] lookup so an attribute the peer cannot name
//! never enters a packet. Re-interpreting the bytes happens at the use site
//! through the dictionary-declared [`AttributeKind`].
//!
//! Wire form per RFC 2865 Section 5:
//!
//! ```text
//!  0                   1                   2
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     Type      |    Length     |  Value ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Length counts the two header bytes, so a value is at most 253 bytes. The
//! core does not fragment oversized values; callers needing RFC 2865 §5
//! "concat" semantics must split across attribute instances themselves.

use crate::dictionary::{AttributeKind, Dictionary};
use crate::error::RadiusError;
use crate::scalar;

/// Longest value that still fits the one-byte length field.
pub const MAX_VALUE_LENGTH: usize = 253;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadiusAttribute {
    id: u8,
    name: String,
    value: Vec<u8>,
}

impl RadiusAttribute {
    /// Create an attribute from its dictionary name.
    pub fn create_by_name(
        dictionary: &Dictionary,
        name: &str,
        value: Vec<u8>,
    ) -> Result<RadiusAttribute, RadiusError> {
        let entry = dictionary
            .attribute_by_name(name)
            .ok_or_else(|| RadiusError::UnknownAttribute(name.to_string()))?;
        Self::checked(entry.code(), entry.name().to_string(), value)
    }

    /// Create an attribute from its numeric code.
    pub fn create_by_code(
        dictionary: &Dictionary,
        code: u8,
        value: Vec<u8>,
    ) -> Result<RadiusAttribute, RadiusError> {
        let entry = dictionary
            .attribute_by_code(code)
            .ok_or_else(|| RadiusError::UnknownAttribute(format!("attribute code {code}")))?;
        Self::checked(code, entry.name().to_string(), value)
    }

    fn checked(id: u8, name: String, value: Vec<u8>) -> Result<RadiusAttribute, RadiusError> {
        if value.len() > MAX_VALUE_LENGTH {
            return Err(RadiusError::MalformedInput(format!(
                "attribute value of {} bytes exceeds the {MAX_VALUE_LENGTH} byte wire limit",
                value.len()
            )));
        }
        Ok(RadiusAttribute { id, name, value })
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Replace the value bytes in place.
    ///
    /// Used when a field can only be filled after the packet is otherwise
    /// complete, such as writing back a computed Message-Authenticator.
    pub fn override_value(&mut self, value: Vec<u8>) {
        self.value = value;
    }

    /// Check the value bytes against a declared data type.
    ///
    /// Text must be valid UTF-8, octets must be non-empty, the fixed-width
    /// types must have exactly their wire width, and address types must
    /// survive the scalar decoder. `ipv4prefix` and `ifid` values carry no
    /// structure this check could pin down, so they never verify.
    pub fn verify(&self, kind: AttributeKind) -> bool {
        match kind {
            AttributeKind::Text => std::str::from_utf8(&self.value).is_ok(),
            AttributeKind::Octets => !self.value.is_empty(),
            AttributeKind::Integer => scalar::bytes_to_integer(&self.value).is_ok(),
            AttributeKind::Integer64 => scalar::bytes_to_integer64(&self.value).is_ok(),
            AttributeKind::Time => scalar::bytes_to_timestamp(&self.value).is_ok(),
            AttributeKind::Ipv4Addr => scalar::bytes_to_ipv4_string(&self.value).is_ok(),
            AttributeKind::Ipv6Addr | AttributeKind::Ipv6Prefix => {
                scalar::bytes_to_ipv6_string(&self.value).is_ok()
            }
            AttributeKind::Ipv4Prefix | AttributeKind::InterfaceId => false,
        }
    }

    /// Re-expose the value through the string-valued scalar decoders.
    pub fn original_string_value(&self, kind: AttributeKind) -> Result<String, RadiusError> {
        match kind {
            AttributeKind::Text => String::from_utf8(self.value.clone()).map_err(|_| {
                RadiusError::MalformedInput("attribute value is not valid UTF-8".to_string())
            }),
            AttributeKind::Ipv4Addr | AttributeKind::Ipv4Prefix => {
                scalar::bytes_to_ipv4_string(&self.value)
            }
            AttributeKind::Ipv6Addr | AttributeKind::Ipv6Prefix => {
                scalar::bytes_to_ipv6_string(&self.value)
            }
            _ => Err(RadiusError::MalformedInput(format!(
                "attribute type {kind:?} is not string-valued"
            ))),
        }
    }

    /// Re-expose the value through the integer-valued scalar decoders.
    pub fn original_integer_value(&self, kind: AttributeKind) -> Result<u64, RadiusError> {
        match kind {
            AttributeKind::Integer => scalar::bytes_to_integer(&self.value).map(u64::from),
            AttributeKind::Integer64 => scalar::bytes_to_integer64(&self.value),
            AttributeKind::Time => scalar::bytes_to_timestamp(&self.value).map(u64::from),
            _ => Err(RadiusError::MalformedInput(format!(
                "attribute type {kind:?} is not integer-valued"
            ))),
        }
    }

    /// Serialize to `type || length || value`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.value.len());
        bytes.push(self.id);
        bytes.push((2 + self.value.len()) as u8);
        bytes.extend_from_slice(&self.value);
        bytes
    }
}
