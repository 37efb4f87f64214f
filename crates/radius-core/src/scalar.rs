//! Scalar value codec.
//!
//! Converts primitive RADIUS values (integers, timestamps, IPv4/IPv6
//! addresses and prefixes, interface ids) to and from the byte form carried
//! inside attributes. All integers are big-endian on the wire per RFC 2865
//! Section 5; prefix forms follow RFC 8044 (`00 pp` header in front of the
//! address bytes).
//!
//! These functions are pure and stateless. Decoders fail on any length that
//! does not match the declared type exactly.

use crate::error::RadiusError;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Encode a u32 attribute value (4 bytes, big-endian).
pub fn integer_to_bytes(value: u32) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Decode a u32 attribute value.
pub fn bytes_to_integer(bytes: &[u8]) -> Result<u32, RadiusError> {
    let array: [u8; 4] = bytes
        .try_into()
        .map_err(|_| RadiusError::MalformedInput(format!("expected 4 integer bytes, got {}", bytes.len())))?;
    Ok(u32::from_be_bytes(array))
}

/// Encode a u64 attribute value (8 bytes, big-endian).
pub fn integer64_to_bytes(value: u64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Decode a u64 attribute value.
pub fn bytes_to_integer64(bytes: &[u8]) -> Result<u64, RadiusError> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| RadiusError::MalformedInput(format!("expected 8 integer64 bytes, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(array))
}

/// Encode a timestamp attribute value.
///
/// RADIUS `time` is an unsigned 32-bit number of seconds since the Unix
/// epoch, so values past 2106 are not representable and rejected here.
pub fn timestamp_to_bytes(timestamp: u64) -> Result<Vec<u8>, RadiusError> {
    let seconds = u32::try_from(timestamp)
        .map_err(|_| RadiusError::MalformedInput(format!("timestamp {timestamp} does not fit into u32")))?;
    Ok(seconds.to_be_bytes().to_vec())
}

/// Decode a timestamp attribute value.
pub fn bytes_to_timestamp(bytes: &[u8]) -> Result<u32, RadiusError> {
    let array: [u8; 4] = bytes
        .try_into()
        .map_err(|_| RadiusError::MalformedInput(format!("expected 4 timestamp bytes, got {}", bytes.len())))?;
    Ok(u32::from_be_bytes(array))
}

/// Encode an IPv4 address or prefix from its string form.
///
/// `"a.b.c.d"` encodes to 4 bytes; `"a.b.c.d/p"` encodes to 6 bytes
/// (`00 pp` followed by the address). Prefix lengths above 32 are rejected.
pub fn ipv4_string_to_bytes(ipv4: &str) -> Result<Vec<u8>, RadiusError> {
    let (address, prefix) = match ipv4.split_once('/') {
        Some((address, prefix)) => (address, Some(parse_prefix_length(prefix)?)),
        None => (ipv4, None),
    };

    let parsed: Ipv4Addr = address
        .parse()
        .map_err(|_| RadiusError::MalformedInput(format!("invalid IPv4 address: {address:?}")))?;

    let mut bytes = Vec::with_capacity(6);
    if let Some(prefix) = prefix {
        if prefix > 32 {
            return Err(RadiusError::MalformedInput(format!(
                "IPv4 prefix length must be no greater than 32, got {prefix}"
            )));
        }
        bytes.push(0);
        bytes.push(prefix);
    }
    bytes.extend_from_slice(&parsed.octets());
    Ok(bytes)
}

/// Decode IPv4 bytes back into string form.
///
/// Accepts the 4-byte plain form and the 6-byte prefix form.
pub fn bytes_to_ipv4_string(bytes: &[u8]) -> Result<String, RadiusError> {
    match bytes.len() {
        4 => Ok(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]).to_string()),
        6 => {
            let prefix = u16::from_be_bytes([bytes[0], bytes[1]]);
            let address = Ipv4Addr::new(bytes[2], bytes[3], bytes[4], bytes[5]);
            Ok(format!("{address}/{prefix}"))
        }
        len => Err(RadiusError::MalformedInput(format!("malformed IPv4 bytes: length {len}"))),
    }
}

/// Encode an IPv6 address or prefix from its string form.
///
/// `"addr"` encodes to 16 bytes; `"addr/p"` encodes to 18 bytes
/// (`00 pp` followed by the address).
pub fn ipv6_string_to_bytes(ipv6: &str) -> Result<Vec<u8>, RadiusError> {
    let (address, prefix) = match ipv6.split_once('/') {
        Some((address, prefix)) => (address, Some(parse_prefix_length(prefix)?)),
        None => (ipv6, None),
    };

    let parsed: Ipv6Addr = address
        .parse()
        .map_err(|_| RadiusError::MalformedInput(format!("invalid IPv6 address: {address:?}")))?;

    let mut bytes = Vec::with_capacity(18);
    if let Some(prefix) = prefix {
        bytes.push(0);
        bytes.push(prefix);
    }
    bytes.extend_from_slice(&parsed.octets());
    Ok(bytes)
}

/// Decode IPv6 bytes back into string form.
///
/// The form is chosen by length alone: 16 bytes is a plain address, 18 bytes
/// is a prefix. Any other length is a decode failure.
pub fn bytes_to_ipv6_string(bytes: &[u8]) -> Result<String, RadiusError> {
    match bytes.len() {
        16 => Ok(ipv6_from_octets(bytes).to_string()),
        18 => Ok(format!("{}/{}", ipv6_from_octets(&bytes[2..]), bytes[1])),
        len => Err(RadiusError::MalformedInput(format!("malformed IPv6 bytes: length {len}"))),
    }
}

/// Encode an interface id (RFC 8044 `ifid`, 8 opaque bytes).
pub fn interface_id_to_bytes(interface_id: &[u8; 8]) -> Vec<u8> {
    interface_id.to_vec()
}

/// Decode an interface id, checking the length only.
pub fn bytes_to_interface_id(bytes: &[u8]) -> Result<[u8; 8], RadiusError> {
    bytes
        .try_into()
        .map_err(|_| RadiusError::MalformedInput(format!("expected 8 interface-id bytes, got {}", bytes.len())))
}

fn parse_prefix_length(prefix: &str) -> Result<u8, RadiusError> {
    prefix
        .parse::<u8>()
        .map_err(|_| RadiusError::MalformedInput(format!("invalid prefix length: {prefix:?}")))
}

fn ipv6_from_octets(bytes: &[u8]) -> Ipv6Addr {
    let mut octets = [0u8; 16];
    octets.copy_from_slice(&bytes[..16]);
    Ipv6Addr::from(octets)
}
