use crate::attributes::RadiusAttribute;
use crate::auth::generate_request_authenticator;
use crate::dictionary::Dictionary;
use crate::error::RadiusError;
use crate::message_auth::calculate_message_authenticator;
use crate::packet::TypeCode;
use rand::Rng;

/// Name of the HMAC-MD5 integrity attribute (id 80, RFC 3579).
pub const MESSAGE_AUTHENTICATOR: &str = "Message-Authenticator";

/// A RADIUS packet, per RFC 2865 Section 3:
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// |                         Authenticator                         |
/// |                                                               |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
///
/// Attributes keep their insertion order through every operation; the
/// Message-Authenticator digest covers the concrete byte sequence, so
/// reordering would change the packet's identity on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusPacket {
    id: u8,
    code: TypeCode,
    authenticator: Vec<u8>,
    attributes: Vec<RadiusAttribute>,
}

impl RadiusPacket {
    /// Header size: code, id, length and authenticator.
    pub const MIN_PACKET_SIZE: usize = 20;
    /// Largest datagram RFC 2865 permits.
    pub const MAX_PACKET_SIZE: usize = 4096;

    /// Create a packet with a random id and a random request authenticator.
    pub fn new(code: TypeCode) -> RadiusPacket {
        RadiusPacket {
            id: rand::rng().random::<u8>(),
            code,
            authenticator: generate_request_authenticator().to_vec(),
            attributes: Vec::new(),
        }
    }

    /// Parse a packet from raw bytes, resolving each attribute id through
    /// the dictionary.
    ///
    /// The declared length at `buf[2..4]` is deliberately not checked
    /// against the buffer: attributes are read until the buffer ends, which
    /// tolerates peers whose length field undercounts trailing data. This
    /// mirrors widely deployed parsers; see the crate tests for the pinned
    /// decision.
    pub fn from_bytes(dictionary: &Dictionary, bytes: &[u8]) -> Result<RadiusPacket, RadiusError> {
        if bytes.len() < Self::MIN_PACKET_SIZE {
            return Err(RadiusError::MalformedInput(format!(
                "packet of {} bytes is shorter than the {} byte header",
                bytes.len(),
                Self::MIN_PACKET_SIZE
            )));
        }

        let code =
            TypeCode::from_u8(bytes[0]).ok_or(RadiusError::InvalidTypeCode(bytes[0]))?;
        let id = bytes[1];
        let authenticator = bytes[4..20].to_vec();

        let mut attributes = Vec::new();
        let mut offset = Self::MIN_PACKET_SIZE;
        while offset != bytes.len() {
            if offset + 2 > bytes.len() {
                return Err(RadiusError::MalformedInput(
                    "attribute header truncated".to_string(),
                ));
            }

            let attribute_id = bytes[offset];
            let attribute_length = bytes[offset + 1] as usize;
            if attribute_length < 2 || offset + attribute_length > bytes.len() {
                return Err(RadiusError::MalformedInput(format!(
                    "attribute {attribute_id} declares invalid length {attribute_length}"
                )));
            }

            let value = bytes[offset + 2..offset + attribute_length].to_vec();
            attributes.push(RadiusAttribute::create_by_code(dictionary, attribute_id, value)?);
            offset += attribute_length;
        }

        Ok(RadiusPacket {
            id,
            code,
            authenticator,
            attributes,
        })
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn code(&self) -> TypeCode {
        self.code
    }

    pub fn authenticator(&self) -> &[u8] {
        &self.authenticator
    }

    pub fn attributes(&self) -> &[RadiusAttribute] {
        &self.attributes
    }

    /// Replace the whole attribute list, keeping the given order.
    pub fn set_attributes(&mut self, attributes: Vec<RadiusAttribute>) {
        self.attributes = attributes;
    }

    /// Append a single attribute.
    pub fn add_attribute(&mut self, attribute: RadiusAttribute) {
        self.attributes.push(attribute);
    }

    /// Replace the packet id, e.g. to echo a request id into its reply.
    pub fn override_id(&mut self, id: u8) {
        self.id = id;
    }

    /// Replace the authenticator.
    ///
    /// An empty value makes the next [`Self::to_bytes`] draw a fresh random
    /// authenticator; anything else must be the full 16 bytes by the time
    /// the packet is serialized.
    pub fn override_authenticator(&mut self, authenticator: Vec<u8>) {
        self.authenticator = authenticator;
    }

    /// First attribute with the given dictionary name.
    pub fn attribute_by_name(&self, name: &str) -> Option<&RadiusAttribute> {
        self.attributes.iter().find(|attribute| attribute.name() == name)
    }

    /// First attribute with the given id.
    pub fn attribute_by_id(&self, id: u8) -> Option<&RadiusAttribute> {
        self.attributes.iter().find(|attribute| attribute.id() == id)
    }

    /// Current Message-Authenticator value.
    pub fn message_authenticator(&self) -> Result<&[u8], RadiusError> {
        self.attribute_by_name(MESSAGE_AUTHENTICATOR)
            .map(RadiusAttribute::value)
            .ok_or_else(|| RadiusError::UnknownAttribute(MESSAGE_AUTHENTICATOR.to_string()))
    }

    /// Replace the Message-Authenticator value in place.
    ///
    /// Fails when the packet carries no such attribute; the caller is
    /// responsible for adding a zero-valued placeholder up front.
    pub fn override_message_authenticator(&mut self, value: Vec<u8>) -> Result<(), RadiusError> {
        let attribute = self
            .attributes
            .iter_mut()
            .find(|attribute| attribute.name() == MESSAGE_AUTHENTICATOR)
            .ok_or_else(|| RadiusError::UnknownAttribute(MESSAGE_AUTHENTICATOR.to_string()))?;

        attribute.override_value(value);
        Ok(())
    }

    /// Compute HMAC-MD5 over the whole packet and write it into the
    /// Message-Authenticator attribute.
    ///
    /// The attribute is zeroed first, so calling this twice is idempotent.
    pub fn generate_message_authenticator(&mut self, secret: &[u8]) -> Result<(), RadiusError> {
        self.override_message_authenticator(vec![0u8; 16])?;
        let digest = calculate_message_authenticator(&self.to_bytes()?, secret);
        self.override_message_authenticator(digest.to_vec())
    }

    /// Serialize into wire form.
    ///
    /// Draws a fresh random authenticator if none is set. The length field
    /// covers the whole packet.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, RadiusError> {
        if self.authenticator.is_empty() {
            self.authenticator = generate_request_authenticator().to_vec();
        }
        if self.authenticator.len() != 16 {
            return Err(RadiusError::MalformedInput(format!(
                "authenticator must be 16 bytes, got {}",
                self.authenticator.len()
            )));
        }

        let mut attribute_bytes = Vec::new();
        for attribute in &self.attributes {
            attribute_bytes.extend_from_slice(&attribute.to_bytes());
        }

        let length = Self::MIN_PACKET_SIZE + attribute_bytes.len();
        if length > Self::MAX_PACKET_SIZE {
            return Err(RadiusError::PacketTooLarge(length));
        }

        let mut bytes = Vec::with_capacity(length);
        bytes.push(self.code.as_u8());
        bytes.push(self.id);
        bytes.extend_from_slice(&(length as u16).to_be_bytes());
        bytes.extend_from_slice(&self.authenticator);
        bytes.extend_from_slice(&attribute_bytes);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{integer_to_bytes, ipv4_string_to_bytes};

    fn dictionary() -> Dictionary {
        Dictionary::from_source(
            "\
ATTRIBUTE User-Name              1  text
ATTRIBUTE User-Password          2  string
ATTRIBUTE NAS-IP-Address         4  ipaddr
ATTRIBUTE NAS-Port-Id            5  integer
ATTRIBUTE Service-Type           6  integer
ATTRIBUTE Framed-IP-Address      8  ipaddr
ATTRIBUTE Called-Station-Id      30 text
ATTRIBUTE Calling-Station-Id     31 text
ATTRIBUTE NAS-Identifier         32 text
ATTRIBUTE Message-Authenticator  80 string
",
        )
        .unwrap()
    }

    // Accounting-Request fixture: note the declared length (83) undercounts
    // the 86 byte buffer, which the lenient parser accepts by design.
    const ACCT_REQUEST: [u8; 86] = [
        4, 43, 0, 83, 215, 189, 213, 172, 57, 94, 141, 70, 134, 121, 101, 57, 187, 220, 227, 73,
        4, 6, 192, 168, 1, 10, 5, 6, 0, 0, 0, 0, 32, 10, 116, 114, 105, 108, 108, 105, 97, 110,
        30, 19, 48, 48, 45, 48, 52, 45, 53, 70, 45, 48, 48, 45, 48, 70, 45, 68, 49, 31, 19, 48,
        48, 45, 48, 49, 45, 50, 52, 45, 56, 48, 45, 66, 51, 45, 57, 67, 8, 6, 10, 0, 0, 100,
    ];

    #[test]
    fn test_from_bytes() {
        let dictionary = dictionary();
        let packet = RadiusPacket::from_bytes(&dictionary, &ACCT_REQUEST).unwrap();

        assert_eq!(packet.code(), TypeCode::AccountingRequest);
        assert_eq!(packet.id(), 43);
        assert_eq!(packet.authenticator(), &ACCT_REQUEST[4..20]);

        let names: Vec<&str> = packet.attributes().iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec![
                "NAS-IP-Address",
                "NAS-Port-Id",
                "NAS-Identifier",
                "Called-Station-Id",
                "Calling-Station-Id",
                "Framed-IP-Address",
            ]
        );

        assert_eq!(
            packet.attribute_by_name("NAS-IP-Address").unwrap().value(),
            &ipv4_string_to_bytes("192.168.1.10").unwrap()[..]
        );
        assert_eq!(packet.attribute_by_name("NAS-Port-Id").unwrap().value(), &integer_to_bytes(0)[..]);
        assert_eq!(packet.attribute_by_name("NAS-Identifier").unwrap().value(), b"trillian");
        assert_eq!(
            packet.attribute_by_id(8).unwrap().value(),
            &ipv4_string_to_bytes("10.0.0.100").unwrap()[..]
        );
    }

    #[test]
    fn test_length_field_not_enforced() {
        // Pinned decision: buf[2..4] says 83, the buffer holds 86, and the
        // parser walks the real buffer rather than the declared length.
        let declared = u16::from_be_bytes([ACCT_REQUEST[2], ACCT_REQUEST[3]]);
        assert_eq!(declared, 83);
        assert_ne!(declared as usize, ACCT_REQUEST.len());
        assert!(RadiusPacket::from_bytes(&dictionary(), &ACCT_REQUEST).is_ok());
    }

    #[test]
    fn test_to_bytes() {
        let dictionary = dictionary();
        let expected = vec![
            1, 50, 0, 29, 0, 25, 100, 56, 13, 0, 67, 34, 39, 12, 88, 153, 0, 1, 2, 3, 1, 9, 116,
            101, 115, 116, 105, 110, 103,
        ];

        let mut packet = RadiusPacket::new(TypeCode::AccessRequest);
        packet.set_attributes(vec![
            RadiusAttribute::create_by_name(&dictionary, "User-Name", b"testing".to_vec()).unwrap(),
        ]);
        packet.override_id(50);
        packet.override_authenticator(vec![0, 25, 100, 56, 13, 0, 67, 34, 39, 12, 88, 153, 0, 1, 2, 3]);

        assert_eq!(packet.to_bytes().unwrap(), expected);
    }

    #[test]
    fn test_round_trip() {
        let dictionary = dictionary();

        let mut packet = RadiusPacket::new(TypeCode::CoARequest);
        packet.set_attributes(vec![
            RadiusAttribute::create_by_name(&dictionary, "User-Name", b"zaphod".to_vec()).unwrap(),
            RadiusAttribute::create_by_name(&dictionary, "NAS-Port-Id", integer_to_bytes(7)).unwrap(),
        ]);

        let bytes = packet.to_bytes().unwrap();
        let reparsed = RadiusPacket::from_bytes(&dictionary, &bytes).unwrap();
        assert_eq!(reparsed, packet);
    }

    #[test]
    fn test_fresh_authenticator_generated_when_empty() {
        let mut packet = RadiusPacket::new(TypeCode::AccessRequest);
        packet.override_authenticator(Vec::new());

        let bytes = packet.to_bytes().unwrap();
        assert_eq!(packet.authenticator().len(), 16);
        assert_eq!(&bytes[4..20], packet.authenticator());
    }

    #[test]
    fn test_non_16_byte_authenticator_rejected() {
        let mut packet = RadiusPacket::new(TypeCode::AccessRequest);
        packet.override_authenticator(vec![0, 25, 100, 56, 13]);
        assert!(packet.to_bytes().is_err());
    }

    #[test]
    fn test_short_buffer() {
        let result = RadiusPacket::from_bytes(&dictionary(), &[0u8; 19]);
        assert!(matches!(result, Err(RadiusError::MalformedInput(_))));
    }

    #[test]
    fn test_invalid_type_code() {
        let mut bytes = ACCT_REQUEST;
        bytes[0] = 99;
        let result = RadiusPacket::from_bytes(&dictionary(), &bytes);
        assert!(matches!(result, Err(RadiusError::InvalidTypeCode(99))));
    }

    #[test]
    fn test_unknown_attribute_id() {
        let mut bytes = ACCT_REQUEST.to_vec();
        bytes.extend_from_slice(&[211, 3, 1]); // id 211 is not in the dictionary
        let result = RadiusPacket::from_bytes(&dictionary(), &bytes);
        assert!(matches!(result, Err(RadiusError::UnknownAttribute(_))));
    }

    #[test]
    fn test_attribute_overrunning_buffer() {
        let mut bytes = ACCT_REQUEST.to_vec();
        bytes.extend_from_slice(&[1, 30, 97]); // claims 30 bytes, carries 1
        assert!(RadiusPacket::from_bytes(&dictionary(), &bytes).is_err());

        let mut bytes = ACCT_REQUEST.to_vec();
        bytes.extend_from_slice(&[1, 1]); // length below the 2 byte header
        assert!(RadiusPacket::from_bytes(&dictionary(), &bytes).is_err());
    }

    #[test]
    fn test_override_message_authenticator() {
        let dictionary = dictionary();
        let replacement = vec![1, 50, 0, 20, 0, 25, 100, 56, 13, 0, 67, 34, 39, 12, 88, 153];

        let mut packet = RadiusPacket::new(TypeCode::AccessRequest);
        packet.set_attributes(vec![
            RadiusAttribute::create_by_name(&dictionary, MESSAGE_AUTHENTICATOR, vec![0u8; 16]).unwrap(),
        ]);

        packet.override_message_authenticator(replacement.clone()).unwrap();
        assert_eq!(packet.message_authenticator().unwrap(), &replacement[..]);
    }

    #[test]
    fn test_message_authenticator_missing() {
        let mut packet = RadiusPacket::new(TypeCode::AccessRequest);
        assert!(packet.message_authenticator().is_err());
        assert!(packet.override_message_authenticator(vec![0u8; 16]).is_err());
        assert!(packet.generate_message_authenticator(b"secret").is_err());
    }

    #[test]
    fn test_generate_message_authenticator() {
        let dictionary = dictionary();
        let expected = vec![
            85, 134, 2, 170, 83, 101, 202, 79, 109, 163, 59, 12, 66, 170, 183, 220,
        ];

        let mut packet = RadiusPacket::new(TypeCode::AccessRequest);
        packet.set_attributes(vec![
            RadiusAttribute::create_by_name(&dictionary, "User-Name", b"testing".to_vec()).unwrap(),
            RadiusAttribute::create_by_name(&dictionary, MESSAGE_AUTHENTICATOR, vec![0u8; 16]).unwrap(),
        ]);
        packet.override_id(220);
        packet.override_authenticator(vec![
            152, 137, 115, 14, 56, 250, 103, 56, 57, 57, 104, 246, 226, 80, 71, 167,
        ]);

        packet.generate_message_authenticator(b"secret").unwrap();
        assert_eq!(packet.message_authenticator().unwrap(), &expected[..]);
    }

    #[test]
    fn test_packet_too_large() {
        let dictionary = dictionary();
        let mut packet = RadiusPacket::new(TypeCode::AccessRequest);
        for _ in 0..17 {
            packet.add_attribute(
                RadiusAttribute::create_by_name(&dictionary, "User-Name", vec![97u8; 250]).unwrap(),
            );
        }
        assert!(matches!(packet.to_bytes(), Err(RadiusError::PacketTooLarge(_))));
    }
}
