//! Shared base for RADIUS client and server roles.
//!
//! A [`Host`] bundles the three conventional ports with the dictionary and
//! offers the verification entry points both roles need on raw datagrams.
//! It holds the only long-lived shared state in the crate; the dictionary
//! inside is immutable after construction, so a `Host` can be consulted
//! from many threads at once.

use crate::attributes::RadiusAttribute;
use crate::dictionary::{Dictionary, DictionaryAttribute, DictionaryValue};
use crate::error::RadiusError;
use crate::message_auth;
use crate::packet::{RadiusMsgType, RadiusPacket, TypeCode, MESSAGE_AUTHENTICATOR};

#[derive(Debug, Clone)]
pub struct Host {
    auth_port: u16,
    acct_port: u16,
    coa_port: u16,
    dictionary: Dictionary,
}

impl Host {
    /// Create a host with all three ports.
    pub fn new(auth_port: u16, acct_port: u16, coa_port: u16, dictionary: Dictionary) -> Host {
        Host {
            auth_port,
            acct_port,
            coa_port,
            dictionary,
        }
    }

    /// Create a host with only a dictionary; ports default to 0 until set
    /// through [`Self::set_port`].
    pub fn with_dictionary(dictionary: Dictionary) -> Host {
        Host {
            auth_port: 0,
            acct_port: 0,
            coa_port: 0,
            dictionary,
        }
    }

    /// Set the port responsible for one message class.
    pub fn set_port(&mut self, msg_type: RadiusMsgType, port: u16) {
        match msg_type {
            RadiusMsgType::Auth => self.auth_port = port,
            RadiusMsgType::Acct => self.acct_port = port,
            RadiusMsgType::CoA => self.coa_port = port,
        }
    }

    /// Port that receives the given request code. Only the three request
    /// codes map to ports; replies travel back on the request's socket.
    pub fn port(&self, code: TypeCode) -> Option<u16> {
        match code {
            TypeCode::AccessRequest => Some(self.auth_port),
            TypeCode::AccountingRequest => Some(self.acct_port),
            TypeCode::CoARequest => Some(self.coa_port),
            _ => None,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    /// Create an attribute by dictionary name.
    pub fn create_attribute_by_name(
        &self,
        attribute_name: &str,
        value: Vec<u8>,
    ) -> Result<RadiusAttribute, RadiusError> {
        RadiusAttribute::create_by_name(&self.dictionary, attribute_name, value)
    }

    /// Create an attribute by numeric code.
    pub fn create_attribute_by_code(
        &self,
        attribute_code: u8,
        value: Vec<u8>,
    ) -> Result<RadiusAttribute, RadiusError> {
        RadiusAttribute::create_by_code(&self.dictionary, attribute_code, value)
    }

    /// Dictionary `ATTRIBUTE` entry with the given code.
    pub fn dictionary_attribute_by_code(&self, code: u8) -> Option<&DictionaryAttribute> {
        self.dictionary.attribute_by_code(code)
    }

    /// Dictionary `ATTRIBUTE` entry with the given name.
    pub fn dictionary_attribute_by_name(&self, name: &str) -> Option<&DictionaryAttribute> {
        self.dictionary.attribute_by_name(name)
    }

    /// Dictionary `VALUE` entry for an attribute/value name pair.
    pub fn dictionary_value_by_attribute_and_value_name(
        &self,
        attribute_name: &str,
        value_name: &str,
    ) -> Option<&DictionaryValue> {
        self.dictionary.value_by_attribute_and_name(attribute_name, value_name)
    }

    /// Parse a raw datagram against this host's dictionary.
    pub fn parse_packet(&self, bytes: &[u8]) -> Result<RadiusPacket, RadiusError> {
        RadiusPacket::from_bytes(&self.dictionary, bytes)
    }

    /// Check every attribute value in a raw datagram against its declared
    /// dictionary type.
    ///
    /// Message-Authenticator is skipped since its value is an HMAC digest,
    /// not a value-typed field. Any failing attribute surfaces with its id.
    pub fn verify_packet_attributes(&self, bytes: &[u8]) -> Result<(), RadiusError> {
        let packet = self.parse_packet(bytes)?;

        for attribute in packet.attributes() {
            if attribute.name() == MESSAGE_AUTHENTICATOR {
                continue;
            }

            let entry = self.dictionary_attribute_by_code(attribute.id()).ok_or_else(|| {
                RadiusError::UnknownAttribute(format!("attribute code {}", attribute.id()))
            })?;

            if !attribute.verify(entry.kind()) {
                return Err(RadiusError::VerifyFailed {
                    id: attribute.id(),
                    reason: format!("value does not decode as {:?}", entry.kind()),
                });
            }
        }
        Ok(())
    }

    /// Check a raw datagram's Message-Authenticator against the shared
    /// secret.
    ///
    /// The packet is reparsed, its Message-Authenticator zeroed, the image
    /// reserialized and HMAC-MD5 recomputed; the received digest is compared
    /// in constant time.
    pub fn verify_message_authenticator(
        &self,
        secret: &str,
        bytes: &[u8],
    ) -> Result<(), RadiusError> {
        let mut packet = self.parse_packet(bytes)?;
        let received = packet.message_authenticator()?.to_vec();

        packet.override_message_authenticator(vec![0u8; 16])?;
        let zeroed_image = packet.to_bytes()?;

        message_auth::verify_message_authenticator(&zeroed_image, secret.as_bytes(), &received)
    }
}
