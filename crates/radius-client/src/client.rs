use radius_core::attributes::RadiusAttribute;
use radius_core::auth::calculate_reply_authenticator;
use radius_core::dictionary::Dictionary;
use radius_core::error::RadiusError;
use radius_core::host::Host;
use radius_core::packet::{RadiusMsgType, RadiusPacket, TypeCode};
use std::time::Duration;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Protocol error: {0}")]
    Radius(#[from] RadiusError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No reply after {retries} attempt(s)")]
    Timeout { retries: u16 },
    #[error("No port assigned for {0:?} requests")]
    PortUnassigned(TypeCode),
    #[error("Reply identifier {actual} does not match request identifier {expected}")]
    IdentifierMismatch { expected: u8, actual: u8 },
    #[error("Reply authenticator mismatch")]
    ReplyAuthenticatorMismatch,
}

/// Generic RADIUS client: packet construction through the dictionary plus
/// UDP transport with bounded retries.
#[derive(Debug)]
pub struct Client {
    host: Host,
    server: String,
    secret: String,
    retries: u16,
    timeout: Duration,
}

impl Client {
    /// Start building a client around a dictionary. Server, secret and
    /// ports come in through the other builder calls.
    pub fn with_dictionary(dictionary: Dictionary) -> Client {
        Client {
            host: Host::with_dictionary(dictionary),
            server: String::new(),
            secret: String::new(),
            retries: 1,
            timeout: Duration::from_secs(2),
        }
    }

    /// Hostname or address of the RADIUS server.
    pub fn set_server(mut self, server: String) -> Client {
        self.server = server;
        self
    }

    /// Shared secret for this server.
    pub fn set_secret(mut self, secret: String) -> Client {
        self.secret = secret;
        self
    }

    /// Remote port handling one message class.
    pub fn set_port(mut self, msg_type: RadiusMsgType, port: u16) -> Client {
        self.host.set_port(msg_type, port);
        self
    }

    /// Send attempts per request (default 1).
    pub fn set_retries(mut self, retries: u16) -> Client {
        self.retries = retries;
        self
    }

    /// Wait per attempt before resending (default 2 seconds).
    pub fn set_timeout(mut self, timeout: Duration) -> Client {
        self.timeout = timeout;
        self
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn retries(&self) -> u16 {
        self.retries
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Port the server expects the given request code on.
    pub fn port(&self, code: TypeCode) -> Option<u16> {
        self.host.port(code)
    }

    /// Create an empty packet with any code; attributes come in through
    /// [`RadiusPacket::set_attributes`].
    pub fn create_packet(&self, code: TypeCode) -> RadiusPacket {
        RadiusPacket::new(code)
    }

    /// Create an empty Access-Request packet.
    pub fn create_auth_packet(&self) -> RadiusPacket {
        RadiusPacket::new(TypeCode::AccessRequest)
    }

    /// Create an empty Accounting-Request packet.
    pub fn create_acct_packet(&self) -> RadiusPacket {
        RadiusPacket::new(TypeCode::AccountingRequest)
    }

    /// Create an empty CoA-Request packet.
    pub fn create_coa_packet(&self) -> RadiusPacket {
        RadiusPacket::new(TypeCode::CoARequest)
    }

    /// Create an attribute by dictionary name.
    pub fn create_attribute_by_name(
        &self,
        attribute_name: &str,
        value: Vec<u8>,
    ) -> Result<RadiusAttribute, ClientError> {
        Ok(self.host.create_attribute_by_name(attribute_name, value)?)
    }

    /// Create an attribute by numeric code.
    pub fn create_attribute_by_code(
        &self,
        attribute_code: u8,
        value: Vec<u8>,
    ) -> Result<RadiusAttribute, ClientError> {
        Ok(self.host.create_attribute_by_code(attribute_code, value)?)
    }

    /// Original string form of an attribute value, resolved through the
    /// dictionary-declared type.
    pub fn attribute_original_string_value(
        &self,
        attribute: &RadiusAttribute,
    ) -> Result<String, ClientError> {
        let entry = self
            .host
            .dictionary_attribute_by_code(attribute.id())
            .ok_or_else(|| RadiusError::UnknownAttribute(format!("attribute code {}", attribute.id())))?;
        Ok(attribute.original_string_value(entry.kind())?)
    }

    /// Original integer form of an attribute value, resolved through the
    /// dictionary-declared type.
    pub fn attribute_original_integer_value(
        &self,
        attribute: &RadiusAttribute,
    ) -> Result<u64, ClientError> {
        let entry = self
            .host
            .dictionary_attribute_by_code(attribute.id())
            .ok_or_else(|| RadiusError::UnknownAttribute(format!("attribute code {}", attribute.id())))?;
        Ok(attribute.original_integer_value(entry.kind())?)
    }

    /// Parse a reply datagram against the client's dictionary.
    pub fn parse_packet(&self, reply: &[u8]) -> Result<RadiusPacket, ClientError> {
        Ok(self.host.parse_packet(reply)?)
    }

    /// Send a request and wait for the matching reply datagram.
    ///
    /// The request is serialized once and resent on every timeout up to the
    /// configured retry budget.
    pub async fn send_and_receive_packet(
        &self,
        packet: &mut RadiusPacket,
    ) -> Result<Vec<u8>, ClientError> {
        let request = packet.to_bytes()?;
        let socket = self.connect(packet.code()).await?;

        let attempts = self.retries.max(1);
        for attempt in 1..=attempts {
            socket.send(&request).await?;

            let mut buffer = vec![0u8; RadiusPacket::MAX_PACKET_SIZE];
            match time::timeout(self.timeout, socket.recv(&mut buffer)).await {
                Ok(received) => {
                    buffer.truncate(received?);
                    return Ok(buffer);
                }
                Err(_) => debug!(attempt, "no reply within timeout, resending"),
            }
        }

        Err(ClientError::Timeout { retries: attempts })
    }

    /// Send a request without waiting for a reply (fire and forget
    /// accounting style).
    pub async fn send_packet(&self, packet: &mut RadiusPacket) -> Result<(), ClientError> {
        let request = packet.to_bytes()?;
        let socket = self.connect(packet.code()).await?;
        socket.send(&request).await?;
        Ok(())
    }

    /// Check that a reply datagram answers the given request: the
    /// identifier must match and the reply authenticator must recompute
    /// from the request authenticator and the shared secret.
    pub fn verify_reply(&self, request: &RadiusPacket, reply: &[u8]) -> Result<(), ClientError> {
        if reply.len() < RadiusPacket::MIN_PACKET_SIZE {
            return Err(RadiusError::MalformedInput(format!(
                "reply of {} bytes is shorter than the {} byte header",
                reply.len(),
                RadiusPacket::MIN_PACKET_SIZE
            ))
            .into());
        }

        if request.id() != reply[1] {
            return Err(ClientError::IdentifierMismatch {
                expected: request.id(),
                actual: reply[1],
            });
        }

        let request_authenticator: [u8; 16] = request.authenticator().try_into().map_err(|_| {
            RadiusError::MalformedInput("request authenticator is not 16 bytes".to_string())
        })?;

        let expected =
            calculate_reply_authenticator(reply, &request_authenticator, self.secret.as_bytes());
        if reply[4..20] == expected {
            Ok(())
        } else {
            Err(ClientError::ReplyAuthenticatorMismatch)
        }
    }

    /// Check a reply's Message-Authenticator attribute.
    pub fn verify_message_authenticator(&self, reply: &[u8]) -> Result<(), ClientError> {
        Ok(self.host.verify_message_authenticator(&self.secret, reply)?)
    }

    /// Check every attribute value in a reply against the dictionary.
    pub fn verify_packet_attributes(&self, reply: &[u8]) -> Result<(), ClientError> {
        Ok(self.host.verify_packet_attributes(reply)?)
    }

    async fn connect(&self, code: TypeCode) -> Result<UdpSocket, ClientError> {
        let port = self
            .host
            .port(code)
            .filter(|port| *port != 0)
            .ok_or(ClientError::PortUnassigned(code))?;

        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect((self.server.as_str(), port)).await?;
        debug!(server = %self.server, port, code = ?code, "client socket connected");
        Ok(socket)
    }
}
