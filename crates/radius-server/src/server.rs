use crate::config::{Config, ConfigError, User};
use radius_core::attributes::RadiusAttribute;
use radius_core::auth::{calculate_reply_authenticator, decrypt_user_password};
use radius_core::chap::{verify_chap_password, ChapPassword};
use radius_core::dictionary::{AttributeKind, Dictionary};
use radius_core::error::RadiusError;
use radius_core::host::Host;
use radius_core::packet::{RadiusMsgType, RadiusPacket, TypeCode};
use radius_core::scalar;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Protocol error: {0}")]
    Radius(#[from] RadiusError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Request from unknown client {0}")]
    UnknownClient(IpAddr),
    #[error("Cannot encode reply attribute {name}: {reason}")]
    ReplyAttribute { name: String, reason: String },
}

/// Request dispatch surface: one entry point per RADIUS message class.
///
/// Each method receives the raw request datagram (already structurally
/// parsed once by the server) and the shared secret of the originating
/// client, and returns the serialized reply datagram.
pub trait RequestHandler: Send + Sync {
    fn handle_auth_request(
        &self,
        server: &Server,
        secret: &str,
        request: &[u8],
    ) -> Result<Vec<u8>, ServerError>;

    fn handle_acct_request(
        &self,
        server: &Server,
        secret: &str,
        request: &[u8],
    ) -> Result<Vec<u8>, ServerError>;

    fn handle_coa_request(
        &self,
        server: &Server,
        secret: &str,
        request: &[u8],
    ) -> Result<Vec<u8>, ServerError>;
}

/// Generic RADIUS server: three UDP listeners feeding a [`RequestHandler`].
pub struct Server {
    host: Host,
    bind_address: IpAddr,
    default_secret: String,
    clients: Vec<crate::config::ClientEntry>,
    handler: Arc<dyn RequestHandler>,
}

impl Server {
    /// Build a server from its configuration, a loaded dictionary and a
    /// handler.
    pub fn new(
        config: Config,
        dictionary: Dictionary,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<Server, ServerError> {
        config.validate()?;
        let bind_address = config
            .bind_address
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", config.bind_address)))?;

        let mut host = Host::with_dictionary(dictionary);
        host.set_port(RadiusMsgType::Auth, config.auth_port);
        host.set_port(RadiusMsgType::Acct, config.acct_port);
        host.set_port(RadiusMsgType::CoA, config.coa_port);

        Ok(Server {
            host,
            bind_address,
            default_secret: config.secret,
            clients: config.clients.into_iter().filter(|entry| entry.enabled).collect(),
            handler,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn dictionary(&self) -> &Dictionary {
        self.host.dictionary()
    }

    /// Shared secret for a source address: the first matching client entry
    /// wins, then the configured fallback secret, then nothing.
    pub fn secret_for(&self, source: IpAddr) -> Option<&str> {
        for client in &self.clients {
            if client.matches(source).unwrap_or(false) {
                return Some(&client.secret);
            }
        }
        if self.default_secret.is_empty() {
            None
        } else {
            Some(&self.default_secret)
        }
    }

    /// Structural check: the datagram parses against the dictionary.
    pub fn verify_request(&self, request: &[u8]) -> Result<(), ServerError> {
        self.host.parse_packet(request)?;
        Ok(())
    }

    /// Typed check: every attribute value decodes per its declared type.
    pub fn verify_request_attributes(&self, request: &[u8]) -> Result<(), ServerError> {
        Ok(self.host.verify_packet_attributes(request)?)
    }

    pub fn parse_packet(&self, request: &[u8]) -> Result<RadiusPacket, ServerError> {
        Ok(self.host.parse_packet(request)?)
    }

    pub fn create_attribute_by_name(
        &self,
        attribute_name: &str,
        value: Vec<u8>,
    ) -> Result<RadiusAttribute, ServerError> {
        Ok(self.host.create_attribute_by_name(attribute_name, value)?)
    }

    /// Build a reply to a raw request: the request id is echoed and the
    /// reply authenticator derived from the request authenticator and the
    /// client's secret.
    pub fn create_reply_packet(
        &self,
        reply_code: TypeCode,
        attributes: Vec<RadiusAttribute>,
        request: &[u8],
        secret: &str,
    ) -> Result<RadiusPacket, ServerError> {
        if request.len() < RadiusPacket::MIN_PACKET_SIZE {
            return Err(ServerError::Radius(RadiusError::MalformedInput(
                "request shorter than the RADIUS header".to_string(),
            )));
        }

        let mut reply = RadiusPacket::new(reply_code);
        reply.set_attributes(attributes);
        reply.override_id(request[1]);

        // The derivation runs over the reply image with the authenticator
        // field still meaningless; only the id and attributes matter.
        let image = reply.to_bytes()?;
        let request_authenticator: [u8; 16] = request[4..20]
            .try_into()
            .expect("header length was checked above");
        let authenticator =
            calculate_reply_authenticator(&image, &request_authenticator, secret.as_bytes());
        reply.override_authenticator(authenticator.to_vec());
        Ok(reply)
    }

    /// Encode a reply attribute from its string form using the
    /// dictionary-declared type. Integer attributes also accept a
    /// dictionary VALUE name, so `"Framed-User"` works where `"2"` would.
    pub fn encode_reply_attribute(
        &self,
        name: &str,
        value: &str,
    ) -> Result<RadiusAttribute, ServerError> {
        let entry = self
            .host
            .dictionary_attribute_by_name(name)
            .ok_or_else(|| RadiusError::UnknownAttribute(name.to_string()))?;

        let reply_attribute = |reason: String| ServerError::ReplyAttribute {
            name: name.to_string(),
            reason,
        };

        let bytes = match entry.kind() {
            AttributeKind::Text | AttributeKind::Octets => value.as_bytes().to_vec(),
            AttributeKind::Integer => {
                let literal = self
                    .host
                    .dictionary_value_by_attribute_and_value_name(name, value)
                    .map(|named| named.value().to_string())
                    .unwrap_or_else(|| value.to_string());
                let number = literal
                    .parse::<u32>()
                    .map_err(|_| reply_attribute(format!("not an integer: {literal:?}")))?;
                scalar::integer_to_bytes(number)
            }
            AttributeKind::Integer64 => {
                let number = value
                    .parse::<u64>()
                    .map_err(|_| reply_attribute(format!("not an integer64: {value:?}")))?;
                scalar::integer64_to_bytes(number)
            }
            AttributeKind::Time => {
                let seconds = value
                    .parse::<u64>()
                    .map_err(|_| reply_attribute(format!("not a timestamp: {value:?}")))?;
                scalar::timestamp_to_bytes(seconds)?
            }
            AttributeKind::Ipv4Addr | AttributeKind::Ipv4Prefix => {
                scalar::ipv4_string_to_bytes(value)?
            }
            AttributeKind::Ipv6Addr | AttributeKind::Ipv6Prefix => {
                scalar::ipv6_string_to_bytes(value)?
            }
            AttributeKind::InterfaceId => {
                return Err(reply_attribute("interface-id has no string form".to_string()));
            }
        };

        Ok(self.host.create_attribute_by_name(name, bytes)?)
    }

    /// Bind the three listeners and serve until the process is stopped.
    pub async fn run(&self) -> Result<(), ServerError> {
        let auth = self.bind(RadiusMsgType::Auth, TypeCode::AccessRequest).await?;
        let acct = self.bind(RadiusMsgType::Acct, TypeCode::AccountingRequest).await?;
        let coa = self.bind(RadiusMsgType::CoA, TypeCode::CoARequest).await?;

        tokio::try_join!(
            self.listen(auth, RadiusMsgType::Auth),
            self.listen(acct, RadiusMsgType::Acct),
            self.listen(coa, RadiusMsgType::CoA),
        )?;
        Ok(())
    }

    async fn bind(&self, msg_type: RadiusMsgType, code: TypeCode) -> Result<UdpSocket, ServerError> {
        let port = self.host.port(code).unwrap_or(0);
        let socket = UdpSocket::bind(SocketAddr::new(self.bind_address, port)).await?;
        info!(%msg_type, address = %socket.local_addr()?, "listener bound");
        Ok(socket)
    }

    async fn listen(&self, socket: UdpSocket, msg_type: RadiusMsgType) -> Result<(), ServerError> {
        let mut buffer = vec![0u8; RadiusPacket::MAX_PACKET_SIZE];
        loop {
            let (received, origin) = socket.recv_from(&mut buffer).await?;
            match self.dispatch(msg_type, origin, &buffer[..received]) {
                Ok(reply) => {
                    socket.send_to(&reply, origin).await?;
                    debug!(%msg_type, %origin, bytes = reply.len(), "reply sent");
                }
                Err(error) => warn!(%msg_type, %origin, %error, "request dropped"),
            }
        }
    }

    fn dispatch(
        &self,
        msg_type: RadiusMsgType,
        origin: SocketAddr,
        request: &[u8],
    ) -> Result<Vec<u8>, ServerError> {
        let secret = self
            .secret_for(origin.ip())
            .ok_or(ServerError::UnknownClient(origin.ip()))?;

        self.verify_request(request)?;

        match msg_type {
            RadiusMsgType::Auth => self.handler.handle_auth_request(self, secret, request),
            RadiusMsgType::Acct => self.handler.handle_acct_request(self, secret, request),
            RadiusMsgType::CoA => self.handler.handle_coa_request(self, secret, request),
        }
    }
}

/// Reference handler backed by the configuration's user list.
///
/// Authenticates PAP (User-Password) and CHAP (CHAP-Password) requests,
/// answers accounting requests with an empty Accounting-Response, and
/// acknowledges CoA requests that name a user.
pub struct SimpleHandler {
    users: Vec<User>,
}

impl SimpleHandler {
    pub fn new(users: Vec<User>) -> SimpleHandler {
        SimpleHandler { users }
    }

    fn lookup(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|user| user.username == username)
    }

    fn authenticate(
        &self,
        secret: &str,
        request: &RadiusPacket,
    ) -> Result<Option<&User>, ServerError> {
        let Some(username_attribute) = request.attribute_by_name("User-Name") else {
            return Ok(None);
        };
        let username = username_attribute.original_string_value(AttributeKind::Text)?;
        let Some(user) = self.lookup(&username) else {
            debug!(%username, "unknown user");
            return Ok(None);
        };

        let authenticator: [u8; 16] = request.authenticator().try_into().map_err(|_| {
            RadiusError::MalformedInput("request authenticator is not 16 bytes".to_string())
        })?;

        if let Some(password_attribute) = request.attribute_by_name("User-Password") {
            let decrypted =
                decrypt_user_password(password_attribute.value(), secret.as_bytes(), &authenticator)?;
            if decrypted == user.password.as_bytes() {
                return Ok(Some(user));
            }
            return Ok(None);
        }

        if let Some(chap_attribute) = request.attribute_by_name("CHAP-Password") {
            let chap = ChapPassword::from_bytes(chap_attribute.value())?;
            // CHAP-Challenge attribute wins; without it the request
            // authenticator is the challenge (RFC 2865 Section 5.3).
            let verified = match request.attribute_by_name("CHAP-Challenge") {
                Some(challenge) => {
                    verify_chap_password(&chap, user.password.as_bytes(), challenge.value())
                }
                None => verify_chap_password(&chap, user.password.as_bytes(), &authenticator),
            };
            if verified {
                return Ok(Some(user));
            }
        }

        Ok(None)
    }
}

impl RequestHandler for SimpleHandler {
    fn handle_auth_request(
        &self,
        server: &Server,
        secret: &str,
        request: &[u8],
    ) -> Result<Vec<u8>, ServerError> {
        let parsed = server.parse_packet(request)?;

        match self.authenticate(secret, &parsed)? {
            Some(user) => {
                info!(username = %user.username, "access accepted");
                let mut attributes = Vec::with_capacity(user.reply_attributes.len());
                for (name, value) in &user.reply_attributes {
                    attributes.push(server.encode_reply_attribute(name, value)?);
                }
                let mut reply =
                    server.create_reply_packet(TypeCode::AccessAccept, attributes, request, secret)?;
                Ok(reply.to_bytes()?)
            }
            None => {
                info!("access rejected");
                let attributes = vec![
                    server.create_attribute_by_name("Reply-Message", b"Authentication failed".to_vec())?,
                ];
                let mut reply =
                    server.create_reply_packet(TypeCode::AccessReject, attributes, request, secret)?;
                Ok(reply.to_bytes()?)
            }
        }
    }

    fn handle_acct_request(
        &self,
        server: &Server,
        secret: &str,
        request: &[u8],
    ) -> Result<Vec<u8>, ServerError> {
        let mut reply =
            server.create_reply_packet(TypeCode::AccountingResponse, Vec::new(), request, secret)?;
        Ok(reply.to_bytes()?)
    }

    fn handle_coa_request(
        &self,
        server: &Server,
        secret: &str,
        request: &[u8],
    ) -> Result<Vec<u8>, ServerError> {
        let parsed = server.parse_packet(request)?;

        // Without a session to act on there is nothing to authorize.
        let reply_code = if parsed.attribute_by_name("User-Name").is_some() {
            TypeCode::CoAACK
        } else {
            TypeCode::CoANAK
        };
        let mut reply = server.create_reply_packet(reply_code, Vec::new(), request, secret)?;
        Ok(reply.to_bytes()?)
    }
}
