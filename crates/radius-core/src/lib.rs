//! Dictionary-driven RADIUS protocol core.
//!
//! This crate provides the pieces a RADIUS client or server is assembled
//! from, per RFC 2865 (authentication/accounting), RFC 2868
//! (Tunnel-Password), RFC 3576 (dynamic authorization) and RFC 3579
//! (Message-Authenticator):
//!
//! - a dictionary model and text-format loader that governs every
//!   encode/decode decision
//! - a bit-exact packet codec for the header, authenticator and
//!   type-length-value attribute sequence
//! - the MD5/HMAC-MD5 obscuring and integrity primitives
//! - a [`Host`] facade bundling ports, dictionary and verification entry
//!   points shared by both roles
//!
//! Everything here is synchronous and operates on owned byte buffers;
//! socket plumbing lives in the companion client and server crates.
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_core::dictionary::Dictionary;
//! use radius_core::packet::{RadiusPacket, TypeCode};
//! use radius_core::attributes::RadiusAttribute;
//! use radius_core::auth::encrypt_user_password;
//!
//! # fn main() -> Result<(), radius_core::RadiusError> {
//! let dictionary = Dictionary::from_file("dictionary")?;
//!
//! let mut request = RadiusPacket::new(TypeCode::AccessRequest);
//! let mut authenticator = [0u8; 16];
//! authenticator.copy_from_slice(request.authenticator());
//!
//! let password = encrypt_user_password(b"arthur-dent", b"secret", &authenticator);
//! request.set_attributes(vec![
//!     RadiusAttribute::create_by_name(&dictionary, "User-Name", b"arthur".to_vec())?,
//!     RadiusAttribute::create_by_name(&dictionary, "User-Password", password)?,
//! ]);
//!
//! let wire_bytes = request.to_bytes()?;
//! # let _ = wire_bytes;
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod auth;
pub mod chap;
pub mod dictionary;
pub mod error;
pub mod host;
pub mod message_auth;
pub mod packet;
pub mod scalar;

pub use attributes::RadiusAttribute;
pub use dictionary::{AttributeKind, Dictionary};
pub use error::RadiusError;
pub use host::Host;
pub use packet::{RadiusMsgType, RadiusPacket, TypeCode, MESSAGE_AUTHENTICATOR};
