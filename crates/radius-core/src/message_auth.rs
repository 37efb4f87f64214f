//! Message-Authenticator support (RFC 3579 Section 3.2).
//!
//! The Message-Authenticator attribute (id 80) carries an HMAC-MD5 digest of
//! the entire packet, keyed with the shared secret and computed with the
//! attribute's own value zeroed out. [`crate::packet::RadiusPacket`] handles
//! the zeroing and write-back; the routines here only hash bytes.

use crate::error::RadiusError;
use hmac::{Hmac, Mac};
use md5_digest::Md5;

type HmacMd5 = Hmac<Md5>;

/// Compute the HMAC-MD5 digest over a serialized packet.
///
/// `packet_bytes` must already carry 16 zero bytes in place of the
/// Message-Authenticator value.
pub fn calculate_message_authenticator(packet_bytes: &[u8], secret: &[u8]) -> [u8; 16] {
    let mut mac = HmacMd5::new_from_slice(secret).expect("HMAC-MD5 accepts keys of any size");
    mac.update(packet_bytes);

    let mut digest = [0u8; 16];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    digest
}

/// Compare a received Message-Authenticator against the recomputed digest.
///
/// The comparison runs in constant time so the digest cannot be probed one
/// byte at a time.
pub fn verify_message_authenticator(
    packet_bytes: &[u8],
    secret: &[u8],
    received: &[u8],
) -> Result<(), RadiusError> {
    let mut mac = HmacMd5::new_from_slice(secret).expect("HMAC-MD5 accepts keys of any size");
    mac.update(packet_bytes);

    mac.verify_slice(received)
        .map_err(|_| RadiusError::AuthenticatorMismatch)
}
