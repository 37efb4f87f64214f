//! CHAP authentication support (RFC 2865 Section 5.3).
//!
//! With CHAP the password never crosses the wire. The NAS issues a
//! challenge, the peer answers with `MD5(ident || password || challenge)`,
//! and the CHAP-Password attribute carries the identifier plus that digest.
//! The challenge comes from the CHAP-Challenge attribute when present,
//! otherwise from the request authenticator.

use crate::error::RadiusError;

/// Decoded CHAP-Password attribute value: one identifier byte followed by
/// the 16-byte response digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapPassword {
    ident: u8,
    response: [u8; 16],
}

impl ChapPassword {
    /// Parse a CHAP-Password attribute value (exactly 17 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<ChapPassword, RadiusError> {
        if bytes.len() != 17 {
            return Err(RadiusError::MalformedInput(format!(
                "CHAP-Password must be 17 bytes, got {}",
                bytes.len()
            )));
        }

        let mut response = [0u8; 16];
        response.copy_from_slice(&bytes[1..]);
        Ok(ChapPassword {
            ident: bytes[0],
            response,
        })
    }

    pub fn ident(&self) -> u8 {
        self.ident
    }

    pub fn response(&self) -> &[u8; 16] {
        &self.response
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(17);
        bytes.push(self.ident);
        bytes.extend_from_slice(&self.response);
        bytes
    }
}

/// Compute the expected CHAP response digest.
pub fn compute_chap_response(ident: u8, password: &[u8], challenge: &[u8]) -> [u8; 16] {
    let mut data = Vec::with_capacity(1 + password.len() + challenge.len());
    data.push(ident);
    data.extend_from_slice(password);
    data.extend_from_slice(challenge);
    md5::compute(&data).0
}

/// Check a received CHAP-Password against the account's plaintext password
/// and the challenge that was issued.
pub fn verify_chap_password(chap: &ChapPassword, password: &[u8], challenge: &[u8]) -> bool {
    compute_chap_response(chap.ident, password, challenge) == chap.response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_round_trip() {
        let mut bytes = vec![0x42];
        bytes.extend_from_slice(&[0xab; 16]);

        let chap = ChapPassword::from_bytes(&bytes).unwrap();
        assert_eq!(chap.ident(), 0x42);
        assert_eq!(chap.response(), &[0xab; 16]);
        assert_eq!(chap.to_bytes(), bytes);
    }

    #[test]
    fn test_from_bytes_wrong_length() {
        assert!(ChapPassword::from_bytes(&[0x01; 16]).is_err());
        assert!(ChapPassword::from_bytes(&[0x01; 18]).is_err());
    }

    #[test]
    fn test_verify_chap_password() {
        let challenge = b"0123456789abcdef";
        let response = compute_chap_response(7, b"secret123", challenge);
        let chap = ChapPassword::from_bytes(&[&[7u8][..], &response[..]].concat()).unwrap();

        assert!(verify_chap_password(&chap, b"secret123", challenge));
        assert!(!verify_chap_password(&chap, b"wrong", challenge));
        assert!(!verify_chap_password(&chap, b"secret123", b"fedcba9876543210"));
    }

    #[test]
    fn test_response_depends_on_ident() {
        let challenge = b"0123456789abcdef";
        assert_ne!(
            compute_chap_response(1, b"password", challenge),
            compute_chap_response(2, b"password", challenge)
        );
    }
}
