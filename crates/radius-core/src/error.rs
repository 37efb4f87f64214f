use thiserror::Error;

/// Errors surfaced by the RADIUS core.
///
/// Every fallible operation in this crate reports one of these variants at
/// the call site; nothing is panicked across module boundaries.
#[derive(Error, Debug)]
pub enum RadiusError {
    /// Decoder was handed bytes of the wrong length or shape, or an encoder
    /// input that cannot be represented on the wire.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Packet code byte is not one of the RFC 2865/3576 defined codes.
    #[error("Invalid RADIUS type code: {0}")]
    InvalidTypeCode(u8),

    /// Attribute id or name has no entry in the dictionary.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Typed validation of an attribute value failed.
    #[error("Attribute {id} failed verification: {reason}")]
    VerifyFailed { id: u8, reason: String },

    /// HMAC or reply authenticator comparison failed, or a Tunnel-Password
    /// length prefix exceeded the decrypted payload (usually a wrong shared
    /// secret).
    #[error("Authenticator mismatch")]
    AuthenticatorMismatch,

    /// A numeric field in a dictionary file is non-numeric or out of range.
    #[error("Dictionary parse error at line {line}: {reason}")]
    DictionaryParseError { line: usize, reason: String },

    /// Serialized packet would not fit the 16-bit length field.
    #[error("Packet too large: {0} bytes")]
    PacketTooLarge(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
