use std::fmt;

/// Coarse message classes a host routes on.
///
/// Each class owns a UDP port on a conventional deployment: authentication
/// on 1812, accounting on 1813, dynamic authorization on 3799.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadiusMsgType {
    /// Authentication traffic (Access-Request and its replies).
    Auth,
    /// Accounting traffic (RFC 2866).
    Acct,
    /// Change-of-Authorization and Disconnect traffic (RFC 3576).
    CoA,
}

impl fmt::Display for RadiusMsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadiusMsgType::Auth => f.write_str("Auth"),
            RadiusMsgType::Acct => f.write_str("Acct"),
            RadiusMsgType::CoA => f.write_str("CoA"),
        }
    }
}

/// RADIUS packet codes as defined in RFC 2865 Section 4 and RFC 3576.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TypeCode {
    /// Access-Request (1)
    AccessRequest = 1,
    /// Access-Accept (2)
    AccessAccept = 2,
    /// Access-Reject (3)
    AccessReject = 3,
    /// Accounting-Request (4) - RFC 2866
    AccountingRequest = 4,
    /// Accounting-Response (5) - RFC 2866
    AccountingResponse = 5,
    /// Access-Challenge (11)
    AccessChallenge = 11,
    /// Status-Server (12) - RFC 5997
    StatusServer = 12,
    /// Status-Client (13) - RFC 5997
    StatusClient = 13,
    /// Disconnect-Request (40) - RFC 3576
    DisconnectRequest = 40,
    /// Disconnect-ACK (41) - RFC 3576
    DisconnectACK = 41,
    /// Disconnect-NAK (42) - RFC 3576
    DisconnectNAK = 42,
    /// CoA-Request (43) - RFC 3576
    CoARequest = 43,
    /// CoA-ACK (44) - RFC 3576
    CoAACK = 44,
    /// CoA-NAK (45) - RFC 3576
    CoANAK = 45,
}

impl TypeCode {
    /// Map a wire code byte. Returns `None` for anything outside the
    /// RFC-defined set.
    pub fn from_u8(value: u8) -> Option<TypeCode> {
        match value {
            1 => Some(TypeCode::AccessRequest),
            2 => Some(TypeCode::AccessAccept),
            3 => Some(TypeCode::AccessReject),
            4 => Some(TypeCode::AccountingRequest),
            5 => Some(TypeCode::AccountingResponse),
            11 => Some(TypeCode::AccessChallenge),
            12 => Some(TypeCode::StatusServer),
            13 => Some(TypeCode::StatusClient),
            40 => Some(TypeCode::DisconnectRequest),
            41 => Some(TypeCode::DisconnectACK),
            42 => Some(TypeCode::DisconnectNAK),
            43 => Some(TypeCode::CoARequest),
            44 => Some(TypeCode::CoAACK),
            45 => Some(TypeCode::CoANAK),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}
