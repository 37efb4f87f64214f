//! RADIUS packet codec: type codes and the packet container.

mod code;
#[allow(clippy::module_inception)]
mod packet;

pub use code::{RadiusMsgType, TypeCode};
pub use packet::{RadiusPacket, MESSAGE_AUTHENTICATOR};
