//! Generic RADIUS client.
//!
//! A thin asynchronous shell over [`radius_core`]: it owns a
//! [`radius_core::Host`] for packet construction and verification, and adds
//! the UDP plumbing (retries, timeout) the core deliberately leaves out.
//!
//! ```rust,no_run
//! use radius_client::Client;
//! use radius_core::dictionary::Dictionary;
//! use radius_core::packet::RadiusMsgType;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dictionary = Dictionary::from_file("dictionary")?;
//! let client = Client::with_dictionary(dictionary)
//!     .set_server("127.0.0.1".to_string())
//!     .set_secret("secret".to_string())
//!     .set_port(RadiusMsgType::Auth, 1812)
//!     .set_retries(3)
//!     .set_timeout(Duration::from_secs(2));
//!
//! let mut request = client.create_auth_packet();
//! let reply = client.send_and_receive_packet(&mut request).await?;
//! client.verify_reply(&request, &reply)?;
//! # Ok(())
//! # }
//! ```

mod client;

pub use client::{Client, ClientError};
