//! Generic RADIUS server shell.
//!
//! A thin asynchronous layer over [`radius_core`]: JSON configuration, one
//! UDP listener per message class (authentication, accounting, dynamic
//! authorization), client secret lookup, and a [`RequestHandler`] trait for
//! the actual policy. [`SimpleHandler`] is a reference implementation that
//! authenticates PAP and CHAP against the configured user list.
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_core::dictionary::Dictionary;
//! use radius_server::{Config, Server, SimpleHandler};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("config.json")?;
//! let dictionary = Dictionary::from_file(&config.dictionary_path)?;
//! let handler = Arc::new(SimpleHandler::new(config.users.clone()));
//!
//! let server = Server::new(config, dictionary, handler)?;
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod server;

pub use config::{ClientEntry, Config, ConfigError, User};
pub use server::{RequestHandler, Server, ServerError, SimpleHandler};
