//! IMAP connection configuration

use crate::address::MailboxAddress;
use crate::error::{Error, Result};
use crate::flag::TransportFlag;
use std::{env, fmt};

/// Mailbox server and account configuration
#[derive(Clone)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub flags: Vec<TransportFlag>,
    pub username: String,
    pub password: String,
}

impl ImapConfig {
    /// Load IMAP configuration from environment variables
    ///
    /// Reads from `.env` file if present. Required variables:
    /// - `IMAP_USERNAME`
    /// - `IMAP_PASSWORD`
    ///
    /// Optional (with defaults):
    /// - `IMAP_HOST` (default: `127.0.0.1`)
    /// - `IMAP_PORT` (default: `993`)
    /// - `IMAP_FLAGS` (default: `imap/ssl`), `/` or `,` separated
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if a required variable is missing or
    /// `IMAP_PORT` is not a port number.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            host: env::var("IMAP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("IMAP_PORT")
                .unwrap_or_else(|_| "993".to_string())
                .parse()
                .map_err(|e| Error::Config(format!("Invalid IMAP_PORT: {e}")))?,
            flags: TransportFlag::parse_list(
                &env::var("IMAP_FLAGS").unwrap_or_else(|_| "imap/ssl".to_string()),
            ),
            username: env::var("IMAP_USERNAME")
                .map_err(|_| Error::Config("IMAP_USERNAME not set".into()))?,
            password: env::var("IMAP_PASSWORD")
                .map_err(|_| Error::Config("IMAP_PASSWORD not set".into()))?,
        })
    }

    /// The mailbox address described by this configuration.
    #[must_use]
    pub fn address(&self) -> MailboxAddress {
        MailboxAddress::new(self.host.clone(), self.port, self.flags.clone())
    }
}

impl fmt::Debug for ImapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImapConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("flags", &self.flags)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
