//! Error types for mailbox-connector

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Mailbox info unavailable: {0}")]
    MailboxInfo(String),

    #[error("Mailbox error: {0}")]
    Mailbox(String),

    #[error("Message {0} not found")]
    MessageNotFound(u32),

    #[error("Malformed server reply: {0}")]
    Malformed(String),

    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("Email parsing error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(String),
}

pub type Result<T> = std::result::Result<T, Error>;
