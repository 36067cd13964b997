//! IMAP mailbox connector library
//!
//! Opens a session against an IMAP server, enumerates folders (optionally
//! recursively) and retrieves message headers and bodies into a folder tree
//! of hydrated [`Message`]s. The wire protocol sits behind the
//! [`Transport`] seam; [`ImapTransport`] is the async-imap implementation.
//!
//! ```no_run
//! # async fn run() -> mailbox_connector::Result<()> {
//! use mailbox_connector::{ImapConfig, ImapConnector};
//!
//! let config = ImapConfig::from_env()?;
//! let mut connector = ImapConnector::from_config(&config);
//!
//! let archive = connector.get_folder(Some("Archive"), true).await?;
//! for sub in archive.subfolders() {
//!     println!("{}", sub.path());
//! }
//! connector.close().await
//! # }
//! ```

mod address;
mod config;
mod connection;
mod connector;
mod error;
mod flag;
mod folder;
mod message;
mod transport;

pub use address::{MailboxAddress, mailbox_name};
pub use config::ImapConfig;
pub use connection::{ImapTransport, ImapTransportSession};
pub use connector::{ConnectorKind, ImapConnector, LIST_PLAIN, LIST_RECURSIVE};
pub use error::{Error, Result};
pub use flag::TransportFlag;
pub use folder::{Folder, FolderFactory};
pub use message::{MailParserFactory, Message, MessageFactory, RawMessage};
pub use transport::{
    ListedMailbox, MailboxStatus, Numbering, Overview, SequenceRange, Transport, TransportSession,
};
