//! Fake IMAP server for integration testing
//!
//! This module provides an in-process IMAP server that speaks enough
//! of the protocol to test `ImapConnector` end-to-end:
//!
//! TCP -> greeting -> STARTTLS -> TLS handshake -> LOGIN -> commands -> LOGOUT
//!
//! or, in `TlsMode::Implicit`, TCP -> TLS handshake -> greeting -> LOGIN -> ...
//!
//! ## Module layout
//!
//! - `server` -- TCP listener, TLS setup, and connection dispatch
//! - `handlers/` -- one file per IMAP command (LIST, SELECT, etc.)
//! - `mailbox` -- test data model (folders, emails, builder)
//! - `io` -- shared write helpers and argument splitting

#![allow(dead_code)]

pub mod mailbox;

pub use mailbox::MailboxBuilder;
pub use server::{FakeImapServer, TlsMode};
