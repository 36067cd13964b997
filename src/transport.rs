//! Transport capability seam
//!
//! The connector never touches sockets itself. It drives a [`Transport`]
//! that opens sessions, and a [`TransportSession`] that performs one
//! protocol round-trip per call. Replies come back as typed records so that
//! malformed server data is rejected at this boundary.

use crate::address::MailboxAddress;
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::future::Future;

/// Opens authenticated sessions against a mailbox server.
pub trait Transport {
    type Session: TransportSession;

    /// Open and authenticate a session. Fails with `Error::Connection`.
    fn open(
        &self,
        address: &MailboxAddress,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Self::Session>>;
}

/// One live session. Every method is a single awaited round-trip.
///
/// Mailbox references passed to [`reopen`](Self::reopen) and
/// [`list`](Self::list) are full `{address}path` strings, and names returned
/// by `list` carry the same address prefix.
pub trait TransportSession {
    /// Make `reference` the current mailbox.
    fn reopen(&mut self, reference: &str) -> impl Future<Output = Result<()>>;

    /// End the session.
    fn close(&mut self) -> impl Future<Output = Result<()>>;

    /// List mailboxes matching `pattern` under `reference`. An empty result
    /// is not an error.
    fn list(
        &mut self,
        reference: &str,
        pattern: &str,
    ) -> impl Future<Output = Result<Vec<ListedMailbox>>>;

    /// Report the current mailbox. Fails with `Error::MailboxInfo`.
    fn status(&mut self) -> impl Future<Output = Result<MailboxStatus>>;

    fn fetch_overview(
        &mut self,
        range: SequenceRange,
        numbering: Numbering,
    ) -> impl Future<Output = Result<Vec<Overview>>>;

    /// Raw header text, or `None` if the server returned nothing.
    fn fetch_header(
        &mut self,
        number: u32,
        numbering: Numbering,
    ) -> impl Future<Output = Result<Option<String>>>;

    /// Raw body text, or `None` if the server returned nothing.
    fn fetch_body(
        &mut self,
        number: u32,
        numbering: Numbering,
    ) -> impl Future<Output = Result<Option<String>>>;

    /// Flag a message as deleted.
    fn delete(&mut self, number: u32, numbering: Numbering)
    -> impl Future<Output = Result<()>>;

    /// Permanently remove deleted messages from the current mailbox.
    fn expunge(&mut self) -> impl Future<Output = Result<()>>;
}

/// How a message number is interpreted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Numbering {
    /// Session-scoped sequence number.
    #[default]
    Sequence,
    /// Persistent UID.
    Uid,
}

/// One entry of a LIST reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedMailbox {
    /// `{address}path` name of the mailbox.
    pub name: String,
    /// Hierarchy delimiter, `None` for a flat namespace.
    pub delimiter: Option<String>,
}

impl ListedMailbox {
    /// Whether this mailbox sits below `parent` in the hierarchy.
    ///
    /// `path` is this mailbox's name with the address prefix removed.
    #[must_use]
    pub fn is_below(&self, path: &str, parent: &str) -> bool {
        self.delimiter.as_deref().is_some_and(|delimiter| {
            path.strip_prefix(parent)
                .and_then(|rest| rest.strip_prefix(delimiter))
                .is_some_and(|rest| !rest.is_empty())
        })
    }
}

/// Result of a status query on the current mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxStatus {
    pub message_count: u32,
    /// `{address}path` identifier of the current mailbox.
    pub mailbox: String,
}

/// Lightweight per-message summary that drives the per-message fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub number: u32,
    pub uid: Option<u32>,
    pub size: Option<u32>,
    pub seen: bool,
}

/// An inclusive `first:last` message range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRange {
    first: u32,
    last: u32,
}

impl SequenceRange {
    /// The range covering every message of a mailbox holding `count`
    /// messages, or `None` for an empty mailbox.
    #[must_use]
    pub const fn all(count: u32) -> Option<Self> {
        if count == 0 {
            None
        } else {
            Some(Self {
                first: 1,
                last: count,
            })
        }
    }

    #[must_use]
    pub const fn first(&self) -> u32 {
        self.first
    }

    #[must_use]
    pub const fn last(&self) -> u32 {
        self.last
    }

    #[must_use]
    pub const fn contains(&self, number: u32) -> bool {
        number >= self.first && number <= self.last
    }
}

impl fmt::Display for SequenceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}
