//! Mailbox addresses
//!
//! A mailbox address is the bracketed `{host:port/flag1/flag2}` block that
//! scopes every folder operation. Folder references are the address
//! immediately followed by a folder path, and servers report mailbox
//! identifiers in the same shape.

use crate::flag::TransportFlag;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

const PREFIX: char = '{';
const SUFFIX: char = '}';
const FLAG_SEPARATOR: char = '/';

static MAILBOX_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{.+\}(.+)$").expect("valid mailbox identifier pattern"));

/// Host, port and ordered transport flags of a mailbox server.
///
/// # Examples
///
/// ```
/// use mailbox_connector::{MailboxAddress, TransportFlag};
///
/// let address = MailboxAddress::new(
///     "imap.example.com",
///     993,
///     vec![TransportFlag::Imap, TransportFlag::Ssl],
/// );
/// assert_eq!(address.to_string(), "{imap.example.com:993/imap/ssl}");
/// assert_eq!(address.mailbox_ref("INBOX"), "{imap.example.com:993/imap/ssl}INBOX");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxAddress {
    host: String,
    port: u16,
    flags: Vec<TransportFlag>,
    connection_string: String,
}

impl MailboxAddress {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, flags: Vec<TransportFlag>) -> Self {
        let host = host.into();
        let connection_string = build_connection_string(&host, port, &flags);
        Self {
            host,
            port,
            flags,
            connection_string,
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn flags(&self) -> &[TransportFlag] {
        &self.flags
    }

    #[must_use]
    pub fn has_flag(&self, flag: &TransportFlag) -> bool {
        self.flags.contains(flag)
    }

    /// The canonical `{host:port/flags}` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.connection_string
    }

    /// The address immediately followed by `path`.
    #[must_use]
    pub fn mailbox_ref(&self, path: &str) -> String {
        format!("{}{path}", self.connection_string)
    }

    /// Remove a leading address from a raw folder name.
    ///
    /// Names without the prefix are returned unchanged, so stripping twice
    /// is the same as stripping once.
    #[must_use]
    pub fn strip_prefix<'a>(&self, raw: &'a str) -> &'a str {
        raw.strip_prefix(self.connection_string.as_str())
            .unwrap_or(raw)
    }
}

impl fmt::Display for MailboxAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.connection_string)
    }
}

fn build_connection_string(host: &str, port: u16, flags: &[TransportFlag]) -> String {
    let mut s = format!("{PREFIX}{host}:{port}");
    for flag in flags {
        s.push(FLAG_SEPARATOR);
        s.push_str(flag.as_str());
    }
    s.push(SUFFIX);
    s
}

/// Extract the folder path from a server-reported mailbox identifier.
///
/// The identifier is an address block directly followed by the path, e.g.
/// `{host:993/ssl}INBOX.Work`. Returns `None` when it does not have that
/// shape.
#[must_use]
pub fn mailbox_name(identifier: &str) -> Option<&str> {
    MAILBOX_IDENTIFIER
        .captures(identifier)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
