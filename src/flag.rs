//! Connection-string flags
//!
//! Provides a strongly-typed enum for the `/flag` segments of a mailbox
//! address instead of raw strings. Well-known flags have dedicated
//! variants; anything else is carried through as `Other`.

use std::fmt;

/// A transport flag appended to a mailbox address.
///
/// # Examples
///
/// ```
/// use mailbox_connector::TransportFlag;
///
/// assert_eq!(TransportFlag::NoValidateCert.as_str(), "novalidate-cert");
/// assert_eq!(TransportFlag::from("SSL"), TransportFlag::Ssl);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransportFlag {
    /// Speak IMAP (`imap`).
    Imap,
    /// Implicit TLS from the first byte (`ssl`).
    Ssl,
    /// Upgrade a plain connection with STARTTLS (`tls`).
    Tls,
    /// Never negotiate TLS (`notls`).
    NoTls,
    /// Verify the server certificate (`validate-cert`).
    ValidateCert,
    /// Accept any server certificate (`novalidate-cert`).
    NoValidateCert,
    /// Open folders read-only (`readonly`).
    ReadOnly,
    /// Any other flag, kept verbatim.
    Other(String),
}

impl TransportFlag {
    /// The flag as it appears in a connection string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Imap => "imap",
            Self::Ssl => "ssl",
            Self::Tls => "tls",
            Self::NoTls => "notls",
            Self::ValidateCert => "validate-cert",
            Self::NoValidateCert => "novalidate-cert",
            Self::ReadOnly => "readonly",
            Self::Other(flag) => flag,
        }
    }

    /// Parse a `/`- or `,`-separated flag list, skipping empty segments.
    #[must_use]
    pub fn parse_list(s: &str) -> Vec<Self> {
        s.split(['/', ','])
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(Self::from)
            .collect()
    }
}

impl fmt::Display for TransportFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TransportFlag {
    fn from(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "imap" => Self::Imap,
            "ssl" => Self::Ssl,
            "tls" => Self::Tls,
            "notls" => Self::NoTls,
            "validate-cert" => Self::ValidateCert,
            "novalidate-cert" => Self::NoValidateCert,
            "readonly" => Self::ReadOnly,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl From<String> for TransportFlag {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
