//! Test data model for the fake IMAP server
//!
//! Provides a builder-style API for constructing mailbox state:
//!
//! ```ignore
//! let mailbox = MailboxBuilder::new()
//!     .folder("INBOX")
//!         .email(1, false, raw_rfc2822_bytes)
//!     .folder("Archive")
//!     .folder("Archive.2023")
//!         .email(10, true, raw_rfc2822_bytes)
//!     .build();
//! ```
//!
//! Folder names use `.` as the hierarchy delimiter. The `Mailbox` is
//! shared with the fake server behind a `Mutex` so STORE and EXPUNGE
//! can modify it.

/// Hierarchy delimiter reported in LIST responses.
pub const DELIMITER: char = '.';

/// A complete mailbox: named folders plus the accepted login.
#[derive(Debug, Clone)]
pub struct Mailbox {
    pub folders: Vec<Folder>,
    /// `None` accepts any credentials.
    pub credentials: Option<(String, String)>,
}

impl Mailbox {
    /// Look up a folder by name (case-sensitive, matching real IMAP).
    pub fn get_folder(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }

    pub fn get_folder_mut(&mut self, name: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.name == name)
    }

    pub fn accepts(&self, username: &str, password: &str) -> bool {
        self.credentials
            .as_ref()
            .is_none_or(|(u, p)| u == username && p == password)
    }
}

/// A single IMAP folder (e.g. "INBOX", "Archive.2023").
#[derive(Debug, Clone)]
pub struct Folder {
    pub name: String,
    pub emails: Vec<TestEmail>,
}

impl Folder {
    /// Find an email by 1-based sequence number or by UID, returning its
    /// sequence number alongside it.
    pub fn find(&self, number: u32, uid: bool) -> Option<(u32, &TestEmail)> {
        self.emails
            .iter()
            .zip(1u32..)
            .find(|(email, seq)| if uid { email.uid == number } else { *seq == number })
            .map(|(email, seq)| (seq, email))
    }

    /// Highest sequence number or UID, used to resolve `*`.
    pub fn max_number(&self, uid: bool) -> u32 {
        if uid {
            self.emails.iter().map(|e| e.uid).max().unwrap_or(0)
        } else {
            u32::try_from(self.emails.len()).unwrap()
        }
    }
}

/// A test email stored in a folder.
///
/// - `uid`: IMAP UID, stable across sessions.
/// - `seen` / `deleted`: the `\Seen` and `\Deleted` flags.
/// - `raw`: the complete RFC 2822 message (headers + body) as bytes.
#[derive(Debug, Clone)]
pub struct TestEmail {
    pub uid: u32,
    pub seen: bool,
    pub deleted: bool,
    pub raw: Vec<u8>,
}

impl TestEmail {
    fn split_at(&self) -> usize {
        self.raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map_or(self.raw.len(), |pos| pos + 4)
    }

    /// `BODY[HEADER]`: the header block including the blank line.
    pub fn header(&self) -> &[u8] {
        &self.raw[..self.split_at()]
    }

    /// `BODY[TEXT]`: everything after the blank line.
    pub fn text(&self) -> &[u8] {
        &self.raw[self.split_at()..]
    }

    /// IMAP flag list, e.g. `\Seen \Deleted`.
    pub fn flags(&self) -> String {
        let mut flags = Vec::new();
        if self.seen {
            flags.push("\\Seen");
        }
        if self.deleted {
            flags.push("\\Deleted");
        }
        flags.join(" ")
    }
}

/// Builder for constructing a `Mailbox` step by step.
pub struct MailboxBuilder {
    folders: Vec<Folder>,
    credentials: Option<(String, String)>,
}

impl MailboxBuilder {
    pub fn new() -> Self {
        Self {
            folders: Vec::new(),
            credentials: None,
        }
    }

    /// Only accept this username and password at LOGIN.
    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some((username.to_string(), password.to_string()));
        self
    }

    /// Add a new folder. Subsequent `.email()` calls add to this folder.
    pub fn folder(mut self, name: &str) -> Self {
        self.folders.push(Folder {
            name: name.to_string(),
            emails: Vec::new(),
        });
        self
    }

    /// Add an email to the most recently added folder.
    ///
    /// # Panics
    ///
    /// Panics if called before any `.folder()` call.
    pub fn email(mut self, uid: u32, seen: bool, raw: &[u8]) -> Self {
        self.folders
            .last_mut()
            .expect("call .folder() before .email()")
            .emails
            .push(TestEmail {
                uid,
                seen,
                deleted: false,
                raw: raw.to_vec(),
            });
        self
    }

    /// Consume the builder and return the finished `Mailbox`.
    pub fn build(self) -> Mailbox {
        Mailbox {
            folders: self.folders,
            credentials: self.credentials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(raw: &[u8]) -> TestEmail {
        TestEmail {
            uid: 7,
            seen: true,
            deleted: false,
            raw: raw.to_vec(),
        }
    }

    #[test]
    fn splits_header_and_text() {
        let e = email(b"Subject: Hi\r\n\r\nBody");
        assert_eq!(e.header(), b"Subject: Hi\r\n\r\n");
        assert_eq!(e.text(), b"Body");
    }

    #[test]
    fn finds_by_sequence_and_uid() {
        let mailbox = MailboxBuilder::new()
            .folder("INBOX")
            .email(40, false, b"a")
            .email(42, false, b"b")
            .build();
        let inbox = mailbox.get_folder("INBOX").unwrap();

        assert_eq!(inbox.find(2, false).map(|(seq, e)| (seq, e.uid)), Some((2, 42)));
        assert_eq!(inbox.find(42, true).map(|(seq, e)| (seq, e.uid)), Some((2, 42)));
        assert!(inbox.find(3, false).is_none());
    }

    #[test]
    fn credentials_are_checked_when_set() {
        let open = MailboxBuilder::new().build();
        assert!(open.accepts("anyone", "anything"));

        let locked = MailboxBuilder::new().credentials("u", "p").build();
        assert!(locked.accepts("u", "p"));
        assert!(!locked.accepts("u", "wrong"));
    }
}
