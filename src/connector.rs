//! IMAP mailbox connector
//!
//! [`ImapConnector`] owns one transport session. It connects lazily on first
//! use, re-selects the requested folder, lists subfolders, pulls every
//! message of the folder and hands the results to a [`FolderFactory`].
//!
//! The connector is meant for sequential use: the selected folder is
//! session state, so concurrent callers need external synchronization.

use crate::address::{MailboxAddress, mailbox_name};
use crate::config::ImapConfig;
use crate::connection::ImapTransport;
use crate::error::{Error, Result};
use crate::folder::{Folder, FolderFactory};
use crate::message::{MailParserFactory, MessageFactory, RawMessage};
use crate::transport::{Numbering, SequenceRange, Transport, TransportSession};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// LIST pattern for direct children only.
pub const LIST_PLAIN: &str = ".%";
/// LIST pattern for every descendant.
pub const LIST_RECURSIVE: &str = "*";

/// The kind of mailbox connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    Imap,
}

/// Folder and message access over a single mailbox session.
pub struct ImapConnector<T: Transport = ImapTransport, F: MessageFactory = MailParserFactory> {
    address: MailboxAddress,
    username: String,
    password: String,
    transport: T,
    folders: FolderFactory<F>,
    session: Option<T::Session>,
}

impl ImapConnector {
    /// A connector using [`ImapTransport`] and the default message parser.
    #[must_use]
    pub fn from_config(config: &ImapConfig) -> Self {
        Self::new(config, ImapTransport, MailParserFactory)
    }
}

impl<T: Transport, F: MessageFactory> ImapConnector<T, F> {
    /// Create a connector. Nothing is opened until the first request.
    #[must_use]
    pub fn new(config: &ImapConfig, transport: T, messages: F) -> Self {
        Self {
            address: config.address(),
            username: config.username.clone(),
            password: config.password.clone(),
            transport,
            folders: FolderFactory::new(messages),
            session: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ConnectorKind {
        ConnectorKind::Imap
    }

    #[must_use]
    pub const fn address(&self) -> &MailboxAddress {
        &self.address
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Fetch a folder with its subfolder stubs and all of its messages.
    ///
    /// With `path` set the folder is re-selected first; otherwise the
    /// session's current folder is used. `recursive` lists every descendant
    /// instead of direct children only.
    ///
    /// # Errors
    ///
    /// Fails on connection, selection, status, listing, retrieval or
    /// hydration errors. No partial folder is ever returned.
    pub async fn get_folder(
        &mut self,
        path: Option<&str>,
        recursive: bool,
    ) -> Result<Folder<F::Message>> {
        self.ensure_connected().await?;
        self.select_folder(path).await?;

        let name = match path.filter(|p| !p.is_empty()) {
            Some(path) => path.to_string(),
            None => self.current_folder_name().await?.ok_or_else(|| {
                Error::MailboxInfo("server reported an unrecognised mailbox identifier".into())
            })?,
        };

        let subfolders = self.list_subfolders(&name, recursive).await?;
        let messages = self.list_messages().await?;

        debug!(
            folder = %name,
            subfolders = subfolders.len(),
            messages = messages.len(),
            "Building folder"
        );
        self.folders
            .by_imap_folder_list_and_message_list(&name, subfolders, messages)
    }

    /// Fetch a single message by sequence number, optionally re-selecting
    /// `path` first.
    ///
    /// # Errors
    ///
    /// Returns `Error::MessageNotFound` if the server has neither header nor
    /// body for `number`, besides connection and selection errors.
    pub async fn get_message(&mut self, number: u32, path: Option<&str>) -> Result<F::Message> {
        self.ensure_connected().await?;
        self.select_folder(path).await?;

        let session = self.ensure_connected().await?;
        let raw = retrieve_message(session, number).await?;
        self.folders.by_raw_message(raw)
    }

    /// Flag a message as deleted and expunge the folder.
    ///
    /// # Errors
    ///
    /// Fails on connection, selection, store or expunge errors.
    pub async fn delete_message(&mut self, number: u32, path: Option<&str>) -> Result<()> {
        self.ensure_connected().await?;
        self.select_folder(path).await?;

        let session = self.ensure_connected().await?;
        debug!(number, "Deleting message");
        session.delete(number, Numbering::Sequence).await?;
        session.expunge().await
    }

    /// Open the session unless one is already live.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connection` if the transport cannot open a session.
    /// Failures are not retried.
    pub async fn ensure_connected(&mut self) -> Result<&mut T::Session> {
        let session = if let Some(session) = self.session.take() {
            session
        } else {
            debug!(address = %self.address, "Opening session");
            let session = self
                .transport
                .open(&self.address, &self.username, &self.password)
                .await?;
            info!(address = %self.address, user = %self.username, "Session opened");
            session
        };
        Ok(self.session.insert(session))
    }

    /// Make `path` the current folder. `None` or an empty path keeps the
    /// current folder.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the folder cannot be selected.
    pub async fn select_folder(&mut self, path: Option<&str>) -> Result<()> {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            return Ok(());
        };

        let reference = self.address.mailbox_ref(path);
        let session = self.ensure_connected().await?;
        debug!(folder = %path, "Selecting folder");
        session.reopen(&reference).await
    }

    /// Name of the current folder as reported by the server, or `None` if
    /// the reported identifier has no recognisable folder path.
    ///
    /// # Errors
    ///
    /// Returns `Error::MailboxInfo` if the status query fails.
    pub async fn current_folder_name(&mut self) -> Result<Option<String>> {
        let session = self.ensure_connected().await?;
        let status = session.status().await?;
        let name = mailbox_name(&status.mailbox).map(str::to_string);
        if name.is_none() {
            warn!(identifier = %status.mailbox, "Unrecognised mailbox identifier");
        }
        Ok(name)
    }

    /// Paths of the subfolders of `folder`, relative to the mailbox root and
    /// in server order.
    ///
    /// Only mailboxes below `folder` in the server's hierarchy are kept:
    /// `folder` itself and siblings sharing its prefix (`ArchiveOld` next to
    /// `Archive`) match the recursive pattern but are dropped.
    ///
    /// # Errors
    ///
    /// Fails on connection or listing errors. An empty listing is `Ok`.
    pub async fn list_subfolders(&mut self, folder: &str, recursive: bool) -> Result<Vec<String>> {
        let pattern = if recursive { LIST_RECURSIVE } else { LIST_PLAIN };
        let reference = self.address.mailbox_ref(folder);

        let session = self.ensure_connected().await?;
        let listed = session.list(&reference, pattern).await?;

        Ok(listed
            .iter()
            .filter_map(|mailbox| {
                let path = self.address.strip_prefix(&mailbox.name);
                mailbox.is_below(path, folder).then(|| path.to_string())
            })
            .collect())
    }

    /// Every message of the current folder in ascending sequence order.
    ///
    /// # Errors
    ///
    /// Fails on status or fetch errors, on overview records outside the
    /// requested range, and with `Error::MessageNotFound` if the overview
    /// misses a number of the range or any message comes back empty.
    pub async fn list_messages(&mut self) -> Result<Vec<RawMessage>> {
        let session = self.ensure_connected().await?;
        let status = session.status().await?;

        let Some(range) = SequenceRange::all(status.message_count) else {
            return Ok(Vec::new());
        };

        let overview = session.fetch_overview(range, Numbering::Sequence).await?;
        if let Some(stray) = overview.iter().find(|record| !range.contains(record.number)) {
            return Err(Error::Malformed(format!(
                "overview record {} outside {range}",
                stray.number
            )));
        }

        let listed: HashSet<u32> = overview.iter().map(|record| record.number).collect();
        if let Some(missing) = (range.first()..=range.last()).find(|n| !listed.contains(n)) {
            warn!(missing, %range, "Overview is missing a message");
            return Err(Error::MessageNotFound(missing));
        }

        let mut messages = Vec::with_capacity(listed.len());
        for number in range.first()..=range.last() {
            messages.push(retrieve_message(session, number).await?);
        }
        Ok(messages)
    }

    /// End the session. Safe to call when not connected.
    ///
    /// The handle is released even when LOGOUT fails; the failure is still
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns the transport's close error.
    pub async fn disconnect(&mut self) -> Result<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        let closed = session.close().await;
        info!(address = %self.address, ok = closed.is_ok(), "Session closed");
        closed
    }

    /// Disconnect and consume the connector.
    ///
    /// # Errors
    ///
    /// Returns the transport's close error.
    pub async fn close(mut self) -> Result<()> {
        self.disconnect().await
    }
}

impl<T: Transport, F: MessageFactory> Drop for ImapConnector<T, F> {
    fn drop(&mut self) {
        if self.session.take().is_some() {
            warn!(address = %self.address, "Connector dropped with a live session; releasing it");
        }
    }
}

/// Fetch header and body of one message, two round-trips.
async fn retrieve_message<S: TransportSession>(session: &mut S, number: u32) -> Result<RawMessage> {
    debug!(number, "Fetching message");
    let header = session.fetch_header(number, Numbering::Sequence).await?;
    let body = session.fetch_body(number, Numbering::Sequence).await?;

    let header = header.unwrap_or_default();
    let body = body.unwrap_or_default();
    if header.is_empty() && body.is_empty() {
        return Err(Error::MessageNotFound(number));
    }

    Ok(RawMessage {
        number,
        header,
        body,
    })
}
