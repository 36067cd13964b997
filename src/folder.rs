//! Folder tree model
//!
//! A [`Folder`] returned for an explicit request is synchronized: its
//! messages were actually fetched. Subfolders discovered by listing are
//! unsynchronized stubs that carry no messages.

use crate::error::Result;
use crate::message::{MailParserFactory, Message, MessageFactory, RawMessage};
use serde::Serialize;

/// A mailbox folder.
///
/// # Examples
///
/// ```
/// use mailbox_connector::{Folder, Message};
///
/// let stub: Folder<Message> = Folder::stub("Archive.2023");
/// assert_eq!(stub.path(), "Archive.2023");
/// assert!(!stub.is_synchronized());
/// assert!(stub.messages().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Folder<M = Message> {
    path: String,
    synchronized: bool,
    subfolders: Vec<Self>,
    messages: Vec<M>,
}

impl<M> Folder<M> {
    /// A listed but unexplored folder.
    #[must_use]
    pub fn stub(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            synchronized: false,
            subfolders: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Path relative to the mailbox root, in the server's separator.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the message list was actually fetched.
    #[must_use]
    pub const fn is_synchronized(&self) -> bool {
        self.synchronized
    }

    #[must_use]
    pub fn subfolders(&self) -> &[Self] {
        &self.subfolders
    }

    #[must_use]
    pub fn messages(&self) -> &[M] {
        &self.messages
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<M> {
        self.messages
    }
}

/// Builds folders from listing and retrieval results.
#[derive(Debug, Clone, Default)]
pub struct FolderFactory<F = MailParserFactory> {
    messages: F,
}

impl<F: MessageFactory> FolderFactory<F> {
    #[must_use]
    pub const fn new(messages: F) -> Self {
        Self { messages }
    }

    /// The message factory used for hydration.
    #[must_use]
    pub const fn message_factory(&self) -> &F {
        &self.messages
    }

    /// Build a synchronized folder with one stub per subfolder path and one
    /// hydrated message per raw message, preserving both orders.
    ///
    /// # Errors
    ///
    /// Returns the first hydration error.
    pub fn by_imap_folder_list_and_message_list(
        &self,
        path: &str,
        subfolders: Vec<String>,
        messages: Vec<RawMessage>,
    ) -> Result<Folder<F::Message>> {
        let messages = messages
            .into_iter()
            .map(|raw| self.messages.by_raw_message(raw))
            .collect::<Result<Vec<_>>>()?;

        Ok(Folder {
            path: path.to_string(),
            synchronized: true,
            subfolders: subfolders.into_iter().map(Folder::stub).collect(),
            messages,
        })
    }

    /// Hydrate a single message.
    ///
    /// # Errors
    ///
    /// Returns the hydration error, if any.
    pub fn by_raw_message(&self, raw: RawMessage) -> Result<F::Message> {
        self.messages.by_raw_message(raw)
    }
}
