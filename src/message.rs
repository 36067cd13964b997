//! Message hydration
//!
//! The connector hands each fetched [`RawMessage`] to a [`MessageFactory`].
//! [`MailParserFactory`] is the default and parses the header and body with
//! `mail-parser`.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use mail_parser::MessageParser;
use serde::Serialize;
use std::borrow::Cow;

/// Header and body text fetched for one message number.
///
/// The number is only meaningful within the session and folder it was
/// fetched under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub number: u32,
    pub header: String,
    pub body: String,
}

impl RawMessage {
    /// Header and body joined back into one RFC 5322 message.
    #[must_use]
    pub fn to_rfc822(&self) -> String {
        if self.header.is_empty()
            || self.header.ends_with("\r\n\r\n")
            || self.header.ends_with("\n\n")
        {
            format!("{}{}", self.header, self.body)
        } else if self.header.ends_with('\n') {
            format!("{}\r\n{}", self.header, self.body)
        } else {
            format!("{}\r\n\r\n{}", self.header, self.body)
        }
    }
}

/// Turns raw messages into caller-facing message objects.
pub trait MessageFactory {
    type Message;

    /// Hydrate one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the raw text cannot be turned into a message.
    fn by_raw_message(&self, raw: RawMessage) -> Result<Self::Message>;
}

/// A hydrated message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub number: u32,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub to: Vec<String>,
    pub date: Option<DateTime<Utc>>,
    pub message_id: Option<String>,
    pub text: Option<String>,
    pub header: String,
    pub body: String,
}

/// Default [`MessageFactory`] backed by `mail-parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MailParserFactory;

impl MessageFactory for MailParserFactory {
    type Message = Message;

    fn by_raw_message(&self, raw: RawMessage) -> Result<Message> {
        let full = raw.to_rfc822();
        let parsed = MessageParser::default()
            .parse(full.as_bytes())
            .ok_or_else(|| Error::Parse(format!("message {} is not parseable", raw.number)))?;

        let from = parsed
            .from()
            .and_then(|addr| addr.first())
            .and_then(|addr| addr.address())
            .map(str::to_string);
        let to = parsed
            .to()
            .map(|list| {
                list.iter()
                    .filter_map(|addr| addr.address())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let date = parsed
            .date()
            .and_then(|d| DateTime::from_timestamp(d.to_timestamp(), 0));

        Ok(Message {
            number: raw.number,
            subject: parsed.subject().map(str::to_string),
            from,
            to,
            date,
            message_id: parsed.message_id().map(str::to_string),
            text: parsed.body_text(0).map(Cow::into_owned),
            header: raw.header,
            body: raw.body,
        })
    }
}
