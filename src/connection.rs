//! IMAP transport over async-imap and rustls
//!
//! [`ImapTransport`] is the production [`Transport`]. It connects with
//! implicit TLS (`/ssl`) or STARTTLS (`/tls`, the default), logs in with
//! LOGIN and starts every session on INBOX.

use crate::address::MailboxAddress;
use crate::error::{Error, Result};
use crate::flag::TransportFlag;
use crate::transport::{
    ListedMailbox, MailboxStatus, Numbering, Overview, SequenceRange, Transport, TransportSession,
};
use async_imap::types::{Fetch, Flag};
use futures::{StreamExt, TryStreamExt};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};
use tracing::{debug, info};

/// A TLS-wrapped async-imap session.
pub type ImapSession = async_imap::Session<Compat<tokio_rustls::client::TlsStream<TcpStream>>>;

const INITIAL_MAILBOX: &str = "INBOX";
const OVERVIEW_QUERY: &str = "(UID FLAGS RFC822.SIZE)";
const HEADER_QUERY: &str = "BODY.PEEK[HEADER]";
const BODY_QUERY: &str = "BODY.PEEK[TEXT]";
const DELETE_QUERY: &str = "+FLAGS (\\Deleted)";

/// Opens sessions with async-imap over tokio-rustls.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImapTransport;

impl Transport for ImapTransport {
    type Session = ImapTransportSession;

    async fn open(
        &self,
        address: &MailboxAddress,
        username: &str,
        password: &str,
    ) -> Result<ImapTransportSession> {
        let session = connect(address, username, password)
            .await
            .map_err(|e| match e {
                Error::Connection(_) | Error::Config(_) => e,
                other => Error::Connection(other.to_string()),
            })?;

        let mut session = ImapTransportSession {
            session,
            address: address.clone(),
            current: None,
        };
        session
            .open_mailbox(INITIAL_MAILBOX)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(session)
    }
}

/// A live session opened by [`ImapTransport`].
pub struct ImapTransportSession {
    session: ImapSession,
    address: MailboxAddress,
    current: Option<String>,
}

impl ImapTransportSession {
    /// SELECT (or EXAMINE for `/readonly`) a folder, returning its message
    /// count.
    async fn open_mailbox(&mut self, path: &str) -> Result<u32> {
        // A failed SELECT leaves nothing selected.
        self.current = None;

        let mailbox = if self.address.has_flag(&TransportFlag::ReadOnly) {
            self.session.examine(path).await
        } else {
            self.session.select(path).await
        }
        .map_err(|e| Error::Mailbox(format!("Failed to select {path}: {e}")))?;

        self.current = Some(path.to_string());
        Ok(mailbox.exists)
    }

    async fn fetch(&mut self, set: &str, query: &str, numbering: Numbering) -> Result<Vec<Fetch>> {
        let fetches = match numbering {
            Numbering::Sequence => {
                self.session
                    .fetch(set, query)
                    .await
                    .map_err(|e| Error::Imap(format!("Fetch failed: {e}")))?
                    .try_collect::<Vec<_>>()
                    .await
            }
            Numbering::Uid => {
                self.session
                    .uid_fetch(set, query)
                    .await
                    .map_err(|e| Error::Imap(format!("Fetch failed: {e}")))?
                    .try_collect::<Vec<_>>()
                    .await
            }
        };
        fetches.map_err(|e| Error::Imap(format!("Fetch error: {e}")))
    }

    /// Fetch one section of a single message, decoded lossily as UTF-8.
    async fn fetch_section(
        &mut self,
        number: u32,
        numbering: Numbering,
        query: &str,
        section: fn(&Fetch) -> Option<&[u8]>,
    ) -> Result<Option<String>> {
        let fetches = self.fetch(&number.to_string(), query, numbering).await?;

        Ok(fetches
            .iter()
            .filter(|fetch| is_message(fetch, number, numbering))
            .find_map(section)
            .map(|data| String::from_utf8_lossy(data).into_owned()))
    }
}

impl TransportSession for ImapTransportSession {
    async fn reopen(&mut self, reference: &str) -> Result<()> {
        let path = self.address.strip_prefix(reference).to_string();
        debug!(folder = %path, "Reopening session");
        self.open_mailbox(&path).await.map(|_| ())
    }

    async fn close(&mut self) -> Result<()> {
        self.current = None;
        self.session
            .logout()
            .await
            .map_err(|e| Error::Imap(format!("Logout failed: {e}")))
    }

    async fn list(&mut self, reference: &str, pattern: &str) -> Result<Vec<ListedMailbox>> {
        let path = self.address.strip_prefix(reference);
        debug!(reference = %path, pattern, "Listing folders");

        let mut folder_stream = self
            .session
            .list(Some(path), Some(pattern))
            .await
            .map_err(|e| Error::Imap(format!("List folders failed: {e}")))?;

        let mut names = Vec::new();
        while let Some(item) = folder_stream.next().await {
            let name = item.map_err(|e| Error::Imap(format!("List folders failed: {e}")))?;
            names.push(ListedMailbox {
                name: self.address.mailbox_ref(name.name()),
                delimiter: name.delimiter().map(str::to_string),
            });
        }
        drop(folder_stream);

        Ok(names)
    }

    async fn status(&mut self) -> Result<MailboxStatus> {
        let Some(path) = self.current.clone() else {
            return Err(Error::MailboxInfo("no mailbox selected".into()));
        };

        let message_count = self
            .open_mailbox(&path)
            .await
            .map_err(|e| Error::MailboxInfo(e.to_string()))?;

        Ok(MailboxStatus {
            message_count,
            mailbox: self.address.mailbox_ref(&path),
        })
    }

    async fn fetch_overview(
        &mut self,
        range: SequenceRange,
        numbering: Numbering,
    ) -> Result<Vec<Overview>> {
        debug!(%range, "Fetching overview");
        let fetches = self
            .fetch(&range.to_string(), OVERVIEW_QUERY, numbering)
            .await?;

        let mut overview: Vec<Overview> = fetches
            .iter()
            .map(|fetch| Overview {
                number: fetch.message,
                uid: fetch.uid,
                size: fetch.size,
                seen: fetch.flags().any(|flag| matches!(flag, Flag::Seen)),
            })
            .collect();
        overview.sort_by_key(|record| record.number);
        overview.dedup_by_key(|record| record.number);
        Ok(overview)
    }

    async fn fetch_header(&mut self, number: u32, numbering: Numbering) -> Result<Option<String>> {
        self.fetch_section(number, numbering, HEADER_QUERY, Fetch::header)
            .await
    }

    async fn fetch_body(&mut self, number: u32, numbering: Numbering) -> Result<Option<String>> {
        self.fetch_section(number, numbering, BODY_QUERY, Fetch::text)
            .await
    }

    async fn delete(&mut self, number: u32, numbering: Numbering) -> Result<()> {
        let set = number.to_string();
        let updates = match numbering {
            Numbering::Sequence => {
                self.session
                    .store(&set, DELETE_QUERY)
                    .await
                    .map_err(|e| Error::Imap(format!("Store failed: {e}")))?
                    .try_collect::<Vec<_>>()
                    .await
            }
            Numbering::Uid => {
                self.session
                    .uid_store(&set, DELETE_QUERY)
                    .await
                    .map_err(|e| Error::Imap(format!("Store failed: {e}")))?
                    .try_collect::<Vec<_>>()
                    .await
            }
        };
        updates
            .map(|_| ())
            .map_err(|e| Error::Imap(format!("Store error: {e}")))
    }

    async fn expunge(&mut self) -> Result<()> {
        let expunged = self
            .session
            .expunge()
            .await
            .map_err(|e| Error::Imap(format!("Expunge failed: {e}")))?
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| Error::Imap(format!("Expunge error: {e}")))?;
        debug!(count = expunged.len(), "Expunged messages");
        Ok(())
    }
}

fn is_message(fetch: &Fetch, number: u32, numbering: Numbering) -> bool {
    match numbering {
        Numbering::Sequence => fetch.message == number,
        Numbering::Uid => fetch.uid == Some(number),
    }
}

/// Open a fresh TLS-wrapped IMAP session and log in.
async fn connect(address: &MailboxAddress, username: &str, password: &str) -> Result<ImapSession> {
    if address.has_flag(&TransportFlag::NoTls) {
        return Err(Error::Config("plaintext sessions are not supported".into()));
    }

    let addr = format!("{}:{}", address.host(), address.port());
    debug!("Connecting to IMAP server at {}", addr);

    let mut tcp_stream = TcpStream::connect(&addr).await?;

    if !address.has_flag(&TransportFlag::Ssl) {
        let mut client = async_imap::Client::new(tcp_stream.compat());
        client
            .run_command_and_check_ok("STARTTLS", None)
            .await
            .map_err(|e| Error::Tls(format!("STARTTLS failed: {e}")))?;
        tcp_stream = client.into_inner().into_inner();
    }

    let connector = tls_connector(!address.has_flag(&TransportFlag::NoValidateCert))?;
    let server_name = ServerName::try_from(address.host().to_string())
        .map_err(|e| Error::Tls(format!("Invalid server name: {e}")))?;

    let tls_stream = connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| Error::Tls(e.to_string()))?;

    let tls_client = async_imap::Client::new(tls_stream.compat());

    let session = tls_client
        .login(username, password)
        .await
        .map_err(|(e, _)| Error::Connection(format!("Login failed: {e}")))?;

    info!(address = %address, "Connected to IMAP server");
    Ok(session)
}

/// Build a TLS connector, validating certificates against the web PKI
/// roots unless `validate` is false.
fn tls_connector(validate: bool) -> Result<TlsConnector> {
    let builder = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| Error::Tls(e.to_string()))?;

    let config = if validate {
        let roots = rustls::RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        builder.with_root_certificates(roots).with_no_client_auth()
    } else {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(DangerousVerifier))
            .with_no_client_auth()
    };
    Ok(TlsConnector::from(Arc::new(config)))
}

/// Certificate verifier that accepts all certificates, used for
/// `/novalidate-cert` addresses.
#[derive(Debug)]
struct DangerousVerifier;

impl rustls::client::danger::ServerCertVerifier for DangerousVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}
