//! SELECT / EXAMINE command handler.
//!
//! Opens a folder and responds with metadata. The key piece for the
//! connector is `* N EXISTS`, the number of messages in the folder.
//!
//! Returns the selected folder name (or `None` if not found).

use crate::fake_imap::io::write_line;
use crate::fake_imap::mailbox::Mailbox;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

/// Handle SELECT or EXAMINE. Returns the selected folder name.
pub async fn handle_select<S: AsyncRead + AsyncWrite + Unpin>(
    tag: &str,
    folder_name: &str,
    read_only: bool,
    mailbox: &Mailbox,
    stream: &mut BufReader<S>,
) -> Option<String> {
    let Some(folder) = mailbox.get_folder(folder_name) else {
        let resp = format!("{tag} NO Folder not found\r\n");
        let _ = write_line(stream, &resp).await;
        return None;
    };

    // RFC 3501 Section 6.3.1: required FLAGS, EXISTS and RECENT
    let _ = write_line(
        stream,
        "* FLAGS (\\Seen \\Answered \\Flagged \\Deleted \\Draft)\r\n",
    )
    .await;
    let exists = format!("* {} EXISTS\r\n", folder.emails.len());
    let _ = write_line(stream, &exists).await;
    let _ = write_line(stream, "* 0 RECENT\r\n").await;

    let _ = write_line(stream, "* OK [UIDVALIDITY 1] UIDs valid\r\n").await;
    let uidnext = folder.max_number(true) + 1;
    let _ = write_line(stream, &format!("* OK [UIDNEXT {uidnext}] Predicted next UID\r\n")).await;

    let (code, command) = if read_only {
        ("READ-ONLY", "EXAMINE")
    } else {
        ("READ-WRITE", "SELECT")
    };
    let resp = format!("{tag} OK [{code}] {command} completed\r\n");
    let _ = write_line(stream, &resp).await;
    Some(folder_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake_imap::mailbox::MailboxBuilder;
    use tokio::io::BufReader;

    async fn run(folder_name: &str, read_only: bool, mailbox: &Mailbox) -> (String, Option<String>) {
        let (client, server) = tokio::io::duplex(4096);
        let mut stream = BufReader::new(server);

        let selected = handle_select("A1", folder_name, read_only, mailbox, &mut stream).await;
        drop(stream);

        let mut buf = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut BufReader::new(client), &mut buf)
            .await
            .unwrap();
        (String::from_utf8(buf).unwrap(), selected)
    }

    #[tokio::test]
    async fn selects_existing_folder() {
        let mailbox = MailboxBuilder::new()
            .folder("Archive.2023")
            .email(1, false, b"a")
            .email(2, true, b"b")
            .build();

        let (output, selected) = run("Archive.2023", false, &mailbox).await;

        assert_eq!(selected.as_deref(), Some("Archive.2023"));
        assert!(output.contains("* 2 EXISTS"));
        assert!(output.contains("* OK [UIDNEXT 3]"));
        assert!(output.ends_with("A1 OK [READ-WRITE] SELECT completed\r\n"));
    }

    #[tokio::test]
    async fn examine_is_read_only() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();
        let (output, _) = run("INBOX", true, &mailbox).await;
        assert!(output.contains("[READ-ONLY] EXAMINE"));
    }

    #[tokio::test]
    async fn returns_none_for_missing_folder() {
        let mailbox = MailboxBuilder::new().folder("INBOX").build();

        let (output, selected) = run("Nope", false, &mailbox).await;

        assert!(selected.is_none());
        assert!(output.contains("A1 NO Folder not found"));
    }
}
