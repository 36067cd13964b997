#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! CLI for browsing an IMAP mailbox folder by folder

use clap::{Parser, Subcommand};
use mailbox_connector::{Folder, ImapConfig, ImapConnector, Message};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mailbox-cli")]
#[command(about = "Browse IMAP folders and messages")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show a folder, its subfolders and its messages
    Folder {
        /// Folder path (defaults to the session's current folder)
        path: Option<String>,

        /// List every descendant instead of direct children only
        #[arg(long)]
        recursive: bool,
    },

    /// Show a single message by sequence number
    Show {
        /// Message sequence number
        number: u32,

        /// Folder containing the message
        #[arg(long)]
        folder: Option<String>,
    },

    /// Delete a message by sequence number and expunge the folder
    Delete {
        /// Message sequence number
        number: u32,

        /// Folder containing the message
        #[arg(long)]
        folder: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ImapConfig::from_env()?;
    let mut connector = ImapConnector::from_config(&config);

    let result = match &args.command {
        Command::Folder { path, recursive } => {
            cmd_folder(&mut connector, &args, path.as_deref(), *recursive).await
        }
        Command::Show { number, folder } => {
            cmd_show(&mut connector, &args, *number, folder.as_deref()).await
        }
        Command::Delete { number, folder } => {
            cmd_delete(&mut connector, *number, folder.as_deref()).await
        }
    };

    // Close even when the command failed, but report the command's error
    // first.
    let closed = connector.close().await;
    result?;
    Ok(closed?)
}

async fn cmd_folder(
    connector: &mut ImapConnector,
    args: &Args,
    path: Option<&str>,
    recursive: bool,
) -> anyhow::Result<()> {
    let folder = connector.get_folder(path, recursive).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&folder)?);
    } else {
        print_folder(&folder);
    }

    Ok(())
}

async fn cmd_show(
    connector: &mut ImapConnector,
    args: &Args,
    number: u32,
    folder: Option<&str>,
) -> anyhow::Result<()> {
    let message = connector.get_message(number, folder).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&message)?);
    } else {
        print_message_detail(&message);
    }

    Ok(())
}

async fn cmd_delete(
    connector: &mut ImapConnector,
    number: u32,
    folder: Option<&str>,
) -> anyhow::Result<()> {
    connector.delete_message(number, folder).await?;
    println!("Deleted message {number}");
    Ok(())
}

fn print_folder(folder: &Folder) {
    println!("Folder: {}", folder.path());

    if !folder.subfolders().is_empty() {
        println!("\n--- Subfolders ---");
        for sub in folder.subfolders() {
            println!("  {}", sub.path());
        }
    }

    let messages = folder.messages();
    if messages.is_empty() {
        println!("\nNo messages found.");
        return;
    }

    println!();
    let header = format!("{:<6} {:<20} {:<30} {}", "No.", "Date", "From", "Subject");
    println!("{header}");
    println!("{}", "-".repeat(100));

    for message in messages {
        println!(
            "{:<6} {:<20} {:<30} {}",
            message.number,
            message
                .date
                .map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d %H:%M").to_string()),
            truncate(message.from.as_deref().unwrap_or("-"), 28),
            truncate(message.subject.as_deref().unwrap_or(""), 40),
        );
    }

    println!("\n{} message(s)", messages.len());
}

fn print_message_detail(message: &Message) {
    println!("No.:     {}", message.number);
    if let Some(date) = message.date {
        println!("Date:    {}", date.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("From:    {}", message.from.as_deref().unwrap_or("-"));
    if !message.to.is_empty() {
        println!("To:      {}", message.to.join(", "));
    }
    println!("Subject: {}", message.subject.as_deref().unwrap_or(""));
    if let Some(id) = &message.message_id {
        println!("Msg-ID:  {id}");
    }

    println!("\n--- Body ---\n");
    println!("{}", message.text.as_deref().unwrap_or(&message.body));
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}
