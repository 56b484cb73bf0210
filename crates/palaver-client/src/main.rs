//! Terminal front end for a palaver session.
//!
//! Reads one command per line from stdin and prints store events as they
//! arrive.  Type `help` for the command list.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use palaver_client::{ClientConfig, LoadOutcome, Session, StoreEvent};
use palaver_shared::time::{format_clock, format_relative};
use palaver_shared::{ChatroomId, ImageAttachment, MessageKind};
use palaver_store::UserProfile;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

const HELP: &str = "\
commands:
  rooms                 list rooms (filtered by the current search)
  recent                rooms by latest activity
  new [title]           create a room
  del <n|id>            delete a room
  open <n|id>           make a room current
  say <text>            send a message to the current room
  img <path> [caption]  send an image to the current room
  log                   show the current room's messages
  more                  load older messages
  search [query]        filter rooms by title
  login <name> <phone>  sign in
  logout                sign out
  dark                  toggle dark mode
  sidebar <on|off>      show or hide the sidebar
  wipe                  forget everything
  quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    palaver_client::init_tracing();

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let session = Arc::new(Session::open(config));

    let printer = {
        let session = session.clone();
        let mut events = session.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => print_event(&session, event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event printer lagging");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    };

    // Forget elapsed reply windows every few minutes.
    let housekeeping = {
        let session = session.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                session.purge_stale();
            }
        })
    };

    println!(
        "{} {} - type `help` for commands",
        palaver_shared::constants::APP_NAME,
        env!("CARGO_PKG_VERSION")
    );

    tokio::select! {
        result = repl(&session) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "input loop failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    printer.abort();
    housekeeping.abort();
    Ok(())
}

async fn repl(session: &Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match cmd {
            "" => {}
            "help" => println!("{HELP}"),
            "quit" | "exit" => break,
            "rooms" => list(&session.filtered_rooms()),
            "recent" => list(&session.recent_rooms(5)),
            "new" => {
                let title = (!rest.is_empty()).then_some(rest);
                let room = session.create_room(title);
                session.open_room(room.id);
            }
            "del" => match resolve_room(session, rest) {
                Some(id) => {
                    session.delete_room(id);
                }
                None => println!("no such room"),
            },
            "open" => match resolve_room(session, rest) {
                Some(id) => {
                    session.open_room(id);
                    show_log(session, id);
                }
                None => println!("no such room"),
            },
            "say" => with_current(session, |id| {
                report_send(session.send_message(id, rest, None));
            }),
            "img" => with_current(session, |id| {
                let (path, caption) = rest.split_once(' ').unwrap_or((rest, ""));
                match read_image(Path::new(path)) {
                    Ok(image) => report_send(session.send_message(id, caption, Some(image))),
                    Err(e) => println!("! {e:#}"),
                }
            }),
            "log" => with_current(session, |id| show_log(session, id)),
            "more" => with_current(session, |id| match session.load_older(id) {
                LoadOutcome::Started { page } => println!("loading page {page}..."),
                LoadOutcome::AlreadyFetching => println!("already loading"),
                LoadOutcome::Exhausted => println!("no older messages"),
                LoadOutcome::UnknownRoom => println!("no such room"),
            }),
            "search" => session.set_query(rest),
            "login" => {
                let (name, phone) = rest.split_once(' ').unwrap_or((rest, ""));
                session.login(UserProfile {
                    id: format!("local-{}", Utc::now().timestamp_millis()),
                    phone: phone.trim().to_string(),
                    country_code: String::new(),
                    name: name.to_string(),
                    created_at: Utc::now(),
                });
                println!("signed in as {name}");
            }
            "logout" => session.logout(),
            "dark" => {
                let on = session.toggle_dark_mode();
                println!("dark mode {}", if on { "on" } else { "off" });
            }
            "sidebar" => session.set_sidebar_open(rest != "off"),
            "wipe" => session.wipe(),
            other => println!("unknown command `{other}`, try `help`"),
        }
    }
    Ok(())
}

fn with_current(session: &Session, f: impl FnOnce(ChatroomId)) {
    match session.current_room() {
        Some(room) => f(room.id),
        None => println!("open a room first"),
    }
}

/// A 1-based position in the room list, or a full id.
fn resolve_room(session: &Session, arg: &str) -> Option<ChatroomId> {
    let rooms = session.list_rooms();
    if let Ok(n) = arg.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| rooms.get(i)).map(|r| r.id);
    }
    let id = ChatroomId::parse(arg).ok()?;
    rooms.iter().any(|r| r.id == id).then_some(id)
}

fn list(rooms: &[palaver_store::Chatroom]) {
    if rooms.is_empty() {
        println!("(no rooms)");
    }
    let now = Utc::now();
    for (i, room) in rooms.iter().enumerate() {
        let when = room
            .last_message_time
            .map(|t| format_relative(t, now))
            .unwrap_or_default();
        println!("{:>2}. {:<20} {:<10} {}", i + 1, room.title, when, room.last_message);
    }
}

fn show_log(session: &Session, id: ChatroomId) {
    for message in session.messages(id) {
        let who = match message.kind {
            MessageKind::User => "you",
            MessageKind::Ai => "assistant",
            MessageKind::System => "*",
        };
        let image = if message.image.is_some() { " [image]" } else { "" };
        println!(
            "[{}] {who}: {}{image}",
            format_clock(message.timestamp),
            message.content
        );
    }
}

fn report_send(result: Result<palaver_client::SendReceipt, palaver_shared::ChatError>) {
    match result {
        Ok(receipt) => {
            if let Err(e) = receipt.reply {
                println!("! {e}");
            }
        }
        Err(e) => println!("! {e}"),
    }
}

fn read_image(path: &Path) -> anyhow::Result<ImageAttachment> {
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    };
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let url = format!("data:{mime};base64,{}", STANDARD.encode(bytes));
    Ok(ImageAttachment::from_data_url(&url)?)
}

fn print_event(session: &Session, event: StoreEvent) {
    match event {
        StoreEvent::MessageAppended {
            chatroom_id,
            message_id,
            kind: MessageKind::Ai,
        } => {
            if let Some(reply) = session
                .messages(chatroom_id)
                .into_iter()
                .find(|m| m.id == message_id)
            {
                println!("assistant: {}", reply.content);
            }
        }
        StoreEvent::TypingChanged { typing: true, .. } => println!("assistant is typing..."),
        StoreEvent::HistoryLoaded {
            count,
            page,
            has_more,
            ..
        } => {
            let more = if has_more { "" } else { ", no more history" };
            println!("loaded {count} older messages (next page {page}{more})");
        }
        StoreEvent::HistoryLoadFailed { error, .. } => println!("! {error}, try `more` again"),
        StoreEvent::SearchApplied { query } => {
            println!("search: {query:?}");
            list(&session.filtered_rooms());
        }
        StoreEvent::RoomCreated { chatroom_id } => {
            if let Some(room) = session.room(chatroom_id) {
                println!("created \"{}\"", room.title);
            }
        }
        StoreEvent::RoomDeleted { .. } => println!("room deleted"),
        _ => {}
    }
}
