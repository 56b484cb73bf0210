//! In-memory chat state shared by the session and its background tasks.
//!
//! [`ChatState`] is wrapped in `Arc<Mutex<>>` ([`SharedState`]).  Every lock
//! is taken for a short synchronous section and never held across an
//! `.await`, so each mutation lands atomically with respect to the pagination
//! and reply tasks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use palaver_shared::ChatroomId;
use palaver_store::{Chatroom, DurableMirror, Message, StorageKey, UserProfile};
use tracing::{info, warn};

pub type SharedState = Arc<Mutex<ChatState>>;

/// Lock the shared state.  A panic in another holder does not leave the data
/// half-written (every mutation is a single section), so poisoning is ignored.
pub fn lock(state: &SharedState) -> MutexGuard<'_, ChatState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-room progress of backward pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub has_more: bool,
    /// Next page to request, starting at 1.
    pub page: u32,
}

impl PageState {
    pub fn new() -> Self {
        Self {
            has_more: true,
            page: 1,
        }
    }

    /// Record one successful load.  Once past `ceiling` the room is
    /// exhausted for good.
    pub fn advance(&mut self, ceiling: u32) {
        self.page += 1;
        if self.page > ceiling {
            self.has_more = false;
        }
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new()
    }
}

/// UI preferences mirrored alongside the chat data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub dark_mode: bool,
    pub sidebar_open: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            dark_mode: false,
            sidebar_open: true,
        }
    }
}

/// The chat store: rooms, their message logs, pagination cursors and the
/// bits of UI state that outlive a single screen.
pub struct ChatState {
    pub(crate) rooms: Vec<Chatroom>,
    pub(crate) messages: HashMap<ChatroomId, Vec<Message>>,
    pub(crate) pages: HashMap<ChatroomId, PageState>,
    pub(crate) current: Option<ChatroomId>,
    pub(crate) is_typing: bool,
    pub(crate) user: Option<UserProfile>,
    pub(crate) preferences: Preferences,
    pub(crate) mirror: DurableMirror,
}

impl ChatState {
    /// Build the state from whatever the mirror holds.
    ///
    /// Missing or malformed records are skipped; message lists for rooms
    /// that no longer exist are dropped.
    pub fn load(mirror: DurableMirror) -> Self {
        let rooms: Vec<Chatroom> = mirror.get(StorageKey::Chatrooms).unwrap_or_default();
        let mut messages: HashMap<ChatroomId, Vec<Message>> =
            mirror.get(StorageKey::Messages).unwrap_or_default();

        let before = messages.len();
        messages.retain(|id, _| rooms.iter().any(|r| r.id == *id));
        if messages.len() != before {
            warn!(
                dropped = before - messages.len(),
                "discarding message logs of unknown chatrooms"
            );
        }

        let mut pages = HashMap::with_capacity(rooms.len());
        for room in &rooms {
            messages.entry(room.id).or_default();
            pages.insert(room.id, PageState::new());
        }

        let defaults = Preferences::default();
        let preferences = Preferences {
            dark_mode: mirror.get(StorageKey::DarkMode).unwrap_or(defaults.dark_mode),
            sidebar_open: mirror
                .get(StorageKey::SidebarOpen)
                .unwrap_or(defaults.sidebar_open),
        };
        let user = mirror.get(StorageKey::AuthUser);

        info!(
            rooms = rooms.len(),
            messages = messages.values().map(Vec::len).sum::<usize>(),
            signed_in = user.is_some(),
            "chat state loaded"
        );

        Self {
            rooms,
            messages,
            pages,
            current: None,
            is_typing: false,
            user,
            preferences,
            mirror,
        }
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    pub fn set_typing(&mut self, typing: bool) {
        self.is_typing = typing;
    }

    pub fn page_state(&self, id: ChatroomId) -> Option<PageState> {
        self.pages.get(&id).copied()
    }

    /// Advance the room's cursor after a successful load.
    pub fn advance_page(&mut self, id: ChatroomId, ceiling: u32) -> Option<PageState> {
        let state = self.pages.get_mut(&id)?;
        state.advance(ceiling);
        Some(*state)
    }

    /// Drop everything, in memory and in the mirror.
    pub fn reset(&mut self) {
        self.rooms.clear();
        self.messages.clear();
        self.pages.clear();
        self.current = None;
        self.is_typing = false;
        self.user = None;
        self.preferences = Preferences::default();
        self.mirror.clear();
        info!("chat state reset");
    }

    pub(crate) fn persist_rooms(&self) {
        self.mirror.set(StorageKey::Chatrooms, &self.rooms);
    }

    pub(crate) fn persist_messages(&self) {
        self.mirror.set(StorageKey::Messages, &self.messages);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use palaver_store::MemoryBackend;

    pub(crate) fn empty_state() -> (ChatState, MemoryBackend) {
        let backend = MemoryBackend::new();
        let state = ChatState::load(DurableMirror::new(Box::new(backend.clone())));
        (state, backend)
    }

    #[test]
    fn page_state_counts_up_and_exhausts() {
        let mut page = PageState::new();
        assert_eq!(page.page, 1);

        for expected in 2..=5 {
            page.advance(5);
            assert_eq!(page.page, expected);
            assert!(page.has_more);
        }

        page.advance(5);
        assert_eq!(page.page, 6);
        assert!(!page.has_more);

        page.advance(5);
        assert!(!page.has_more, "exhaustion never reverts");
    }

    #[test]
    fn load_from_empty_mirror() {
        let (state, _) = empty_state();
        assert!(state.rooms.is_empty());
        assert!(!state.is_typing());
        assert_eq!(state.preferences, Preferences::default());
        assert!(state.user.is_none());
    }

    #[test]
    fn load_discards_malformed_records() {
        let backend = MemoryBackend::new();
        backend.insert_raw(StorageKey::Chatrooms.as_str(), "[{\"id\": 42}]");
        backend.insert_raw(StorageKey::Messages.as_str(), "garbage");
        backend.insert_raw(StorageKey::DarkMode.as_str(), "true");

        let state = ChatState::load(DurableMirror::new(Box::new(backend)));
        assert!(state.rooms.is_empty());
        assert!(state.messages.is_empty());
        assert!(state.preferences.dark_mode);
    }

    #[test]
    fn load_drops_orphaned_logs() {
        let (mut state, backend) = empty_state();
        let room = state.create_room(None);
        state.append_message(room.id, Message::ai(room.id, "hi", chrono::Utc::now()));

        let orphan = ChatroomId::new();
        state.messages.insert(orphan, vec![Message::ai(orphan, "lost", chrono::Utc::now())]);
        state.persist_messages();

        let reloaded = ChatState::load(DurableMirror::new(Box::new(backend)));
        assert_eq!(reloaded.messages(room.id).len(), 1);
        assert!(reloaded.messages(orphan).is_empty());
        assert_eq!(reloaded.page_state(room.id), Some(PageState::new()));
    }

    #[test]
    fn reset_clears_mirror() {
        let (mut state, backend) = empty_state();
        state.create_room(Some("Deep Dive"));
        assert!(!backend.keys().is_empty());

        state.reset();
        assert!(state.rooms().is_empty());
        assert!(backend.keys().is_empty());
    }
}
