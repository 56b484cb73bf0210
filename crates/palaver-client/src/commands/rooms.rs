use palaver_shared::ChatroomId;
use palaver_store::Chatroom;
use tracing::debug;

use crate::events::StoreEvent;
use crate::session::Session;
use crate::state::lock;

impl Session {
    /// All rooms, newest created first.
    pub fn list_rooms(&self) -> Vec<Chatroom> {
        lock(&self.state).rooms().to_vec()
    }

    pub fn room(&self, id: ChatroomId) -> Option<Chatroom> {
        lock(&self.state).room(id).cloned()
    }

    /// Most recently active rooms, for the dashboard.
    pub fn recent_rooms(&self, limit: usize) -> Vec<Chatroom> {
        lock(&self.state).recent_rooms(limit)
    }

    pub fn create_room(&self, title: Option<&str>) -> Chatroom {
        let room = lock(&self.state).create_room(title);
        self.events.emit(StoreEvent::RoomCreated {
            chatroom_id: room.id,
        });
        room
    }

    /// Delete a room and everything hanging off it, including its pending
    /// history fetch and assistant reply.
    pub fn delete_room(&self, id: ChatroomId) -> bool {
        let removed = lock(&self.state).delete_room(id);
        let cancelled = self.tasks.cancel_room(id);
        self.responder.forget_room(id);

        if cancelled > 0 {
            debug!(room = %id, cancelled, "pending tasks cancelled");
        }
        if removed {
            self.events.emit(StoreEvent::RoomDeleted { chatroom_id: id });
        }
        removed
    }

    /// Make `id` the current room.  A room with an empty log starts loading
    /// its first history page.
    pub fn open_room(&self, id: ChatroomId) -> bool {
        let needs_history = {
            let mut state = lock(&self.state);
            if !state.open_room(id) {
                return false;
            }
            state.messages(id).is_empty()
        };
        if needs_history {
            self.pagination.load_older(id);
        }
        true
    }

    pub fn current_room(&self) -> Option<Chatroom> {
        lock(&self.state).current_room().cloned()
    }

    /// Record a search keystroke.  Results change once typing pauses.
    pub fn set_query(&self, raw: impl Into<String>) {
        self.search.set_query(raw);
    }

    pub fn raw_query(&self) -> String {
        self.search.raw_query()
    }

    pub fn debounced_query(&self) -> String {
        self.search.debounced_query()
    }

    /// Rooms matching the applied search query.
    pub fn filtered_rooms(&self) -> Vec<Chatroom> {
        let state = lock(&self.state);
        self.search.results(state.rooms())
    }
}
