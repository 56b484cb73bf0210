/// The well-known keys of the persisted key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// The signed-in user's profile.
    AuthUser,
    /// Ordered list of chatrooms.
    Chatrooms,
    /// Map of chatroom id to its message list.
    Messages,
    DarkMode,
    SidebarOpen,
}

impl StorageKey {
    pub const ALL: [StorageKey; 5] = [
        StorageKey::AuthUser,
        StorageKey::Chatrooms,
        StorageKey::Messages,
        StorageKey::DarkMode,
        StorageKey::SidebarOpen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthUser => "palaver_auth_user",
            Self::Chatrooms => "palaver_chatrooms",
            Self::Messages => "palaver_messages",
            Self::DarkMode => "palaver_dark_mode",
            Self::SidebarOpen => "palaver_sidebar_open",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
