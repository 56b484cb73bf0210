//! Signed-in user and UI preferences.

use palaver_store::{StorageKey, UserProfile};
use tracing::info;

use crate::state::{ChatState, Preferences};

impl ChatState {
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Remember the user handed over by the sign-in flow.
    pub fn login(&mut self, profile: UserProfile) {
        info!(user = %profile.id, "user signed in");
        self.mirror.set(StorageKey::AuthUser, &profile);
        self.user = Some(profile);
    }

    /// Forget the user.  Chat data stays.
    pub fn logout(&mut self) {
        if self.user.take().is_some() {
            info!("user signed out");
        }
        self.mirror.remove(StorageKey::AuthUser);
    }

    pub fn preferences(&self) -> Preferences {
        self.preferences
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.preferences.dark_mode = enabled;
        self.mirror.set(StorageKey::DarkMode, &enabled);
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        let enabled = !self.preferences.dark_mode;
        self.set_dark_mode(enabled);
        enabled
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.preferences.sidebar_open = open;
        self.mirror.set(StorageKey::SidebarOpen, &open);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::empty_state;
    use chrono::Utc;
    use palaver_store::DurableMirror;

    fn profile() -> UserProfile {
        UserProfile {
            id: "u-1".into(),
            phone: "5551234567".into(),
            country_code: "+1".into(),
            name: "User 4567".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn preferences_survive_reload() {
        let (mut state, backend) = empty_state();
        assert!(state.toggle_dark_mode());
        state.set_sidebar_open(false);

        let reloaded = ChatState::load(DurableMirror::new(Box::new(backend)));
        assert_eq!(
            reloaded.preferences(),
            Preferences {
                dark_mode: true,
                sidebar_open: false
            }
        );
    }

    #[test]
    fn login_logout_round_trip() {
        let (mut state, backend) = empty_state();
        let user = profile();
        state.login(user.clone());

        let reloaded = ChatState::load(DurableMirror::new(Box::new(backend.clone())));
        assert_eq!(reloaded.user(), Some(&user));

        state.logout();
        assert!(state.user().is_none());
        let reloaded = ChatState::load(DurableMirror::new(Box::new(backend)));
        assert!(reloaded.user().is_none());
    }
}
