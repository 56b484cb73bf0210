use palaver_store::UserProfile;
use tracing::info;

use crate::session::Session;
use crate::state::{lock, Preferences};

impl Session {
    pub fn user(&self) -> Option<UserProfile> {
        lock(&self.state).user().cloned()
    }

    pub fn login(&self, profile: UserProfile) {
        lock(&self.state).login(profile);
    }

    pub fn logout(&self) {
        lock(&self.state).logout();
    }

    pub fn preferences(&self) -> Preferences {
        lock(&self.state).preferences()
    }

    /// Flip dark mode and return the new value.
    pub fn toggle_dark_mode(&self) -> bool {
        lock(&self.state).toggle_dark_mode()
    }

    pub fn set_dark_mode(&self, enabled: bool) {
        lock(&self.state).set_dark_mode(enabled);
    }

    pub fn set_sidebar_open(&self, open: bool) {
        lock(&self.state).set_sidebar_open(open);
    }

    /// Forget everything: rooms, messages, user and preferences, both in
    /// memory and in the mirror.  Pending work is cancelled first.
    pub fn wipe(&self) {
        self.tasks.cancel_all();
        lock(&self.state).reset();
        info!("session wiped");
    }
}
