//! Minimum-interval gate in front of assistant replies.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use palaver_shared::ChatroomId;
use tokio::time::Instant;

/// Whether the reply interval is shared by all rooms or tracked per room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThrottleScope {
    /// One assistant identity: one window for the whole session.
    #[default]
    Global,
    PerRoom,
}

impl FromStr for ThrottleScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "per-room" | "per_room" | "room" => Ok(Self::PerRoom),
            other => Err(format!("unknown throttle scope: {other}")),
        }
    }
}

/// Minimum-interval gate in front of assistant replies.
#[derive(Debug)]
pub struct ReplyThrottle {
    scope: ThrottleScope,
    min_interval: Duration,
    last_accepted: HashMap<Option<ChatroomId>, Instant>,
}

impl ReplyThrottle {
    pub fn new(min_interval: Duration, scope: ThrottleScope) -> Self {
        Self {
            scope,
            min_interval,
            last_accepted: HashMap::new(),
        }
    }

    fn key(&self, room: ChatroomId) -> Option<ChatroomId> {
        match self.scope {
            ThrottleScope::Global => None,
            ThrottleScope::PerRoom => Some(room),
        }
    }

    /// Check without recording anything.  `Err` carries the remaining wait.
    pub fn check(&self, room: ChatroomId, now: Instant) -> Result<(), Duration> {
        match self.last_accepted.get(&self.key(room)) {
            Some(last) => {
                let elapsed = now.duration_since(*last);
                if elapsed < self.min_interval {
                    Err(self.min_interval - elapsed)
                } else {
                    Ok(())
                }
            }
            None => Ok(()),
        }
    }

    /// Record an accepted trigger.
    pub fn accept(&mut self, room: ChatroomId, now: Instant) {
        let key = self.key(room);
        self.last_accepted.insert(key, now);
    }

    pub fn try_acquire(&mut self, room: ChatroomId, now: Instant) -> Result<(), Duration> {
        self.check(room, now)?;
        self.accept(room, now);
        Ok(())
    }

    /// Drop windows that have already elapsed.
    pub fn purge_stale(&mut self, now: Instant) {
        let min_interval = self.min_interval;
        self.last_accepted
            .retain(|_, last| now.duration_since(*last) < min_interval);
    }

    pub fn forget_room(&mut self, room: ChatroomId) {
        self.last_accepted.remove(&Some(room));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(3_000);

    #[test]
    fn test_global_window_blocks_other_rooms() {
        let mut throttle = ReplyThrottle::new(INTERVAL, ThrottleScope::Global);
        let t0 = Instant::now();
        let (a, b) = (ChatroomId::new(), ChatroomId::new());

        assert!(throttle.try_acquire(a, t0).is_ok());
        let wait = throttle
            .try_acquire(b, t0 + Duration::from_millis(1_000))
            .unwrap_err();
        assert_eq!(wait, Duration::from_millis(2_000));

        assert!(throttle.try_acquire(b, t0 + INTERVAL).is_ok());
    }

    #[test]
    fn test_per_room_windows_are_independent() {
        let mut throttle = ReplyThrottle::new(INTERVAL, ThrottleScope::PerRoom);
        let t0 = Instant::now();
        let (a, b) = (ChatroomId::new(), ChatroomId::new());

        assert!(throttle.try_acquire(a, t0).is_ok());
        assert!(throttle.try_acquire(b, t0).is_ok());
        assert!(throttle.try_acquire(a, t0 + Duration::from_millis(10)).is_err());

        throttle.forget_room(a);
        assert!(throttle.try_acquire(a, t0 + Duration::from_millis(10)).is_ok());
    }

    #[test]
    fn test_rejection_records_nothing() {
        let mut throttle = ReplyThrottle::new(INTERVAL, ThrottleScope::Global);
        let t0 = Instant::now();
        let room = ChatroomId::new();

        throttle.accept(room, t0);
        assert!(throttle.try_acquire(room, t0 + Duration::from_millis(2_999)).is_err());
        // The rejected attempt must not have extended the window.
        assert!(throttle.try_acquire(room, t0 + INTERVAL).is_ok());
    }

    #[test]
    fn test_purge_stale() {
        let mut throttle = ReplyThrottle::new(INTERVAL, ThrottleScope::PerRoom);
        let t0 = Instant::now();
        throttle.accept(ChatroomId::new(), t0);

        throttle.purge_stale(t0 + INTERVAL);
        assert!(throttle.last_accepted.is_empty());
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!("global".parse::<ThrottleScope>().unwrap(), ThrottleScope::Global);
        assert_eq!("Per-Room".parse::<ThrottleScope>().unwrap(), ThrottleScope::PerRoom);
        assert!("sometimes".parse::<ThrottleScope>().is_err());
    }
}
