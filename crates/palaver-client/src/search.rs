//! Debounced room search.
//!
//! The raw query follows every keystroke.  The applied query only changes
//! once typing has paused for the quiet period, and is published on a watch
//! channel so readers always see the latest value.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use palaver_store::Chatroom;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::events::{EventBus, StoreEvent};
use crate::registry::filter_rooms;

pub struct SearchFilter {
    raw: Mutex<String>,
    debounced: Arc<watch::Sender<String>>,
    pending: Mutex<Option<JoinHandle<()>>>,
    quiet_period: Duration,
    events: EventBus,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SearchFilter {
    pub fn new(quiet_period: Duration, events: EventBus) -> Self {
        let (tx, _) = watch::channel(String::new());
        Self {
            raw: Mutex::new(String::new()),
            debounced: Arc::new(tx),
            pending: Mutex::new(None),
            quiet_period,
            events,
        }
    }

    /// Record a keystroke.  Restarts the quiet period; only the last query
    /// of a burst is ever applied.
    pub fn set_query(&self, raw: impl Into<String>) {
        let raw = raw.into();
        *guard(&self.raw) = raw.clone();

        let debounced = self.debounced.clone();
        let events = self.events.clone();
        let quiet_period = self.quiet_period;
        let task = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            let changed = debounced.send_if_modified(|current| {
                if *current == raw {
                    false
                } else {
                    *current = raw.clone();
                    true
                }
            });
            if changed {
                debug!(query = %raw, "search query applied");
                events.emit(StoreEvent::SearchApplied { query: raw });
            }
        });

        if let Some(previous) = guard(&self.pending).replace(task) {
            previous.abort();
        }
    }

    pub fn raw_query(&self) -> String {
        guard(&self.raw).clone()
    }

    pub fn debounced_query(&self) -> String {
        self.debounced.borrow().clone()
    }

    /// Watch the applied query.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.debounced.subscribe()
    }

    /// Rooms matching the applied query.
    pub fn results(&self, rooms: &[Chatroom]) -> Vec<Chatroom> {
        filter_rooms(rooms, &self.debounced.borrow())
    }
}

impl Drop for SearchFilter {
    fn drop(&mut self) {
        if let Some(task) = guard(&self.pending).take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const QUIET: Duration = Duration::from_millis(300);

    fn rooms(titles: &[&str]) -> Vec<Chatroom> {
        titles.iter().map(|t| Chatroom::new(*t, Utc::now())).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn burst_applies_only_last_query() {
        let bus = EventBus::new();
        let mut events = bus.subscribe();
        let search = SearchFilter::new(QUIET, bus);
        let mut applied = search.subscribe();

        for query in ["a", "ab", "abc"] {
            search.set_query(query);
            assert_eq!(search.raw_query(), query);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(search.debounced_query(), "");

        tokio::time::sleep(QUIET).await;
        assert_eq!(search.debounced_query(), "abc");
        assert!(applied.has_changed().unwrap());
        assert_eq!(*applied.borrow_and_update(), "abc");

        assert_eq!(
            events.recv().await.unwrap(),
            StoreEvent::SearchApplied {
                query: "abc".into()
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn results_follow_debounced_query() {
        let search = SearchFilter::new(QUIET, EventBus::new());
        let all = rooms(&["Casual Chat", "Tech Talk", "Quick Questions"]);

        search.set_query("tech");
        assert_eq!(search.results(&all).len(), 3);

        tokio::time::sleep(QUIET + Duration::from_millis(1)).await;
        let titles: Vec<_> = search.results(&all).into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Tech Talk"]);

        search.set_query("");
        tokio::time::sleep(QUIET + Duration::from_millis(1)).await;
        assert_eq!(search.results(&all), all);
    }

    #[tokio::test(start_paused = true)]
    async fn same_query_does_not_republish() {
        let bus = EventBus::new();
        let mut events = bus.subscribe();
        let search = SearchFilter::new(QUIET, bus);

        search.set_query("deep");
        tokio::time::sleep(QUIET * 2).await;
        search.set_query("deep");
        tokio::time::sleep(QUIET * 2).await;

        assert!(matches!(
            events.try_recv(),
            Ok(StoreEvent::SearchApplied { .. })
        ));
        assert!(events.try_recv().is_err());
    }
}
