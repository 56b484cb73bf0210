//! The session: one user's chat store and the background machinery around it.
//!
//! A [`Session`] owns the shared [`ChatState`], the event bus, the task
//! registry and the three timed components (pagination, replies, search).
//! Its public operations live in [`crate::commands`], grouped by area.

use std::sync::{Arc, Mutex};

use anyhow::Context;
use palaver_store::{Database, DurableMirror, KvBackend, MemoryBackend};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::events::{EventBus, StoreEvent};
use crate::history::{HistorySource, SimulatedHistory};
use crate::pagination::PaginationEngine;
use crate::responder::ThrottledResponder;
use crate::search::SearchFilter;
use crate::state::{lock, ChatState, SharedState};
use crate::tasks::TaskRegistry;
use crate::throttle::ReplyThrottle;

pub struct Session {
    pub(crate) config: ClientConfig,
    pub(crate) state: SharedState,
    pub(crate) events: EventBus,
    pub(crate) tasks: TaskRegistry,
    pub(crate) pagination: PaginationEngine,
    pub(crate) responder: ThrottledResponder,
    pub(crate) search: SearchFilter,
}

impl Session {
    /// Open the session over the SQLite mirror named by the config.
    ///
    /// If the database cannot be opened the session still starts, backed by
    /// memory only.
    pub fn open(config: ClientConfig) -> Self {
        let backend: Box<dyn KvBackend> = match open_database(&config) {
            Ok(db) => Box::new(db),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "durable storage unavailable, keeping data in memory");
                Box::new(MemoryBackend::new())
            }
        };
        Self::with_backend(config, backend)
    }

    pub fn with_backend(config: ClientConfig, backend: Box<dyn KvBackend>) -> Self {
        let source = Arc::new(SimulatedHistory::new(config.history_latency));
        Self::with_history_source(config, backend, source)
    }

    pub fn with_history_source(
        config: ClientConfig,
        backend: Box<dyn KvBackend>,
        source: Arc<dyn HistorySource>,
    ) -> Self {
        let mirror = DurableMirror::new(backend);
        let state: SharedState = Arc::new(Mutex::new(ChatState::load(mirror)));
        let events = EventBus::new();
        let tasks = TaskRegistry::new();

        let pagination = PaginationEngine::new(
            state.clone(),
            events.clone(),
            tasks.clone(),
            source,
            config.page_size,
            config.page_ceiling,
        );
        let responder = ThrottledResponder::new(
            state.clone(),
            events.clone(),
            tasks.clone(),
            ReplyThrottle::new(config.reply_interval, config.throttle_scope),
            config.typing_delay,
        );
        let search = SearchFilter::new(config.search_debounce, events.clone());

        info!(
            scope = ?config.throttle_scope,
            page_size = config.page_size,
            page_ceiling = config.page_ceiling,
            "session ready"
        );

        Self {
            config,
            state,
            events,
            tasks,
            pagination,
            responder,
            search,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Housekeeping for long-running sessions: forget elapsed reply windows.
    pub fn purge_stale(&self) {
        self.responder.purge_stale();
    }

    /// Run `f` against the locked state.  Keep it short; background tasks
    /// wait on the same lock.
    pub fn with_state<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R {
        f(&lock(&self.state))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.tasks.cancel_all();
    }
}

fn open_database(config: &ClientConfig) -> anyhow::Result<Database> {
    match &config.db_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            info!(path = %path.display(), "opening database");
            Database::open_at(path).with_context(|| format!("opening {}", path.display()))
        }
        None => Database::new().context("opening default database"),
    }
}
