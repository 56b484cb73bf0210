//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration.

use std::path::PathBuf;
use std::time::Duration;

use palaver_shared::constants::{
    AI_RESPONSE_DELAY_MS, AI_THROTTLE_INTERVAL_MS, HISTORY_LATENCY_MS, HISTORY_PAGE_CEILING,
    MESSAGES_PER_PAGE, SEARCH_DEBOUNCE_MS,
};

use crate::throttle::ThrottleScope;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// SQLite file backing the durable mirror.
    /// Env: `PALAVER_DB_PATH`
    /// Default: `None` (platform data directory).
    pub db_path: Option<PathBuf>,

    /// How long the assistant "types" before replying.
    /// Env: `PALAVER_TYPING_DELAY_MS`
    pub typing_delay: Duration,

    /// Minimum time between accepted reply triggers.
    /// Env: `PALAVER_REPLY_INTERVAL_MS`
    pub reply_interval: Duration,

    /// Env: `PALAVER_THROTTLE_SCOPE` (`global` / `per-room`)
    pub throttle_scope: ThrottleScope,

    /// Quiet period before a search query is applied.
    /// Env: `PALAVER_SEARCH_DEBOUNCE_MS`
    pub search_debounce: Duration,

    /// Messages per history page.
    /// Env: `PALAVER_PAGE_SIZE`
    pub page_size: usize,

    /// Number of history pages available per room.
    /// Env: `PALAVER_PAGE_CEILING`
    pub page_ceiling: u32,

    /// Simulated latency of one history fetch.
    /// Env: `PALAVER_HISTORY_LATENCY_MS`
    pub history_latency: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            typing_delay: Duration::from_millis(AI_RESPONSE_DELAY_MS),
            reply_interval: Duration::from_millis(AI_THROTTLE_INTERVAL_MS),
            throttle_scope: ThrottleScope::Global,
            search_debounce: Duration::from_millis(SEARCH_DEBOUNCE_MS),
            page_size: MESSAGES_PER_PAGE,
            page_ceiling: HISTORY_PAGE_CEILING,
            history_latency: Duration::from_millis(HISTORY_LATENCY_MS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reading from an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup("PALAVER_DB_PATH") {
            if !path.trim().is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(ms) = parse_var::<u64>(&lookup, "PALAVER_TYPING_DELAY_MS") {
            config.typing_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "PALAVER_REPLY_INTERVAL_MS") {
            config.reply_interval = Duration::from_millis(ms);
        }
        if let Some(scope) = parse_var::<ThrottleScope>(&lookup, "PALAVER_THROTTLE_SCOPE") {
            config.throttle_scope = scope;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "PALAVER_SEARCH_DEBOUNCE_MS") {
            config.search_debounce = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "PALAVER_HISTORY_LATENCY_MS") {
            config.history_latency = Duration::from_millis(ms);
        }

        match parse_var::<usize>(&lookup, "PALAVER_PAGE_SIZE") {
            Some(0) => tracing::warn!("PALAVER_PAGE_SIZE must be positive, using default"),
            Some(n) => config.page_size = n,
            None => {}
        }
        match parse_var::<u32>(&lookup, "PALAVER_PAGE_CEILING") {
            Some(0) => tracing::warn!("PALAVER_PAGE_CEILING must be positive, using default"),
            Some(n) => config.page_ceiling = n,
            None => {}
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(var = name, value = %raw, "Invalid value, using default");
            None
        }
    }
}
