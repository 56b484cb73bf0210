//! # palaver-client
//!
//! Client-resident chat session store: rooms, their message logs, backward
//! pagination, throttled assistant replies and debounced room search, all
//! mirrored into a key-value store that never fails loudly.
//!
//! Start with [`Session`].

pub mod commands;
pub mod config;
pub mod events;
pub mod history;
pub mod pagination;
pub mod preferences;
pub mod registry;
pub mod responder;
pub mod search;
pub mod session;
pub mod state;
pub mod tasks;
pub mod throttle;

mod log;

pub use commands::messaging::SendReceipt;
pub use config::ClientConfig;
pub use events::{EventBus, StoreEvent};
pub use history::{HistoryRequest, HistorySource, SimulatedHistory};
pub use pagination::LoadOutcome;
pub use session::Session;
pub use state::{PageState, Preferences};
pub use throttle::ThrottleScope;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber.  `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("palaver_client=debug,palaver_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
