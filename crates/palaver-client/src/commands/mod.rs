//! Public operations on a [`Session`](crate::Session).
//!
//! Each sub-module adds one `impl Session` block for a related group of
//! calls.  Every call takes the state lock for a short section, releases it,
//! and only then emits events or starts background work.

pub mod messaging;
pub mod rooms;
pub mod settings;
