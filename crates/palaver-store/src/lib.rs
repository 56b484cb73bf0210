//! # palaver-store
//!
//! The durable mirror behind the in-memory chat store.
//!
//! Values are JSON documents stored under a handful of well-known keys. The
//! crate offers a SQLite-backed [`Database`] and an in-process
//! [`MemoryBackend`], both behind the [`KvBackend`] trait, and wraps either
//! in a [`DurableMirror`] that never lets a storage failure reach the caller.

pub mod backend;
pub mod database;
pub mod keys;
pub mod kv;
pub mod migrations;
pub mod mirror;
pub mod models;

mod error;

pub use backend::{KvBackend, MemoryBackend};
pub use database::Database;
pub use error::StoreError;
pub use keys::StorageKey;
pub use mirror::DurableMirror;
pub use models::*;
