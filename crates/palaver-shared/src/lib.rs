//! # palaver-shared
//!
//! Identifiers, constants, the caller-facing error taxonomy and small
//! validation / formatting helpers shared by every palaver crate.

pub mod constants;
pub mod error;
pub mod time;
pub mod types;
pub mod validate;

pub use error::ChatError;
pub use types::{ChatroomId, MessageId, MessageKind, MessageStatus};
pub use validate::ImageAttachment;
