//! Fail-soft, typed façade over a [`KvBackend`].
//!
//! Every mutation of the in-memory chat store is written through here right
//! after it is applied.  In-memory state stays authoritative for the session,
//! so a failed read is reported as "absent" and a failed write as a no-op;
//! both are logged and neither reaches the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::KvBackend;
use crate::keys::StorageKey;

pub struct DurableMirror {
    backend: Box<dyn KvBackend>,
}

impl DurableMirror {
    pub fn new(backend: Box<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Read and decode the value under `key`.
    ///
    /// Returns `None` when the key is missing, the backend fails, or the
    /// stored payload does not decode as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = match self.backend.get(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "mirror read failed, treating as absent");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "discarding corrupt mirrored value");
                None
            }
        }
    }

    /// Encode and store `value` under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "could not encode value for mirror");
                return;
            }
        };

        match self.backend.set(key.as_str(), &raw) {
            Ok(()) => debug!(key = %key, bytes = raw.len(), "mirrored"),
            Err(e) => warn!(key = %key, error = %e, "mirror write failed"),
        }
    }

    pub fn remove(&self, key: StorageKey) {
        if let Err(e) = self.backend.remove(key.as_str()) {
            warn!(key = %key, error = %e, "mirror remove failed");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.backend.clear() {
            warn!(error = %e, "mirror clear failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::{Result, StoreError};

    struct BrokenBackend;

    impl KvBackend for BrokenBackend {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(StoreError::Unavailable("disk on fire".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(StoreError::Unavailable("quota exceeded".into()))
        }
        fn remove(&self, _key: &str) -> Result<()> {
            Err(StoreError::Unavailable("read-only".into()))
        }
        fn clear(&self) -> Result<()> {
            Err(StoreError::Unavailable("read-only".into()))
        }
    }

    #[test]
    fn typed_round_trip() {
        let mirror = DurableMirror::new(Box::new(MemoryBackend::new()));
        mirror.set(StorageKey::DarkMode, &true);
        assert_eq!(mirror.get::<bool>(StorageKey::DarkMode), Some(true));

        mirror.remove(StorageKey::DarkMode);
        assert_eq!(mirror.get::<bool>(StorageKey::DarkMode), None);
    }

    #[test]
    fn corrupt_payload_reads_as_absent() {
        let backend = MemoryBackend::new();
        backend.insert_raw(StorageKey::Chatrooms.as_str(), "{not json");

        let mirror = DurableMirror::new(Box::new(backend));
        assert!(mirror.get::<Vec<String>>(StorageKey::Chatrooms).is_none());
    }

    #[test]
    fn wrong_shape_reads_as_absent() {
        let backend = MemoryBackend::new();
        backend.insert_raw(StorageKey::DarkMode.as_str(), "\"yes\"");

        let mirror = DurableMirror::new(Box::new(backend));
        assert!(mirror.get::<bool>(StorageKey::DarkMode).is_none());
    }

    #[test]
    fn backend_failures_never_escape() {
        let mirror = DurableMirror::new(Box::new(BrokenBackend));
        mirror.set(StorageKey::SidebarOpen, &false);
        mirror.remove(StorageKey::SidebarOpen);
        mirror.clear();
        assert_eq!(mirror.get::<bool>(StorageKey::SidebarOpen), None);
    }

    #[test]
    fn clear_drops_every_key() {
        let backend = MemoryBackend::new();
        let mirror = DurableMirror::new(Box::new(backend.clone()));
        for key in StorageKey::ALL {
            mirror.set(key, &1u8);
        }
        assert_eq!(backend.keys().len(), StorageKey::ALL.len());

        mirror.clear();
        assert!(backend.keys().is_empty());
    }
}
