use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Thread-safe store of chunked uploads keyed by an opaque session id.
///
/// Kept apart from the entity state so appends do not contend with the
/// entity lock. Clones share the same storage.
#[derive(Debug, Default)]
pub struct FileUploads {
    storage: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl Clone for FileUploads {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl FileUploads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new empty session and return its id.
    pub fn initiate(&self) -> String {
        let session_id = format!("{}:{}", std::process::id(), Uuid::new_v4().simple());
        self.storage
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.clone(), Vec::new());
        session_id
    }

    /// Append a chunk, returning the cumulative size, or `None` for an unknown session.
    pub fn append(&self, session_id: &str, chunk: &[u8]) -> Option<u64> {
        let mut storage = self.storage.write().unwrap_or_else(PoisonError::into_inner);
        let bytes = storage.get_mut(session_id)?;
        bytes.extend_from_slice(chunk);
        Some(bytes.len() as u64)
    }

    pub fn size(&self, session_id: &str) -> Option<u64> {
        self.storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .map(|bytes| bytes.len() as u64)
    }

    /// Copy of the uploaded bytes; the session stays open.
    pub fn get(&self, session_id: &str) -> Option<Vec<u8>> {
        self.storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    /// Close a session, returning whatever it held.
    pub fn remove(&self, session_id: &str) -> Option<Vec<u8>> {
        self.storage
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.storage
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(session_id)
    }

    pub fn clear(&self) {
        self.storage
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn stats(&self) -> UploadStats {
        let storage = self.storage.read().unwrap_or_else(PoisonError::into_inner);
        UploadStats {
            open_sessions: storage.len(),
            total_bytes: storage.values().map(|bytes| bytes.len() as u64).sum(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadStats {
    pub open_sessions: usize,
    pub total_bytes: u64,
}
