//! In-process backend

use super::KvBackend;
use crate::error::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

/// HashMap-backed storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_and_remove() {
        let backend = MemoryBackend::new();
        assert!(backend.is_empty());

        backend.set("usage-stats", "{}").unwrap();
        backend.set("usage-stats", r#"{"uploads":1}"#).unwrap();
        assert_eq!(backend.len(), 1);
        assert_eq!(
            backend.get("usage-stats").unwrap().as_deref(),
            Some(r#"{"uploads":1}"#)
        );

        backend.remove("usage-stats").unwrap();
        backend.remove("usage-stats").unwrap();
        assert_eq!(backend.get("usage-stats").unwrap(), None);
    }
}
