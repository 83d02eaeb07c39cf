use crate::domain::model::{CanonicalEmail, WaitlistEntry};
use crate::domain::ports::WaitlistStore;
use crate::utils::error::{Result, WaitlistError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Process-local store. Nothing survives a restart; meant for tests and
/// local development.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<CanonicalEmail, WaitlistEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<CanonicalEmail, WaitlistEntry>>> {
        self.entries
            .lock()
            .map_err(|_| WaitlistError::storage("memory store lock poisoned"))
    }
}

#[async_trait]
impl WaitlistStore for MemoryStore {
    async fn insert_if_absent(&self, entry: WaitlistEntry) -> Result<bool> {
        let mut entries = self.lock()?;
        if entries.contains_key(&entry.email) {
            return Ok(false);
        }
        entries.insert(entry.email.clone(), entry);
        Ok(true)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.lock()?.len() as u64)
    }

    async fn get(&self, email: &CanonicalEmail) -> Result<Option<WaitlistEntry>> {
        Ok(self.lock()?.get(email).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_second_insert_is_ignored() {
        let store = MemoryStore::new();
        let email = CanonicalEmail::parse("a@b.com").unwrap();
        let first = WaitlistEntry::new(email.clone(), Utc::now());

        assert!(tokio_test::block_on(store.insert_if_absent(first.clone())).unwrap());
        let later = WaitlistEntry::new(email.clone(), Utc::now() + chrono::Duration::hours(1));
        assert!(!tokio_test::block_on(store.insert_if_absent(later)).unwrap());

        assert_eq!(tokio_test::block_on(store.count()).unwrap(), 1);
        let stored = tokio_test::block_on(store.get(&email)).unwrap().unwrap();
        assert_eq!(stored.created_at, first.created_at);
    }
}
