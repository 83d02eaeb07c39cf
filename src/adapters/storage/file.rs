use crate::domain::model::{CanonicalEmail, WaitlistEntry};
use crate::domain::ports::WaitlistStore;
use crate::utils::error::{Result, WaitlistError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Waitlist kept in a single JSON document on local disk.
///
/// The whole file is rewritten on every new signup. The lock is held across
/// check, insert and write, so concurrent registrations of one address
/// serialize here.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<CanonicalEmail, WaitlistEntry>>,
}

impl FileStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = Self::load(&path).await?;

        tracing::info!(
            "Opened waitlist file {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(path: &Path) -> Result<BTreeMap<CanonicalEmail, WaitlistEntry>> {
        let mut entries = BTreeMap::new();

        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => {
                return Err(WaitlistError::storage(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(entries);
        }

        let list: Vec<WaitlistEntry> = serde_json::from_slice(&data).map_err(|e| {
            WaitlistError::storage(format!("corrupt waitlist file {}: {}", path.display(), e))
        })?;

        for entry in list {
            // 重複的 email 只保留第一筆
            entries.entry(entry.email.clone()).or_insert(entry);
        }

        Ok(entries)
    }

    async fn persist(&self, entries: &BTreeMap<CanonicalEmail, WaitlistEntry>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let list: Vec<&WaitlistEntry> = entries.values().collect();
        let data = serde_json::to_vec_pretty(&list)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl WaitlistStore for FileStore {
    async fn insert_if_absent(&self, entry: WaitlistEntry) -> Result<bool> {
        let mut entries = self.entries.lock().await;
        if entries.contains_key(&entry.email) {
            return Ok(false);
        }

        let email = entry.email.clone();
        entries.insert(email.clone(), entry);

        if let Err(e) = self.persist(&entries).await {
            entries.remove(&email);
            tracing::error!("Failed to write waitlist file {}: {}", self.path.display(), e);
            return Err(WaitlistError::storage(format!("write failed: {}", e)));
        }

        Ok(true)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.entries.lock().await.len() as u64)
    }

    async fn get(&self, email: &CanonicalEmail) -> Result<Option<WaitlistEntry>> {
        Ok(self.entries.lock().await.get(email).cloned())
    }
}
