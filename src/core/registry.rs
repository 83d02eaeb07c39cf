use crate::domain::model::{CanonicalEmail, RegisterResult, WaitlistEntry};
use crate::domain::ports::WaitlistStore;
use crate::utils::error::Result;
use chrono::Utc;
use std::sync::Arc;

/// Email signups on top of a [`WaitlistStore`].
///
/// There is no lock here. Two registrations of the same address may run
/// side by side and both reach the store; the store's insert-if-absent is
/// what keeps the list unique.
#[derive(Clone)]
pub struct WaitlistRegistry {
    store: Arc<dyn WaitlistStore>,
}

impl WaitlistRegistry {
    pub fn new(store: Arc<dyn WaitlistStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, raw_email: &str) -> Result<RegisterResult> {
        let email = CanonicalEmail::parse(raw_email)?;
        tracing::debug!("Registering {}", email);

        let newly_registered = self
            .store
            .insert_if_absent(WaitlistEntry::new(email, Utc::now()))
            .await?;

        // 寫入後再讀，回傳的人數包含這次報名
        let count = self.store.count().await?;

        if newly_registered {
            tracing::info!("New waitlist signup, total is now {}", count);
        } else {
            tracing::info!("Duplicate signup ignored, total stays {}", count);
        }

        Ok(RegisterResult {
            count,
            newly_registered,
        })
    }

    pub async fn count(&self) -> Result<u64> {
        self.store.count().await
    }

    pub async fn lookup(&self, raw_email: &str) -> Result<Option<WaitlistEntry>> {
        let email = CanonicalEmail::parse(raw_email)?;
        self.store.get(&email).await
    }
}
