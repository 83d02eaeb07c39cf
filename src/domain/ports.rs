use crate::domain::model::{CanonicalEmail, Conversation, LocationStatus, WaitlistEntry};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Durable home of the waitlist. Implementations own the uniqueness
/// guarantee: `insert_if_absent` must be atomic with respect to other
/// callers inserting the same email.
#[async_trait]
pub trait WaitlistStore: Send + Sync {
    /// Returns `true` if the entry was created, `false` if the email was
    /// already present (the stored entry is left untouched).
    async fn insert_if_absent(&self, entry: WaitlistEntry) -> Result<bool>;

    async fn count(&self) -> Result<u64>;

    async fn get(&self, email: &CanonicalEmail) -> Result<Option<WaitlistEntry>>;
}

/// Produces the friendly text shown after signup and in the FAQ chat.
/// Failures are absorbed here and turned into fallback strings.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    fn is_enabled(&self) -> bool;

    async fn welcome_message(&self, status: &LocationStatus) -> String;

    async fn chat_reply(&self, conversation: &Conversation, user_text: &str) -> String;
}
