pub mod gemini;

use crate::domain::model::{Conversation, LocationStatus};
use crate::domain::ports::MessageGenerator;
use async_trait::async_trait;

pub use gemini::GeminiGenerator;

pub const WELCOME_FALLBACK: &str = "Thanks for joining the movement! We'll be in touch soon.";
pub const WELCOME_EMPTY: &str = "Welcome to the circular fashion revolution!";
pub const CHAT_DISABLED: &str =
    "AI is currently unavailable, but you can still explore ReWear normally.";
pub const CHAT_EMPTY: &str = "I'm having a little trouble connecting to the fashion grid right now.";
pub const CHAT_FALLBACK: &str = "Oops, I dropped the thread. Can you say that again?";

/// Used when no API key is configured. Always answers with fixed text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticGenerator;

#[async_trait]
impl MessageGenerator for StaticGenerator {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn welcome_message(&self, _status: &LocationStatus) -> String {
        WELCOME_FALLBACK.to_string()
    }

    async fn chat_reply(&self, _conversation: &Conversation, _user_text: &str) -> String {
        CHAT_DISABLED.to_string()
    }
}
