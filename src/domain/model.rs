use crate::utils::error::{Result, WaitlistError};
use crate::utils::validation::validate_range;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    // local-part "@" domain-with-dot, no whitespace anywhere
    Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is a valid regex")
});

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Range check for callers that receive coordinates from the outside world.
    /// The distance math itself never calls this.
    pub fn validate(&self) -> Result<()> {
        validate_range("latitude", self.latitude, -90.0, 90.0)
            .and_then(|_| validate_range("longitude", self.longitude, -180.0, 180.0))
            .map_err(|e| WaitlistError::validation(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceResult {
    pub miles: f64,
    pub within_range: bool,
}

/// What the front end knows about the visitor's location. A missing fix
/// (permission denied, unsupported device) is never in range.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationStatus {
    pub distance_miles: Option<f64>,
    pub within_range: bool,
}

impl LocationStatus {
    pub fn unknown() -> Self {
        Self::default()
    }
}

impl From<DistanceResult> for LocationStatus {
    fn from(result: DistanceResult) -> Self {
        Self {
            distance_miles: Some(result.miles),
            within_range: result.within_range,
        }
    }
}

/// Trimmed, lowercased address. The only way to build one is through
/// [`CanonicalEmail::parse`], so holding one means the shape check passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CanonicalEmail(String);

impl CanonicalEmail {
    pub fn parse(raw: &str) -> Result<Self> {
        let email = raw.trim().to_lowercase();
        if email.is_empty() || !EMAIL_SHAPE.is_match(&email) {
            return Err(WaitlistError::validation("Invalid email"));
        }
        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CanonicalEmail {
    type Error = WaitlistError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<CanonicalEmail> for String {
    fn from(email: CanonicalEmail) -> Self {
        email.0
    }
}

impl fmt::Display for CanonicalEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub email: CanonicalEmail,
    pub created_at: DateTime<Utc>,
}

impl WaitlistEntry {
    pub fn new(email: CanonicalEmail, created_at: DateTime<Utc>) -> Self {
        Self { email, created_at }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterResult {
    /// Total entries after the operation, read back from the store.
    pub count: u64,
    /// `false` when the email was already on the list.
    pub newly_registered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// Chat history owned by whoever is talking to the bot. Nothing about a
/// conversation is kept server side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: ChatRole::User,
            text: text.into(),
        });
    }

    pub fn push_model(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: ChatRole::Model,
            text: text.into(),
        });
    }

    /// Drop the oldest messages so at most `max` remain.
    pub fn keep_recent(&mut self, max: usize) {
        if self.messages.len() > max {
            let excess = self.messages.len() - max;
            self.messages.drain(..excess);
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_trimmed_and_lowercased() {
        let email = CanonicalEmail::parse("  Jane.Doe@Cornell.EDU \n").unwrap();
        assert_eq!(email.as_str(), "jane.doe@cornell.edu");
        assert_eq!(
            CanonicalEmail::parse(" A@B.com ").unwrap(),
            CanonicalEmail::parse("a@b.com").unwrap()
        );
    }

    #[test]
    fn test_malformed_emails_are_rejected() {
        for raw in ["nope", "", "   ", "a@b", "@b.com", "a@.com", "a b@c.com", "a@b.c om"] {
            let err = CanonicalEmail::parse(raw).unwrap_err();
            assert!(err.is_client_error(), "{raw:?} should be a validation error");
        }
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = WaitlistEntry::new(
            CanonicalEmail::parse("x@y.com").unwrap(),
            "2025-01-02T03:04:05Z".parse().unwrap(),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["email"], "x@y.com");
        assert_eq!(json["createdAt"], "2025-01-02T03:04:05Z");

        let bad = serde_json::json!({ "email": "not-an-email", "createdAt": "2025-01-02T03:04:05Z" });
        assert!(serde_json::from_value::<WaitlistEntry>(bad).is_err());
    }

    #[test]
    fn test_coordinate_range_check() {
        assert!(Coordinate::new(40.7, -73.9).validate().is_ok());
        assert!(Coordinate::new(91.0, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -180.5).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_conversation_keeps_most_recent_messages() {
        let mut conversation = Conversation::new();
        for i in 0..5 {
            conversation.push_user(format!("q{i}"));
            conversation.push_model(format!("a{i}"));
        }
        conversation.keep_recent(3);
        let texts: Vec<&str> = conversation.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["a3", "q4", "a4"]);
    }

    #[test]
    fn test_conversation_wire_format() {
        let conversation: Conversation = serde_json::from_str(
            r#"[{"role":"user","text":"hi"},{"role":"model","text":"hello"}]"#,
        )
        .unwrap();
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[1].role, ChatRole::Model);
    }
}
