use super::{CHAT_EMPTY, CHAT_FALLBACK, WELCOME_EMPTY, WELCOME_FALLBACK};
use crate::config::toml_config::GeneratorConfig;
use crate::domain::model::{ChatRole, Conversation, LocationStatus};
use crate::domain::ports::MessageGenerator;
use crate::utils::error::{Result, WaitlistError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_INSTRUCTION: &str = "You are the AI assistant for ReWear, a sustainable fashion marketplace. \n\
Our Mission: To transform how we consume fashion on campus through a circular economy.\n\
Our Vision: A world where clothes are shared, reused, and repurposed to minimize waste.\n\
Our Values: Sustainability, Community, Style.\n\
Context: We are currently in a waitlist phase. The app uses geo-targeting to connect local buyers and sellers (Launch Zone: 15 miles around Cornell Tech). \n\
Tone: Friendly, trendy, eco-conscious, helpful. Keep answers concise.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> Content<'a> {
    fn text(role: Option<&'a str>, text: &'a str) -> Self {
        Self {
            role,
            parts: vec![Part { text }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, `None` when blank.
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

pub fn welcome_prompt(status: &LocationStatus) -> String {
    let mut prompt = String::from(
        "Write a short, punchy, 1-sentence welcome message for a user joining the 'ReWear' sustainable fashion marketplace waitlist.",
    );

    match (status.within_range, status.distance_miles) {
        (true, Some(miles)) => prompt.push_str(&format!(
            " They are located just {:.1} miles from our campus hub. Mention that they will be among the first to trade.",
            miles
        )),
        (true, None) => prompt.push_str(
            " They are located near our campus hub. Mention that they will be among the first to trade.",
        ),
        (false, _) => prompt.push_str(
            " They are a bit far from our launch hub, but mention we are expanding globally soon.",
        ),
    }

    prompt.push_str(" Tone: Trendy, eco-conscious, excited. Do not use hashtags.");
    prompt
}

/// Google Gemini `generateContent` over plain HTTPS.
pub struct GeminiGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| WaitlistError::MissingConfigError {
                field: "generator.api_key".to_string(),
            })?;
        Self::new(
            &config.endpoint,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<Option<String>> {
        tracing::debug!("Calling Gemini model {}", self.model);

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WaitlistError::GeneratorError {
                message: format!("Gemini returned HTTP {}", status),
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.text())
    }
}

#[async_trait]
impl MessageGenerator for GeminiGenerator {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn welcome_message(&self, status: &LocationStatus) -> String {
        let prompt = welcome_prompt(status);
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content::text(Some("user"), &prompt)],
        };

        match self.generate(&request).await {
            Ok(Some(text)) => text,
            Ok(None) => WELCOME_EMPTY.to_string(),
            Err(e) => {
                tracing::error!("Gemini welcome message failed: {}", e);
                WELCOME_FALLBACK.to_string()
            }
        }
    }

    async fn chat_reply(&self, conversation: &Conversation, user_text: &str) -> String {
        let mut contents: Vec<Content<'_>> = conversation
            .messages()
            .iter()
            .map(|m| {
                let role = match m.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                };
                Content::text(Some(role), &m.text)
            })
            .collect();
        contents.push(Content::text(Some("user"), user_text));

        let request = GenerateRequest {
            system_instruction: Some(Content::text(None, SYSTEM_INSTRUCTION)),
            contents,
        };

        match self.generate(&request).await {
            Ok(Some(text)) => text,
            Ok(None) => CHAT_EMPTY.to_string(),
            Err(e) => {
                tracing::error!("Gemini chat reply failed: {}", e);
                CHAT_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_prompt_mentions_distance_when_local() {
        let prompt = welcome_prompt(&LocationStatus {
            distance_miles: Some(3.96),
            within_range: true,
        });
        assert!(prompt.contains("just 4.0 miles"));
        assert!(prompt.contains("among the first to trade"));
    }

    #[test]
    fn test_welcome_prompt_for_distant_user() {
        let prompt = welcome_prompt(&LocationStatus {
            distance_miles: Some(2448.0),
            within_range: false,
        });
        assert!(prompt.contains("expanding globally"));
        assert!(!prompt.contains("2448"));
    }

    #[test]
    fn test_response_text_extraction() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"there"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("Hello there"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.text(), None);

        let blank: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)
                .unwrap();
        assert_eq!(blank.text(), None);
    }
}
