use super::error::json_payload;
use super::state::AppState;
use crate::domain::model::{ChatMessage, Conversation, Coordinate, LocationStatus};
use crate::utils::error::WaitlistError;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type ApiResult<T> = Result<Json<T>, WaitlistError>;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub ok: bool,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationResponse {
    pub ok: bool,
    pub distance_miles: Option<f64>,
    pub within_range: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WelcomeRequest {
    pub within_range: bool,
    pub distance_miles: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeResponse {
    pub ok: bool,
    pub message: String,
    pub ai_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub history: Conversation,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub ok: bool,
    pub reply: String,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<CountResponse> {
    let request = json_payload(payload)?;
    let result = state.registry.register(&request.email).await?;

    Ok(Json(CountResponse {
        ok: true,
        count: result.count,
    }))
}

pub async fn count_handler(State(state): State<Arc<AppState>>) -> ApiResult<CountResponse> {
    let count = state.registry.count().await?;
    Ok(Json(CountResponse { ok: true, count }))
}

pub async fn location_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LocationRequest>, JsonRejection>,
) -> ApiResult<LocationResponse> {
    let request = json_payload(payload)?;

    let point = match (request.latitude, request.longitude) {
        (Some(latitude), Some(longitude)) => {
            let point = Coordinate::new(latitude, longitude);
            point.validate()?;
            Some(point)
        }
        _ => None,
    };

    let status = state.gate.classify(point);
    Ok(Json(LocationResponse {
        ok: true,
        distance_miles: status.distance_miles,
        within_range: status.within_range,
    }))
}

pub async fn welcome_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<WelcomeRequest>, JsonRejection>,
) -> ApiResult<WelcomeResponse> {
    let request = json_payload(payload)?;
    let status = LocationStatus {
        distance_miles: request.distance_miles,
        within_range: request.within_range,
    };

    let message = state.generator.welcome_message(&status).await;
    Ok(Json(WelcomeResponse {
        ok: true,
        message,
        ai_enabled: state.generator.is_enabled(),
    }))
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatResponse> {
    let request = json_payload(payload)?;
    let message = request.message.trim();
    if message.is_empty() {
        return Err(WaitlistError::validation("Message cannot be empty"));
    }

    let mut conversation = request.history;
    conversation.keep_recent(state.max_history_messages);

    let reply = state.generator.chat_reply(&conversation, message).await;

    conversation.push_user(message);
    conversation.push_model(reply.clone());
    conversation.keep_recent(state.max_history_messages);

    Ok(Json(ChatResponse {
        ok: true,
        reply,
        history: conversation.into_messages(),
    }))
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
