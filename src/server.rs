use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::error::HeartrestError;
use crate::heuristic::canned_reply;
use crate::history::ConversationStore;
use crate::models::{ChatRequest, ChatResponse, ConversationEntry, ErrorBody, HistoryResponse};
use crate::service::{ChatService, MISSING_MESSAGE};

pub const CLIENT_ID_HEADER: &str = "x-client-id";

const MISSING_CLIENT_ID: &str = "x-client-id 헤더가 필요합니다.";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
    pub history: Arc<ConversationStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/history", get(list_history).delete(clear_history))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

impl IntoResponse for HeartrestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            HeartrestError::InvalidInput(message) => ErrorBody {
                error: message,
                details: None,
                reply: None,
            },
            HeartrestError::RateLimited(_) => ErrorBody {
                error: "API 할당량이 부족합니다. 잠시 후 다시 시도해주세요.".to_string(),
                details: Some(
                    "AI 서비스 사용량이 초과되었습니다. 잠시 후 다시 시도해주세요.".to_string(),
                ),
                reply: Some(canned_reply()),
            },
            HeartrestError::Upstream(_) => ErrorBody {
                error: "AI 서비스에 일시적인 문제가 있습니다.".to_string(),
                details: Some("잠시 후 다시 시도해주세요.".to_string()),
                reply: None,
            },
            other => {
                tracing::error!("Internal error while handling request: {}", other);
                ErrorBody {
                    error: "서버 오류가 발생했습니다.".to_string(),
                    details: Some("잠시 후 다시 시도해주세요.".to_string()),
                    reply: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

fn client_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, HeartrestError> {
    let message = match payload {
        Ok(Json(ChatRequest { message: Some(m) })) => m,
        Ok(_) => return Err(HeartrestError::InvalidInput(MISSING_MESSAGE.to_string())),
        Err(rejection) => {
            tracing::debug!("Rejected chat body: {}", rejection);
            return Err(HeartrestError::InvalidInput(MISSING_MESSAGE.to_string()));
        }
    };

    let outcome = state.service.handle(&message).await?;

    let client_id = client_id(&headers);
    if let Some(id) = &client_id {
        let entry = ConversationEntry::new(message, outcome.reply.clone());
        if let Err(e) = state.history.append(id, entry).await {
            tracing::warn!("Failed to record history for {}: {}", id, e);
        }
    }

    Ok(Json(ChatResponse {
        response: outcome.answer,
        reply: outcome.reply,
        client_id,
    }))
}

async fn list_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HistoryResponse>, HeartrestError> {
    let client_id = client_id(&headers)
        .ok_or_else(|| HeartrestError::InvalidInput(MISSING_CLIENT_ID.to_string()))?;
    let entries = state.history.list(&client_id).await?;
    Ok(Json(HistoryResponse { entries }))
}

async fn clear_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, HeartrestError> {
    let client_id = client_id(&headers)
        .ok_or_else(|| HeartrestError::InvalidInput(MISSING_CLIENT_ID.to_string()))?;
    state.history.clear(&client_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
