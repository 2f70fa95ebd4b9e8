//! HTTP layer — thin warp plumbing over the chat pipeline.
//!
//! Routes: `POST /chat`, `GET /roles`, `GET /roles/{id}`, `GET /health`,
//! `POST /reset`. All `ChatError` → status-code mapping lives here.

use crate::chat::{ChatRequest, ChatService, Turn};
use crate::error::ChatError;
use crate::model::ModelService;
use crate::roles::RoleRegistry;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::Filter;


/// Request body cap — base64 image payloads are the only large input.
const MAX_BODY_SIZE: u64 = 20 * 1024 * 1024;

/// Everything a request handler needs, built once in `main` and cloned
/// into each filter. No global statics.
#[derive(Clone)]
pub struct AppState {
    pub roles: Arc<RoleRegistry>,
    pub model: ModelService,
    pub chat: ChatService,
}

#[derive(Debug, Deserialize)]
struct ChatRequestBody {
    message: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    history: Vec<Turn>,
    #[serde(default)]
    role_id: Option<String>,
}

pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let chat = warp::path!("chat")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_SIZE))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handle_chat);

    let roles = warp::path!("roles")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_roles);

    let role_detail = warp::path!("roles" / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_role_detail);

    let health = warp::path!("health")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handle_health);

    let reset = warp::path!("reset")
        .and(warp::post())
        .and_then(handle_reset);

    chat.or(roles).or(role_detail).or(health).or(reset)
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn handle_chat(body: ChatRequestBody, state: AppState) -> Result<impl warp::Reply, Infallible> {
    let image = body.image.as_deref().and_then(decode_image_payload);
    let request = ChatRequest {
        message: body.message,
        image,
        history: body.history,
        role_id: body.role_id,
    };

    Ok(match state.chat.chat(request).await {
        Ok(reply) => json_reply(
            &json!({
                "response": reply.text,
                "emotion": reply.emotion,
                "role_id": reply.role_id,
                "status": "success",
            }),
            StatusCode::OK,
        ),
        Err(err) => {
            error!(error = %err, "chat request failed");
            json_reply(&json!({ "error": err.to_string() }), status_for(&err))
        }
    })
}

async fn handle_roles(state: AppState) -> Result<impl warp::Reply, Infallible> {
    let summaries = state.roles.summaries();
    Ok(json_reply(
        &json!({ "count": summaries.len(), "roles": summaries }),
        StatusCode::OK,
    ))
}

async fn handle_role_detail(id: String, state: AppState) -> Result<impl warp::Reply, Infallible> {
    Ok(match state.roles.lookup(&id) {
        Some(role) => {
            let mut value = serde_json::to_value(role).unwrap_or_else(|_| json!({}));
            if let Some(object) = value.as_object_mut() {
                object.insert("id".to_string(), json!(id));
            }
            json_reply(&value, StatusCode::OK)
        }
        None => json_reply(
            &json!({ "error": format!("role not found: {}", id) }),
            StatusCode::NOT_FOUND,
        ),
    })
}

async fn handle_health(state: AppState) -> Result<impl warp::Reply, Infallible> {
    let body = match state.model.backend() {
        Ok(backend) => json!({
            "status": "ok",
            "model_loaded": true,
            "device": backend.device(),
            "model_name": backend.model_name(),
            "model_id": backend.model_id(),
        }),
        Err(_) => json!({
            "status": "ok",
            "model_loaded": false,
            "device": "unknown",
            "model_name": "none",
            "model_id": "none",
        }),
    };
    Ok(json_reply(&body, StatusCode::OK))
}

/// History lives client-side, so reset is a compatibility no-op.
async fn handle_reset() -> Result<impl warp::Reply, Infallible> {
    Ok(json_reply(
        &json!({ "status": "success", "message": "对话已重置" }),
        StatusCode::OK,
    ))
}

/// Decode a base64 image payload, stripping an optional data-URL prefix
/// (everything up to the first comma). Invalid base64 degrades to no image.
fn decode_image_payload(payload: &str) -> Option<Vec<u8>> {
    let data = payload
        .split_once(',')
        .map(|(_, rest)| rest)
        .unwrap_or(payload);
    match BASE64.decode(data.trim()) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!(error = %e, "invalid base64 image payload, continuing without image");
            None
        }
    }
}

fn status_for(err: &ChatError) -> StatusCode {
    match err {
        ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn json_reply(
    value: &serde_json::Value,
    status: StatusCode,
) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(value), status)
}
