//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agent_core::{AgentError, SessionResolution};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub provider: String,
    pub provider_connected: bool,
    pub active_sessions: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionParams {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub agent_reply: String,
    /// Present only when the agent called tools this turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub user_id: String,
    pub rolls: Vec<i64>,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn session_error(e: &AgentError) -> ApiError {
    tracing::error!("Session error: {}", e);
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "SESSION_ERROR",
        format!("Internal server error while creating session: {}", e.user_message()),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Hello agent server is running!".into(),
    })
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider = state.runner.agent().provider();
    let provider_connected = provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        provider: provider.name().into(),
        provider_connected,
        active_sessions: state.runner.sessions().len().await,
    })
}

/// Create a session explicitly
pub async fn create_session(
    State(state): State<AppState>,
    Query(params): Query<CreateSessionParams>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user_id = params
        .user_id
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| state.config.default_user_id.clone());
    tracing::info!(user_id = %user_id, "Create session requested");

    let session = state
        .runner
        .sessions()
        .create(&user_id)
        .await
        .map_err(|e| session_error(&e))?;

    Ok(Json(SessionResponse {
        session_id: session.id.to_string(),
        message: "Session created successfully.".into(),
    }))
}

/// Send one message to the agent, creating a session when needed
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (session, resolution) = state
        .runner
        .sessions()
        .resolve(payload.session_id.as_deref(), &state.config.chat_user_id)
        .await
        .map_err(|e| session_error(&e))?;

    match &resolution {
        SessionResolution::Existing => {
            tracing::info!(session_id = %session.id, "Using existing session");
        }
        SessionResolution::Created => {
            tracing::info!(session_id = %session.id, "No session id supplied, created one");
        }
        SessionResolution::Replaced { requested } => {
            tracing::info!(
                session_id = %session.id,
                requested = %requested,
                "Session id not found, created a replacement"
            );
        }
    }

    let reply = state
        .runner
        .dispatch(&session, payload.message)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %session.id, "Agent error: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "AGENT_ERROR",
                format!(
                    "Internal server error while running the agent: {}",
                    e.user_message()
                ),
            )
        })?;

    for call in &reply.tool_calls {
        tracing::debug!(session_id = %session.id, "{}", call);
    }

    Ok(Json(ChatResponse {
        session_id: session.id.to_string(),
        agent_reply: reply.text,
        tool_calls: (!reply.tool_calls.is_empty()).then_some(reply.tool_calls),
    }))
}

/// Inspect a session's state.
///
/// Never waits on a running turn: a session mid-turn answers 409.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionInfo>, ApiError> {
    let session = state.runner.sessions().get(&session_id).await.ok_or_else(|| {
        api_error(
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
            format!("Session '{session_id}' not found"),
        )
    })?;

    let Some(session) = session.try_lock() else {
        return Err(api_error(
            StatusCode::CONFLICT,
            "SESSION_BUSY",
            format!("Session '{session_id}' is handling a message; try again shortly"),
        ));
    };
    Ok(Json(SessionInfo {
        session_id: session.id.to_string(),
        user_id: session.user_id.clone(),
        rolls: session.state.rolls().to_vec(),
        message_count: session.message_count(),
        created_at: session.created_at,
        updated_at: session.updated_at,
    }))
}

/// Forget a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.runner.sessions().remove(&session_id).await {
        tracing::info!(session_id = %session_id, "Session removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
            format!("Session '{session_id}' not found"),
        ))
    }
}
