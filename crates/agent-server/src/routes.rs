//! Router

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    chat_handler, create_session, delete_session, get_session, health_check, root,
};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/create_session", post(create_session))
        .route("/chat", post(chat_handler))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
