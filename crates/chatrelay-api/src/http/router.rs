//! Axum router configuration with middleware.
//!
//! All routes live under `/api/`. Middleware: CORS (origins from config,
//! `*` wildcards to any) and request tracing.

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.origins_list());

    let api_routes = Router::new()
        // Chat
        .route("/chat/stream", post(handlers::chat::stream_chat))
        .route("/chat/send", post(handlers::chat::send_chat))
        .route("/chat/messages/{id}", put(handlers::chat::edit_message))
        // Conversations
        .route(
            "/conversations",
            post(handlers::conversation::create_conversation)
                .get(handlers::conversation::list_conversations),
        )
        .route(
            "/conversations/{id}",
            get(handlers::conversation::get_conversation)
                .patch(handlers::conversation::rename_conversation)
                .delete(handlers::conversation::delete_conversation),
        )
        // Model catalog
        .route("/models", get(handlers::model::list_models))
        .route("/models/free", get(handlers::model::list_free_models));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse::<HeaderValue>().ok())
            .collect();
        layer.allow_origin(AllowOrigin::list(parsed))
    }
}

/// GET /health -- liveness probe.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
