use crate::api::handlers::{booking, chat, dashboard};
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router() -> Router<AppState> {
    let pages = Router::new()
        .route("/", get(dashboard::index))
        .route("/health", get(chat::health))
        .route("/dashboard/availability", post(dashboard::check_availability))
        .route("/dashboard/book", post(dashboard::book))
        .route("/dashboard/chat", post(dashboard::chat));

    let api = Router::new()
        .route("/turfs", get(booking::list_turfs))
        .route(
            "/bookings",
            get(booking::list_bookings).post(booking::create_booking),
        )
        .route(
            "/availability/{turf_id}/{date}",
            get(booking::availability),
        )
        .route("/chat", post(chat::chat))
        .route("/prompts", get(chat::list_prompts))
        .route("/prompts/{name}", post(chat::run_prompt))
        .route("/agent/status", get(chat::agent_status));

    pages.nest("/api", api)
}

/// The complete application with tracing and CORS layers.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
