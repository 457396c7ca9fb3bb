use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use backend::{AttributesApi, BackendClient, BlocksApi, ParticipantsApi};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, security_headers_middleware,
    trace_id, RateLimiterState,
};
use crate::routes::{attributes, health, participants, table};
use crate::sessions::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub participants: ParticipantsApi,
    pub attributes: AttributesApi,
    pub blocks: BlocksApi,
    pub sessions: Arc<SessionStore>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, client: BackendClient, sessions: Arc<SessionStore>) -> Router {
    let config = Arc::new(config);

    // Rate limiting is enabled when rate_limit_per_minute > 0
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
        )))
    } else {
        None
    };

    let state = AppState {
        config: config.clone(),
        participants: ParticipantsApi::new(client.clone()),
        attributes: AttributesApi::new(client.clone()),
        blocks: BlocksApi::new(client),
        sessions,
        rate_limiter,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Panel routes under /api/v1; the panel key and session are checked
    // by extractors in each handler.
    let panel_routes = Router::new()
        .route(
            "/api/v1/events/:event_id/attributes",
            get(attributes::get_attributes),
        )
        .route("/api/v1/events/:event_id/table", get(table::get_table))
        .route("/api/v1/events/:event_id/table/sort", post(table::sort))
        .route("/api/v1/events/:event_id/table/filter", post(table::filter))
        .route("/api/v1/events/:event_id/table/page", post(table::page))
        .route(
            "/api/v1/events/:event_id/table/selection",
            post(table::selection),
        )
        .route("/api/v1/events/:event_id/table/reset", post(table::reset))
        .route(
            "/api/v1/events/:event_id/participants",
            post(participants::create_participant)
                .delete(participants::delete_many_participants),
        )
        .route(
            "/api/v1/events/:event_id/participants/:participant_id",
            put(participants::save_participant).delete(participants::delete_participant),
        )
        .route(
            "/api/v1/events/:event_id/participants/:participant_id/edit",
            post(participants::begin_edit),
        )
        .route(
            "/api/v1/events/:event_id/participants/:participant_id/cancel",
            post(participants::cancel_edit),
        )
        .route(
            "/api/v1/events/:event_id/participants/:participant_id/expand",
            post(participants::expand_participant),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/healthz", get(health::health_check))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(panel_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
