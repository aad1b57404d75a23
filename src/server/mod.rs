// server/mod.rs - Console server: edge-guarded JSON page views over the backend
pub mod handlers;
pub mod state;
pub mod view;

use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::messages::APP_NAME;
use crate::middleware::{edge_guard, EdgeGuard};

pub use state::{AppState, Caches, RequestContext};
pub use view::ViewError;

pub fn app(state: AppState) -> Router {
    let guard = EdgeGuard::from_config(&state.config);
    let request_logging = state.config.server.enable_request_logging;

    let mut router = Router::new()
        .merge(auth_routes())
        .merge(page_routes())
        .merge(appointment_routes())
        // Every route above sits behind the session cookie check
        .layer(from_fn_with_state(guard, edge_guard))
        // Liveness stays reachable without a session
        .route("/health", get(health))
        .with_state(state);

    if request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", post(auth::logout))
}

fn page_routes() -> Router<AppState> {
    use handlers::{clients, dashboard};

    Router::new()
        .route("/", get(dashboard::dashboard))
        .route("/clients", get(clients::list))
}

fn appointment_routes() -> Router<AppState> {
    use handlers::appointments;

    Router::new()
        .route("/appointments", get(appointments::list).post(appointments::create))
        .route("/appointments/upcoming", get(appointments::upcoming))
        .route("/appointments/:id", get(appointments::show).patch(appointments::update))
        .route("/appointments/:id/cancel", post(appointments::cancel))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": APP_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "backend": state.config.api.base_url,
        }
    }))
}
