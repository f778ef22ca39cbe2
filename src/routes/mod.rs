//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! All endpoints are read-only JSON under `/api`, plus `/healthz` for
//! liveness probes. Requests are traced with `tower-http`; CORS is opt-in
//! for hosts that serve the browser bundle from another origin.

pub mod dashboards;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/pack", get(dashboards::get_pack))
        .route("/api/dashboards", get(dashboards::list_dashboards))
        .route("/api/dashboards/{name}", get(dashboards::get_dashboard))
        .route("/api/dashboards/{name}/view", get(dashboards::view_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
        router.layer(cors)
    } else {
        router
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
