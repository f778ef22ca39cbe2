//! Dashboard and element pack routes.

#[cfg(test)]
#[path = "dashboards_test.rs"]
mod dashboards_test;

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use editor::dashboard::DashboardData;
use editor::scene::{self, PaletteGroupView, ViewerScene};
use editor::vars::Variables;
use editor::viewer::DashboardViewer;
use serde::Serialize;

use crate::services::store::StoreError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DashboardListResponse {
    pub dashboards: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub scene: ViewerScene,
    pub oids: Vec<String>,
}

/// `GET /api/dashboards` — names of the stored dashboards.
pub async fn list_dashboards(State(state): State<AppState>) -> Result<Json<DashboardListResponse>, StatusCode> {
    let dashboards = state.store.list().await.map_err(store_error_to_status)?;
    Ok(Json(DashboardListResponse { dashboards }))
}

/// `GET /api/dashboards/:name` — validated dashboard data.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DashboardData>, StatusCode> {
    let data = state.store.load(&name).await.map_err(store_error_to_status)?;
    Ok(Json(data))
}

/// `GET /api/dashboards/:name/view?var=value` — viewer scene with
/// template variables applied, and the OIDs it subscribes to.
pub async fn view_dashboard(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(variables): Query<Variables>,
) -> Result<Json<ViewResponse>, StatusCode> {
    let data = state.store.load(&name).await.map_err(store_error_to_status)?;

    let mut viewer = DashboardViewer::new(data, Arc::clone(&state.pack));
    viewer.pool.set_variables(variables);
    for el in viewer.pool.items() {
        if !viewer.pack.contains(&el.kind) {
            tracing::warn!(dashboard = %name, kind = %el.kind, "unknown element kind");
        }
    }

    Ok(Json(ViewResponse { oids: viewer.oids_to_subscribe(), scene: scene::viewer_scene(&viewer) }))
}

/// `GET /api/pack` — element palette groups.
pub async fn get_pack(State(state): State<AppState>) -> Json<Vec<PaletteGroupView>> {
    Json(scene::palette(&state.pack))
}

pub(crate) fn store_error_to_status(err: StoreError) -> StatusCode {
    match err {
        StoreError::InvalidName(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Invalid { name, source } => {
            tracing::warn!(%name, error = %source, "dashboard failed validation");
            StatusCode::UNPROCESSABLE_ENTITY
        }
        StoreError::Io(e) => {
            tracing::error!(error = %e, "dashboard store io error");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
