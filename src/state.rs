//! Shared application state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! is immutable after startup: the dashboard store reads files on demand
//! and the element pack is loaded once.

use std::sync::Arc;

use editor::pack::ElementPack;

use crate::services::store::DashboardStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DashboardStore>,
    pub pack: Arc<ElementPack>,
}

impl AppState {
    #[must_use]
    pub fn new(store: DashboardStore, pack: ElementPack) -> Self {
        Self { store: Arc::new(store), pack: Arc::new(pack) }
    }
}
