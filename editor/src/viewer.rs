//! Read-only dashboard viewer.

#[cfg(test)]
#[path = "viewer_test.rs"]
mod viewer_test;

use std::sync::Arc;

use crate::dashboard::DashboardData;
use crate::editor::Action;
use crate::geom::Coords;
use crate::input::{KeyCode, KeyTarget, Modifiers};
use crate::pack::ElementPack;
use crate::pool::ElementPool;
use crate::vars::Variables;

/// A loaded dashboard shown without editing chrome.
pub struct DashboardViewer {
    pub pool: ElementPool,
    /// Shared with other viewers of the same pack.
    pub pack: Arc<ElementPack>,
    pub name: String,
    pub viewport: Coords,
    pub scale: f64,
    /// The host can close the viewer (`Shift+Q`).
    pub finish_allowed: bool,
}

impl DashboardViewer {
    #[must_use]
    pub fn new(data: DashboardData, pack: impl Into<Arc<ElementPack>>) -> Self {
        let mut pool = ElementPool::new();
        pool.import(data.elements);
        Self { pool, pack: pack.into(), name: data.name, viewport: data.viewport, scale: data.scale, finish_allowed: false }
    }

    /// Replace the template variables; subscriptions follow.
    pub fn set_variables(&mut self, variables: Variables) -> Vec<Action> {
        self.pool.set_variables(variables);
        vec![Action::SubscriptionsChanged { oids: self.oids_to_subscribe() }, Action::RenderNeeded]
    }

    #[must_use]
    pub fn oids_to_subscribe(&self) -> Vec<String> {
        self.pool.oids_to_subscribe(&self.pack)
    }

    pub fn key_down(&self, code: KeyCode, mods: Modifiers, target: KeyTarget) -> Vec<Action> {
        if target == KeyTarget::Body && code == KeyCode::KeyQ && mods.shift && !mods.alt && self.finish_allowed {
            return vec![Action::PreventDefault, Action::Finish];
        }
        Vec::new()
    }

    /// Content for `<meta name="viewport">` so mobile browsers honor the dashboard scale.
    #[must_use]
    pub fn viewport_meta_content(&self) -> String {
        format!("width=device-width, initial-scale={}", self.scale)
    }
}
