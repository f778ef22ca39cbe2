//! Dashboard editor state machine.
//!
//! `EditorCore` owns the element pool, the dashboard globals, the undo
//! history and every piece of UI state the editor chrome needs. The host
//! forwards pointer and keyboard events (page coordinates, millisecond
//! timestamps) and carries out the returned [`Action`]s: re-render, prevent
//! the browser default, resubscribe OIDs, save, exit and so on.
//!
//! Nothing here touches the DOM, so the whole editor is testable natively.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::{
    CLICK_MS, DASHBOARD_CLEARED, DASHBOARD_MODIFIED_CONFIRM, DASHBOARD_SOURCE_SET, DEFAULT_SIDEBAR_WIDTH,
    DEFAULT_WINDOW, MAX_ZINDEX, MIN_SCALE, MIN_SIDEBAR_WIDTH, MIN_VIEWPORT, SCROLL_MARGIN, SELECTION_SLOP,
};
use crate::dashboard::DashboardData;
use crate::element::{DElement, DElementData, ElementId};
use crate::geom::{self, Coords, Rect};
use crate::history::{UndoEntry, UndoHistory};
use crate::input::{Gesture, KeyCode, KeyTarget, Modifiers, PointerKind, PointerTarget};
use crate::pack::{ElementPack, PropertyKind};
use crate::pool::ElementPool;
use crate::property::{self, PropertyInput};
use crate::vars::Variables;

/// Severity of a host notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyLevel {
    Info,
    Error,
}

/// Actions returned from event handlers for the host to process.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    RenderNeeded,
    PreventDefault,
    /// The set of OIDs the dashboard needs changed.
    SubscriptionsChanged { oids: Vec<String> },
    Save { data: DashboardData, finish_after: bool },
    /// Leave the editor.
    Finish,
    /// Ask before leaving the editor; answer with `confirm_exit`/`cancel_exit`.
    ConfirmExit { message: String },
    /// Ask before the browser navigates away; prevent the default if declined.
    ConfirmLeave { message: String },
    ShowSource { source: String },
    HideSource,
    Notify { level: NotifyLevel, message: String },
}

impl Action {
    pub fn info(message: impl Display) -> Self {
        Self::Notify { level: NotifyLevel::Info, message: message.to_string() }
    }

    pub fn error(message: impl Display) -> Self {
        Self::Notify { level: NotifyLevel::Error, message: message.to_string() }
    }
}

/// Host-provided capabilities and page geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// The host can persist dashboards (`S`, `Shift+S`).
    pub save_allowed: bool,
    /// The host can close the editor (`Shift+Q`).
    pub finish_allowed: bool,
    /// Never ask about unsaved changes.
    pub ignore_modified: bool,
    /// Page position of the viewport's top-left corner.
    pub viewport_offset: Coords,
    /// Browser window size.
    pub window: Coords,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            save_allowed: true,
            finish_allowed: true,
            ignore_modified: false,
            viewport_offset: Coords::default(),
            window: DEFAULT_WINDOW,
        }
    }
}

/// Field touched by the last recorded edit; consecutive edits to the same
/// field share an undo step.
#[derive(Debug, Clone, PartialEq)]
enum EditKey {
    Name,
    Viewport,
    Scale,
    Grid,
    Position(ElementId),
    ZIndex(ElementId),
    Param(ElementId, String),
}

/// Core editor state: everything that doesn't depend on the browser.
#[allow(clippy::struct_excessive_bools)]
pub struct EditorCore {
    pub pool: ElementPool,
    pub pack: ElementPack,
    pub options: EditorOptions,

    // Dashboard globals
    pub name: String,
    pub viewport: Coords,
    pub scale: f64,
    pub grid: u32,
    pub custom_data: Option<Value>,

    /// Scroll offset of the viewport, in dashboard pixels.
    pub cur_offset: Coords,
    pub modified: bool,

    // Chrome
    pub sidebar_visible: bool,
    pub sidebar_width: f64,
    pub help_visible: bool,
    pub source_visible: bool,
    pub exit_confirm_visible: bool,
    pub scrolling_enabled: bool,
    pub viewport_scrolled: bool,
    /// Last validation failure from the property bar.
    pub param_error: Option<String>,

    // Pointer
    pub gesture: Gesture,
    pub last_mouse: Coords,
    pub last_click: Option<f64>,
    /// Last press on an element, mouse or touch, for double taps.
    last_element_press: Option<(ElementId, f64)>,

    history: UndoHistory,
    last_edit: Option<EditKey>,
}

impl EditorCore {
    /// Editor showing an empty default dashboard.
    #[must_use]
    pub fn new(pack: ElementPack, options: EditorOptions) -> Self {
        let data = DashboardData::default();
        let mut core = Self {
            pool: ElementPool::new(),
            pack,
            options,
            name: data.name.clone(),
            viewport: data.viewport,
            scale: data.scale,
            grid: data.grid,
            custom_data: None,
            cur_offset: Coords::default(),
            modified: false,
            sidebar_visible: true,
            sidebar_width: DEFAULT_SIDEBAR_WIDTH.min(options.window.x),
            help_visible: false,
            source_visible: false,
            exit_confirm_visible: false,
            scrolling_enabled: false,
            viewport_scrolled: false,
            param_error: None,
            gesture: Gesture::Idle,
            last_mouse: Coords::default(),
            last_click: None,
            last_element_press: None,
            history: UndoHistory::new(),
            last_edit: None,
        };
        core.reset_to(data);
        core
    }

    // --- Load / export ---

    /// Replace the whole dashboard. `None` starts a new one.
    pub fn load(&mut self, data: Option<DashboardData>) -> Vec<Action> {
        self.reset_to(data.unwrap_or_default());
        vec![self.subscriptions(), Action::RenderNeeded]
    }

    fn reset_to(&mut self, data: DashboardData) {
        self.apply_data(data);
        self.cur_offset = Coords::default();
        self.modified = false;
        self.gesture = Gesture::Idle;
        self.last_edit = None;
        self.history.reset(self.undo_entry());
    }

    fn apply_data(&mut self, data: DashboardData) {
        self.name = data.name;
        self.viewport = data.viewport;
        self.scale = data.scale;
        self.grid = data.grid;
        self.custom_data = data.custom_data;
        self.pool.import(data.elements);
    }

    /// Current dashboard in persisted form.
    #[must_use]
    pub fn export_data(&self) -> DashboardData {
        DashboardData {
            name: self.name.clone(),
            viewport: self.viewport,
            scale: self.scale,
            grid: self.grid,
            elements: self.pool.export(),
            custom_data: self.custom_data.clone(),
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[must_use]
    pub fn oids_to_subscribe(&self) -> Vec<String> {
        self.pool.oids_to_subscribe(&self.pack)
    }

    /// Scroll offset rounded down to the grid; the viewport is drawn from here.
    #[must_use]
    pub fn aligned_offset(&self) -> Coords {
        Coords::new(
            geom::floor_to_grid(self.cur_offset.x, self.grid),
            geom::floor_to_grid(self.cur_offset.y, self.grid),
        )
    }

    /// Map a page point into dashboard coordinates.
    #[must_use]
    pub fn page_to_dashboard(&self, p: Coords) -> Coords {
        let o = self.options.viewport_offset;
        Coords::new(p.x - o.x + self.cur_offset.x, p.y - o.y + self.cur_offset.y)
    }

    /// The last press happened less than `CLICK_MS` before `now`.
    #[must_use]
    pub fn is_click(&self, now: f64) -> bool {
        self.last_click.is_some_and(|t| now - t < CLICK_MS)
    }

    // --- Undo bookkeeping ---

    fn undo_entry(&self) -> UndoEntry {
        UndoEntry::new(self.export_data(), self.pool.selected_indices())
    }

    /// Record the current state as a new undo step.
    fn snapshot_undo(&mut self) {
        self.last_edit = None;
        let entry = self.undo_entry();
        if self.history.current() == Some(&entry) {
            return;
        }
        self.history.snapshot(entry);
    }

    fn set_modified(&mut self, snapshot: bool) {
        self.modified = true;
        if snapshot {
            self.snapshot_undo();
        }
    }

    /// Mark modified; repeated edits of one field collapse into one step.
    fn record_edit(&mut self, key: EditKey) {
        self.modified = true;
        let entry = self.undo_entry();
        if self.last_edit.as_ref() == Some(&key) && self.history.can_undo() {
            self.history.replace_current(entry);
            return;
        }
        if self.history.current() == Some(&entry) {
            self.last_edit = None;
            return;
        }
        self.history.snapshot(entry);
        self.last_edit = Some(key);
    }

    fn subscriptions(&self) -> Action {
        Action::SubscriptionsChanged { oids: self.oids_to_subscribe() }
    }

    // --- Elements ---

    /// Keep an element inside the viewport, optionally snapping it to the grid.
    pub fn fix_position(&mut self, id: &ElementId, align: bool) {
        let Some(el) = self.pool.get_mut(id) else {
            return;
        };
        let size = self.pack.default_size(&el.kind);
        let mut pos = geom::clip_to_viewport(el.position, size, self.viewport);
        if align {
            pos = geom::snap_coords(pos, self.grid);
        }
        el.position = pos;
    }

    /// Place a new element of `kind`; without a position it lands at the
    /// current scroll offset.
    pub fn add_element(&mut self, kind: &str, pos: Option<Coords>, activate: bool) -> Vec<Action> {
        let pos = pos.unwrap_or(self.cur_offset);
        let id = match self.pool.add(&self.pack, kind, pos) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("add element: {e}");
                return vec![Action::error(e)];
            }
        };
        self.fix_position(&id, true);
        if activate {
            self.pool.set_selected(id);
        }
        self.set_modified(true);
        vec![self.subscriptions(), Action::RenderNeeded]
    }

    /// Drop a palette entry at a page point.
    pub fn drop_new_element(&mut self, kind: &str, at: Coords) -> Vec<Action> {
        let pos = self.page_to_dashboard(at);
        self.add_element(kind, Some(pos), true)
    }

    /// Snap every element to the grid.
    pub fn align_elements(&mut self) -> Vec<Action> {
        let ids: Vec<ElementId> = self.pool.items().iter().map(|el| el.id).collect();
        for id in &ids {
            self.fix_position(id, true);
        }
        self.set_modified(true);
        vec![Action::RenderNeeded]
    }

    /// Duplicate the selection one grid step down and right; the copies
    /// become the new selection.
    pub fn copy_selected(&mut self) -> Vec<Action> {
        let grid = f64::from(self.grid);
        let sources: Vec<DElementData> = self.pool.selected_elements().map(DElement::to_data).collect();
        if sources.is_empty() {
            return Vec::new();
        }
        let mut copies = Vec::with_capacity(sources.len());
        for mut data in sources {
            data.position = data.position.offset_by(grid, grid);
            let id = self.pool.push(DElement::from_data(data));
            self.fix_position(&id, true);
            copies.push(id);
        }
        self.pool.set_selection(copies);
        self.set_modified(true);
        vec![self.subscriptions(), Action::RenderNeeded]
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        if !self.pool.selection_active() {
            return Vec::new();
        }
        let ids = self.pool.selected_ids().to_vec();
        for id in &ids {
            self.pool.delete(id);
        }
        self.pool.clear_selection();
        self.set_modified(true);
        vec![self.subscriptions(), Action::RenderNeeded]
    }

    /// Remove every element. The host confirms with `DASHBOARD_CLEAR_CONFIRM` first.
    pub fn delete_all(&mut self) -> Vec<Action> {
        let had_elements = !self.pool.is_empty();
        self.pool.clear();
        if had_elements {
            self.set_modified(true);
        }
        vec![Action::info(DASHBOARD_CLEARED), self.subscriptions(), Action::RenderNeeded]
    }

    // --- Selection ---

    /// Select only `id`.
    pub fn select_element(&mut self, id: ElementId) -> Vec<Action> {
        self.pool.set_selected(id);
        self.snapshot_undo();
        vec![Action::RenderNeeded]
    }

    pub fn clear_selection(&mut self) -> Vec<Action> {
        self.pool.clear_selection();
        self.snapshot_undo();
        vec![Action::RenderNeeded]
    }

    // --- Globals ---

    pub fn set_name(&mut self, name: &str) -> Vec<Action> {
        if name.trim().is_empty() {
            return vec![Action::error("no dashboard name")];
        }
        name.clone_into(&mut self.name);
        self.record_edit(EditKey::Name);
        vec![Action::RenderNeeded]
    }

    pub fn set_viewport(&mut self, viewport: Coords) -> Vec<Action> {
        if !(viewport.x >= MIN_VIEWPORT && viewport.y >= MIN_VIEWPORT) {
            return vec![Action::error("invalid viewport")];
        }
        self.viewport = viewport;
        self.record_edit(EditKey::Viewport);
        vec![Action::RenderNeeded]
    }

    pub fn set_scale(&mut self, scale: f64) -> Vec<Action> {
        if !(scale >= MIN_SCALE && scale.is_finite()) {
            return vec![Action::error("invalid scale")];
        }
        self.scale = scale;
        self.record_edit(EditKey::Scale);
        vec![Action::RenderNeeded]
    }

    pub fn set_grid(&mut self, grid: u32) -> Vec<Action> {
        if grid == 0 {
            return vec![Action::error("invalid grid")];
        }
        self.grid = grid;
        self.record_edit(EditKey::Grid);
        vec![Action::RenderNeeded]
    }

    pub fn set_custom_data(&mut self, data: Option<Value>) {
        self.custom_data = data.filter(|v| !v.is_null());
        self.set_modified(true);
    }

    // --- Element properties ---

    /// Move an element to an exact position inside the viewport.
    pub fn set_element_position(&mut self, id: ElementId, pos: Coords) -> Vec<Action> {
        if !(pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= self.viewport.x && pos.y <= self.viewport.y) {
            return vec![Action::error("position outside the viewport")];
        }
        let Some(el) = self.pool.get_mut(&id) else {
            return Vec::new();
        };
        el.position = pos;
        self.record_edit(EditKey::Position(id));
        vec![Action::RenderNeeded]
    }

    pub fn set_element_zindex(&mut self, id: ElementId, zindex: i64) -> Vec<Action> {
        if !(0..=MAX_ZINDEX).contains(&zindex) {
            return vec![Action::error(format!("z-index must be between 0 and {MAX_ZINDEX}"))];
        }
        let Some(el) = self.pool.get_mut(&id) else {
            return Vec::new();
        };
        el.zindex = zindex;
        self.record_edit(EditKey::ZIndex(id));
        vec![Action::RenderNeeded]
    }

    /// Validate `input` against the class property `name` and store it.
    ///
    /// Rejected input leaves the element untouched and sets `param_error`.
    pub fn set_element_param(&mut self, id: ElementId, name: &str, input: PropertyInput) -> Vec<Action> {
        let Some(el) = self.pool.get(&id) else {
            return Vec::new();
        };
        let Some(class) = self.pack.class(&el.kind) else {
            return vec![Action::error(format!("unsupported element: {}", el.kind))];
        };
        let Some(prop) = class.property(name) else {
            return vec![Action::error(format!("unknown property: {name}"))];
        };
        let resubscribe = prop.kind == PropertyKind::OidSubscribed;
        let value = match property::coerce(&prop.kind, prop.params.as_ref(), input) {
            Ok(value) => value,
            Err(e) => {
                let message = format!("{name}: {e}");
                self.param_error = Some(message.clone());
                return vec![Action::error(message), Action::RenderNeeded];
            }
        };
        self.param_error = None;
        if let Some(el) = self.pool.get_mut(&id) {
            el.set_param(name, value);
        }
        self.record_edit(EditKey::Param(id, name.to_owned()));
        let mut actions = Vec::with_capacity(2);
        if resubscribe {
            actions.push(self.subscriptions());
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn set_variables(&mut self, variables: Variables) -> Vec<Action> {
        self.pool.set_variables(variables);
        vec![self.subscriptions(), Action::RenderNeeded]
    }

    // --- Chrome ---

    /// Scroll the viewport. Negative offsets are ignored.
    pub fn set_cur_offset(&mut self, offset: Coords) -> Vec<Action> {
        if offset.x < 0.0 || offset.y < 0.0 {
            return Vec::new();
        }
        self.cur_offset = offset;
        vec![Action::RenderNeeded]
    }

    pub fn set_scrolling_enabled(&mut self, enabled: bool) -> Vec<Action> {
        self.scrolling_enabled = enabled;
        vec![Action::RenderNeeded]
    }

    pub fn toggle_sidebar(&mut self) -> Vec<Action> {
        self.set_sidebar_visible(!self.sidebar_visible)
    }

    pub fn set_sidebar_visible(&mut self, visible: bool) -> Vec<Action> {
        self.sidebar_visible = visible;
        vec![Action::RenderNeeded]
    }

    pub fn set_help_visible(&mut self, visible: bool) -> Vec<Action> {
        self.help_visible = visible;
        vec![Action::RenderNeeded]
    }

    /// Browser window resized.
    pub fn set_window(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.options.window = Coords::new(width, height);
        if self.sidebar_width > width {
            self.sidebar_width = width.max(MIN_SIDEBAR_WIDTH);
        }
        vec![Action::RenderNeeded]
    }

    /// Viewport moved on the page.
    pub fn set_viewport_offset(&mut self, offset: Coords) {
        self.options.viewport_offset = offset;
    }

    // --- Undo ---

    pub fn undo(&mut self) -> Vec<Action> {
        let Some(entry) = self.history.undo().cloned() else {
            return Vec::new();
        };
        log::debug!("undo to step {}", self.history.cursor());
        self.restore(entry)
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let Some(entry) = self.history.redo().cloned() else {
            return Vec::new();
        };
        log::debug!("redo to step {}", self.history.cursor());
        self.restore(entry)
    }

    fn restore(&mut self, entry: UndoEntry) -> Vec<Action> {
        let UndoEntry { data, selected } = entry;
        self.apply_data(data);
        let ids: Vec<ElementId> = selected
            .iter()
            .filter_map(|i| self.pool.items().get(*i).map(|el| el.id))
            .collect();
        self.pool.set_selection(ids);
        self.modified = true;
        self.last_edit = None;
        vec![self.subscriptions(), Action::RenderNeeded]
    }

    // --- Source dialog ---

    pub fn show_source(&mut self) -> Vec<Action> {
        match self.export_data().to_source() {
            Ok(source) => {
                self.source_visible = true;
                vec![Action::ShowSource { source }]
            }
            Err(e) => vec![Action::error(e)],
        }
    }

    /// Replace the dashboard with edited source text.
    ///
    /// Invalid source keeps the dialog open and reports the problem.
    pub fn apply_source(&mut self, source: &str) -> Vec<Action> {
        let data = match DashboardData::from_source(source) {
            Ok(data) => data,
            Err(e) => {
                log::debug!("source rejected: {e}");
                return vec![Action::error(e)];
            }
        };
        self.apply_data(data);
        self.set_modified(true);
        log::debug!("source applied: {} elements", self.pool.len());
        self.close_source(vec![Action::info(DASHBOARD_SOURCE_SET)])
    }

    pub fn cancel_source(&mut self) -> Vec<Action> {
        self.close_source(Vec::new())
    }

    fn close_source(&mut self, mut actions: Vec<Action>) -> Vec<Action> {
        self.pool.clear_selection();
        self.pool.set_dragged(false);
        self.source_visible = false;
        actions.push(self.subscriptions());
        actions.push(Action::HideSource);
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Save / exit ---

    fn save(&self, finish_after: bool) -> Vec<Action> {
        if !self.options.save_allowed {
            return Vec::new();
        }
        vec![Action::PreventDefault, Action::Save { data: self.export_data(), finish_after }]
    }

    /// The host finished persisting a `Save` action.
    pub fn save_completed(&mut self, ok: bool, finish_after: bool) -> Vec<Action> {
        if !ok {
            return vec![Action::error("dashboard save failed")];
        }
        self.modified = false;
        let mut actions = vec![Action::RenderNeeded];
        if finish_after {
            actions.extend(self.request_finish());
        }
        actions
    }

    /// Leave the editor, asking first when there are unsaved changes.
    pub fn request_finish(&mut self) -> Vec<Action> {
        if !self.options.finish_allowed {
            return Vec::new();
        }
        if self.modified && !self.options.ignore_modified {
            self.exit_confirm_visible = true;
            return vec![Action::ConfirmExit { message: DASHBOARD_MODIFIED_CONFIRM.to_owned() }];
        }
        vec![Action::Finish]
    }

    pub fn confirm_exit(&mut self) -> Vec<Action> {
        self.exit_confirm_visible = false;
        self.modified = false;
        vec![Action::Finish]
    }

    pub fn cancel_exit(&mut self) -> Vec<Action> {
        self.exit_confirm_visible = false;
        vec![Action::RenderNeeded]
    }

    /// Whether the browser should warn before unloading the page.
    #[must_use]
    pub fn before_unload(&self) -> bool {
        self.modified && !self.options.ignore_modified
    }

    fn leave_guard(&self) -> Vec<Action> {
        if self.before_unload() {
            vec![Action::ConfirmLeave { message: DASHBOARD_MODIFIED_CONFIRM.to_owned() }]
        } else {
            Vec::new()
        }
    }

    // --- Pointer ---

    fn record_press(&mut self, kind: PointerKind, now: f64) {
        if kind == PointerKind::Mouse {
            self.last_click = Some(now);
        }
    }

    /// Press on empty viewport area.
    pub fn pointer_down_viewport(&mut self, at: Coords, mods: Modifiers, kind: PointerKind, now: f64) -> Vec<Action> {
        self.last_mouse = at;
        self.help_visible = false;
        if !mods.shift && self.pool.selection_active() {
            self.pool.clear_selection();
            self.snapshot_undo();
        }
        if kind == PointerKind::Mouse && self.is_click(now) {
            self.sidebar_visible = true;
        } else {
            if self.scrolling_enabled {
                self.viewport_scrolled = true;
                self.gesture = Gesture::ScrollingViewport { last: at };
            }
            if self.viewport.x + self.sidebar_width - self.cur_offset.x >= self.options.window.x {
                self.sidebar_visible = false;
            }
        }
        self.record_press(kind, now);
        if !self.scrolling_enabled {
            self.gesture = Gesture::Selecting { start: at };
        }
        vec![Action::RenderNeeded]
    }

    /// Press on a placed element.
    ///
    /// Ctrl passes the press through to the viewport so a rubber band can
    /// start on top of elements.
    pub fn pointer_down_element(
        &mut self,
        id: ElementId,
        at: Coords,
        mods: Modifiers,
        kind: PointerKind,
        now: f64,
    ) -> Vec<Action> {
        self.last_mouse = at;
        self.help_visible = false;
        if self.last_element_press.is_some_and(|(last, t)| last == id && now - t < CLICK_MS) {
            self.sidebar_visible = true;
        }
        self.last_element_press = Some((id, now));
        if mods.ctrl {
            if !self.scrolling_enabled {
                self.gesture = Gesture::Selecting { start: at };
            }
        } else if !mods.shift {
            if !self.pool.is_selected(&id) {
                self.pool.set_selected(id);
                self.snapshot_undo();
            }
            self.pool.set_dragged(true);
            self.gesture = Gesture::DraggingElements { last: None };
        }
        self.record_press(kind, now);
        vec![Action::RenderNeeded]
    }

    /// Start resizing the sidebar from its edge.
    pub fn sidebar_drag_start(&mut self, at: Coords) -> Vec<Action> {
        self.gesture = Gesture::ResizingSidebar { last: at };
        self.last_mouse = at;
        Vec::new()
    }

    pub fn pointer_move(&mut self, at: Coords) -> Vec<Action> {
        let mut actions = Vec::new();
        match self.gesture {
            Gesture::DraggingElements { .. } => {
                let d = at.delta(self.last_mouse);
                let ids = self.pool.selected_ids().to_vec();
                for id in &ids {
                    if let Some(el) = self.pool.get_mut(id) {
                        el.position = el.position.offset_by(d.x, d.y);
                    }
                    self.fix_position(id, false);
                }
                if !ids.is_empty() {
                    self.set_modified(false);
                }
                self.gesture = Gesture::DraggingElements { last: Some(at) };
                actions.push(Action::RenderNeeded);
            }
            Gesture::ScrollingViewport { last } => {
                let d = last.delta(at);
                let mut next = self.cur_offset.offset_by(d.x, d.y);
                next.x = next.x.max(0.0);
                next.y = next.y.max(0.0);
                if next.x > self.viewport.x - SCROLL_MARGIN {
                    next.x = self.viewport.x - SCROLL_MARGIN;
                }
                if next.y > self.viewport.y - SCROLL_MARGIN {
                    next.y = self.viewport.y - SCROLL_MARGIN;
                }
                self.gesture = Gesture::ScrollingViewport { last: at };
                actions.extend(self.set_cur_offset(next));
            }
            Gesture::ResizingSidebar { last } => {
                let mut width = self.sidebar_width + last.x - at.x;
                if width < MIN_SIDEBAR_WIDTH {
                    width = MIN_SIDEBAR_WIDTH;
                }
                if width > self.options.window.x {
                    width = self.options.window.x;
                }
                self.sidebar_width = width;
                self.gesture = Gesture::ResizingSidebar { last: at };
                actions.push(Action::RenderNeeded);
            }
            Gesture::Selecting { .. } => actions.push(Action::RenderNeeded),
            Gesture::Idle => {}
        }
        self.last_mouse = at;
        actions
    }

    /// Release anywhere on the page.
    ///
    /// Element releases apply click semantics first (shift toggles, a quick
    /// click selects only that element), then drags and rubber bands finish.
    pub fn pointer_up(&mut self, at: Coords, target: PointerTarget, mods: Modifiers, now: f64) -> Vec<Action> {
        let mut selection_changed = false;
        if let PointerTarget::Element(id) = target {
            if mods.shift {
                self.pool.toggle_selected(id);
                selection_changed = true;
            } else if self.is_click(now) && self.pool.selected_ids() != [id] {
                self.pool.set_selected(id);
                selection_changed = true;
            }
        }

        if self.pool.elements_dragged() {
            let moved = matches!(self.gesture, Gesture::DraggingElements { last: Some(_) });
            let ids = self.pool.selected_ids().to_vec();
            let before = self.positions(&ids);
            for id in &ids {
                self.fix_position(id, true);
            }
            self.pool.set_dragged(false);
            if moved || before != self.positions(&ids) {
                self.set_modified(true);
            }
        }
        self.viewport_scrolled = false;

        if let Gesture::Selecting { start } = self.gesture
            && target.completes_selection()
        {
            let rect = Rect::from_corners(start, at).map(|p| self.page_to_dashboard(p));
            if !mods.shift {
                self.pool.clear_selection();
            }
            let hits: Vec<ElementId> = self
                .pool
                .items()
                .iter()
                .filter(|el| rect.contains_anchor(el.position, SELECTION_SLOP))
                .map(|el| el.id)
                .collect();
            for id in hits {
                self.pool.select(id);
            }
            selection_changed = true;
        }
        self.gesture = Gesture::Idle;
        self.last_mouse = at;

        if selection_changed {
            self.snapshot_undo();
        }
        vec![Action::RenderNeeded]
    }

    fn positions(&self, ids: &[ElementId]) -> Vec<Coords> {
        ids.iter().filter_map(|id| self.pool.get(id).map(|el| el.position)).collect()
    }

    // --- Keyboard ---

    /// Global shortcuts. Keys typed into sidebar inputs are ignored.
    pub fn key_down(&mut self, code: KeyCode, mods: Modifiers, target: KeyTarget) -> Vec<Action> {
        if target != KeyTarget::Body {
            return Vec::new();
        }
        if code != KeyCode::KeyH && self.help_visible {
            self.help_visible = false;
        }
        let grid = f64::from(self.grid);
        match code {
            KeyCode::Home => with_prevent(self.set_cur_offset(Coords::default())),
            KeyCode::Backquote => with_prevent(self.toggle_sidebar()),
            KeyCode::Backspace => self.leave_guard(),
            KeyCode::ArrowLeft if mods.alt => self.leave_guard(),
            KeyCode::ArrowRight if mods.alt => self.leave_guard(),
            KeyCode::ArrowLeft if mods.shift => self.scroll_by(grid, 0.0),
            KeyCode::ArrowRight if mods.shift => self.scroll_by(-grid, 0.0),
            KeyCode::ArrowUp if mods.shift => self.scroll_by(0.0, grid),
            KeyCode::ArrowDown if mods.shift => self.scroll_by(0.0, -grid),
            KeyCode::ArrowLeft => self.nudge_selection(-grid, 0.0),
            KeyCode::ArrowRight => self.nudge_selection(grid, 0.0),
            KeyCode::ArrowUp => self.nudge_selection(0.0, -grid),
            KeyCode::ArrowDown => self.nudge_selection(0.0, grid),
            KeyCode::KeyZ if mods.ctrl => with_prevent(self.undo()),
            KeyCode::KeyY if mods.ctrl => with_prevent(self.redo()),
            KeyCode::KeyX if mods.plain() => with_prevent(self.show_source()),
            KeyCode::KeyH if mods.plain() => with_prevent(self.set_help_visible(true)),
            KeyCode::KeyL if mods.plain() => self.set_scrolling_enabled(!self.scrolling_enabled),
            KeyCode::KeyS if !mods.alt => self.save(mods.shift),
            KeyCode::KeyQ if mods.shift && !mods.alt => with_prevent(self.request_finish()),
            KeyCode::KeyC if mods.plain() => with_prevent(self.copy_selected()),
            KeyCode::Delete if mods.plain() => with_prevent(self.delete_selected()),
            _ => Vec::new(),
        }
    }

    fn nudge_selection(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        if !self.pool.selection_active() {
            return Vec::new();
        }
        let ids = self.pool.selected_ids().to_vec();
        for id in &ids {
            if let Some(el) = self.pool.get_mut(id) {
                el.position = el.position.offset_by(dx, dy);
            }
            self.fix_position(id, true);
        }
        self.set_modified(true);
        vec![Action::PreventDefault, Action::RenderNeeded]
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        let next = self.cur_offset.offset_by(dx, dy);
        with_prevent(self.set_cur_offset(next))
    }
}

fn with_prevent(actions: Vec<Action>) -> Vec<Action> {
    let mut out = Vec::with_capacity(actions.len() + 1);
    out.push(Action::PreventDefault);
    out.extend(actions);
    out
}
