//! Display lists for the host.
//!
//! The host renders elements with the element pack's own renderers, so the
//! editor never draws them itself. Instead it computes where everything goes
//! (element boxes, CSS classes, rulers, the rubber band, scroll indicators,
//! the property bar) and hands the host a serializable scene.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use serde::Serialize;
use serde_json::Value;

use crate::consts::{RULER_LEGEND_DX, RULER_LEGEND_DY};
use crate::editor::EditorCore;
use crate::element::{DElement, ElementId};
use crate::geom::{Coords, Rect};
use crate::input::Gesture;
use crate::pack::ElementPack;
use crate::pool::ElementPool;
use crate::viewer::DashboardViewer;

pub const CLASS_ELEMENT: &str = "idc-element";
pub const CLASS_SELECTED: &str = "idc-element-selected";
pub const CLASS_DRAGGED: &str = "idc-element-dragged";
pub const CLASS_VIEW: &str = "idc-element-view";

/// One element positioned inside the viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementView {
    pub id: ElementId,
    pub kind: String,
    /// Viewport-local position.
    pub left: f64,
    pub top: f64,
    /// Class default size; zero for unknown kinds.
    pub width: f64,
    pub height: f64,
    pub z_index: i64,
    pub css_class: String,
    pub boxed: bool,
    pub selected: bool,
    pub dragged: bool,
    /// Parameters with template variables resolved.
    pub params: Value,
}

/// Position guides for the element being dragged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ruler {
    /// Viewport-local anchor; the guides run from the viewport edges to here.
    pub x: f64,
    pub y: f64,
    pub legend_left: f64,
    pub legend_top: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollIndicator {
    pub width: f64,
    pub height: f64,
    pub text: String,
}

/// Arrows hinting that part of the viewport is scrolled out of sight.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScrollHelpers {
    pub left: bool,
    pub up: bool,
    pub right: bool,
    pub down: bool,
    /// Shown while the viewport is being dragged.
    pub indicator: Option<ScrollIndicator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    pub keys: &'static str,
    pub action: &'static str,
}

/// One editable property of the selected element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropRow {
    pub name: String,
    pub kind: String,
    pub params: Option<Value>,
    pub value: Option<Value>,
}

/// Contents of the sidebar property bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropsPanel {
    /// Nothing selected: the globals bar is shown instead.
    Globals,
    Multiple { count: usize },
    Unsupported { kind: String },
    Element {
        id: ElementId,
        kind: String,
        description: String,
        position: Coords,
        zindex: i64,
        props: Vec<PropRow>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteItem {
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteGroupView {
    pub group: String,
    pub items: Vec<PaletteItem>,
}

/// Editor chrome state the host mirrors into its widgets.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chrome {
    pub name: String,
    pub viewport: Coords,
    pub scale: f64,
    pub grid: u32,
    pub modified: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub sidebar_visible: bool,
    pub sidebar_width: f64,
    pub source_visible: bool,
    pub exit_confirm_visible: bool,
    pub scrolling_enabled: bool,
    pub param_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorScene {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub grid: u32,
    pub cursor: &'static str,
    pub elements: Vec<ElementView>,
    pub ruler: Option<Ruler>,
    /// Rubber band in viewport-local coordinates.
    pub selection_rect: Option<Rect>,
    pub scroll: ScrollHelpers,
    pub help: Option<Vec<HelpEntry>>,
    pub props: PropsPanel,
    pub palette: Vec<PaletteGroupView>,
    pub chrome: Chrome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerScene {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub meta_content: String,
    pub elements: Vec<ElementView>,
}

/// Keyboard reference shown by `H`.
#[must_use]
pub fn help_entries(save_allowed: bool, finish_allowed: bool) -> Vec<HelpEntry> {
    let mut out = vec![
        HelpEntry { keys: "h", action: "show this help" },
        HelpEntry { keys: "c", action: "copy selected elements" },
        HelpEntry { keys: "Del", action: "delete selected elements" },
        HelpEntry { keys: "x", action: "edit dashboard source" },
        HelpEntry { keys: "l", action: "toggle viewport scrolling" },
        HelpEntry { keys: "arrows", action: "move selected elements" },
        HelpEntry { keys: "Ctrl+Z", action: "undo" },
        HelpEntry { keys: "Ctrl+Y", action: "redo" },
        HelpEntry { keys: "Shift+arrows", action: "scroll viewport" },
        HelpEntry { keys: "Shift+LeftMouse", action: "add/remove element to/from selection" },
        HelpEntry { keys: "Ctrl+LeftMouse", action: "start selection over elements" },
        HelpEntry { keys: "Home", action: "reset viewport scroll" },
    ];
    if save_allowed {
        out.push(HelpEntry { keys: "s", action: "save dashboard" });
        if finish_allowed {
            out.push(HelpEntry { keys: "Shift+S", action: "save dashboard and exit" });
        }
    }
    if finish_allowed {
        out.push(HelpEntry { keys: "Shift+Q", action: "exit editor" });
    }
    out.push(HelpEntry { keys: "`", action: "toggle sidebar" });
    out
}

fn element_view(el: &DElement, pool: &ElementPool, pack: &ElementPack, offset: Coords) -> ElementView {
    let class = pack.class(&el.kind);
    let size = class.map(|c| c.default_size).unwrap_or_default();
    ElementView {
        id: el.id,
        kind: el.kind.clone(),
        left: el.position.x - offset.x,
        top: el.position.y - offset.y,
        width: size.x,
        height: size.y,
        z_index: el.zindex,
        css_class: CLASS_VIEW.to_owned(),
        boxed: class.is_some_and(|c| c.boxed),
        selected: false,
        dragged: false,
        params: pool.resolved_params(&el.id).unwrap_or_else(|| el.params.clone()),
    }
}

/// Scene for the editor at time `now` (milliseconds).
///
/// Rulers and the rubber band stay hidden during the click window so a
/// simple click doesn't flash them.
#[must_use]
pub fn editor_scene(core: &EditorCore, now: f64) -> EditorScene {
    let offset = core.aligned_offset();
    let past_click = !core.is_click(now);
    let dragging = core.pool.elements_dragged();

    let elements = core
        .pool
        .display_order()
        .into_iter()
        .map(|el| {
            let mut view = element_view(el, &core.pool, &core.pack, offset);
            view.selected = core.pool.is_selected(&el.id);
            view.dragged = (dragging && view.selected) || core.viewport_scrolled;
            let mut class = CLASS_ELEMENT.to_owned();
            if view.selected {
                class.push(' ');
                class.push_str(CLASS_SELECTED);
            }
            if view.dragged {
                class.push(' ');
                class.push_str(CLASS_DRAGGED);
            }
            view.css_class = class;
            if core.pack.class(&el.kind).is_some_and(|c| c.actions)
                && let Some(map) = view.params.as_object_mut()
            {
                map.insert("disabled_actions".to_owned(), Value::Bool(true));
            }
            view
        })
        .collect();

    let ruler = if dragging && past_click {
        core.pool.top_selected_element().map(|el| ruler_for(el, offset))
    } else {
        None
    };

    let selection_rect = match core.gesture {
        Gesture::Selecting { start } if past_click => {
            let o = core.options.viewport_offset;
            Some(Rect::from_corners(start, core.last_mouse).map(|p| p.offset_by(-o.x, -o.y)))
        }
        _ => None,
    };

    EditorScene {
        viewport_width: core.viewport.x - offset.x,
        viewport_height: core.viewport.y - offset.y,
        grid: core.grid,
        cursor: if core.scrolling_enabled { "grab" } else { "default" },
        elements,
        ruler,
        selection_rect,
        scroll: scroll_helpers(core, offset),
        help: core
            .help_visible
            .then(|| help_entries(core.options.save_allowed, core.options.finish_allowed)),
        props: props_panel(core),
        palette: palette(&core.pack),
        chrome: Chrome {
            name: core.name.clone(),
            viewport: core.viewport,
            scale: core.scale,
            grid: core.grid,
            modified: core.modified,
            can_undo: core.can_undo(),
            can_redo: core.can_redo(),
            sidebar_visible: core.sidebar_visible,
            sidebar_width: core.sidebar_width,
            source_visible: core.source_visible,
            exit_confirm_visible: core.exit_confirm_visible,
            scrolling_enabled: core.scrolling_enabled,
            param_error: core.param_error.clone(),
        },
    }
}

fn ruler_for(el: &DElement, offset: Coords) -> Ruler {
    let x = el.position.x - offset.x;
    let y = el.position.y - offset.y;
    Ruler {
        x,
        y,
        legend_left: x + RULER_LEGEND_DX,
        legend_top: (y - RULER_LEGEND_DY).max(1.0),
        text: format!("{} x: {}, y: {}", el.kind, el.position.x, el.position.y),
    }
}

fn scroll_helpers(core: &EditorCore, offset: Coords) -> ScrollHelpers {
    let window = core.options.window;
    let page = core.options.viewport_offset;
    let visible = Coords::new(core.viewport.x - offset.x, core.viewport.y - offset.y);
    ScrollHelpers {
        left: offset.x > 0.0,
        up: offset.y > 0.0,
        right: visible.x + page.x > window.x,
        down: visible.y + page.y > window.y,
        indicator: core.viewport_scrolled.then(|| ScrollIndicator {
            width: visible.x.min(window.x),
            height: visible.y.min(window.y),
            text: format!("X: {} Y: {}", offset.x, offset.y),
        }),
    }
}

fn props_panel(core: &EditorCore) -> PropsPanel {
    let count = core.pool.selected_ids().len();
    if count > 1 {
        return PropsPanel::Multiple { count };
    }
    let Some(el) = core.pool.selected_elements().next() else {
        return PropsPanel::Globals;
    };
    let Some(class) = core.pack.class(&el.kind) else {
        return PropsPanel::Unsupported { kind: el.kind.clone() };
    };
    let params = el.params();
    PropsPanel::Element {
        id: el.id,
        kind: el.kind.clone(),
        description: class.description.clone(),
        position: el.position,
        zindex: el.zindex,
        props: class
            .props
            .iter()
            .map(|p| PropRow {
                name: p.name.clone(),
                kind: p.kind.as_str().to_owned(),
                params: p.params.clone(),
                value: params.get(&p.name).cloned(),
            })
            .collect(),
    }
}

/// Palette groups of `pack`, as shown in the editor sidebar.
#[must_use]
pub fn palette(pack: &ElementPack) -> Vec<PaletteGroupView> {
    pack.groups()
        .into_iter()
        .map(|(group, classes)| PaletteGroupView {
            group: group.to_owned(),
            items: classes
                .into_iter()
                .map(|(kind, class)| PaletteItem { kind: kind.to_owned(), description: class.description.clone() })
                .collect(),
        })
        .collect()
}

/// Scene for the read-only viewer.
#[must_use]
pub fn viewer_scene(viewer: &DashboardViewer) -> ViewerScene {
    ViewerScene {
        name: viewer.name.clone(),
        width: viewer.viewport.x,
        height: viewer.viewport.y,
        meta_content: viewer.viewport_meta_content(),
        elements: viewer
            .pool
            .display_order()
            .into_iter()
            .map(|el| element_view(el, &viewer.pool, &viewer.pack, Coords::default()))
            .collect(),
    }
}
