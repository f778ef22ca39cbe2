//! Browser bindings.
//!
//! [`Engine`] wraps [`EditorCore`] and owns the overlay canvas; [`Viewer`]
//! wraps [`DashboardViewer`]. Both take JSON strings and primitives from
//! JavaScript and return the resulting [`Action`] list serialized as JSON,
//! which the host processes in order.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::fmt::Display;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::dashboard::DashboardData;
use crate::editor::{Action, EditorCore, EditorOptions};
use crate::element::ElementId;
use crate::geom::Coords;
use crate::input::{KeyCode, KeyTarget, Modifiers, PointerKind, PointerTarget};
use crate::pack::ElementPack;
use crate::property::PropertyInput;
use crate::render;
use crate::scene;
use crate::vars::Variables;
use crate::viewer::DashboardViewer;

/// Install the panic hook and route `log` output to the browser console.
#[wasm_bindgen]
pub fn init_logging(level: &str) {
    console_error_panic_hook::set_once();
    let level = level.parse().unwrap_or(log::Level::Info);
    if console_log::init_with_level(level).is_err() {
        log::debug!("console logger already installed");
    }
}

fn js_err(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn emit(actions: &[Action]) -> Result<String, JsValue> {
    serde_json::to_string(actions).map_err(js_err)
}

fn now() -> f64 {
    js_sys::Date::now()
}

fn pointer_kind(touch: bool) -> PointerKind {
    if touch { PointerKind::Touch } else { PointerKind::Mouse }
}

fn key_target(in_input: bool) -> KeyTarget {
    if in_input { KeyTarget::Input } else { KeyTarget::Body }
}

fn parse_id(id: &str) -> Result<ElementId, String> {
    ElementId::parse_str(id).map_err(|e| format!("invalid element id {id}: {e}"))
}

/// Decode a release target reported by the host: `viewport`, `selection`,
/// `element` (with an id) or anything else.
fn pointer_target(kind: &str, id: Option<&str>) -> Result<PointerTarget, String> {
    Ok(match kind {
        "viewport" => PointerTarget::Viewport,
        "selection" => PointerTarget::SelectionRect,
        "element" => match id {
            Some(id) => PointerTarget::Element(parse_id(id)?),
            None => return Err("element target without id".to_owned()),
        },
        _ => PointerTarget::Other,
    })
}

fn parse_dashboard(json: Option<String>) -> Result<Option<DashboardData>, String> {
    match json {
        Some(json) => DashboardData::from_source(&json).map(Some).map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

/// The dashboard editor. Wraps `EditorCore` and owns the overlay canvas.
#[wasm_bindgen]
pub struct Engine {
    canvas: HtmlCanvasElement,
    core: EditorCore,
}

#[wasm_bindgen]
impl Engine {
    /// Create an editor bound to the overlay `canvas`.
    ///
    /// `pack_json` is the element pack; `options_json` deserializes into
    /// [`EditorOptions`] (missing fields take defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, pack_json: &str, options_json: &str) -> Result<Engine, JsValue> {
        let pack = ElementPack::from_json(pack_json).map_err(js_err)?;
        let options: EditorOptions = serde_json::from_str(options_json).map_err(js_err)?;
        log::info!("editor ready: {} element classes", pack.len());
        Ok(Self { canvas, core: EditorCore::new(pack, options) })
    }

    // --- Data ---

    pub fn load(&mut self, dashboard_json: Option<String>) -> Result<String, JsValue> {
        let data = parse_dashboard(dashboard_json).map_err(js_err)?;
        emit(&self.core.load(data))
    }

    pub fn export(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.core.export_data()).map_err(js_err)
    }

    pub fn oids(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.core.oids_to_subscribe()).map_err(js_err)
    }

    pub fn scene(&self) -> Result<String, JsValue> {
        serde_json::to_string(&scene::editor_scene(&self.core, now())).map_err(js_err)
    }

    /// Redraw the overlay canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self, width: f64, height: f64, dpr: f64) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        render::draw_overlay(&ctx, &scene::editor_scene(&self.core, now()), width, height, dpr)
    }

    // --- Elements ---

    pub fn add_element(&mut self, kind: &str, x: Option<f64>, y: Option<f64>) -> Result<String, JsValue> {
        let pos = x.zip(y).map(|(x, y)| Coords::new(x, y));
        emit(&self.core.add_element(kind, pos, true))
    }

    pub fn drop_element(&mut self, kind: &str, x: f64, y: f64) -> Result<String, JsValue> {
        emit(&self.core.drop_new_element(kind, Coords::new(x, y)))
    }

    pub fn align_elements(&mut self) -> Result<String, JsValue> {
        emit(&self.core.align_elements())
    }

    pub fn copy_selected(&mut self) -> Result<String, JsValue> {
        emit(&self.core.copy_selected())
    }

    pub fn delete_selected(&mut self) -> Result<String, JsValue> {
        emit(&self.core.delete_selected())
    }

    pub fn delete_all(&mut self) -> Result<String, JsValue> {
        emit(&self.core.delete_all())
    }

    pub fn select_element(&mut self, id: &str) -> Result<String, JsValue> {
        let id = parse_id(id).map_err(js_err)?;
        emit(&self.core.select_element(id))
    }

    pub fn set_element_position(&mut self, id: &str, x: f64, y: f64) -> Result<String, JsValue> {
        let id = parse_id(id).map_err(js_err)?;
        emit(&self.core.set_element_position(id, Coords::new(x, y)))
    }

    pub fn set_element_zindex(&mut self, id: &str, zindex: i32) -> Result<String, JsValue> {
        let id = parse_id(id).map_err(js_err)?;
        emit(&self.core.set_element_zindex(id, i64::from(zindex)))
    }

    /// Set a parameter from a structured editor; `value_json` is any JSON value.
    pub fn set_element_param(&mut self, id: &str, name: &str, value_json: &str) -> Result<String, JsValue> {
        let id = parse_id(id).map_err(js_err)?;
        let value: serde_json::Value = serde_json::from_str(value_json).map_err(js_err)?;
        emit(&self.core.set_element_param(id, name, PropertyInput::Value(value)))
    }

    /// Set a parameter from a text field.
    pub fn set_element_param_text(&mut self, id: &str, name: &str, text: &str) -> Result<String, JsValue> {
        let id = parse_id(id).map_err(js_err)?;
        emit(&self.core.set_element_param(id, name, PropertyInput::from(text)))
    }

    // --- Globals ---

    pub fn set_name(&mut self, name: &str) -> Result<String, JsValue> {
        emit(&self.core.set_name(name))
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) -> Result<String, JsValue> {
        emit(&self.core.set_viewport(Coords::new(width, height)))
    }

    pub fn set_scale(&mut self, scale: f64) -> Result<String, JsValue> {
        emit(&self.core.set_scale(scale))
    }

    pub fn set_grid(&mut self, grid: u32) -> Result<String, JsValue> {
        emit(&self.core.set_grid(grid))
    }

    pub fn set_variables(&mut self, variables_json: &str) -> Result<String, JsValue> {
        let variables: Variables = serde_json::from_str(variables_json).map_err(js_err)?;
        emit(&self.core.set_variables(variables))
    }

    // --- Chrome ---

    pub fn set_cur_offset(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        emit(&self.core.set_cur_offset(Coords::new(x, y)))
    }

    pub fn set_scrolling_enabled(&mut self, enabled: bool) -> Result<String, JsValue> {
        emit(&self.core.set_scrolling_enabled(enabled))
    }

    pub fn toggle_sidebar(&mut self) -> Result<String, JsValue> {
        emit(&self.core.toggle_sidebar())
    }

    pub fn set_sidebar_visible(&mut self, visible: bool) -> Result<String, JsValue> {
        emit(&self.core.set_sidebar_visible(visible))
    }

    pub fn set_help_visible(&mut self, visible: bool) -> Result<String, JsValue> {
        emit(&self.core.set_help_visible(visible))
    }

    pub fn set_window(&mut self, width: f64, height: f64) -> Result<String, JsValue> {
        emit(&self.core.set_window(width, height))
    }

    pub fn set_viewport_offset(&mut self, x: f64, y: f64) {
        self.core.set_viewport_offset(Coords::new(x, y));
    }

    // --- Undo / source ---

    pub fn undo(&mut self) -> Result<String, JsValue> {
        emit(&self.core.undo())
    }

    pub fn redo(&mut self) -> Result<String, JsValue> {
        emit(&self.core.redo())
    }

    pub fn show_source(&mut self) -> Result<String, JsValue> {
        emit(&self.core.show_source())
    }

    pub fn apply_source(&mut self, source: &str) -> Result<String, JsValue> {
        emit(&self.core.apply_source(source))
    }

    pub fn cancel_source(&mut self) -> Result<String, JsValue> {
        emit(&self.core.cancel_source())
    }

    // --- Save / exit ---

    pub fn save_completed(&mut self, ok: bool, finish_after: bool) -> Result<String, JsValue> {
        emit(&self.core.save_completed(ok, finish_after))
    }

    pub fn request_finish(&mut self) -> Result<String, JsValue> {
        emit(&self.core.request_finish())
    }

    pub fn confirm_exit(&mut self) -> Result<String, JsValue> {
        emit(&self.core.confirm_exit())
    }

    pub fn cancel_exit(&mut self) -> Result<String, JsValue> {
        emit(&self.core.cancel_exit())
    }

    /// `beforeunload` handler: whether to warn about unsaved changes.
    pub fn before_unload(&self) -> bool {
        self.core.before_unload()
    }

    // --- Input ---

    pub fn pointer_down_viewport(&mut self, x: f64, y: f64, mods: u8, touch: bool) -> Result<String, JsValue> {
        let actions =
            self.core
                .pointer_down_viewport(Coords::new(x, y), Modifiers::from_bits(mods), pointer_kind(touch), now());
        emit(&actions)
    }

    pub fn pointer_down_element(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        mods: u8,
        touch: bool,
    ) -> Result<String, JsValue> {
        let id = parse_id(id).map_err(js_err)?;
        let actions = self.core.pointer_down_element(
            id,
            Coords::new(x, y),
            Modifiers::from_bits(mods),
            pointer_kind(touch),
            now(),
        );
        emit(&actions)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        emit(&self.core.pointer_move(Coords::new(x, y)))
    }

    pub fn pointer_up(
        &mut self,
        x: f64,
        y: f64,
        target: &str,
        element_id: Option<String>,
        mods: u8,
    ) -> Result<String, JsValue> {
        let target = pointer_target(target, element_id.as_deref()).map_err(js_err)?;
        emit(&self.core.pointer_up(Coords::new(x, y), target, Modifiers::from_bits(mods), now()))
    }

    pub fn sidebar_drag_start(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        emit(&self.core.sidebar_drag_start(Coords::new(x, y)))
    }

    /// `code` is `KeyboardEvent.code`; `in_input` is true for events typed
    /// into form fields.
    pub fn key_down(&mut self, code: &str, mods: u8, in_input: bool) -> Result<String, JsValue> {
        emit(&self.core.key_down(KeyCode::from_code(code), Modifiers::from_bits(mods), key_target(in_input)))
    }
}

impl Engine {
    /// The wrapped editor state.
    #[must_use]
    pub fn core(&self) -> &EditorCore {
        &self.core
    }
}

/// The read-only dashboard viewer.
#[wasm_bindgen]
pub struct Viewer {
    viewer: DashboardViewer,
}

#[wasm_bindgen]
impl Viewer {
    #[wasm_bindgen(constructor)]
    pub fn new(dashboard_json: &str, pack_json: &str, finish_allowed: bool) -> Result<Viewer, JsValue> {
        let data = DashboardData::from_source(dashboard_json).map_err(js_err)?;
        let pack = ElementPack::from_json(pack_json).map_err(js_err)?;
        let mut viewer = DashboardViewer::new(data, pack);
        viewer.finish_allowed = finish_allowed;
        Ok(Self { viewer })
    }

    pub fn set_variables(&mut self, variables_json: &str) -> Result<String, JsValue> {
        let variables: Variables = serde_json::from_str(variables_json).map_err(js_err)?;
        emit(&self.viewer.set_variables(variables))
    }

    pub fn oids(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.viewer.oids_to_subscribe()).map_err(js_err)
    }

    pub fn key_down(&self, code: &str, mods: u8, in_input: bool) -> Result<String, JsValue> {
        emit(&self.viewer.key_down(KeyCode::from_code(code), Modifiers::from_bits(mods), key_target(in_input)))
    }

    pub fn viewport_meta_content(&self) -> String {
        self.viewer.viewport_meta_content()
    }

    pub fn scene(&self) -> Result<String, JsValue> {
        serde_json::to_string(&scene::viewer_scene(&self.viewer)).map_err(js_err)
    }
}
