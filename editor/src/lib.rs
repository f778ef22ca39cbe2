//! Dashboard editor and viewer engine.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! dashboard model and every editing rule: placing, moving, copying and
//! deleting elements, grid snapping, rubber-band selection, undo/redo,
//! property validation and source editing. The host JavaScript layer renders
//! elements through the element pack, forwards DOM events to the engine and
//! carries out the returned [`editor::Action`]s (saving, OID subscriptions,
//! dialogs).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | `wasm-bindgen` wrappers: [`engine::Engine`] and [`engine::Viewer`] |
//! | [`editor`] | Testable editor state machine, [`editor::EditorCore`] |
//! | [`viewer`] | Read-only [`viewer::DashboardViewer`] |
//! | [`scene`] | Serializable display lists for the host |
//! | [`render`] | Overlay drawing: grid, selection, rulers, rubber band |
//! | [`pool`] | Element pool: elements, selection, drag flag, variables |
//! | [`dashboard`] | Dashboard data and source validation |
//! | [`element`] | Placed elements and their parameter bags |
//! | [`pack`] | Element pack: classes, properties, palette groups |
//! | [`property`] | Property editor input validation |
//! | [`formula`] | Value formulas over `x` |
//! | [`vars`] | `${name}` template variables |
//! | [`history`] | Undo/redo snapshots |
//! | [`input`] | Modifiers, key codes, pointer targets and gestures |
//! | [`geom`] | Coordinates, rectangles and grid snapping |
//! | [`consts`] | Shared constants (defaults, limits, messages) |

pub mod consts;
pub mod dashboard;
pub mod editor;
pub mod element;
pub mod engine;
pub mod formula;
pub mod geom;
pub mod history;
pub mod input;
pub mod pack;
pub mod pool;
pub mod property;
pub mod render;
pub mod scene;
pub mod vars;
pub mod viewer;

#[cfg(test)]
mod testkit;
