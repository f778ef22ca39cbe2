//! Overlay rendering: grid, selection outlines, rulers and the rubber band.
//!
//! Elements themselves are rendered by the host through the element pack.
//! This module draws the editing aids on a transparent canvas laid over the
//! viewport and is the only place that touches
//! [`web_sys::CanvasRenderingContext2d`]. It reads an [`EditorScene`] and
//! never mutates editor state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::geom::Rect;
use crate::scene::{EditorScene, ElementView, Ruler};

const GRID_COLOR: &str = "rgba(0, 0, 0, 0.25)";
const SELECTION_COLOR: &str = "#1E90FF";
const DRAGGED_COLOR: &str = "rgba(30, 144, 255, 0.5)";
const MARQUEE_FILL: &str = "rgba(30, 144, 255, 0.12)";
const RULER_COLOR: &str = "#FF4500";

/// Dash segment length in CSS pixels.
const DASH_PX: f64 = 4.0;

/// Grids finer than this many pixels are not drawn.
const MIN_GRID_PX: u32 = 5;

/// Draw the overlay for `scene`.
///
/// `width` and `height` are the canvas size in CSS pixels. `dpr` is the
/// device pixel ratio.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw_overlay(
    ctx: &CanvasRenderingContext2d,
    scene: &EditorScene,
    width: f64,
    height: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, width, height);

    let w = width.min(scene.viewport_width);
    let h = height.min(scene.viewport_height);
    draw_grid(ctx, scene.grid, w, h);

    for view in scene.elements.iter().filter(|v| v.selected) {
        draw_selection(ctx, view)?;
    }

    if let Some(ruler) = &scene.ruler {
        draw_ruler(ctx, ruler)?;
    }

    if let Some(rect) = scene.selection_rect {
        draw_marquee(ctx, rect)?;
    }

    Ok(())
}

fn draw_grid(ctx: &CanvasRenderingContext2d, grid: u32, width: f64, height: f64) {
    if grid < MIN_GRID_PX {
        return;
    }
    let step = f64::from(grid);
    ctx.save();
    ctx.set_fill_style_str(GRID_COLOR);
    let mut y = 0.0;
    while y <= height {
        let mut x = 0.0;
        while x <= width {
            ctx.fill_rect(x, y, 1.0, 1.0);
            x += step;
        }
        y += step;
    }
    ctx.restore();
}

fn set_dash(ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
    let dash = js_sys::Array::new();
    dash.push(&DASH_PX.into());
    dash.push(&DASH_PX.into());
    ctx.set_line_dash(&dash)
}

fn clear_dash(ctx: &CanvasRenderingContext2d) -> Result<(), JsValue> {
    ctx.set_line_dash(&js_sys::Array::new())
}

fn draw_selection(ctx: &CanvasRenderingContext2d, view: &ElementView) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0);
    set_dash(ctx)?;
    ctx.stroke_rect(view.left - 1.0, view.top - 1.0, view.width + 2.0, view.height + 2.0);
    clear_dash(ctx)?;
    if view.dragged {
        ctx.set_fill_style_str(DRAGGED_COLOR);
        ctx.fill_rect(view.left, view.top, 3.0, 3.0);
    }
    ctx.restore();
    Ok(())
}

fn draw_ruler(ctx: &CanvasRenderingContext2d, ruler: &Ruler) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_stroke_style_str(RULER_COLOR);
    ctx.set_line_width(1.0);
    set_dash(ctx)?;

    ctx.begin_path();
    ctx.move_to(0.0, ruler.y);
    ctx.line_to(ruler.x, ruler.y);
    ctx.move_to(ruler.x, 0.0);
    ctx.line_to(ruler.x, ruler.y);
    ctx.stroke();
    clear_dash(ctx)?;

    ctx.set_fill_style_str(RULER_COLOR);
    ctx.set_font("11px sans-serif");
    ctx.set_text_baseline("top");
    ctx.fill_text(&ruler.text, ruler.legend_left, ruler.legend_top)?;

    ctx.restore();
    Ok(())
}

fn draw_marquee(ctx: &CanvasRenderingContext2d, rect: Rect) -> Result<(), JsValue> {
    ctx.save();
    set_dash(ctx)?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_fill_style_str(MARQUEE_FILL);
    ctx.set_line_width(1.0);
    ctx.fill_rect(rect.left, rect.top, rect.width, rect.height);
    ctx.stroke_rect(rect.left, rect.top, rect.width, rect.height);
    clear_dash(ctx)?;
    ctx.restore();
    Ok(())
}
