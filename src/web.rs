// web.rs - Browser host: canvas surfaces and the animation loop
//
// Two stacked canvases: the field (painted on resize only) and the layer
// canvas (redrawn every frame). Listeners for resize, pointer movement and the
// frame callback are all held by the handle and removed together on destroy.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, info, warn};
use wasm_bindgen::{Clamped, JsCast, closure::Closure, prelude::*};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, ImageData, MouseEvent, Window, console,
};

use crate::backdrop::Backdrop;
use crate::color::Rgba;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::surface::{Gradient, GradientShape, Surface};
use crate::viewport::Viewport;

/// `Surface` over a 2D canvas context. A canvas without a context is kept
/// as `None` and every draw call becomes a no-op.
pub struct Canvas2d {
    canvas: HtmlCanvasElement,
    ctx: Option<CanvasRenderingContext2d>,
    dpr: f64,
    logical: (f64, f64),
}

impl Canvas2d {
    /// `name` only labels the warning when the context is missing
    pub fn new(canvas: HtmlCanvasElement, name: &str) -> Self {
        let ctx = match context_2d(&canvas) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                warn!(canvas = name, error = %e, "canvas has no 2d context, layer disabled");
                console::warn_1(&format!("backdrop: {name} canvas disabled: {e}").into());
                None
            }
        };
        Self { canvas, ctx, dpr: 1.0, logical: (0.0, 0.0) }
    }

    fn apply_scale(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0);
        }
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .map_err(|e| EngineError::Context(format!("{e:?}")))?
        .ok_or_else(|| EngineError::Context("2d unsupported".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| EngineError::Context("not a 2d context".into()))
}

impl Surface for Canvas2d {
    fn resize(&mut self, viewport: &Viewport) {
        self.canvas.set_width(viewport.physical_width());
        self.canvas.set_height(viewport.physical_height());
        // without a CSS size the canvas would lay out at its attribute size
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", viewport.width));
        let _ = style.set_property("height", &format!("{}px", viewport.height));
        self.dpr = viewport.dpr as f64;
        self.logical = (viewport.width as f64, viewport.height as f64);
        // setting the size resets the transform
        self.apply_scale();
    }

    fn clear(&mut self) {
        let Some(ctx) = &self.ctx else { return };
        ctx.clear_rect(0.0, 0.0, self.logical.0, self.logical.1);
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        let Some(ctx) = &self.ctx else { return };
        if radius <= 0.0 { return; }
        ctx.begin_path();
        if ctx.arc(x as f64, y as f64, radius as f64, 0.0, std::f64::consts::TAU).is_err() { return; }
        ctx.set_fill_style_str(&color.to_css());
        ctx.fill();
    }

    fn stroke_segment(&mut self, a: (f32, f32), b: (f32, f32), width: f32, from: Rgba, to: Rgba) {
        let Some(ctx) = &self.ctx else { return };
        let (ax, ay, bx, by) = (a.0 as f64, a.1 as f64, b.0 as f64, b.1 as f64);
        if from == to {
            ctx.set_stroke_style_str(&from.to_css());
        } else {
            let g = ctx.create_linear_gradient(ax, ay, bx, by);
            if g.add_color_stop(0.0, &from.to_css()).is_err() || g.add_color_stop(1.0, &to.to_css()).is_err() {
                return;
            }
            ctx.set_stroke_style_canvas_gradient(&g);
        }
        ctx.set_line_width(width as f64);
        ctx.begin_path();
        ctx.move_to(ax, ay);
        ctx.line_to(bx, by);
        ctx.stroke();
    }

    fn fill_gradient(&mut self, gradient: &Gradient) {
        let Some(ctx) = &self.ctx else { return };
        let g = match gradient.shape {
            GradientShape::Radial { cx, cy, r0, r1 } => {
                match ctx.create_radial_gradient(cx as f64, cy as f64, r0.max(0.0) as f64, cx as f64, cy as f64, r1.max(0.0) as f64) {
                    Ok(g) => g,
                    Err(_) => return,
                }
            }
            GradientShape::Linear { x0, y0, x1, y1 } => {
                ctx.create_linear_gradient(x0 as f64, y0 as f64, x1 as f64, y1 as f64)
            }
        };
        for (offset, color) in &gradient.stops {
            if g.add_color_stop(*offset, &color.to_css()).is_err() { return; }
        }
        ctx.set_fill_style_canvas_gradient(&g);
        ctx.fill_rect(0.0, 0.0, self.logical.0, self.logical.1);
    }

    fn overlay_rgba(&mut self, pixels: &[u8], width: u32, height: u32) {
        let Some(ctx) = &self.ctx else { return };
        // putImageData replaces pixels, so stage on a scratch canvas and composite
        let Some(doc) = web_sys::window().and_then(|w| w.document()) else { return };
        let Ok(scratch) = doc.create_element("canvas") else { return };
        let Ok(scratch) = scratch.dyn_into::<HtmlCanvasElement>() else { return };
        scratch.set_width(width);
        scratch.set_height(height);
        let Ok(sctx) = context_2d(&scratch) else { return };
        let Ok(img) = ImageData::new_with_u8_clamped_array_and_sh(Clamped(pixels), width, height) else { return };
        if sctx.put_image_data(&img, 0.0, 0.0).is_err() { return; }

        let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        let _ = ctx.draw_image_with_html_canvas_element(&scratch, 0.0, 0.0);
        self.apply_scale();
    }
}

struct Host {
    engine: Backdrop,
    field: Canvas2d,
    layers: Canvas2d,
}

impl Host {
    fn relayout(&mut self, window: &Window) {
        let viewport = measure(window);
        self.engine.resize(viewport);
        self.engine.paint_field(&mut self.field);
        self.layers.resize(&viewport);
    }
}

/// Logical size of the window the backdrop covers. Never read back from the
/// canvases, whose size is an output of this.
fn measure(window: &Window) -> Viewport {
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(w as f32, h as f32, window.device_pixel_ratio() as f32)
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Owns every listener of one mounted backdrop. Dropping it tears down.
#[wasm_bindgen]
pub struct BackdropHandle {
    window: Window,
    alive: Rc<Cell<bool>>,
    frame_id: Rc<Cell<Option<i32>>>,
    frame: FrameSlot,
    on_resize: Option<Closure<dyn FnMut()>>,
    on_move: Option<Closure<dyn FnMut(MouseEvent)>>,
    on_leave: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl BackdropHandle {
    /// Remove all listeners and cancel the pending frame. Safe to call twice.
    pub fn destroy(&mut self) {
        if !self.alive.replace(false) { return; }

        if let Some(id) = self.frame_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        if let Some(cb) = self.on_resize.take() {
            let _ = self.window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
        }
        if let Some(cb) = self.on_move.take() {
            let _ = self.window.remove_event_listener_with_callback("pointermove", cb.as_ref().unchecked_ref());
        }
        if let Some(cb) = self.on_leave.take() {
            let doc: Option<Document> = self.window.document();
            if let Some(doc) = doc {
                let _ = doc.remove_event_listener_with_callback("pointerleave", cb.as_ref().unchecked_ref());
            }
        }
        // break the frame closure's reference to itself
        self.frame.borrow_mut().take();
        info!("backdrop unmounted");
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }
}

impl Drop for BackdropHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Mount the engine on a field canvas and a layer canvas stacked above it.
#[wasm_bindgen]
pub fn mount_backdrop(
    field: HtmlCanvasElement,
    layers: HtmlCanvasElement,
    config: Option<String>,
) -> std::result::Result<BackdropHandle, JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let cfg = match config.as_deref() {
        Some(json) => EngineConfig::from_json(json).map_err(|e| {
            console::error_1(&format!("backdrop: {e}").into());
            JsValue::from_str(&e.to_string())
        })?,
        None => EngineConfig::default(),
    };
    let seed = js_sys::Date::now() as u64;

    let host = Rc::new(RefCell::new(Host {
        engine: Backdrop::new(cfg, seed),
        field: Canvas2d::new(field, "field"),
        layers: Canvas2d::new(layers, "layer"),
    }));
    host.borrow_mut().relayout(&window);

    // Listeners are handed to the handle as soon as they are registered, so an
    // early return drops the handle and unhooks whatever got attached.
    let mut handle = BackdropHandle {
        window: window.clone(),
        alive: Rc::new(Cell::new(true)),
        frame_id: Rc::new(Cell::new(None)),
        frame: Rc::new(RefCell::new(None)),
        on_resize: None,
        on_move: None,
        on_leave: None,
    };

    let on_resize = {
        let (host, alive, window) = (host.clone(), handle.alive.clone(), window.clone());
        Closure::<dyn FnMut()>::new(move || {
            if !alive.get() { return; }
            host.borrow_mut().relayout(&window);
        })
    };
    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    handle.on_resize = Some(on_resize);

    let on_move = {
        let (host, alive) = (host.clone(), handle.alive.clone());
        Closure::<dyn FnMut(MouseEvent)>::new(move |e: MouseEvent| {
            if !alive.get() { return; }
            let mut host = host.borrow_mut();
            let rect = host.layers.canvas.get_bounding_client_rect();
            let x = e.client_x() as f64 - rect.left();
            let y = e.client_y() as f64 - rect.top();
            host.engine.pointer_moved(x as f32, y as f32);
        })
    };
    window.add_event_listener_with_callback("pointermove", on_move.as_ref().unchecked_ref())?;
    handle.on_move = Some(on_move);

    let on_leave = {
        let (host, alive) = (host.clone(), handle.alive.clone());
        Closure::<dyn FnMut()>::new(move || {
            if !alive.get() { return; }
            host.borrow_mut().engine.pointer_left();
        })
    };
    if let Some(doc) = window.document() {
        doc.add_event_listener_with_callback("pointerleave", on_leave.as_ref().unchecked_ref())?;
        handle.on_leave = Some(on_leave);
    }

    // Animation loop. The closure lives in the frame slot so it can re-request itself.
    {
        let (slot, host, alive, ids, window) = (
            handle.frame.clone(),
            host.clone(),
            handle.alive.clone(),
            handle.frame_id.clone(),
            window.clone(),
        );
        *handle.frame.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |now: f64| {
            // a frame that fires after destroy must not touch the canvases
            if !alive.get() { return; }
            {
                let mut host = host.borrow_mut();
                let Host { engine, layers, .. } = &mut *host;
                engine.frame(now, layers);
            }
            if let Some(cb) = slot.borrow().as_ref() {
                ids.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
            }
        }));
    }
    let first = handle.frame.borrow().as_ref()
        .map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
    handle.frame_id.set(first.transpose()?);

    debug!(populations = ?host.borrow().engine.populations(), "backdrop mounted");
    Ok(handle)
}
