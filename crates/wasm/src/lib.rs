#![deny(unsafe_code)]
//! Browser bindings: a canvas 2D [`Surface`] and a page-level backdrop whose
//! lifecycle follows the host component's mount and unmount.
//!
//! ```js
//! const backdrop = WebBackdrop.mount(canvas, [blobA, blobB], '{"count": 120}', 42);
//! // ...
//! backdrop.unmount();
//! ```

use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use backdrop_core::{AnimationScheduler, Rgba, Surface, Viewport};
use backdrop_scene::{Backdrop, BackdropConfig, HostWindow};
use glam::DVec2;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlElement, Window};

/// A [`Surface`] backed by a `<canvas>` element's 2D context.
pub struct Canvas2dSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Canvas2dSurface {
    /// Acquires the 2D context, `None` if the browser refuses it.
    pub fn acquire(canvas: HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { canvas, ctx })
    }
}

impl Surface for Canvas2dSurface {
    fn size(&self) -> Viewport {
        Viewport::new(self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx
            .clear_rect(0.0, 0.0, size.width as f64, size.height as f64);
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, width: f64, color: Rgba) {
        self.ctx.begin_path();
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Rgba) {
        self.ctx.begin_path();
        if self.ctx.arc(center.x, center.y, radius, 0.0, TAU).is_ok() {
            self.ctx.set_fill_style_str(&color.to_css());
            self.ctx.fill();
        }
    }
}

/// Converts CSS pixel dimensions to a viewport; negative or non-numeric
/// readings become zero.
fn viewport_from_css(width: f64, height: f64) -> Viewport {
    let px = |v: f64| if v.is_finite() && v > 0.0 { v as u32 } else { 0 };
    Viewport::new(px(width), px(height))
}

fn window_viewport(window: &Window) -> Viewport {
    let read = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    viewport_from_css(read(window.inner_width()), read(window.inner_height()))
}

fn now_ms(window: &Window) -> f64 {
    window.performance().map(|p| p.now()).unwrap_or(0.0)
}

type SharedBackdrop = Rc<RefCell<Option<Backdrop<Canvas2dSurface>>>>;
type FrameLoop = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// The backdrop mounted on the current page.
#[wasm_bindgen]
pub struct WebBackdrop {
    window: Window,
    backdrop: SharedBackdrop,
    frame_loop: FrameLoop,
    frame_handle: Rc<Cell<Option<i32>>>,
    on_resize: Option<Closure<dyn FnMut(Event)>>,
    on_scroll: Option<Closure<dyn FnMut(Event)>>,
}

#[wasm_bindgen]
impl WebBackdrop {
    /// Starts the particle field on `canvas` and drives `blob_elements` with
    /// the page scroll.
    ///
    /// If the canvas has no 2D context the particle field stays inert; the
    /// blobs still move. Only malformed params are an error.
    pub fn mount(
        canvas: HtmlCanvasElement,
        blob_elements: js_sys::Array,
        params_json: &str,
        seed: u32,
    ) -> Result<WebBackdrop, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let config =
            BackdropConfig::from_json_str(params_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let blobs: Vec<HtmlElement> = blob_elements
            .iter()
            .filter_map(|el| el.dyn_into::<HtmlElement>().ok())
            .collect();

        let surface = Canvas2dSurface::acquire(canvas);
        if surface.is_none() {
            warn!("canvas 2d context unavailable; particles disabled");
        }

        let host = HostWindow::new(window_viewport(&window));
        host.scroll_to(window.scroll_y().unwrap_or(0.0), now_ms(&window));
        let scheduler = AnimationScheduler::new();
        let backdrop: SharedBackdrop = Rc::new(RefCell::new(Some(Backdrop::mount(
            &host,
            &scheduler,
            surface,
            config,
            u64::from(seed),
        ))));

        let on_resize = {
            let (host, window) = (host.clone(), window.clone());
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                host.resize_to(window_viewport(&window));
            })
        };
        let on_scroll = {
            let (host, window) = (host.clone(), window.clone());
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                host.scroll_to(window.scroll_y().unwrap_or(0.0), now_ms(&window));
            })
        };
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        window.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())?;

        let frame_loop: FrameLoop = Rc::new(RefCell::new(None));
        let frame_handle = Rc::new(Cell::new(None));
        {
            let (next, handle) = (Rc::clone(&frame_loop), Rc::clone(&frame_handle));
            let (window, backdrop) = (window.clone(), Rc::clone(&backdrop));
            *frame_loop.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
                scheduler.tick(timestamp);
                let mounted = backdrop.borrow();
                let Some(mounted) = mounted.as_ref() else {
                    return;
                };
                for t in mounted.blob_transforms() {
                    if let Some(el) = blobs.get(t.index) {
                        let _ = el.style().set_property("transform", &t.to_css());
                    }
                }
                if let Some(f) = next.borrow().as_ref() {
                    handle.set(window.request_animation_frame(f.as_ref().unchecked_ref()).ok());
                }
            }));
        }
        if let Some(f) = frame_loop.borrow().as_ref() {
            frame_handle.set(Some(
                window.request_animation_frame(f.as_ref().unchecked_ref())?,
            ));
        }

        debug!("web backdrop mounted");
        Ok(WebBackdrop {
            window,
            backdrop,
            frame_loop,
            frame_handle,
            on_resize: Some(on_resize),
            on_scroll: Some(on_scroll),
        })
    }

    /// Cancels the pending animation frame, removes the window listeners and
    /// clears the canvas. Calling it twice is harmless.
    pub fn unmount(&mut self) {
        if let Some(handle) = self.frame_handle.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
        for (event, listener) in [("resize", self.on_resize.take()), ("scroll", self.on_scroll.take())] {
            if let Some(listener) = listener {
                let _ = self
                    .window
                    .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
            }
        }
        // Breaks the frame closure's reference to itself.
        self.frame_loop.borrow_mut().take();
        let backdrop = self.backdrop.borrow_mut().take();
        if let Some(mut surface) = backdrop.and_then(Backdrop::unmount) {
            surface.clear();
        }
        debug!("web backdrop unmounted");
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.backdrop.borrow().is_some()
    }
}

impl Drop for WebBackdrop {
    fn drop(&mut self) {
        self.unmount();
    }
}
