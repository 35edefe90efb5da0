/// Browser-side application: viewer state, GL backend and page elements
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::convert::FromWasmAbi;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlImageElement, PointerEvent, WebGl2RenderingContext, Window};

use vitrine_core::loading::AssetId;
use vitrine_core::{
    EntranceEvent, Mesh, MeshOutcome, SceneControls, TextureSlot, Viewer, ViewerConfig, ViewerError,
};

use crate::dom::{set_styles, PageDom};
use crate::renderer::WebRenderer;
use crate::with_app_mut;

pub struct App {
    viewer: Viewer,
    renderer: WebRenderer,
    dom: PageDom,
    canvas: HtmlCanvasElement,
}

impl App {
    pub fn new(
        window: &Window,
        document: &Document,
        canvas: HtmlCanvasElement,
        config: ViewerConfig,
    ) -> Result<Self, JsValue> {
        let gl = canvas
            .get_context("webgl2")?
            .ok_or_else(|| JsValue::from_str("WebGL2 not supported"))?
            .dyn_into::<WebGl2RenderingContext>()?;
        let renderer = WebRenderer::new(gl)?;

        let (width, height) = window_size(window, &canvas);
        let seed = (js_sys::Math::random() * f64::from(u32::MAX)) as u64;
        let viewer = Viewer::new(config, width, height, seed);

        let dom = PageDom::new(document);
        dom.show_animation_state(viewer.flags().auto_rotating);
        dom.show_progress(viewer.progress());

        Ok(Self {
            viewer,
            renderer,
            dom,
            canvas,
        })
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn frame(&mut self, now_ms: f64) {
        for event in self.viewer.frame(now_ms, &mut self.renderer) {
            match event {
                EntranceEvent::LoaderDismissed => self.dom.hide_loader(),
                EntranceEvent::ControlsUnlocked => log::info!("orbit controls enabled"),
                EntranceEvent::Started | EntranceEvent::Finished => {}
            }
        }
    }

    /// Match the canvas to the window, capping the device pixel ratio
    pub fn resize(&mut self, window: &Window) {
        let (width, height) = window_size(window, &self.canvas);
        let ratio = window
            .device_pixel_ratio()
            .min(self.viewer.config().camera.max_pixel_ratio);
        let backing_width = (f64::from(width) * ratio).round() as u32;
        let backing_height = (f64::from(height) * ratio).round() as u32;

        self.canvas.set_width(backing_width);
        self.canvas.set_height(backing_height);
        let css_width = format!("{width}px");
        let css_height = format!("{height}px");
        if let Err(e) = set_styles(&self.canvas, &[("width", &css_width), ("height", &css_height)]) {
            log::warn!("canvas resize failed: {e:?}");
        }

        self.renderer.set_viewport(backing_width, backing_height);
        self.viewer.resize(width, height);
    }

    pub fn texture_loaded(&mut self, slot: TextureSlot, image: Result<HtmlImageElement, ViewerError>) {
        let url = self
            .viewer
            .manifest()
            .url_of(AssetId::Texture(slot))
            .unwrap_or_default()
            .to_string();
        let handle = image.and_then(|image| {
            self.renderer
                .upload_texture(&image)
                .map_err(|e| ViewerError::asset_load(url, format!("{e:?}")))
        });
        let progress = self.viewer.on_texture_loaded(slot, handle);
        self.dom.show_progress(progress);
    }

    pub fn mesh_loaded(&mut self, meshes: vitrine_core::Result<Vec<Mesh>>, now_ms: f64) {
        let report = self.viewer.on_mesh_loaded(meshes, now_ms);
        self.dom.show_progress(report.progress);
        if report.outcome == MeshOutcome::Failed {
            self.dom.show_mesh_error(&self.viewer.config().messages);
        }
    }

    pub fn reset_camera(&mut self) {
        self.viewer.reset_camera();
    }

    pub fn toggle_animation(&mut self) {
        let rotating = self.viewer.toggle_animation();
        self.dom.show_animation_state(rotating);
    }

    pub fn toggle_wireframe(&mut self) {
        if let Some(on) = self.viewer.toggle_wireframe() {
            log::debug!("wireframe {}", if on { "on" } else { "off" });
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent) {
        self.viewer.pointer_down(event.offset_x() as f32, event.offset_y() as f32);
    }

    fn pointer_move(&mut self, event: &PointerEvent) {
        self.viewer.pointer_move(event.offset_x() as f32, event.offset_y() as f32);
    }

    fn pointer_up(&mut self) {
        self.viewer.pointer_up();
    }
}

/// CSS size of the viewport, falling back to the canvas attributes
fn window_size(window: &Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
    let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).map(|v| v as u32);
    let width = dimension(window.inner_width()).unwrap_or_else(|| canvas.width());
    let height = dimension(window.inner_height()).unwrap_or_else(|| canvas.height());
    (width.max(1), height.max(1))
}

pub(crate) fn listen<E: FromWasmAbi + 'static>(
    target: &web_sys::EventTarget,
    name: &str,
    handler: impl FnMut(E) + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Window resize plus pointer input on the canvas
pub fn install_listeners(window: &Window, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
    let resize_window = window.clone();
    listen(window, "resize", move |_: web_sys::Event| {
        with_app_mut(|app| app.resize(&resize_window));
    })?;

    listen(canvas, "pointerdown", |event: PointerEvent| {
        with_app_mut(|app| app.pointer_down(&event));
    })?;
    listen(canvas, "pointermove", |event: PointerEvent| {
        with_app_mut(|app| app.pointer_move(&event));
    })?;
    for name in ["pointerup", "pointercancel", "pointerleave"] {
        listen(canvas, name, |_: PointerEvent| {
            with_app_mut(App::pointer_up);
        })?;
    }
    Ok(())
}

fn request_animation_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<(), JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map(|_| ())
}

/// Drive `App::frame` from `requestAnimationFrame` for the life of the page
pub fn start_loop() -> Result<(), JsValue> {
    let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = callback.clone();

    *callback.borrow_mut() = Some(Closure::new(move |now: f64| {
        with_app_mut(|app| app.frame(now));
        if let Some(callback) = next.borrow().as_ref() {
            if let Err(e) = request_animation_frame(callback) {
                log::error!("frame loop stopped: {e:?}");
            }
        }
    }));

    let started = match callback.borrow().as_ref() {
        Some(first) => request_animation_frame(first),
        None => Ok(()),
    };
    started
}
