/// Vitrine Web - WebGL2 front end for the showcase viewer
///
/// Boots on module start: reads the optional page config, takes over
/// `#canvas3d`, wires the page chrome and starts the asset fetches and the
/// frame loop. The three viewer buttons call the exported actions.
mod app;
mod assets;
mod chrome;
mod dom;
mod renderer;
mod shaders;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, Window};

use vitrine_core::ViewerConfig;

use crate::app::App;

// WASM is single-threaded; every callback reaches the app through here.
thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

/// Borrow the app mutably and run a closure. Returns None before start-up.
pub(crate) fn with_app_mut<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| {
        let mut borrow = cell.borrow_mut();
        borrow.as_mut().map(f)
    })
}

fn load_config(document: &Document) -> ViewerConfig {
    let Some(source) = dom::config_source(document) else {
        return ViewerConfig::default();
    };
    match ViewerConfig::from_json(&source) {
        Ok(config) => {
            log::info!("using page viewer config");
            config
        }
        Err(e) => {
            log::warn!("{e}; falling back to defaults");
            ViewerConfig::default()
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    console_log::init_with_level(level).ok();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global `window`"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document on window"))?;
    let canvas = document
        .get_element_by_id("canvas3d")
        .ok_or_else(|| JsValue::from_str("missing #canvas3d"))?
        .dyn_into::<HtmlCanvasElement>()?;

    let config = load_config(&document);
    let chrome_config = config.chrome.clone();
    let mut app = App::new(&window, &document, canvas.clone(), config)?;
    app.resize(&window);
    let manifest = app.viewer().manifest().clone();
    APP.with(|cell| *cell.borrow_mut() = Some(app));

    app::install_listeners(&window, &canvas)?;
    install_actions(&window)?;
    chrome::install(&window, &document, &chrome_config)?;
    assets::load_all(&manifest)?;
    app::start_loop()?;

    log::info!("viewer started");
    Ok(())
}

#[wasm_bindgen(js_name = resetCamera)]
pub fn reset_camera() {
    with_app_mut(App::reset_camera);
}

#[wasm_bindgen(js_name = toggleAnimation)]
pub fn toggle_animation() {
    with_app_mut(App::toggle_animation);
}

#[wasm_bindgen(js_name = toggleWireframe)]
pub fn toggle_wireframe() {
    with_app_mut(App::toggle_wireframe);
}

/// Inline `onclick` handlers look the actions up on `window`
fn install_actions(window: &Window) -> Result<(), JsValue> {
    let actions: [(&str, fn()); 3] = [
        ("resetCamera", reset_camera),
        ("toggleAnimation", toggle_animation),
        ("toggleWireframe", toggle_wireframe),
    ];
    for (name, action) in actions {
        let closure = Closure::<dyn FnMut()>::new(action);
        js_sys::Reflect::set(window, &JsValue::from_str(name), closure.as_ref())?;
        closure.forget();
    }
    Ok(())
}
