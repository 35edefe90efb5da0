/// Asset fetching: textures through image elements, the mesh through fetch
use gloo_net::http::Request;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlImageElement;

use vitrine_core::loading::{AssetId, AssetManifest};
use vitrine_core::{parse_obj, Mesh, TextureSlot, ViewerError};

use crate::with_app_mut;

/// Start every request in the manifest. Completions arrive later, in any
/// order, through the app state.
pub fn load_all(manifest: &AssetManifest) -> Result<(), JsValue> {
    for request in manifest.requests() {
        log::debug!("requesting {} from {}", request.id, request.url);
        match request.id {
            AssetId::Texture(slot) => load_texture(slot, request.url)?,
            AssetId::Mesh => spawn_local(load_mesh(request.url)),
        }
    }
    Ok(())
}

fn load_texture(slot: TextureSlot, url: String) -> Result<(), JsValue> {
    let image = HtmlImageElement::new()?;

    let loaded = image.clone();
    let onload = Closure::<dyn FnMut()>::new(move || {
        let image = loaded.clone();
        with_app_mut(|app| app.texture_loaded(slot, Ok(image)));
    });

    let failed_url = url.clone();
    let onerror = Closure::<dyn FnMut()>::new(move || {
        let error = ViewerError::asset_load(failed_url.clone(), "image could not be loaded");
        with_app_mut(|app| app.texture_loaded(slot, Err(error)));
    });

    image.set_onload(Some(onload.as_ref().unchecked_ref()));
    image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onload.forget();
    onerror.forget();

    image.set_src(&url);
    Ok(())
}

async fn fetch_text(url: &str) -> Result<String, ViewerError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| ViewerError::asset_load(url, e.to_string()))?;
    if !response.ok() {
        return Err(ViewerError::asset_load(url, format!("HTTP {}", response.status())));
    }
    response
        .text()
        .await
        .map_err(|e| ViewerError::asset_load(url, e.to_string()))
}

async fn load_mesh(url: String) {
    let meshes: vitrine_core::Result<Vec<Mesh>> = match fetch_text(&url).await {
        Ok(text) => parse_obj(&text),
        Err(e) => Err(e),
    };
    let now = now_ms();
    with_app_mut(|app| app.mesh_loaded(meshes, now));
}

/// Same clock as `requestAnimationFrame` timestamps
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or(0.0)
}
