/// Page elements the viewer writes to. All of them are optional.
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use vitrine_core::config::MessageConfig;
use vitrine_core::{AnimationIcon, LoadProgress};

pub struct PageDom {
    progress_bar: Option<HtmlElement>,
    loader: Option<Element>,
    anim_icon: Option<Element>,
}

impl PageDom {
    pub fn new(document: &Document) -> Self {
        Self {
            progress_bar: document
                .get_element_by_id("progressBar")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok()),
            loader: document.get_element_by_id("loader"),
            anim_icon: document.get_element_by_id("animIcon"),
        }
    }

    pub fn show_progress(&self, progress: LoadProgress) {
        if let Some(bar) = &self.progress_bar {
            let width = format!("{}%", progress.percent());
            if let Err(e) = bar.style().set_property("width", &width) {
                log::warn!("progress bar update failed: {e:?}");
            }
        }
    }

    pub fn hide_loader(&self) {
        if let Some(loader) = &self.loader {
            set_class(loader, "hidden", true);
        }
    }

    /// Replace the loader content with the mesh error text
    pub fn show_mesh_error(&self, messages: &MessageConfig) {
        let Some(loader) = &self.loader else {
            return;
        };
        loader.set_inner_html(&format!(
            concat!(
                r#"<div class="loader-content">"#,
                r#"<p style="color: #ef4444; font-size: 18px;">{}</p>"#,
                r#"<p style="color: #94a3b8; font-size: 14px;">{}</p>"#,
                "</div>"
            ),
            escape_html(&messages.mesh_error_title),
            escape_html(&messages.mesh_error_hint),
        ));
    }

    pub fn show_animation_state(&self, auto_rotating: bool) {
        if let Some(icon) = &self.anim_icon {
            icon.set_class_name(AnimationIcon::for_state(auto_rotating).css_class());
        }
    }
}

/// Text of `<script type="application/json" id="viewer-config">`, if present
pub fn config_source(document: &Document) -> Option<String> {
    document
        .get_element_by_id("viewer-config")
        .and_then(|el| el.text_content())
        .filter(|text| !text.trim().is_empty())
}

/// Add or remove a class, logging a rejected update
pub fn set_class(element: &Element, class: &str, on: bool) {
    if let Err(e) = element.class_list().toggle_with_force(class, on) {
        log::warn!("class `{class}` update failed: {e:?}");
    }
}

pub fn set_styles(element: &Element, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let element = element.dyn_ref::<HtmlElement>().ok_or_else(|| JsValue::from_str("not an HTML element"))?;
    let style = element.style();
    for (property, value) in styles {
        style.set_property(property, value)?;
    }
    Ok(())
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
