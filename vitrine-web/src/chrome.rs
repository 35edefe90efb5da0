/// Page chrome wiring: nav links, navbar, mobile menu and scroll reveals
use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use vitrine_core::chrome::{
    active_section, link_targets, navbar_scrolled, MenuState, RevealKind, RevealTracker, SectionSpan,
};
use vitrine_core::config::ChromeConfig;

use crate::app::listen;
use crate::dom::{set_class, set_styles};

const REVEAL_KEY: &str = "data-reveal-key";

fn elements(document: &Document, selector: &str) -> Result<Vec<Element>, JsValue> {
    let nodes = document.query_selector_all(selector)?;
    Ok((0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

pub fn install(window: &Window, document: &Document, config: &ChromeConfig) -> Result<(), JsValue> {
    let menu = Rc::new(RefCell::new(MenuState::default()));
    let menu_panel = document.query_selector(".nav-links")?;

    install_nav_links(document, &menu, menu_panel.clone())?;
    install_scroll_tracking(window, document, config)?;
    if let (Some(toggle), Some(panel)) = (document.get_element_by_id("menuToggle"), menu_panel) {
        let menu = menu.clone();
        listen(&toggle, "click", move |_: Event| {
            let open = menu.borrow_mut().toggle();
            set_class(&panel, "active", open);
        })?;
    }
    schedule_reveals(window, document, config)
}

/// Clicking a nav link marks it active, closes the mobile menu and scrolls
/// smoothly to its section
fn install_nav_links(
    document: &Document,
    menu: &Rc<RefCell<MenuState>>,
    menu_panel: Option<Element>,
) -> Result<(), JsValue> {
    let links = Rc::new(elements(document, ".nav-link")?);

    for link in links.iter() {
        let links = links.clone();
        let link_el = link.clone();
        let menu = menu.clone();
        let menu_panel = menu_panel.clone();
        let document = document.clone();

        listen(link, "click", move |event: Event| {
            event.prevent_default();
            for other in links.iter() {
                set_class(other, "active", false);
            }
            set_class(&link_el, "active", true);

            menu.borrow_mut().close();
            if let Some(panel) = &menu_panel {
                set_class(panel, "active", false);
            }

            let Some(href) = link_el.get_attribute("href") else {
                return;
            };
            if let Ok(Some(section)) = document.query_selector(&href) {
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                options.set_block(ScrollLogicalPosition::Start);
                section.scroll_into_view_with_scroll_into_view_options(&options);
            }
        })?;
    }
    Ok(())
}

/// Navbar background and active link follow the scroll position
fn install_scroll_tracking(window: &Window, document: &Document, config: &ChromeConfig) -> Result<(), JsValue> {
    let navbar = document.get_element_by_id("navbar");
    let links = elements(document, ".nav-link")?;
    let document = document.clone();
    let scroll_window = window.clone();
    let offset = config.scroll_offset;
    let threshold = config.navbar_scrolled_threshold;

    listen(window, "scroll", move |_: Event| {
        let scroll_y = scroll_window.scroll_y().unwrap_or(0.0);

        if let Some(navbar) = &navbar {
            set_class(navbar, "scrolled", navbar_scrolled(scroll_y, threshold));
        }

        let sections: Vec<SectionSpan> = match elements(&document, "section") {
            Ok(found) => found
                .iter()
                .filter_map(|el| el.dyn_ref::<HtmlElement>())
                .map(|el| SectionSpan::new(el.id(), f64::from(el.offset_top()), f64::from(el.offset_height())))
                .collect(),
            Err(_) => return,
        };

        if let Some(active) = active_section(&sections, scroll_y, offset) {
            for link in &links {
                let targeted = link
                    .get_attribute("href")
                    .is_some_and(|href| link_targets(&href, active));
                set_class(link, "active", targeted);
            }
        }
    })
}

/// Reveal observers go in a fixed delay after the window has loaded
fn schedule_reveals(window: &Window, document: &Document, config: &ChromeConfig) -> Result<(), JsValue> {
    let delay = config.reveal_setup_delay_ms;
    let schedule = {
        let window = window.clone();
        let document = document.clone();
        let config = config.clone();
        move || {
            let document = document.clone();
            let config = config.clone();
            let setup = Closure::once_into_js(move || {
                if let Err(e) = install_reveals(&document, &config) {
                    log::warn!("scroll reveal setup failed: {e:?}");
                }
            });
            if let Err(e) =
                window.set_timeout_with_callback_and_timeout_and_arguments_0(setup.unchecked_ref(), delay)
            {
                log::warn!("unable to schedule scroll reveals: {e:?}");
            }
        }
    };

    if document.ready_state() == "complete" {
        schedule();
        Ok(())
    } else {
        listen(window, "load", move |_: Event| schedule())
    }
}

fn install_reveals(document: &Document, config: &ChromeConfig) -> Result<(), JsValue> {
    let tracker = Rc::new(RefCell::new(RevealTracker::new()));

    let callback = {
        let tracker = tracker.clone();
        Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, observer: IntersectionObserver| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    if !entry.is_intersecting() {
                        continue;
                    }
                    let target = entry.target();
                    let Some(key) = target.get_attribute(REVEAL_KEY).and_then(|k| k.parse().ok()) else {
                        continue;
                    };
                    if tracker.borrow_mut().reveal(key) {
                        if let Err(e) = set_styles(&target, &RevealKind::revealed_style()) {
                            log::warn!("reveal failed: {e:?}");
                        }
                        observer.unobserve(&target);
                    }
                }
            },
        )
    };

    let options = IntersectionObserverInit::new();
    options.set_threshold(&JsValue::from_f64(config.reveal_threshold));
    options.set_root_margin(&config.reveal_root_margin);
    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;
    callback.forget();

    let groups: [(&str, fn(usize) -> RevealKind); 4] = [
        (RevealKind::SECTION_SELECTOR, |_| RevealKind::Section),
        (RevealKind::CARD_SELECTOR, RevealKind::Card),
        (RevealKind::HEADER_SELECTOR, |_| RevealKind::Header),
        (RevealKind::TEXT_SELECTOR, |_| RevealKind::Text),
    ];

    for (selector, kind_at) in groups {
        for (index, element) in elements(document, selector)?.iter().enumerate() {
            let kind = kind_at(index);
            let key = tracker.borrow_mut().register(kind);
            element.set_attribute(REVEAL_KEY, &key.to_string())?;

            let hidden = kind.hidden_style(config.card_stagger_seconds);
            let hidden: Vec<(&str, &str)> = hidden.iter().map(|(k, v)| (*k, v.as_str())).collect();
            set_styles(element, &hidden)?;
            observer.observe(element);
        }
    }

    log::info!("scroll reveals armed for {} elements", tracker.borrow().len());
    Ok(())
}
