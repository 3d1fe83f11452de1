mod api;
mod app;
mod components;
mod config;
mod confirm;
mod csrf;
mod dom;
mod editable;
mod models;
mod normalize;
mod pages;
mod state;

use crate::app::App;
use crate::config::PageConfig;
use crate::state::AppState;
use leptos::logging::{log, warn};
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let config = PageConfig::from_window();
    let Some(mount) = dom::find_mount(&config.mount_selector) else {
        warn!("no element matches {}; mounting an empty list on <body>", config.mount_selector);
        let state = AppState::new(config, Vec::new());
        mount_to_body(move || view! { <App state=state /> });
        return;
    };

    // The server-rendered list is the initial state; the app re-renders it.
    let items = dom::read_items(&mount);
    log!("linklist: {} items under {}", items.len(), config.mount_selector);
    mount.set_inner_html("");

    let state = AppState::new(config, items);
    leptos::mount::mount_to(mount, move || view! { <App state=state /> }).forget();
}
