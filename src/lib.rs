/// Snippet Organizer - Chrome Extension for Code Snippets
/// Built with Rust + WASM + Yew

mod backend;
mod config;
mod credentials;
mod error;
mod language;
mod library;
mod messages;
mod operations;
mod pkce;
mod relay;
mod session;
mod slug;
mod snippet;
mod summarize;
mod background;
pub mod ui;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Re-export helpers for JavaScript access
#[wasm_bindgen]
pub fn detect_language(code: &str) -> String {
    language::detect_language(code).to_string()
}

#[wasm_bindgen]
pub fn slugify(title: &str) -> String {
    slug::slugify(title)
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}
