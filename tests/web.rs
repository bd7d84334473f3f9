//! Exported helpers, run in a browser with `wasm-pack test --headless --chrome`
#![cfg(target_arch = "wasm32")]

use snippet_organizer::{detect_language, slugify};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn slugify_title() {
    assert_eq!(slugify("My Snippet!!"), "my-snippet");
}

#[wasm_bindgen_test]
fn detect_python() {
    assert_eq!(detect_language("def greet():\n    return 'hi'"), "python");
}

#[wasm_bindgen_test]
fn detect_defaults_to_javascript() {
    assert_eq!(detect_language("hello"), "javascript");
}
