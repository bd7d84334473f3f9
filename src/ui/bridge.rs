/// Popup-only JS bridge calls
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/chrome.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn copyText(text: &str) -> Result<(), JsValue>;

    fn setTheme(theme: &str);
}

pub async fn copy_to_clipboard(text: &str) -> Result<(), String> {
    copyText(text)
        .await
        .map_err(|e| format!("Failed to copy: {:?}", e))
}

pub fn apply_theme(theme: &str) {
    setTheme(theme);
}
