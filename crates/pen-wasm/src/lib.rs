//! WASM bridge for Pen: exposes in-memory conversion and lint to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Every export takes the
//! document as JSON text and returns JSON text.

use pen_core::{Document, lint_document};
use pen_html::{ConvertConfig, convert_document_with};
use wasm_bindgen::prelude::*;

/// Convert a document. Resolves to `{"html": "...", "css": "..."}`,
/// rejects with the parse error message.
#[wasm_bindgen]
pub fn convert(json: &str) -> Result<String, JsValue> {
    console_error_panic_hook_setup();
    convert_json(json, &ConvertConfig::default()).map_err(|e| JsValue::from_str(&e))
}

/// [`convert`] with a custom class prefix and ref depth limit.
#[wasm_bindgen]
pub fn convert_with(json: &str, class_prefix: &str, max_ref_depth: usize) -> Result<String, JsValue> {
    console_error_panic_hook_setup();
    let config = ConvertConfig {
        class_prefix: class_prefix.to_string(),
        max_ref_depth,
        ..ConvertConfig::default()
    };
    convert_json(json, &config).map_err(|e| JsValue::from_str(&e))
}

/// Lint a document. Resolves to an array of
/// `{"nodeId", "message", "severity", "rule"}` objects.
#[wasm_bindgen]
pub fn lint(json: &str) -> Result<String, JsValue> {
    console_error_panic_hook_setup();
    lint_json(json).map_err(|e| JsValue::from_str(&e))
}

/// Validate document JSON. Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate(json: &str) -> String {
    let result = match Document::from_json(json) {
        Ok(_) => serde_json::json!({ "ok": true }),
        Err(e) => serde_json::json!({ "ok": false, "error": e.to_string() }),
    };
    result.to_string()
}

fn convert_json(json: &str, config: &ConvertConfig) -> Result<String, String> {
    let doc = Document::from_json(json).map_err(|e| format!("invalid design document: {e}"))?;
    let conversion = convert_document_with(&doc, config);
    log::debug!(
        "converted {} bytes of html, {} bytes of css",
        conversion.html.len(),
        conversion.css.len()
    );
    serde_json::to_string(&conversion).map_err(|e| format!("serialization error: {e}"))
}

fn lint_json(json: &str) -> Result<String, String> {
    let doc = Document::from_json(json).map_err(|e| format!("invalid design document: {e}"))?;
    serde_json::to_string(&lint_document(&doc)).map_err(|e| format!("serialization error: {e}"))
}

/// Route Rust panics to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Pen WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
