//! WebAssembly bindings for the lexref pipeline.
//!
//! Exposes the pipeline to a browser chat UI via `wasm-bindgen`. Compile
//! with `wasm-pack build` to produce an npm-ready package. Structured values
//! cross the boundary as JSON strings.
//!
//! ## Display: [`render_tags`], [`render_opinion`], [`sanitize_html`]
//!
//! ```js
//! import init, { renderTags, renderOpinion } from './lexref_wasm.js';
//! await init();
//!
//! const html = renderTags(modelReply);                     // Case 1, Case 2, …
//! const html2 = renderTags(reply, JSON.stringify(["900", "12"]));  // known list
//! const html3 = renderOpinion(await res.text());           // {opinion, ref_case}
//! ```
//!
//! ## Editing: [`edit_case_ids`], [`protect`], [`resolve`]
//!
//! The host performs the title fetches; the bindings stay free of I/O.
//!
//! ```js
//! const ids = JSON.parse(editCaseIds(html));
//! const titles = {};
//! await Promise.all(ids.map(async id => {
//!   const r = await fetch(`${backend}/fetch-case-title/${encodeURIComponent(id)}`);
//!   if (r.ok) titles[id] = (await r.json()).title;
//! }));
//!
//! const { text, mapping } = JSON.parse(protect(html, JSON.stringify(titles)));
//! // …user edits `text`…
//! const saved = resolve(editedText, JSON.stringify(mapping));
//! ```

use std::collections::HashMap;

use lexref::{CaseNumbering, OpinionResponse, PlaceholderMapping, Reference};
use wasm_bindgen::prelude::*;

/// One-time initialisation called at the start of every exported function.
///
/// Installs the `console_error_panic_hook` when the feature is enabled so
/// that Rust panics are forwarded to the browser console as readable errors
/// rather than appearing as generic "unreachable" WASM traps.
fn setup() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Render inline tags as sanitized badge HTML.
///
/// `known_cases_json`, when given, is a JSON array of case ids: cases are
/// numbered by their position in it and ids outside it show `Case ?`.
/// Without it cases are numbered in order of first appearance.
///
/// Throws only if `known_cases_json` is not a JSON array of strings.
#[wasm_bindgen(js_name = renderTags)]
pub fn render_tags(raw: &str, known_cases_json: Option<String>) -> Result<String, JsValue> {
    setup();
    let numbering = match known_cases_json {
        Some(json) => {
            let ids: Vec<String> = serde_json::from_str(&json)
                .map_err(|e| JsValue::from_str(&format!("known cases parse error: {e}")))?;
            CaseNumbering::Known(ids)
        }
        None => CaseNumbering::FirstSeen,
    };
    Ok(lexref::render_message(raw, &numbering))
}

/// Render a backend opinion response (`{"opinion", "ref_case"}`), numbering
/// cases by the order of `ref_case`.
#[wasm_bindgen(js_name = renderOpinion)]
pub fn render_opinion(json: &str) -> Result<String, JsValue> {
    setup();
    let response: OpinionResponse = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("opinion parse error: {e}")))?;
    let numbering = CaseNumbering::Known(response.known_case_ids());
    Ok(lexref::render_message(&response.opinion, &numbering))
}

#[wasm_bindgen(js_name = sanitizeHtml)]
pub fn sanitize_html(html: &str) -> String {
    setup();
    lexref::sanitize(html)
}

/// References carried by badge markup, as a JSON array.
#[wasm_bindgen(js_name = extractReferences)]
pub fn extract_references(html: &str) -> Result<String, JsValue> {
    setup();
    to_json(&lexref::extract_badges(html))
}

/// References carried by raw inline tags, as a JSON array.
#[wasm_bindgen(js_name = extractInlineTags)]
pub fn extract_inline_tags(raw: &str) -> Result<String, JsValue> {
    setup();
    to_json(&lexref::extract_inline(raw))
}

/// Distinct case ids whose titles [`protect`] wants, as a JSON array.
#[wasm_bindgen(js_name = editCaseIds)]
pub fn edit_case_ids(html: &str) -> Result<String, JsValue> {
    setup();
    to_json(&lexref::edit_case_ids(html))
}

/// Swap badges for placeholder tokens.
///
/// `titles_json` is a JSON object mapping case id to title; missing ids are
/// labelled `Unknown Title`. Returns `{"text": …, "mapping": …}`.
#[wasm_bindgen]
pub fn protect(html: &str, titles_json: Option<String>) -> Result<String, JsValue> {
    setup();
    let titles: HashMap<String, String> = match titles_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsValue::from_str(&format!("titles parse error: {e}")))?,
        None => HashMap::new(),
    };
    to_json(&lexref::protect(html, &titles))
}

/// Resolve edited text back into sanitized badge HTML.
///
/// `mapping_json` is the `mapping` member of [`protect`]'s result.
#[wasm_bindgen]
pub fn resolve(text: &str, mapping_json: &str) -> Result<String, JsValue> {
    setup();
    let mapping: PlaceholderMapping = serde_json::from_str(mapping_json)
        .map_err(|e| JsValue::from_str(&format!("mapping parse error: {e}")))?;
    Ok(lexref::resolve(text, &mapping))
}

/// The `{"act", "section"}` pair to send to the code-text endpoint for a
/// clicked code badge, plus `actName` for the popup heading (`null` for an
/// act code outside the well-known table).
///
/// ```js
/// lookupKey('HMA', '17(a)')
/// // '{"act":"hma","section":"17","actName":"Hindu Marriage Act"}'
/// ```
#[wasm_bindgen(js_name = lookupKey)]
pub fn lookup_key(act: &str, section: &str) -> Result<String, JsValue> {
    setup();
    let key = Reference::code(act, section, "")
        .lookup_key()
        .ok_or_else(|| JsValue::from_str("not a code reference"))?;
    let act_name = lexref::act_name(&key.act);
    to_json(&serde_json::json!({
        "act": key.act,
        "section": key.section,
        "actName": act_name,
    }))
}
