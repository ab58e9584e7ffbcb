//! wasm-bindgen-test integration tests for the lexref WASM bindings.
//!
//! Run with:
//!   wasm-pack test packages/wasm --node
//!
//! These tests compile to WASM and execute in a Node.js process, verifying
//! the exported API surface works end-to-end in a JavaScript host.

use wasm_bindgen_test::*;

// Configure all tests in this file to run in Node.js (no browser required).
wasm_bindgen_test_configure!(run_in_node_experimental);

use lexref_wasm::{
    edit_case_ids, extract_inline_tags, extract_references, lookup_key, protect, render_opinion,
    render_tags, resolve, sanitize_html,
};

const REPLY: &str = "See <code:ipc:302> and <case_id:12345>.";

// ---------------------------------------------------------------------------
// renderTags()
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn render_tags_first_seen_numbering() {
    let html = render_tags("<case_id:A> <case_id:B> <case_id:A>", None).unwrap();
    assert_eq!(html.matches(">Case 1</span>").count(), 2);
    assert_eq!(html.matches(">Case 2</span>").count(), 1);
}

#[wasm_bindgen_test]
fn render_tags_known_list() {
    let html = render_tags("<case_id:A> <case_id:Z>", Some(r#"["B","A"]"#.into())).unwrap();
    assert!(html.contains(">Case 2</span>"));
    assert!(html.contains(">Case ?</span>"));
}

#[wasm_bindgen_test]
fn render_tags_bad_known_list_throws() {
    assert!(render_tags("x", Some("{not json".into())).is_err());
}

#[wasm_bindgen_test]
fn render_opinion_uses_ref_case_order() {
    let json = r#"{"opinion":"<case_id:12> then <case_id:900>","ref_case":{"900":[1],"12":[0]}}"#;
    let html = render_opinion(json).unwrap();
    assert!(html.contains(r#"<span data-ref-case="12" class="reference-badge">Case 2</span>"#));
    assert!(html.contains(r#"<span data-ref-case="900" class="reference-badge">Case 1</span>"#));
}

// ---------------------------------------------------------------------------
// sanitizeHtml()
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn sanitize_strips_scripts_and_handlers() {
    let out = sanitize_html(r#"<b onclick="x()">hi</b><script>alert(1)</script>"#);
    assert_eq!(out, "<b>hi</b>");
}

// ---------------------------------------------------------------------------
// extractReferences() / extractInlineTags()
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn extract_references_from_badges() {
    let html = render_tags(REPLY, None).unwrap();
    let refs: serde_json::Value = serde_json::from_str(&extract_references(&html).unwrap()).unwrap();
    assert_eq!(refs[0]["kind"], "code");
    assert_eq!(refs[0]["displayText"], "IPC Section: 302");
    assert_eq!(refs[1]["kind"], "case");
    assert_eq!(refs[1]["caseId"], "12345");
}

#[wasm_bindgen_test]
fn extract_inline_keeps_constitution_whole() {
    let refs: serde_json::Value =
        serde_json::from_str(&extract_inline_tags("<code:indian_constitution:14,15>").unwrap())
            .unwrap();
    assert_eq!(refs.as_array().map(Vec::len), Some(1));
    assert_eq!(refs[0]["section"], "14,15");
}

// ---------------------------------------------------------------------------
// editCaseIds() / protect() / resolve()
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn edit_round_trip() {
    let html = render_tags(REPLY, None).unwrap();

    let ids: Vec<String> = serde_json::from_str(&edit_case_ids(&html).unwrap()).unwrap();
    assert_eq!(ids, vec!["12345"]);

    let protected: serde_json::Value = serde_json::from_str(
        &protect(&html, Some(r#"{"12345":"State v. Doe"}"#.into())).unwrap(),
    )
    .unwrap();
    let text = protected["text"].as_str().unwrap();
    assert!(text.contains("State v. Doe"));

    let mapping = protected["mapping"].to_string();
    assert_eq!(resolve(text, &mapping).unwrap(), html);
}

#[wasm_bindgen_test]
fn protect_without_titles_uses_unknown_title() {
    let html = render_tags(REPLY, None).unwrap();
    let protected: serde_json::Value =
        serde_json::from_str(&protect(&html, None).unwrap()).unwrap();
    assert!(protected["text"].as_str().unwrap().contains("Unknown Title"));
}

#[wasm_bindgen_test]
fn resolve_bad_mapping_throws() {
    assert!(resolve("text", "[]").is_err());
}

// ---------------------------------------------------------------------------
// lookupKey()
// ---------------------------------------------------------------------------

#[wasm_bindgen_test]
fn lookup_key_strips_parenthetical() {
    let key: serde_json::Value = serde_json::from_str(&lookup_key("HMA", "17(a)").unwrap()).unwrap();
    assert_eq!(key["act"], "hma");
    assert_eq!(key["section"], "17");
    assert_eq!(key["actName"], "Hindu Marriage Act");
}

#[wasm_bindgen_test]
fn lookup_key_unknown_act_has_null_name() {
    let key: serde_json::Value = serde_json::from_str(&lookup_key("xyz", "4").unwrap()).unwrap();
    assert_eq!(key["act"], "xyz");
    assert!(key["actName"].is_null());
}
