//! Placeholder resolution: edited text back to badge HTML.

use tracing::debug;

use crate::placeholder::{Delimiters, PlaceholderMapping};
use crate::render::badge_html;
use crate::sanitize::sanitize;

/// Replace every token known to `mapping` with its badge markup, in a single
/// left-to-right pass.
///
/// Deleted tokens simply produce no badge, duplicated tokens produce
/// duplicate badges, and anything that looks like a token but has no entry
/// stays as literal text. The result is not sanitized; see [`resolve`].
pub fn substitute(text: &str, mapping: &PlaceholderMapping) -> String {
    let Delimiters { open, close } = mapping.delimiters();
    let mut out = String::with_capacity(text.len() * 2);
    let mut rest = text;

    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        let body = start + open.len_utf8();

        if let Some(len) = rest[body..].find(close) {
            let end = body + len + close.len_utf8();
            let token = &rest[start..end];
            if let Some(reference) = mapping.get(token) {
                out.push_str(&badge_html(reference));
                rest = &rest[end..];
                continue;
            }
            debug!(token, "placeholder without mapping entry left as text");
        }

        out.push(open);
        rest = &rest[body..];
    }
    out.push_str(rest);
    out
}

/// Resolve edited text into sanitized HTML ready to store in the message.
pub fn resolve(text: &str, mapping: &PlaceholderMapping) -> String {
    sanitize(&substitute(text, mapping))
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::protect::protect;
    use crate::render::{render_message, CaseNumbering};
    use crate::types::Reference;

    fn protected(raw: &str) -> (String, crate::protect::Protected) {
        let html = render_message(raw, &CaseNumbering::FirstSeen);
        let titles = HashMap::from([("12345".to_string(), "State v. Doe".to_string())]);
        let p = protect(&html, &titles);
        (html, p)
    }

    #[test]
    fn unedited_round_trip_is_exact() {
        for raw in [
            "See <code:ipc:302> and <case_id:12345>.",
            "<b>Held</b>:<br><li><case_id:[2021] 7 SCR 571> under <code:indian_constitution:14, 21></li>",
            "no references at all",
            "<code:hma:17(a)> & <case_id:A> <case_id:B> <case_id:A>",
        ] {
            let (html, p) = protected(raw);
            assert_eq!(resolve(&p.text, &p.mapping), html, "round trip of {raw:?}");
        }
    }

    #[test]
    fn case_label_restored_not_title() {
        let (html, p) = protected("See <code:ipc:302> and <case_id:12345>.");
        assert!(p.text.contains("State v. Doe"));
        let out = resolve(&p.text, &p.mapping);
        assert_eq!(out, html);
        assert!(out.contains(">Case 1</span>"));
        assert!(!out.contains("State v. Doe"));
    }

    #[test]
    fn deleted_token_drops_badge() {
        let (_, p) = protected("See <code:ipc:302> and <case_id:12345>.");
        let edited = p.text.replace("⟦ref-0: IPC Section: 302⟧", "");
        let out = resolve(&edited, &p.mapping);
        assert!(!out.contains("data-ref-code"));
        assert!(out.contains("data-ref-case=\"12345\""));
    }

    #[test]
    fn duplicated_token_duplicates_badge() {
        let (_, p) = protected("See <case_id:12345>.");
        let token = "⟦ref-0: State v. Doe⟧";
        let edited = format!("{} and again {token}", p.text);
        let out = resolve(&edited, &p.mapping);
        let badge = badge_html(&Reference::case("12345", "Case 1"));
        assert_eq!(out.matches(&badge).count(), 2);
    }

    #[test]
    fn text_edits_between_tokens_survive() {
        let (_, p) = protected("See <code:ipc:302> and <case_id:12345>.");
        let edited = p.text.replace("See", "Compare").replace(" and ", " with ");
        let out = resolve(&edited, &p.mapping);
        assert!(out.starts_with("Compare <span data-ref-code=\"ipc\""));
        assert!(out.contains("</span> with <span data-ref-case"));
    }

    #[test]
    fn unknown_token_stays_literal() {
        let (_, p) = protected("See <case_id:12345>.");
        let edited = format!("{} ⟦ref-9: nobody⟧ ⟦unclosed", p.text);
        let out = resolve(&edited, &p.mapping);
        assert!(out.ends_with("⟦ref-9: nobody⟧ ⟦unclosed"));
        assert!(out.contains("data-ref-case"));
    }

    #[test]
    fn edited_markup_is_sanitized() {
        let (_, p) = protected("See <case_id:12345>.");
        let edited = format!("{}<script>alert(1)</script><i onclick=\"x\">ok</i>", p.text);
        let out = resolve(&edited, &p.mapping);
        assert!(!out.contains("script"));
        assert!(out.ends_with("<i>ok</i>"));
    }

    #[test]
    fn private_use_delimiters_resolve() {
        let raw = "⟦ ⟪ ⦃ 〚 <case_id:1> <case_id:2>";
        let html = render_message(raw, &CaseNumbering::FirstSeen);
        let p = protect(&html, &HashMap::new());
        assert_eq!(p.mapping.delimiters().open, '\u{E000}');
        assert_eq!(resolve(&p.text, &p.mapping), html);
    }
}
