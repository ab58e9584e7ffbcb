//! Allow-list HTML sanitization.
//!
//! Applied to rendered model output before it is stored, and again to
//! resolved edits. Everything outside the allow-list is removed silently:
//!
//! | Input | Output |
//! |-------|--------|
//! | `span b strong i em u br p ul ol li` | kept, re-serialized canonically |
//! | `data-ref-case data-ref-code data-ref-section class` on `span` | kept |
//! | any other attribute (`style`, `onclick`, `onerror`, …) | dropped |
//! | `script style iframe object noscript template textarea title svg math xmp` | dropped with content |
//! | any other element | tag dropped, text kept |
//! | comments, doctypes, processing instructions | dropped |
//! | stray `<` / `>` in text | `&lt;` / `&gt;` |
//!
//! The output is a fixed point: `sanitize(sanitize(x)) == sanitize(x)`.

use crate::html::{escape_attr, tokenize, StartTag, Token, VOID_ELEMENTS};

const ALLOWED_ELEMENTS: &[&str] = &[
    "span", "b", "strong", "i", "em", "u", "br", "p", "ul", "ol", "li",
];

const SPAN_ATTRIBUTES: &[&str] = &["data-ref-case", "data-ref-code", "data-ref-section", "class"];

const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "noscript", "template", "textarea", "title", "svg",
    "math", "xmp",
];

/// Sanitize an HTML fragment against the badge allow-list.
pub fn sanitize(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    // (element being dropped, nesting depth)
    let mut skipping: Option<(String, usize)> = None;

    for (_, token) in tokenize(html) {
        if let Some((name, depth)) = skipping.as_mut() {
            let closed = match &token {
                Token::Start(tag) if tag.name == *name && !tag.self_closing => {
                    *depth += 1;
                    false
                }
                Token::End(end) if end.as_str() == name.as_str() => {
                    *depth -= 1;
                    *depth == 0
                }
                _ => false,
            };
            if closed {
                skipping = None;
            }
            continue;
        }

        match token {
            Token::Text(text) => push_text(&mut out, text),
            Token::Comment(_) => {}
            Token::Start(tag) => {
                let name = tag.name.as_str();
                if DROP_WITH_CONTENT.contains(&name) {
                    if !tag.self_closing {
                        skipping = Some((tag.name, 1));
                    }
                } else if ALLOWED_ELEMENTS.contains(&name) {
                    write_start_tag(&mut out, &tag);
                }
            }
            Token::End(name) => {
                let name = name.as_str();
                if ALLOWED_ELEMENTS.contains(&name) && !VOID_ELEMENTS.contains(&name) {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
        }
    }

    out
}

fn push_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn write_start_tag(out: &mut String, tag: &StartTag) {
    out.push('<');
    out.push_str(&tag.name);
    if tag.name == "span" {
        let mut written: Vec<&str> = Vec::new();
        for attr in &tag.attrs {
            let name = attr.name.as_str();
            if !SPAN_ATTRIBUTES.contains(&name) || written.contains(&name) {
                continue;
            }
            written.push(name);
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(&attr.value));
            out.push('"');
        }
    }
    out.push('>');
}

// --- tests -------------------------------------------------------------------
