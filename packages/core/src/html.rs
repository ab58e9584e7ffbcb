//! A small HTML tokenizer and entity codec.
//!
//! Model output and edited messages are HTML fragments, not documents, and
//! the pipeline only ever needs a flat token stream with source byte ranges:
//! badge extraction finds `span` boundaries, the sanitizer re-serializes an
//! allow-list. There is no tree building.
//!
//! What the tokenizer handles:
//! - start tags with double-quoted, single-quoted, unquoted, and bare
//!   attributes, in any order, with entity-decoded values;
//! - end tags, comments, doctypes and processing instructions;
//! - raw-text elements (`script`, `style`, `textarea`, `title`, `xmp`),
//!   whose content is one text token up to the matching end tag;
//! - a `<` that does not open well-formed markup (unterminated tag,
//!   `a < b`, `<3`) is plain text.

use std::borrow::Cow;
use std::ops::Range;

use memchr::memchr;

/// Elements whose content is not markup.
const RAW_TEXT: &[&str] = &["script", "style", "textarea", "title", "xmp"];

/// Elements that never have an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// One attribute of a start tag. Names are lowercased, values decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag {
    /// Lowercased element name.
    pub name: String,
    /// Attributes in source order. Duplicates are kept; see [`StartTag::attr`].
    pub attrs: Vec<Attribute>,
    pub self_closing: bool,
}

impl StartTag {
    /// Value of the first attribute called `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw source text, entities not decoded.
    Text(&'a str),
    Start(StartTag),
    /// Lowercased element name.
    End(String),
    /// Comment, doctype, or processing instruction body.
    Comment(&'a str),
}

/// Iterator over `(source byte range, token)` pairs.
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    pending: Option<(Range<usize>, Token<'a>)>,
    raw_text: Option<String>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            pending: None,
            raw_text: None,
        }
    }
}

/// Tokenize `input` from the start.
pub fn tokenize(input: &str) -> Tokenizer<'_> {
    Tokenizer::new(input)
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = (Range<usize>, Token<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(pending) = self.pending.take() {
            return Some(pending);
        }
        if self.pos >= self.input.len() {
            return None;
        }

        if let Some(name) = self.raw_text.take() {
            let start = self.pos;
            let end = find_end_tag(self.input, start, &name).unwrap_or(self.input.len());
            self.pos = end;
            if end > start {
                return Some((start..end, Token::Text(&self.input[start..end])));
            }
        }

        let bytes = self.input.as_bytes();
        let start = self.pos;
        let mut search = start;
        while let Some(off) = memchr(b'<', &bytes[search..]) {
            let lt = search + off;
            if let Some((end, token)) = parse_markup(self.input, lt) {
                if let Token::Start(tag) = &token {
                    if !tag.self_closing && RAW_TEXT.contains(&tag.name.as_str()) {
                        self.raw_text = Some(tag.name.clone());
                    }
                }
                self.pos = end;
                if lt > start {
                    self.pending = Some((lt..end, token));
                    return Some((start..lt, Token::Text(&self.input[start..lt])));
                }
                return Some((lt..end, token));
            }
            search = lt + 1;
        }

        self.pos = self.input.len();
        Some((start..self.input.len(), Token::Text(&self.input[start..])))
    }
}

/// Try to read markup starting at the `<` at byte `lt`.
///
/// Returns the byte offset just past the markup, or `None` when the `<` is
/// literal text.
fn parse_markup(input: &str, lt: usize) -> Option<(usize, Token<'_>)> {
    let b = input.as_bytes();

    if input[lt..].starts_with("<!--") {
        let body = lt + 4;
        return Some(match input[body..].find("-->") {
            Some(i) => (body + i + 3, Token::Comment(&input[body..body + i])),
            None => (input.len(), Token::Comment(&input[body..])),
        });
    }

    match b.get(lt + 1).copied() {
        Some(b'!') | Some(b'?') => {
            let body = lt + 2;
            Some(match memchr(b'>', &b[body..]) {
                Some(i) => (body + i + 1, Token::Comment(&input[body..body + i])),
                None => (input.len(), Token::Comment(&input[body..])),
            })
        }
        Some(b'/') if b.get(lt + 2).is_some_and(u8::is_ascii_alphabetic) => {
            parse_end_tag(input, lt)
        }
        Some(c) if c.is_ascii_alphabetic() => parse_start_tag(input, lt),
        _ => None,
    }
}

fn is_name_end(c: u8) -> bool {
    c.is_ascii_whitespace() || c == b'/' || c == b'>'
}

fn parse_end_tag(input: &str, lt: usize) -> Option<(usize, Token<'_>)> {
    let b = input.as_bytes();
    let name_start = lt + 2;
    let mut i = name_start;
    while i < b.len() && !is_name_end(b[i]) {
        i += 1;
    }
    let name = input[name_start..i].to_ascii_lowercase();
    let gt = i + memchr(b'>', &b[i..])?;
    Some((gt + 1, Token::End(name)))
}

fn parse_start_tag(input: &str, lt: usize) -> Option<(usize, Token<'_>)> {
    let b = input.as_bytes();
    let name_start = lt + 1;
    let mut i = name_start;
    while i < b.len() && !is_name_end(b[i]) {
        i += 1;
    }
    let name = input[name_start..i].to_ascii_lowercase();
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        let c = *b.get(i)?;
        if c == b'>' {
            let tag = StartTag {
                name,
                attrs,
                self_closing,
            };
            return Some((i + 1, Token::Start(tag)));
        }
        if c == b'/' {
            i += 1;
            self_closing = b.get(i) == Some(&b'>');
            continue;
        }
        self_closing = false;

        // The first character is part of the name even when it is `=`.
        let attr_start = i;
        i += 1;
        while i < b.len() && !matches!(b[i], b'=' | b'>' | b'/') && !b[i].is_ascii_whitespace()
        {
            i += 1;
        }
        let attr_name = input[attr_start..i].to_ascii_lowercase();

        while i < b.len() && b[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if b.get(i) == Some(&b'=') {
            i += 1;
            while i < b.len() && b[i].is_ascii_whitespace() {
                i += 1;
            }
            let q = *b.get(i)?;
            if q == b'"' || q == b'\'' {
                let value_start = i + 1;
                let close = value_start + memchr(q, &b[value_start..])?;
                value = decode_entities(&input[value_start..close]).into_owned();
                i = close + 1;
            } else {
                let value_start = i;
                while i < b.len() && b[i] != b'>' && !b[i].is_ascii_whitespace() {
                    i += 1;
                }
                value = decode_entities(&input[value_start..i]).into_owned();
            }
        }
        attrs.push(Attribute {
            name: attr_name,
            value,
        });
    }
}

/// Byte offset of the `</name` that closes a raw-text element, matched
/// case-insensitively and followed by a name terminator.
fn find_end_tag(input: &str, from: usize, name: &str) -> Option<usize> {
    let b = input.as_bytes();
    let mut search = from;
    while let Some(off) = memchr(b'<', &b[search..]) {
        let lt = search + off;
        let name_end = lt + 2 + name.len();
        if b.get(lt + 1) == Some(&b'/')
            && b.len() >= name_end
            && b[lt + 2..name_end].eq_ignore_ascii_case(name.as_bytes())
            && b.get(name_end).map_or(true, |&c| is_name_end(c))
        {
            return Some(lt);
        }
        search = lt + 1;
    }
    None
}

// --- entities ----------------------------------------------------------------

/// Decode the character references the pipeline itself produces plus the
/// common named ones. Unknown or malformed references stay literal.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_one(tail) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// `s` starts with `&`. Returns the decoded char and the reference length.
fn decode_one(s: &str) -> Option<(char, usize)> {
    let semi = s.bytes().take(12).position(|c| c == b';')?;
    let body = &s[1..semi];
    let ch = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(|c: char| c == 'x' || c == 'X') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        char::from_u32(code)?
    } else {
        match body {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            _ => return None,
        }
    };
    Some((ch, semi + 1))
}

/// Escape text content: `&`, `<`, `>`.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a double-quoted attribute value: `&`, `"`, `<`, `>`.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Decoded text content of a fragment: text tokens only, tags dropped.
pub fn text_content(html: &str) -> String {
    tokenize(html)
        .filter_map(|(_, t)| match t {
            Token::Text(s) => Some(decode_entities(s).into_owned()),
            _ => None,
        })
        .collect()
}

// --- tests -------------------------------------------------------------------
