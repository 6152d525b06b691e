// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::{Document, NodeId, NodeKind};

const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "title"];

pub(super) fn serialize_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(node) = doc.node(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Element(data) => {
            out.push('<');
            out.push_str(&data.tag);
            for (name, value) in &data.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attribute(value));
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&data.tag.as_str()) {
                return;
            }
            if matches!(data.tag.as_str(), "script" | "style") {
                out.push_str(&doc.text_content(id));
            } else {
                for child in &node.children {
                    serialize_node(doc, *child, out);
                }
            }
            out.push_str("</");
            out.push_str(&data.tag);
            out.push('>');
        }
    }
}

pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    Text(String),
    Start {
        tag: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    End(String),
}

/// Builds `markup` into element and text nodes under `parent`, the way an
/// `innerHTML` assignment does. Stray end tags are dropped and elements left
/// open at the end of the fragment are closed there.
pub(super) fn parse_fragment(doc: &mut Document, parent: NodeId, markup: &str) {
    let mut open = vec![(parent, String::new())];
    for token in tokenize(markup) {
        let current = open.last().map_or(parent, |(node, _)| *node);
        match token {
            Token::Text(text) => {
                if !text.is_empty() {
                    doc.append_text(current, &text);
                }
            }
            Token::Start {
                tag,
                attributes,
                self_closing,
            } => {
                let element = doc.create_element(&tag);
                for (name, value) in &attributes {
                    if !doc.has_attribute(element, name) {
                        doc.set_attribute(element, name, value);
                    }
                }
                doc.append_child(current, element);
                if !self_closing && !VOID_ELEMENTS.contains(&tag.as_str()) {
                    open.push((element, tag));
                }
            }
            Token::End(tag) => {
                if let Some(depth) = open.iter().skip(1).rposition(|(_, open_tag)| *open_tag == tag) {
                    open.truncate(depth + 1);
                }
            }
        }
    }
}

fn tokenize(markup: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = markup;
    let mut text = String::new();
    while let Some(position) = rest.find('<') {
        text.push_str(&rest[..position]);
        rest = &rest[position..];
        let after = &rest[1..];

        if let Some(comment) = after.strip_prefix("!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }
        if after.starts_with('!') || after.starts_with('?') {
            rest = after.find('>').map_or("", |end| &after[end + 1..]);
            continue;
        }
        if let Some(end_tag) = after.strip_prefix('/')
            && end_tag.starts_with(|ch: char| ch.is_ascii_alphabetic())
        {
            flush_text(&mut tokens, &mut text);
            let name_len = end_tag
                .find(|ch: char| ch.is_ascii_whitespace() || ch == '>')
                .unwrap_or(end_tag.len());
            tokens.push(Token::End(end_tag[..name_len].to_ascii_lowercase()));
            rest = end_tag.find('>').map_or("", |end| &end_tag[end + 1..]);
            continue;
        }
        if !after.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
            text.push('<');
            rest = after;
            continue;
        }

        flush_text(&mut tokens, &mut text);
        let (token, remainder) = start_tag(after);
        rest = remainder;
        if let Token::Start {
            tag,
            self_closing: false,
            ..
        } = &token
            && RAW_TEXT_ELEMENTS.contains(&tag.as_str())
        {
            let tag = tag.clone();
            tokens.push(token);
            let (raw, remainder) = raw_text(rest, &tag);
            let content = if tag == "script" || tag == "style" {
                raw.to_string()
            } else {
                decode_entities(raw)
            };
            tokens.push(Token::Text(content));
            tokens.push(Token::End(tag));
            rest = remainder;
            continue;
        }
        tokens.push(token);
    }
    text.push_str(rest);
    flush_text(&mut tokens, &mut text);
    tokens
}

fn flush_text(tokens: &mut Vec<Token>, text: &mut String) {
    if !text.is_empty() {
        tokens.push(Token::Text(decode_entities(text)));
        text.clear();
    }
}

/// Reads a start tag after its `<`; returns the token and the input after `>`.
fn start_tag(input: &str) -> (Token, &str) {
    let is_name_char = |ch: char| ch.is_ascii_alphanumeric() || ch == '-' || ch == ':';
    let name_len = input.find(|ch: char| !is_name_char(ch)).unwrap_or(input.len());
    let tag = input[..name_len].to_ascii_lowercase();
    let mut rest = &input[name_len..];
    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        if let Some(after) = rest.strip_prefix("/>") {
            self_closing = true;
            rest = after;
            break;
        }
        if let Some(after) = rest.strip_prefix('>') {
            rest = after;
            break;
        }
        let name_len = rest
            .find(|ch: char| ch.is_ascii_whitespace() || matches!(ch, '=' | '>' | '/'))
            .unwrap_or(rest.len());
        if name_len == 0 {
            // A lone '/' or '=' inside the tag.
            rest = &rest[1..];
            continue;
        }
        let name = rest[..name_len].to_ascii_lowercase();
        rest = rest[name_len..].trim_start();
        let mut value = String::new();
        if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            let (raw, remainder) = attribute_value(after);
            value = decode_entities(raw);
            rest = remainder;
        }
        attributes.push((name, value));
    }

    (
        Token::Start {
            tag,
            attributes,
            self_closing,
        },
        rest,
    )
}

fn attribute_value(input: &str) -> (&str, &str) {
    match input.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &input[1..];
            match body.find(quote) {
                Some(end) => (&body[..end], &body[end + 1..]),
                None => (body, ""),
            }
        }
        _ => {
            let end = input
                .find(|ch: char| ch.is_ascii_whitespace() || ch == '>')
                .unwrap_or(input.len());
            (&input[..end], &input[end..])
        }
    }
}

/// Splits raw element content at its end tag, matched case-insensitively.
fn raw_text<'a>(input: &'a str, tag: &str) -> (&'a str, &'a str) {
    let closing = format!("</{}", tag);
    let end = input
        .to_ascii_lowercase()
        .find(&closing)
        .unwrap_or(input.len());
    let content = &input[..end];
    let after = &input[end..];
    let rest = after.find('>').map_or("", |close| &after[close + 1..]);
    (content, rest)
}

pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(position) = rest.find('&') {
        out.push_str(&rest[..position]);
        rest = &rest[position..];
        let decoded = rest
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&rest[1..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

pub(super) fn parse_style(css: &str) -> Vec<(String, String)> {
    css.split(';')
        .filter_map(|declaration| {
            let (name, value) = declaration.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

pub(super) fn serialize_style(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{}: {};", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_style_ignores_blank_and_malformed_declarations() {
        let parsed = parse_style("\n  width: 100%;\n  height: 120px;;bogus; : x;");
        assert_eq!(
            parsed,
            vec![
                ("width".to_string(), "100%".to_string()),
                ("height".to_string(), "120px".to_string()),
            ]
        );
    }

    #[test]
    fn fragments_become_element_and_text_nodes() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.set_inner_html(
            body,
            "<div class='card' data-editable=\"inner\"><h2 data-field=title>Safe &amp; sound</h2>\
             <img src=\"a.png\" alt=x><br/>tail</div> after",
        );
        let card = doc.first_child(body).expect("card");
        assert_eq!(doc.tag(card), Some("div"));
        assert_eq!(doc.attribute(card, "class"), Some("card"));
        assert_eq!(doc.attribute(card, "data-editable"), Some("inner"));
        let children = doc.element_children(card);
        let tags: Vec<_> = children.iter().filter_map(|id| doc.tag(*id)).collect();
        assert_eq!(tags, vec!["h2", "img", "br"]);
        assert_eq!(doc.attribute(children[0], "data-field"), Some("title"));
        assert_eq!(doc.text_content(children[0]), "Safe & sound");
        assert_eq!(doc.text_content(body), "Safe & soundtail after");
    }

    #[test]
    fn stray_and_unclosed_tags_are_recovered() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.set_inner_html(body, "a < b </span><p>open <em>nested");
        assert_eq!(doc.inner_html(body), "a &lt; b <p>open <em>nested</em></p>");
    }

    #[test]
    fn comments_are_dropped_and_raw_text_is_kept() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.set_inner_html(body, "<!-- note --><textarea>1 &lt; <b>2</b></textarea>");
        let area = doc.first_child(body).expect("textarea");
        assert_eq!(doc.tag(area), Some("textarea"));
        assert_eq!(doc.text_content(area), "1 < <b>2</b>");
        assert_eq!(doc.children(body).len(), 1);

        doc.set_inner_html(body, "<style>a > b { color: red }</style>");
        assert_eq!(doc.inner_html(body), "<style>a > b { color: red }</style>");
    }

    #[test]
    fn entities_decode_named_and_numeric_forms() {
        assert_eq!(decode_entities("&lt;&#65;&#x42;&quot;&bogus; & x"), "<AB\"&bogus; & x");
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let mut doc = Document::new();
        let body = doc.body();
        let img = doc.append_element(body, "img", &[("alt", "say \"hi\"")]);
        assert_eq!(doc.outer_html(img), "<img alt=\"say &quot;hi&quot;\">");
    }
}
