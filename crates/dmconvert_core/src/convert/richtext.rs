//! Legacy HTML to editor document conversion.
//!
//! # Responsibility
//! - Rewrite legacy annotation spans into `highlight` marks carrying the
//!   selector URI.
//! - Produce the editor's JSON document (`{"type":"doc",...}`) and a flat
//!   search text.
//!
//! # Invariants
//! - The produced document always has at least one block.
//! - Adjacent text nodes with identical marks are merged.
//! - Search text joins every textblock with a single space.
//! - Whitespace between two tags survives parsing.
//! - Markup never reaches the document as text, even when parsing fails.

use crate::model::node::normalize_uri;
use html_parser::{Dom, Element, Node};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::{json, Map, Value};
use std::borrow::Cow;

/// Class of annotation spans in legacy documents. The selector URI is in `about`.
const LEGACY_HIGHLIGHT_CLASS: &str = "atb-editor-textannotation";
/// Class of already-converted highlight spans.
const HIGHLIGHT_CLASS: &str = "dm-highlight";

/// Elements that separate words when tags are stripped. All but `br` also
/// close an open `p`.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "blockquote", "pre",
    "hr", "br", "table", "tr", "td", "th", "section", "article", "header", "footer", "main",
];

static CSS_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z-]+)\s*:\s*(.*?)\s*$").expect("static CSS regex is valid")
});

static INTER_TAG_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r">(\s+)<").expect("static whitespace regex is valid"));

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)[^>]*>").expect("static tag regex is valid")
});

/// Converted text document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichText {
    /// Serialized editor JSON document.
    pub content: String,
    pub search_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mark {
    Link { href: String, title: Option<String> },
    Em,
    Strong,
    Code,
    TextStyle {
        color: String,
        font_size: String,
        text_decoration: String,
    },
    Highlight { uid: String },
}

impl Mark {
    fn rank(&self) -> u8 {
        match self {
            Self::Link { .. } => 0,
            Self::Em => 1,
            Self::Strong => 2,
            Self::Code => 3,
            Self::TextStyle { .. } => 4,
            Self::Highlight { .. } => 5,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Link { href, title } => {
                json!({"type": "link", "attrs": {"href": href, "title": title}})
            }
            Self::Em => json!({"type": "em"}),
            Self::Strong => json!({"type": "strong"}),
            Self::Code => json!({"type": "code"}),
            Self::TextStyle {
                color,
                font_size,
                text_decoration,
            } => json!({
                "type": "textStyle",
                "attrs": {
                    "color": color,
                    "fontSize": font_size,
                    "textDecoration": text_decoration,
                }
            }),
            Self::Highlight { uid } => {
                json!({"type": "highlight", "attrs": {"highlightUid": uid}})
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Inline {
    Text { text: String, marks: Vec<Mark> },
    HardBreak { marks: Vec<Mark> },
    Image {
        src: String,
        alt: Option<String>,
        title: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Paragraph(Vec<Inline>),
    Heading(u8, Vec<Inline>),
    CodeBlock(String),
    Blockquote(Vec<Block>),
    HorizontalRule,
    BulletList(Vec<Vec<Block>>),
    OrderedList(u32, Vec<Vec<Block>>),
}

/// Accumulates blocks, wrapping loose inline content in paragraphs.
#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    pending: Vec<Inline>,
}

impl BlockBuilder {
    fn push_text(&mut self, text: &str, marks: &[Mark]) {
        let mut text = collapse_whitespace(text);
        let at_line_start = match self.pending.last() {
            None | Some(Inline::HardBreak { .. }) => true,
            Some(Inline::Text { text: prev, .. }) => prev.ends_with(' '),
            Some(Inline::Image { .. }) => false,
        };
        if at_line_start {
            text = text.trim_start().to_string();
        }
        if text.is_empty() {
            return;
        }
        if let Some(Inline::Text {
            text: prev,
            marks: prev_marks,
        }) = self.pending.last_mut()
        {
            if prev_marks.as_slice() == marks {
                prev.push_str(&text);
                return;
            }
        }
        self.pending.push(Inline::Text {
            text,
            marks: marks.to_vec(),
        });
    }

    fn push_inline(&mut self, inline: Inline) {
        self.pending.push(inline);
    }

    /// Closes pending inline content as a paragraph, if there is any.
    fn flush(&mut self) {
        self.close_textblock(Block::Paragraph, false);
    }

    fn close_textblock(&mut self, make: impl FnOnce(Vec<Inline>) -> Block, keep_empty: bool) {
        let mut inlines = std::mem::take(&mut self.pending);
        if let Some(Inline::Text { text, .. }) = inlines.last_mut() {
            let trimmed = text.trim_end().len();
            text.truncate(trimmed);
        }
        inlines.retain(|inline| !matches!(inline, Inline::Text { text, .. } if text.is_empty()));
        if inlines.is_empty() && !keep_empty {
            return;
        }
        self.blocks.push(make(inlines));
    }

    fn push_block(&mut self, block: Block) {
        self.flush();
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

/// Converts a legacy HTML fragment into the editor document and search text.
///
/// HTML with omitted `p`/`li` end tags is repaired before parsing. Anything
/// still unparseable degrades to a single paragraph of its text content.
pub fn convert_html(html: &str) -> RichText {
    let blocks = if !html.contains('<') {
        plain_text_blocks(&decode_entities(html))
    } else {
        parse_blocks(html)
    };
    let blocks = non_empty(blocks);

    let doc = json!({
        "type": "doc",
        "content": blocks.iter().map(block_to_json).collect::<Vec<_>>(),
    });
    let mut textblocks = Vec::new();
    for block in &blocks {
        collect_textblocks(block, &mut textblocks);
    }

    RichText {
        content: doc.to_string(),
        search_text: textblocks.join(" "),
    }
}

fn parse_blocks(html: &str) -> Vec<Block> {
    let html = preserve_inter_tag_whitespace(html);
    let err = match Dom::parse(&html) {
        Ok(dom) => return dom_blocks(&dom),
        Err(err) => err,
    };
    match Dom::parse(&close_implicit_tags(&html)) {
        Ok(dom) => {
            debug!(
                "event=richtext_parse module=convert status=repaired error={}",
                err
            );
            dom_blocks(&dom)
        }
        Err(err) => {
            warn!(
                "event=richtext_parse module=convert status=fallback error={}",
                err
            );
            plain_text_blocks(&strip_tags(&html))
        }
    }
}

fn dom_blocks(dom: &Dom) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    walk_nodes(&dom.children, &[], &mut builder);
    builder.finish()
}

fn plain_text_blocks(text: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    builder.push_text(text, &[]);
    builder.finish()
}

/// Rewrites whitespace-only gaps between tags as character references so the
/// parser keeps them as text nodes.
fn preserve_inter_tag_whitespace(html: &str) -> Cow<'_, str> {
    INTER_TAG_WHITESPACE.replace_all(html, |caps: &Captures<'_>| {
        let gap: String = caps[1]
            .chars()
            .map(|ch| format!("&#{};", u32::from(ch)))
            .collect();
        format!(">{gap}<")
    })
}

/// Inserts the end tags HTML allows to be omitted for `p` and `li`.
fn close_implicit_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut open: Vec<&'static str> = Vec::new();
    let mut last = 0;

    for tag in TAG.captures_iter(html) {
        let Some(whole) = tag.get(0) else {
            continue;
        };
        out.push_str(&html[last..whole.start()]);
        last = whole.end();
        let name = tag[2].to_ascii_lowercase();
        let is_block = name != "br" && BLOCK_TAGS.contains(&name.as_str());

        if &tag[1] == "/" {
            match name.as_str() {
                "p" if open.last() == Some(&"p") => {
                    open.pop();
                }
                // Stray end tag.
                "p" => continue,
                "li" => {
                    close_open(&mut open, &mut out, &["p"]);
                    if open.last() != Some(&"li") {
                        continue;
                    }
                    open.pop();
                }
                "ul" | "ol" => {
                    close_open(&mut open, &mut out, &["p", "li"]);
                    if open.last().is_some_and(|top| *top == "ul" || *top == "ol") {
                        open.pop();
                    }
                }
                _ if is_block => close_open(&mut open, &mut out, &["p"]),
                _ => {}
            }
        } else {
            if is_block {
                close_open(&mut open, &mut out, &["p"]);
            }
            if name == "li" {
                close_open(&mut open, &mut out, &["li"]);
            }
            if !whole.as_str().ends_with("/>") {
                match name.as_str() {
                    "p" => open.push("p"),
                    "li" => open.push("li"),
                    "ul" => open.push("ul"),
                    "ol" => open.push("ol"),
                    _ => {}
                }
            }
        }
        out.push_str(whole.as_str());
    }

    out.push_str(&html[last..]);
    close_open(&mut open, &mut out, &["p", "li"]);
    out
}

/// Pops and closes elements from the top of `open` while they are in `names`.
fn close_open(open: &mut Vec<&'static str>, out: &mut String, names: &[&str]) {
    while let Some(top) = open.last().copied() {
        if !names.contains(&top) {
            break;
        }
        open.pop();
        out.push_str("</");
        out.push_str(top);
        out.push('>');
    }
}

/// Text content of markup the parser rejected. Block tags become spaces.
fn strip_tags(html: &str) -> String {
    let text = TAG.replace_all(html, |tag: &Captures<'_>| {
        if BLOCK_TAGS.contains(&tag[2].to_ascii_lowercase().as_str()) {
            " "
        } else {
            ""
        }
    });
    decode_entities(&text)
}

fn walk_nodes(nodes: &[Node], marks: &[Mark], out: &mut BlockBuilder) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_text(&decode_entities(text), marks),
            Node::Element(element) => walk_element(element, marks, out),
            Node::Comment(_) => {}
        }
    }
}

fn walk_element(element: &Element, marks: &[Mark], out: &mut BlockBuilder) {
    let name = element.name.to_ascii_lowercase();
    match name.as_str() {
        "p" => {
            out.flush();
            walk_nodes(&element.children, marks, out);
            out.close_textblock(Block::Paragraph, true);
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<u8>().unwrap_or(1);
            out.flush();
            walk_nodes(&element.children, marks, out);
            out.close_textblock(|inlines| Block::Heading(level, inlines), true);
        }
        "blockquote" => {
            let mut inner = BlockBuilder::default();
            walk_nodes(&element.children, marks, &mut inner);
            out.push_block(Block::Blockquote(non_empty(inner.finish())));
        }
        "hr" => out.push_block(Block::HorizontalRule),
        "pre" => {
            let mut raw = String::new();
            raw_text(&element.children, &mut raw);
            out.push_block(Block::CodeBlock(decode_entities(&raw)));
        }
        "ul" => {
            let items = list_items(element, marks);
            out.push_block(Block::BulletList(items));
        }
        "ol" => {
            let order = attr(element, "start")
                .and_then(|value| value.trim().parse::<u32>().ok())
                .unwrap_or(1);
            let items = list_items(element, marks);
            out.push_block(Block::OrderedList(order, items));
        }
        "br" => out.push_inline(Inline::HardBreak {
            marks: marks.to_vec(),
        }),
        "img" => {
            if let Some(src) = attr(element, "src") {
                out.push_inline(Inline::Image {
                    src: src.to_string(),
                    alt: attr(element, "alt").map(decode_entities),
                    title: attr(element, "title").map(decode_entities),
                });
            }
        }
        "head" | "script" | "style" | "title" | "meta" | "link" => {}
        "div" | "section" | "article" | "header" | "footer" | "main" | "body" | "html"
        | "li" | "table" | "tbody" | "thead" | "tr" | "td" | "th" | "center" => {
            out.flush();
            walk_nodes(&element.children, marks, out);
            out.flush();
        }
        _ => {
            let marks = with_element_marks(element, &name, marks);
            walk_nodes(&element.children, &marks, out);
        }
    }
}

fn list_items(list: &Element, marks: &[Mark]) -> Vec<Vec<Block>> {
    let mut items = Vec::new();
    for child in &list.children {
        let Node::Element(element) = child else {
            continue;
        };
        let mut item = BlockBuilder::default();
        if element.name.eq_ignore_ascii_case("li") {
            walk_nodes(&element.children, marks, &mut item);
        } else {
            walk_element(element, marks, &mut item);
        }
        let mut blocks = item.finish();
        if !matches!(blocks.first(), Some(Block::Paragraph(_))) {
            blocks.insert(0, Block::Paragraph(Vec::new()));
        }
        items.push(blocks);
    }
    items
}

/// Marks in effect inside `element`, sorted by rank, one per mark type.
fn with_element_marks(element: &Element, name: &str, marks: &[Mark]) -> Vec<Mark> {
    let mut added = Vec::new();

    match name {
        "em" | "i" => added.push(Mark::Em),
        "strong" | "b" => added.push(Mark::Strong),
        "code" => added.push(Mark::Code),
        "a" => {
            if let Some(href) = attr(element, "href") {
                added.push(Mark::Link {
                    href: href.to_string(),
                    title: attr(element, "title").map(decode_entities),
                });
            }
        }
        _ => {}
    }

    if has_class(element, LEGACY_HIGHLIGHT_CLASS) {
        if let Some(about) = attr(element, "about") {
            added.push(Mark::Highlight {
                uid: normalize_uri(about.trim()),
            });
        }
    } else if has_class(element, HIGHLIGHT_CLASS) {
        if let Some(uid) = attr(element, "data-highlight-uid") {
            added.push(Mark::Highlight {
                uid: uid.trim().to_string(),
            });
        }
    }

    if let Some(style) = attr(element, "style") {
        added.extend(style_marks(style));
    }

    let mut merged = marks.to_vec();
    for mark in added {
        match merged.iter_mut().find(|existing| existing.rank() == mark.rank()) {
            Some(existing) => *existing = mark,
            None => merged.push(mark),
        }
    }
    merged.sort_by_key(Mark::rank);
    merged
}

/// Marks expressed through inline CSS.
fn style_marks(style: &str) -> Vec<Mark> {
    let mut marks = Vec::new();
    let mut color = None;
    let mut font_size = None;
    let mut text_decoration = None;

    for declaration in style.split(';') {
        let Some(captures) = CSS_DECLARATION.captures(declaration) else {
            continue;
        };
        let property = captures[1].to_ascii_lowercase();
        let value = captures[2].to_string();
        if value.is_empty() {
            continue;
        }
        match property.as_str() {
            "color" => color = Some(value),
            "font-size" => font_size = Some(value),
            "text-decoration" => text_decoration = Some(value),
            "font-style" if value.eq_ignore_ascii_case("italic") => marks.push(Mark::Em),
            "font-weight" if is_bold(&value) => marks.push(Mark::Strong),
            _ => {}
        }
    }

    if color.is_some() || font_size.is_some() || text_decoration.is_some() {
        marks.push(Mark::TextStyle {
            color: color.unwrap_or_else(|| "#000".to_string()),
            font_size: font_size.unwrap_or_else(|| "normal".to_string()),
            text_decoration: text_decoration.unwrap_or_else(|| "none".to_string()),
        });
    }
    marks
}

fn is_bold(value: &str) -> bool {
    value.eq_ignore_ascii_case("bold")
        || value.eq_ignore_ascii_case("bolder")
        || value.parse::<u32>().is_ok_and(|weight| weight >= 600)
}

fn attr<'a>(element: &'a Element, name: &str) -> Option<&'a str> {
    element
        .attributes
        .get(name)
        .and_then(|value| value.as_deref())
}

fn has_class(element: &Element, class: &str) -> bool {
    element.classes.iter().any(|candidate| candidate == class)
        || attr(element, "class")
            .is_some_and(|value| value.split_whitespace().any(|candidate| candidate == class))
}

fn raw_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) if element.name.eq_ignore_ascii_case("br") => out.push('\n'),
            Node::Element(element) => raw_text(&element.children, out),
            Node::Comment(_) => {}
        }
    }
}

fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() && ch != '\u{a0}' {
            if !in_space {
                collapsed.push(' ');
            }
            in_space = true;
        } else {
            collapsed.push(ch);
            in_space = false;
        }
    }
    collapsed
}

fn non_empty(mut blocks: Vec<Block>) -> Vec<Block> {
    if blocks.is_empty() {
        blocks.push(Block::Paragraph(Vec::new()));
    }
    blocks
}

fn block_to_json(block: &Block) -> Value {
    match block {
        Block::Paragraph(inlines) => textblock_json("paragraph", None, inlines),
        Block::Heading(level, inlines) => {
            textblock_json("heading", Some(json!({"level": level})), inlines)
        }
        Block::CodeBlock(text) => {
            let mut node = json!({"type": "code_block", "attrs": {"params": ""}});
            if !text.is_empty() {
                node["content"] = json!([{"type": "text", "text": text}]);
            }
            node
        }
        Block::Blockquote(blocks) => json!({
            "type": "blockquote",
            "content": blocks.iter().map(block_to_json).collect::<Vec<_>>(),
        }),
        Block::HorizontalRule => json!({"type": "horizontal_rule"}),
        Block::BulletList(items) => json!({
            "type": "bullet_list",
            "content": items.iter().map(|item| list_item_json(item)).collect::<Vec<_>>(),
        }),
        Block::OrderedList(order, items) => json!({
            "type": "ordered_list",
            "attrs": {"order": order},
            "content": items.iter().map(|item| list_item_json(item)).collect::<Vec<_>>(),
        }),
    }
}

fn list_item_json(blocks: &[Block]) -> Value {
    json!({
        "type": "list_item",
        "content": blocks.iter().map(block_to_json).collect::<Vec<_>>(),
    })
}

fn textblock_json(kind: &str, attrs: Option<Value>, inlines: &[Inline]) -> Value {
    let mut node = Map::new();
    node.insert("type".to_string(), json!(kind));
    if let Some(attrs) = attrs {
        node.insert("attrs".to_string(), attrs);
    }
    if !inlines.is_empty() {
        node.insert(
            "content".to_string(),
            Value::Array(inlines.iter().map(inline_to_json).collect()),
        );
    }
    Value::Object(node)
}

fn inline_to_json(inline: &Inline) -> Value {
    let (mut node, marks) = match inline {
        Inline::Text { text, marks } => (json!({"type": "text", "text": text}), marks.as_slice()),
        Inline::HardBreak { marks } => (json!({"type": "hard_break"}), marks.as_slice()),
        Inline::Image { src, alt, title } => (
            json!({"type": "image", "attrs": {"src": src, "alt": alt, "title": title}}),
            &[][..],
        ),
    };
    if !marks.is_empty() {
        node["marks"] = Value::Array(marks.iter().map(Mark::to_json).collect());
    }
    node
}

fn collect_textblocks(block: &Block, out: &mut Vec<String>) {
    match block {
        Block::Paragraph(inlines) | Block::Heading(_, inlines) => out.push(inline_text(inlines)),
        Block::CodeBlock(text) => out.push(text.clone()),
        Block::Blockquote(blocks) => blocks
            .iter()
            .for_each(|block| collect_textblocks(block, out)),
        Block::HorizontalRule => {}
        Block::BulletList(items) | Block::OrderedList(_, items) => items
            .iter()
            .flatten()
            .for_each(|block| collect_textblocks(block, out)),
    }
}

fn inline_text(inlines: &[Inline]) -> String {
    inlines
        .iter()
        .filter_map(|inline| match inline {
            Inline::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> (Value, String) {
        let converted = convert_html(html);
        (
            serde_json::from_str(&converted.content).unwrap(),
            converted.search_text,
        )
    }

    fn text_nodes(value: &Value, out: &mut Vec<Value>) {
        if value["type"] == "text" {
            out.push(value.clone());
        }
        if let Some(children) = value["content"].as_array() {
            for child in children {
                text_nodes(child, out);
            }
        }
    }

    #[test]
    fn legacy_annotation_span_becomes_highlight_mark() {
        let (doc, search) = doc(
            r#"<p>Hello <span class="atb-editor-textannotation" about="urn:dm.sel1">world</span></p>"#,
        );
        let mut texts = Vec::new();
        text_nodes(&doc, &mut texts);
        let highlighted = texts
            .iter()
            .find(|node| node["text"] == "world")
            .expect("highlighted text node");
        assert_eq!(highlighted["marks"][0]["type"], "highlight");
        assert_eq!(
            highlighted["marks"][0]["attrs"]["highlightUid"],
            "urn:dm_sel1"
        );
        assert_eq!(search, "Hello world");
    }

    #[test]
    fn whitespace_between_inline_elements_is_kept() {
        let (doc, search) = doc("<p><b>bold</b> <i>it</i></p>");
        assert_eq!(search, "bold it");
        let mut texts = Vec::new();
        text_nodes(&doc, &mut texts);
        let words: Vec<&str> = texts.iter().filter_map(|node| node["text"].as_str()).collect();
        assert_eq!(words, vec!["bold", " ", "it"]);
        assert!(texts[1].get("marks").is_none());

        let (_, search) = self::doc(concat!(
            r#"<p><span class="atb-editor-textannotation" about="urn:a">one</span>"#,
            "\n",
            r#"<span class="atb-editor-textannotation" about="urn:b">two</span></p>"#,
        ));
        assert_eq!(search, "one two");
    }

    #[test]
    fn whitespace_between_blocks_adds_no_text() {
        let (doc, search) = doc("<p>First</p>\n  <p>Second</p>");
        assert_eq!(doc["content"].as_array().unwrap().len(), 2);
        assert_eq!(search, "First Second");
    }

    #[test]
    fn omitted_paragraph_end_tags_are_repaired() {
        let (doc, search) = doc(
            r#"<p>one<p>two <span class="atb-editor-textannotation" about="urn:q">quoted</span>"#,
        );
        assert_eq!(search, "one two quoted");
        let blocks = doc["content"].as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1]["content"][1]["marks"][0]["attrs"]["highlightUid"], "urn:q");
    }

    #[test]
    fn omitted_list_item_end_tags_are_repaired() {
        assert_eq!(
            close_implicit_tags("<ul><li>a<li>b<ul><li>c</ul></ul>"),
            "<ul><li>a</li><li>b<ul><li>c</li></ul></li></ul>"
        );
        let (_, search) = doc("<ul><li>a<li>b</ul>");
        assert_eq!(search, "a b");
        assert_eq!(close_implicit_tags("<p>a<br>b<p>c"), "<p>a<br>b</p><p>c</p>");
    }

    #[test]
    fn stripped_fallback_keeps_text_only() {
        let text = strip_tags("<p>one<b>two</b></p><p>x &amp; y<br>z");
        assert_eq!(collapse_whitespace(&text).trim(), "onetwo x & y z");
        let blocks = plain_text_blocks(&text);
        assert_eq!(collect_search(&blocks), "onetwo x & y z");
    }

    fn collect_search(blocks: &[Block]) -> String {
        let mut out = Vec::new();
        for block in blocks {
            collect_textblocks(block, &mut out);
        }
        out.join(" ")
    }

    #[test]
    fn converted_highlight_span_keeps_uid() {
        let (doc, _) = doc(
            r#"<p><span class="dm-highlight" data-highlight-uid="urn:sel2">quoted</span></p>"#,
        );
        let mut texts = Vec::new();
        text_nodes(&doc, &mut texts);
        assert_eq!(texts[0]["marks"][0]["attrs"]["highlightUid"], "urn:sel2");
    }

    #[test]
    fn paragraphs_join_search_text_with_space() {
        let (doc, search) = doc("<p>First</p><p>Second</p>");
        assert_eq!(doc["type"], "doc");
        assert_eq!(doc["content"].as_array().unwrap().len(), 2);
        assert_eq!(search, "First Second");
    }

    #[test]
    fn basic_marks_are_applied() {
        let (doc, _) = doc("<p><strong>bold</strong><em>it</em></p>");
        let mut texts = Vec::new();
        text_nodes(&doc, &mut texts);
        let bold = texts.iter().find(|node| node["text"] == "bold").unwrap();
        let italic = texts.iter().find(|node| node["text"] == "it").unwrap();
        assert_eq!(bold["marks"][0]["type"], "strong");
        assert_eq!(italic["marks"][0]["type"], "em");
    }

    #[test]
    fn inline_style_becomes_text_style_with_defaults() {
        let (doc, _) = doc(r#"<span style="color: red; font-size: 12px">styled</span>"#);
        let paragraph = &doc["content"][0];
        assert_eq!(paragraph["type"], "paragraph");
        let mark = &paragraph["content"][0]["marks"][0];
        assert_eq!(mark["type"], "textStyle");
        assert_eq!(mark["attrs"]["color"], "red");
        assert_eq!(mark["attrs"]["fontSize"], "12px");
        assert_eq!(mark["attrs"]["textDecoration"], "none");
    }

    #[test]
    fn lists_become_list_items_with_paragraphs() {
        let (doc, search) = doc("<ul><li>One</li><li>Two</li></ul>");
        let list = &doc["content"][0];
        assert_eq!(list["type"], "bullet_list");
        let items = list["content"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["type"], "list_item");
        assert_eq!(items[0]["content"][0]["type"], "paragraph");
        assert_eq!(search, "One Two");
    }

    #[test]
    fn entities_are_decoded() {
        let (_, search) = doc("<p>a &amp; b</p>");
        assert_eq!(search, "a & b");
    }

    #[test]
    fn plain_text_and_empty_input_still_produce_a_block() {
        let (doc, search) = doc("just text");
        assert_eq!(doc["content"][0]["content"][0]["text"], "just text");
        assert_eq!(search, "just text");

        let (doc, search) = self::doc("");
        assert_eq!(doc["content"][0]["type"], "paragraph");
        assert_eq!(search, "");
    }

    #[test]
    fn style_marks_detect_weight_and_italic() {
        let marks = style_marks("font-weight: 700; font-style: italic");
        assert_eq!(marks, vec![Mark::Strong, Mark::Em]);
        assert!(style_marks("background: #ffeb3b").is_empty());
    }
}
