use std::sync::LazyLock;

use jasiri_markup::{Element, Node};
use regex::Regex;

use super::model::{Block, Document, HeadingLevel};
use super::serialize::EMPTY_MARKUP;

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern is valid"));

/// Parse stored markup back into a document. Never fails.
///
/// `None`, blank input and `<p></p>` give the empty document. Unknown
/// top-level elements become text blocks holding their inner markup, and
/// input the markup parser rejects outright becomes one text block holding
/// the raw input.
pub fn parse(markup: Option<&str>) -> Document {
    match markup {
        Some(markup) => parse_str(markup),
        None => Document::new(),
    }
}

pub fn parse_str(markup: &str) -> Document {
    let trimmed = markup.trim();
    if trimmed.is_empty() || trimmed == EMPTY_MARKUP {
        return Document::new();
    }

    let nodes = match jasiri_markup::parse(markup) {
        Ok(nodes) => nodes,
        Err(err) => {
            tracing::warn!(error = %err, "unparseable post markup, keeping it as raw text");
            return Document::from_blocks(vec![Block::text(markup)]);
        }
    };

    let blocks: Vec<Block> = nodes
        .iter()
        .filter_map(|node| node_to_block(node, markup))
        .collect();

    if blocks.is_empty() {
        Document::new()
    } else {
        Document::from_blocks(blocks)
    }
}

fn node_to_block(node: &Node, source: &str) -> Option<Block> {
    match node {
        Node::Element(el) => Some(element_to_block(el, source)),
        Node::Text(raw) => {
            let text = raw.trim();
            (!text.is_empty()).then(|| Block::text(text))
        }
        Node::Comment(_) => None,
    }
}

fn element_to_block(el: &Element, source: &str) -> Block {
    match el.name.as_str() {
        "h1" => Block::heading(HeadingLevel::H1, el.text_content()),
        "h2" => Block::heading(HeadingLevel::H2, el.text_content()),
        "h3" => Block::heading(HeadingLevel::H3, el.text_content()),
        "img" => Block::image(
            el.attr("src").unwrap_or_default(),
            el.attr("alt").unwrap_or_default(),
        ),
        "ul" | "ol" => Block::list(
            el.name == "ol",
            el.find_all("li")
                .into_iter()
                .map(|li| li.text_content().trim().to_string())
                .collect(),
        ),
        "blockquote" => Block::quote(breaks_to_newlines(el.inner_html(source))),
        // p, div, and anything unrecognized keep their inner markup as text
        _ => Block::text(breaks_to_newlines(el.inner_html(source))),
    }
}

fn breaks_to_newlines(markup: &str) -> String {
    LINE_BREAK.replace_all(markup, "\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::model::BlockKind;
    use crate::block::serialize;

    fn only_block(doc: &Document) -> &Block {
        assert_eq!(doc.blocks().len(), 1, "expected one block: {doc:?}");
        &doc.blocks()[0]
    }

    #[test]
    fn empty_inputs_canonicalize() {
        assert!(parse(None).is_blank());
        assert!(parse(Some("")).is_blank());
        assert!(parse(Some("   \n")).is_blank());
        assert!(parse(Some(" <p></p> ")).is_blank());
        assert!(parse(Some(&serialize(&[]))).is_blank());
    }

    #[test]
    fn paragraph_breaks_become_newlines() {
        let doc = parse_str("<p>one<br>two<BR/>three<br />four</p>");
        assert!(only_block(&doc).content_eq(&Block::text("one\ntwo\nthree\nfour")));
    }

    #[test]
    fn div_is_text() {
        let doc = parse_str("<div>hello <em>there</em></div>");
        assert!(only_block(&doc).content_eq(&Block::text("hello <em>there</em>")));
    }

    #[test]
    fn headings_by_level() {
        let doc = parse_str("<h1>A</h1><h2>B &amp; C</h2><h3><em>D</em></h3>");
        let blocks = doc.blocks();
        assert!(blocks[0].content_eq(&Block::heading(HeadingLevel::H1, "A")));
        assert!(blocks[1].content_eq(&Block::heading(HeadingLevel::H2, "B & C")));
        assert!(blocks[2].content_eq(&Block::heading(HeadingLevel::H3, "D")));
    }

    #[test]
    fn deeper_headings_degrade_to_text() {
        let doc = parse_str("<h4>Small</h4>");
        assert!(only_block(&doc).content_eq(&Block::text("Small")));
    }

    #[test]
    fn image_attributes() {
        let markup = r#"<img src="a.png" alt="An &quot;A&quot;" class="max-w-full h-auto" />"#;
        let doc = parse_str(markup);
        assert!(only_block(&doc).content_eq(&Block::image("a.png", "An \"A\"")));
    }

    #[test]
    fn image_without_attributes_is_empty_image() {
        let doc = parse_str("<img>");
        assert!(only_block(&doc).content_eq(&Block::image("", "")));
    }

    #[test]
    fn lists_collect_nested_items() {
        let doc = parse_str("<ol><li>first</li><li> second </li></ol><ul><li>x</li></ul>");
        let blocks = doc.blocks();
        assert!(blocks[0].content_eq(&Block::list(
            true,
            vec!["first".into(), "second".into()]
        )));
        assert!(blocks[1].content_eq(&Block::list(false, vec!["x".into()])));
    }

    #[test]
    fn blockquote_is_quote() {
        let doc = parse_str("<blockquote>said<br>this</blockquote>");
        assert!(only_block(&doc).content_eq(&Block::quote("said\nthis")));
    }

    #[test]
    fn unknown_element_degrades_to_text() {
        let doc = parse_str("<section>hi</section>");
        assert!(only_block(&doc).content_eq(&Block::text("hi")));
    }

    #[test]
    fn bare_top_level_text_is_kept() {
        let doc = parse_str("just words <p>para</p>");
        assert_eq!(doc.blocks().len(), 2);
        assert!(doc.blocks()[0].content_eq(&Block::text("just words")));
    }

    #[test]
    fn comments_only_yields_empty_document() {
        assert!(parse_str("<!-- nothing here -->").is_blank());
    }

    #[test]
    fn hard_failure_keeps_raw_input() {
        let raw = "<p>draft text <img src=\"broken";
        let doc = parse_str(raw);
        assert!(only_block(&doc).content_eq(&Block::text(raw)));
    }

    #[test]
    fn block_ids_are_unique() {
        let doc = parse_str("<p>a</p><p>b</p><p>c</p>");
        let mut ids: Vec<&str> = doc.blocks().iter().map(Block::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn round_trip_preserves_content() {
        let original = Document::from_blocks(vec![
            Block::heading(HeadingLevel::H1, "Launch day"),
            Block::text("We shipped <strong>it</strong>.\nMore soon."),
            Block::image("https://cdn.example/cup.png", "The cup"),
            Block::list(false, vec!["Soft".into(), "Safe & reusable".into()]),
            Block::list(true, vec!["Boil".into(), "Insert".into()]),
            Block::heading(HeadingLevel::H3, "a < b"),
            Block::quote("Best purchase\never"),
        ]);
        let markup = original.to_markup();
        let reparsed = parse_str(&markup);
        assert!(
            reparsed.content_eq(&original),
            "round trip changed content:\n{original:?}\n{reparsed:?}"
        );
        assert_eq!(reparsed.to_markup(), markup);
    }

    #[test]
    fn literal_angle_brackets_in_text_survive_saves() {
        let original = Document::from_blocks(vec![
            Block::text("if a<b then"),
            Block::quote("x<y<z and 1</b 2"),
            Block::heading(HeadingLevel::H2, "Next"),
        ]);
        let first = original.to_markup();
        assert_eq!(
            first,
            "<p>if a<b then</p><blockquote>x<y<z and 1</b 2</blockquote><h2>Next</h2>"
        );
        let second = parse_str(&first).to_markup();
        assert_eq!(second, first);
        assert!(parse_str(&second).content_eq(&original));
    }

    #[test]
    fn editing_session_round_trip() {
        let mut doc = parse(None);
        let heading = doc.push(BlockKind::Heading);
        doc.update(&heading, Block::heading(HeadingLevel::H2, "Hello"))
            .unwrap();
        let first = doc.blocks()[0].id().to_string();
        doc.remove(&first).unwrap();

        let stored = doc.to_markup();
        assert_eq!(stored, "<h2>Hello</h2>");
        assert!(parse_str(&stored).content_eq(&doc));
    }
}
