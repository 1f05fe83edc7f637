use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::model::Block;

/// Markup of a document holding only an empty text block.
pub const EMPTY_MARKUP: &str = "<p></p>";

/// Serialize blocks to markup, one fragment per block with no separator.
///
/// Images without a `src` and lists without items produce nothing.
pub fn serialize(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        write_block(&mut out, block);
    }
    out
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::Text { text, .. } => {
            out.push_str("<p>");
            out.push_str(&newlines_to_breaks(text));
            out.push_str("</p>");
        }
        Block::Heading { level, text, .. } => {
            let tag = level.tag();
            let _ = write!(out, "<{tag}>{}</{tag}>", encode_text(text));
        }
        Block::Image { src, alt, .. } => {
            if src.trim().is_empty() {
                return;
            }
            let _ = write!(
                out,
                r#"<img src="{}" alt="{}" />"#,
                encode_double_quoted_attribute(src),
                encode_double_quoted_attribute(alt)
            );
        }
        Block::List { ordered, items, .. } => {
            if items.is_empty() {
                return;
            }
            let tag = if *ordered { "ol" } else { "ul" };
            let _ = write!(out, "<{tag}>");
            for item in items {
                let _ = write!(out, "<li>{}</li>", encode_text(item));
            }
            let _ = write!(out, "</{tag}>");
        }
        Block::Quote { text, .. } => {
            out.push_str("<blockquote>");
            out.push_str(&newlines_to_breaks(text));
            out.push_str("</blockquote>");
        }
        Block::Unknown => {}
    }
}

fn newlines_to_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br>")
}
