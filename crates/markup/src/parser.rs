use crate::ast::{is_void, Attribute, Element, Node};
use crate::lexer::{tokenize, LexError, Span, SpannedToken, Token};

/// Parser error types.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),
    #[error("nesting deeper than {0} elements")]
    TooDeep(usize),
}

/// Maximum element nesting before the input is rejected.
pub const MAX_DEPTH: usize = 256;

/// Start tags that implicitly close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "dl",
    "fieldset",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Parse a markup string into a forest of top-level nodes.
///
/// Recovery follows the forgiving rules authors expect from browsers: stray
/// end tags are dropped, unclosed elements close at the end of input, and
/// `<li>`/`<p>` close implicitly. Only lexical failures and runaway nesting
/// are reported as errors.
pub fn parse(input: &str) -> Result<Vec<Node>, ParseError> {
    let tokens = tokenize(input)?;
    let mut builder = TreeBuilder::new();
    for token in tokens {
        builder.push(token)?;
    }
    Ok(builder.finish(input.len()))
}

struct OpenElement {
    name: String,
    attrs: Vec<Attribute>,
    children: Vec<Node>,
    start: usize,
    inner_start: usize,
}

struct TreeBuilder {
    roots: Vec<Node>,
    stack: Vec<OpenElement>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            roots: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn append(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(open) => open.children.push(node),
            None => self.roots.push(node),
        }
    }

    /// Pop the innermost open element, ending its content at `inner_end`.
    fn close_top(&mut self, inner_end: usize, end: usize) {
        if let Some(open) = self.stack.pop() {
            let element = Element {
                name: open.name,
                attrs: open.attrs,
                children: open.children,
                span: Span {
                    start: open.start,
                    end,
                },
                inner: Span {
                    start: open.inner_start,
                    end: inner_end,
                },
            };
            self.append(Node::Element(element));
        }
    }

    fn close_down_to(&mut self, index: usize, at: usize) {
        while self.stack.len() > index {
            self.close_top(at, at);
        }
    }

    fn close_implied(&mut self, name: &str, at: usize) {
        if name == "li" {
            let nearest = self
                .stack
                .iter()
                .rposition(|o| matches!(o.name.as_str(), "li" | "ul" | "ol"));
            if let Some(index) = nearest {
                if self.stack[index].name == "li" {
                    self.close_down_to(index, at);
                }
            }
        }

        if CLOSES_PARAGRAPH.contains(&name) {
            if let Some(index) = self.stack.iter().rposition(|o| o.name == "p") {
                self.close_down_to(index, at);
            }
        }
    }

    fn push(&mut self, spanned: SpannedToken) -> Result<(), ParseError> {
        let SpannedToken { token, span } = spanned;
        match token {
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                self.close_implied(&name, span.start);
                if self_closing || is_void(&name) {
                    self.append(Node::Element(Element {
                        name,
                        attrs,
                        children: Vec::new(),
                        span,
                        inner: Span {
                            start: span.end,
                            end: span.end,
                        },
                    }));
                } else {
                    if self.stack.len() >= MAX_DEPTH {
                        return Err(ParseError::TooDeep(MAX_DEPTH));
                    }
                    self.stack.push(OpenElement {
                        name,
                        attrs,
                        children: Vec::new(),
                        start: span.start,
                        inner_start: span.end,
                    });
                }
            }
            Token::EndTag(name) => match self.stack.iter().rposition(|o| o.name == name) {
                Some(index) => {
                    self.close_down_to(index + 1, span.start);
                    self.close_top(span.start, span.end);
                }
                None => tracing::trace!(tag = %name, "ignoring stray end tag"),
            },
            Token::Text(raw) => self.append(Node::Text(raw)),
            Token::Comment(body) => self.append(Node::Comment(body)),
            Token::Doctype(_) | Token::Eof => {}
        }
        Ok(())
    }

    fn finish(mut self, input_len: usize) -> Vec<Node> {
        self.close_down_to(0, input_len);
        self.roots
    }
}
