use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Attribute;

/// Token types produced by the markup lexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// An opening tag such as `<p class="x">` or `<br />`.
    StartTag {
        name: String,
        attrs: Vec<Attribute>,
        self_closing: bool,
    },
    /// A closing tag such as `</p>`.
    EndTag(String),
    /// A run of character data, entities left undecoded.
    Text(String),
    /// The body of a `<!-- -->` comment.
    Comment(String),
    /// A `<!DOCTYPE>` or other `<!...>` declaration.
    Doctype(String),
    /// The end of the input.
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::StartTag { name, .. } => write!(f, "<{name}>"),
            Token::EndTag(name) => write!(f, "</{name}>"),
            Token::Text(s) => write!(f, "{s:?}"),
            Token::Comment(_) => write!(f, "comment"),
            Token::Doctype(_) => write!(f, "doctype"),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

/// Byte range in the source, used to slice inner markup back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A token with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

/// Lexer error.
#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("unterminated tag starting at position {0}")]
    UnterminatedTag(usize),
    #[error("unterminated comment starting at position {0}")]
    UnterminatedComment(usize),
    #[error("unterminated attribute value starting at position {0}")]
    UnterminatedAttribute(usize),
}

/// Elements whose content is raw text up to the matching end tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Tokenize a markup string into a sequence of tokens.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, LexError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;

        if !starts_markup(bytes, pos) {
            pos += 1;
            while pos < bytes.len() && !starts_markup(bytes, pos) {
                pos += 1;
            }
            tokens.push(SpannedToken {
                token: Token::Text(input[start..pos].to_string()),
                span: Span { start, end: pos },
            });
            continue;
        }

        let token = match bytes[pos + 1] {
            b'!' => {
                if input[pos..].starts_with("<!--") {
                    let body_start = pos + 4;
                    let Some(offset) = input[body_start..].find("-->") else {
                        return Err(LexError::UnterminatedComment(start));
                    };
                    pos = body_start + offset + 3;
                    Token::Comment(input[body_start..body_start + offset].to_string())
                } else {
                    let Some(offset) = input[pos..].find('>') else {
                        return Err(LexError::UnterminatedTag(start));
                    };
                    let body = input[pos + 2..pos + offset].trim().to_string();
                    pos += offset + 1;
                    Token::Doctype(body)
                }
            }
            b'/' => {
                pos += 2;
                let name_start = pos;
                while pos < bytes.len() && is_name_byte(bytes[pos]) {
                    pos += 1;
                }
                let name = input[name_start..pos].to_ascii_lowercase();
                while pos < bytes.len() && bytes[pos] != b'>' {
                    pos += 1;
                }
                if pos >= bytes.len() {
                    return Err(LexError::UnterminatedTag(start));
                }
                pos += 1;
                Token::EndTag(name)
            }
            _ => lex_start_tag(input, &mut pos)?,
        };

        let raw_text_name = match &token {
            Token::StartTag {
                name,
                self_closing: false,
                ..
            } if RAW_TEXT_ELEMENTS.contains(&name.as_str()) => Some(name.clone()),
            _ => None,
        };

        tokens.push(SpannedToken {
            token,
            span: Span { start, end: pos },
        });

        if let Some(name) = raw_text_name {
            // Script and style bodies may contain '<' freely; only the end tag ends them.
            let body_start = pos;
            let closing = format!("</{name}");
            let body_end = input[body_start..]
                .to_ascii_lowercase()
                .find(&closing)
                .map(|offset| body_start + offset)
                .unwrap_or(bytes.len());
            if body_end > body_start {
                tokens.push(SpannedToken {
                    token: Token::Text(input[body_start..body_end].to_string()),
                    span: Span {
                        start: body_start,
                        end: body_end,
                    },
                });
            }
            pos = body_end;
        }
    }

    tokens.push(SpannedToken {
        token: Token::Eof,
        span: Span {
            start: pos,
            end: pos,
        },
    });

    Ok(tokens)
}

/// A `<` only opens markup when followed by `!`, by a tag name ending at
/// whitespace, `/` or `>`, or by `/name>` (whitespace allowed before the `>`).
/// Anything else, like `x<y<z` or `1</b 2`, stays literal text.
fn starts_markup(bytes: &[u8], pos: usize) -> bool {
    if bytes[pos] != b'<' {
        return false;
    }
    let (name_start, end_tag) = match bytes.get(pos + 1) {
        Some(b'!') => return true,
        Some(b'/') => (pos + 2, true),
        _ => (pos + 1, false),
    };
    if !matches!(bytes.get(name_start), Some(b) if b.is_ascii_alphabetic()) {
        return false;
    }
    let mut end = name_start;
    while end < bytes.len() && is_name_byte(bytes[end]) {
        end += 1;
    }
    if end_tag {
        skip_whitespace(bytes, &mut end);
        return bytes.get(end) == Some(&b'>');
    }
    matches!(bytes.get(end), Some(b) if b.is_ascii_whitespace() || matches!(b, b'/' | b'>'))
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b':'
}

fn skip_whitespace(bytes: &[u8], pos: &mut usize) {
    while *pos < bytes.len() && bytes[*pos].is_ascii_whitespace() {
        *pos += 1;
    }
}

fn lex_start_tag(input: &str, pos: &mut usize) -> Result<Token, LexError> {
    let bytes = input.as_bytes();
    let start = *pos;
    *pos += 1;

    let name_start = *pos;
    while *pos < bytes.len() && is_name_byte(bytes[*pos]) {
        *pos += 1;
    }
    let name = input[name_start..*pos].to_ascii_lowercase();

    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        skip_whitespace(bytes, pos);
        if *pos >= bytes.len() {
            return Err(LexError::UnterminatedTag(start));
        }

        match bytes[*pos] {
            b'>' => {
                *pos += 1;
                break;
            }
            b'/' => {
                *pos += 1;
                if bytes.get(*pos) == Some(&b'>') {
                    *pos += 1;
                    self_closing = true;
                    break;
                }
            }
            _ => {
                let attr_start = *pos;
                while *pos < bytes.len()
                    && !bytes[*pos].is_ascii_whitespace()
                    && !matches!(bytes[*pos], b'=' | b'>' | b'/')
                {
                    *pos += 1;
                }
                let attr_name = input[attr_start..*pos].to_ascii_lowercase();

                skip_whitespace(bytes, pos);
                let value = if bytes.get(*pos) == Some(&b'=') {
                    *pos += 1;
                    skip_whitespace(bytes, pos);
                    match bytes.get(*pos) {
                        Some(&quote) if quote == b'"' || quote == b'\'' => {
                            *pos += 1;
                            let value_start = *pos;
                            while *pos < bytes.len() && bytes[*pos] != quote {
                                *pos += 1;
                            }
                            if *pos >= bytes.len() {
                                return Err(LexError::UnterminatedAttribute(attr_start));
                            }
                            let value = &input[value_start..*pos];
                            *pos += 1;
                            value
                        }
                        _ => {
                            let value_start = *pos;
                            while *pos < bytes.len()
                                && !bytes[*pos].is_ascii_whitespace()
                                && bytes[*pos] != b'>'
                            {
                                *pos += 1;
                            }
                            &input[value_start..*pos]
                        }
                    }
                } else {
                    ""
                };

                if !attr_name.is_empty() {
                    attrs.push(Attribute {
                        name: attr_name,
                        value: html_escape::decode_html_entities(value).into_owned(),
                    });
                }
            }
        }
    }

    Ok(Token::StartTag {
        name,
        attrs,
        self_closing,
    })
}
